//! Golazo Core - Shared types library.
//!
//! This crate provides common types used across all Golazo components:
//! - `api` - REST API over the product catalog, orders and accounts
//! - `client` - Typed HTTP client and the client-side cart
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database mappings are available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, and the enumerated columns
//! - [`models`] - Wire models shared by the API and its clients

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
