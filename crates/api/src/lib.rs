//! Golazo API library.
//!
//! This crate provides the REST API as a library, allowing the router to be
//! driven in tests and the repositories to be reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
