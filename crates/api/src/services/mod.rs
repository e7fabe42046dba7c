//! Business logic shared by the route handlers.

pub mod auth;
pub mod cart;
