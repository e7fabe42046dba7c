//! Persistence for the catalog, accounts and orders.
//!
//! # Tables
//!
//! - `products` - Catalog with price and stock
//! - `users` - Accounts with argon2 password hashes
//! - `orders` - One row per checkout
//! - `order_items` - Lines of an order, with the unit price paid
//!
//! Handlers talk to storage through the [`Store`] trait. [`PgStore`] is the
//! `PostgreSQL` implementation; [`MemoryStore`] keeps everything in process
//! and backs the router tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p golazo-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use golazo_core::{
    Category, CreateOrderRequest, Email, Order, OrderId, OrderWithItems, Product, ProductId,
    ProductInput, Role, User, UserId,
};

pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, unknown product).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Fields needed to create an account. The password is already hashed.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub role: Role,
}

/// Catalog storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, or only those of `category`, ordered by id.
    async fn list_products(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Product>, RepositoryError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create_product(&self, input: &ProductInput) -> Result<Product, RepositoryError>;

    /// Replace every field of a product. `None` when it does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Returns `false` when nothing was deleted.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Decrement stock by `quantity` if at least that much is available.
    ///
    /// Check and decrement happen atomically. `None` means the product is
    /// missing or the stock is insufficient.
    async fn reduce_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError>;
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up an account and its password hash.
    async fn find_user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Returns `RepositoryError::Conflict` when the email is taken.
    async fn create_user(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert the order (status `confirmed`) and its items as one unit.
    async fn create_order(
        &self,
        user_id: UserId,
        request: &CreateOrderRequest,
    ) -> Result<Order, RepositoryError>;

    /// Orders of a user, newest first, with their lines.
    async fn orders_for_user(&self, user_id: UserId)
    -> Result<Vec<OrderWithItems>, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError>;
}

/// Everything the API needs from storage.
#[async_trait]
pub trait Store: ProductStore + UserStore + OrderStore {
    /// Round-trip to the backend, returning its clock.
    async fn ping(&self) -> Result<DateTime<Utc>, RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<DateTime<Utc>, RepositoryError> {
        let now: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&self.pool)
            .await?;
        Ok(now)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error, turning constraint violations into `Conflict` naming
/// the constraint that failed.
pub(crate) fn map_constraint_error(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && (db_err.is_unique_violation()
            || db_err.is_foreign_key_violation()
            || db_err.is_check_violation())
    {
        let constraint = db_err.constraint().unwrap_or("constraint");
        return RepositoryError::Conflict(format!("{what}: {constraint} violated"));
    }
    RepositoryError::Database(err)
}

/// Like [`map_constraint_error`], except a foreign-key violation is
/// reported as `missing`.
pub(crate) fn map_reference_error(err: sqlx::Error, missing: &str, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(missing.to_owned());
    }
    map_constraint_error(err, what)
}
