//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Load `.env` and connect using `API_DATABASE_URL`, falling back to
/// `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "API_DATABASE_URL not set")?;

    tracing::info!("Connecting to database...");
    Ok(golazo_api::db::create_pool(&database_url).await?)
}
