//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build
//! time.

use sqlx::migrate::Migrator;

static MIGRATOR: Migrator = sqlx::migrate!("../api/migrations");

/// Apply pending migrations.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!(
        available = MIGRATOR.iter().count(),
        "Running migrations..."
    );
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
