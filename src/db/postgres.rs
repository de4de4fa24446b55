use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Creates the PostgreSQL connection pool
///
/// A small pool is plenty: every query the storefront issues is short-lived.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    Ok(pool)
}
