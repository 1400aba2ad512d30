// crates/frog-growth-core/src/db.rs

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;

use crate::error::Result;

pub type DbPool = Pool<Postgres>;

/// Establish a Postgres connection pool for the extraction queries.
///
/// The pipeline issues its queries one after another, so a small pool is
/// enough.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    info!("Database connection pool established");
    Ok(pool)
}

/// Close every connection in the pool, waiting for in-flight queries.
pub async fn disconnect(pool: DbPool) {
    pool.close().await;
    info!("Database connection pool closed");
}
