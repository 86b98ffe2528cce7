use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub mod listing_queries;

/// Initialize the PostgreSQL connection pool.
///
/// Schema management happens outside this service; the pool only assumes
/// the `listings` table exists.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
}
