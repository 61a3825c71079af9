use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};

/// A connection that cannot be acquired within this bound is an outage,
/// not something to queue behind.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the shared connection pool. Pool size comes from configuration:
/// the gateway serves webhook bursts, the scheduler runs one query a tick.
pub async fn connect_database(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .context("failed to connect to postgres")
}
