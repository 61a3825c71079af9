use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use notifica_core::events::{LifecycleEvent, LifecycleEventKind};
use notifica_core::storage::MeetingStore;
use notifica_engine::sweep::sweep_due_meetings;
use notifica_platform::{RedisBus, ServiceConfig, channels, connect_database};
use notifica_store::PgEntityStore;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
// One sweep query per tick.
const DB_POOL_SIZE: u32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "notifica_scheduler=info".to_string()),
        )
        .init();

    let (database_url, redis_url) = ServiceConfig::worker_from_env()?;
    let pool = connect_database(&database_url, DB_POOL_SIZE).await?;
    let redis = RedisBus::connect(&redis_url)?;
    let store = PgEntityStore::new(pool);

    info!(
        "meeting sweep running every {}s",
        SWEEP_INTERVAL.as_secs()
    );

    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        if let Err(err) = run_sweep(&store, &redis).await {
            error!("sweep pass failed: {err:#}");
        }
    }
}

/// One sweep pass: complete every scheduled meeting whose date and time
/// have passed, then announce each completion on the event bus.
async fn run_sweep(store: &dyn MeetingStore, redis: &RedisBus) -> Result<()> {
    let completed = sweep_due_meetings(store, Utc::now()).await?;
    if completed.is_empty() {
        return Ok(());
    }

    info!("completed {} due meeting(s)", completed.len());
    for meeting_id in completed {
        let event = LifecycleEvent::new(
            meeting_id.to_string(),
            LifecycleEventKind::MeetingCompleted,
        );
        if let Err(err) = redis
            .publish_json(channels::MEETINGS_COMPLETED, &event)
            .await
        {
            error!("failed to publish completion of meeting {meeting_id}: {err:#}");
        }
    }

    Ok(())
}
