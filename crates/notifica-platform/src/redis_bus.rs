use anyhow::Result;
use redis::{AsyncCommands, Client};
use serde::Serialize;
use tracing::debug;

/// Thin publish-side wrapper over redis pub/sub for lifecycle events.
#[derive(Clone)]
pub struct RedisBus {
    client: Client,
}

impl RedisBus {
    pub fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }

    pub async fn publish_json<T: Serialize>(&self, channel: &str, payload: &T) -> Result<()> {
        let mut connection = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(payload)?;
        let receivers: i64 = connection.publish(channel, serialized).await?;
        debug!("published to {channel} ({receivers} receivers)");
        Ok(())
    }
}
