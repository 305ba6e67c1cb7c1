//! Redis pub/sub transport for the outbound bus.

use async_trait::async_trait;

use resona_core::error::AppError;
use resona_core::result::AppResult;

use super::publisher::BusTransport;

/// Redis PUBLISH transport.
#[derive(Debug, Clone)]
pub struct RedisBusTransport {
    /// Redis URL.
    url: String,
}

impl RedisBusTransport {
    /// Creates a new Redis transport.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl BusTransport for RedisBusTransport {
    async fn publish(&self, topic: &str, payload: &str) -> AppResult<()> {
        let client = redis::Client::open(self.url.as_str())
            .map_err(|e| AppError::bus(format!("Redis connection failed: {e}")))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::bus(format!("Redis connection failed: {e}")))?;

        redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await
            .map_err(|e| AppError::bus(format!("Redis PUBLISH failed: {e}")))?;

        Ok(())
    }
}
