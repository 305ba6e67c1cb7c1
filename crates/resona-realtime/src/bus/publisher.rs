//! Fire-and-forget outbound event publishing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use resona_core::config::bus::BusConfig;
use resona_core::events::BusEnvelope;
use resona_core::result::AppResult;

/// A publish-only, topic-addressable transport.
#[async_trait]
pub trait BusTransport: Send + Sync + 'static {
    /// Publish a serialized payload to a topic.
    async fn publish(&self, topic: &str, payload: &str) -> AppResult<()>;
}

/// Best-effort publisher of friend-graph events to the outbound bus.
///
/// Returns quickly and never surfaces an error to the caller: transport
/// unavailability is logged and the event is dropped. The notification
/// store already holds the durable copy of intra-service effects; this
/// channel exists only for other services' convenience.
#[derive(Clone)]
pub struct OutboundPublisher {
    transport: Option<Arc<dyn BusTransport>>,
    topic_prefix: String,
}

impl std::fmt::Debug for OutboundPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundPublisher")
            .field("enabled", &self.transport.is_some())
            .finish()
    }
}

impl OutboundPublisher {
    /// A publisher over the given transport.
    pub fn new(transport: Arc<dyn BusTransport>, topic_prefix: impl Into<String>) -> Self {
        Self {
            transport: Some(transport),
            topic_prefix: topic_prefix.into(),
        }
    }

    /// A no-op publisher; every publish is dropped silently.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            topic_prefix: String::new(),
        }
    }

    /// Builds a publisher from configuration.
    ///
    /// Without the `redis-bus` feature, or with the bus disabled or
    /// missing a URL, this degrades to the no-op publisher.
    pub fn from_config(config: &BusConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }

        #[cfg(feature = "redis-bus")]
        if let Some(url) = &config.url {
            return Self::new(
                Arc::new(crate::bus::redis::RedisBusTransport::new(url)),
                config.topic_prefix.clone(),
            );
        }

        warn!("Outbound bus enabled but no transport available, publishing disabled");
        Self::disabled()
    }

    /// Whether a transport is configured.
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Publish an envelope. Infallible: failures are logged and dropped.
    pub async fn publish(&self, envelope: &BusEnvelope) {
        let Some(transport) = &self.transport else {
            return;
        };

        let topic = format!("{}:{}", self.topic_prefix, envelope.topic());
        let payload = match serde_json::to_string(envelope) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to serialize bus envelope, dropping");
                return;
            }
        };

        match transport.publish(&topic, &payload).await {
            Ok(()) => {
                debug!(topic = %topic, event_id = %envelope.event_id, "Published bus event");
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "Bus publish failed, dropping event");
            }
        }
    }
}
