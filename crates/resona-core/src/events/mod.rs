//! Events published to the outbound cross-service bus.
//!
//! The bus is strictly one-way: this service publishes friend-graph
//! changes for other services to consume, and never re-ingests its own
//! events. Every envelope carries a correlation id so any future consumer
//! can deduplicate.

pub mod friendship;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::EventId;

pub use friendship::FriendshipEvent;

/// Wrapper for all outbound bus events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEnvelope {
    /// Correlation id, unique per logical domain action.
    pub event_id: EventId,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
    /// The event payload.
    pub event: FriendshipEvent,
}

impl BusEnvelope {
    /// Create a new envelope around a friendship event.
    pub fn new(event: FriendshipEvent) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_at: Utc::now(),
            event,
        }
    }

    /// The topic suffix this envelope is published under.
    pub fn topic(&self) -> &'static str {
        "friendship"
    }
}
