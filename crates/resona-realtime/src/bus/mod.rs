//! Outbound cross-service bus.
//!
//! Strictly one-way: friend-graph events are published for other
//! services; nothing is ever consumed back into this service's own push
//! pipeline.

pub mod publisher;
#[cfg(feature = "redis-bus")]
pub mod redis;

pub use publisher::{BusTransport, OutboundPublisher};
#[cfg(feature = "redis-bus")]
pub use redis::RedisBusTransport;
