//! # resona-realtime
//!
//! Real-time fan-out core for Resona Notify. Provides:
//!
//! - Presence registry: connection lifecycle, per-user groups, online set
//! - Active-viewer tracking for conversation-level push suppression
//! - Event fan-out coordination (store write + live push + unread counts)
//! - Fire-and-forget outbound publishing of friend-graph events
//! - Liveness sweep for abnormally closed connections

pub mod bus;
pub mod engine;
pub mod fanout;
pub mod message;
pub mod presence;
pub mod viewer;

pub use bus::publisher::OutboundPublisher;
pub use engine::{FriendDirectory, NotifyEngine};
pub use fanout::coordinator::FanoutCoordinator;
pub use presence::registry::PresenceRegistry;
pub use viewer::tracker::ActiveViewerTracker;
