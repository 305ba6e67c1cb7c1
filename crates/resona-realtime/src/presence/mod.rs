//! Presence registry: connection lifecycle, groups, and liveness.

pub mod group;
pub mod handle;
pub mod pool;
pub mod registry;

pub use group::{GroupKey, GroupRegistry};
pub use handle::ConnectionHandle;
pub use pool::ConnectionPool;
pub use registry::PresenceRegistry;
