//! Wire message definitions for the push channel.

pub mod types;

pub use types::OutboundEvent;
