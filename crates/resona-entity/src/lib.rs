//! # resona-entity
//!
//! Domain entity models for Resona Notify. Every struct in this crate
//! represents a stored record or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, and `Deserialize`; mapping to
//! database rows lives with the repository implementations.

pub mod notification;
pub mod presence;
