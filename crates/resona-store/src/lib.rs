//! # resona-store
//!
//! Notification persistence for Resona Notify. The persistence engine is a
//! collaborator behind the [`NotificationRepository`] trait; this crate
//! ships the always-available in-memory implementation and, behind the
//! `postgres` feature, a PostgreSQL implementation. The
//! [`NotificationStore`] layers the lifecycle policy (expiry, status state
//! machine, ownership checks, best-effort failure semantics) on top.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;
pub mod store;

pub use memory::MemoryNotificationRepository;
#[cfg(feature = "postgres")]
pub use postgres::PgNotificationRepository;
pub use repository::NotificationRepository;
pub use store::NotificationStore;
