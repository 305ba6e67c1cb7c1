//! # resona-core
//!
//! Core crate for Resona Notify. Contains configuration schemas, typed
//! identifiers, outbound bus event envelopes, pagination types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Resona crates.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
