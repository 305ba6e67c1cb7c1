//! Active-viewer tracking for conversation-level push suppression.

pub mod tracker;

pub use tracker::ActiveViewerTracker;
