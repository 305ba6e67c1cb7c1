//! Pagination types for notification listing.

use serde::{Deserialize, Serialize};

/// Default number of items returned when the caller does not specify.
const DEFAULT_LIMIT: u64 = 25;
/// Hard cap on the number of items per query.
const MAX_LIMIT: u64 = 100;

/// Serde default provider for [`PageRequest::limit`].
fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// Limit/skip window for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of items to skip from the newest.
    #[serde(default)]
    pub skip: u64,
}

impl PageRequest {
    /// Create a new page request. The limit is clamped to `1..=100`.
    pub fn new(limit: u64, skip: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            skip,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items in this window, most recent first.
    pub items: Vec<T>,
    /// Total number of matching items across all windows.
    pub total: u64,
    /// The limit that produced this window.
    pub limit: u64,
    /// The skip that produced this window.
    pub skip: u64,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, total: u64, page: &PageRequest) -> Self {
        Self {
            items,
            total,
            limit: page.limit,
            skip: page.skip,
        }
    }

    /// Whether more items exist past this window.
    pub fn has_more(&self) -> bool {
        self.skip + (self.items.len() as u64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_clamped() {
        let page = PageRequest::new(500, 0);
        assert_eq!(page.limit, MAX_LIMIT);
        let page = PageRequest::new(0, 0);
        assert_eq!(page.limit, 1);
    }

    #[test]
    fn test_has_more() {
        let page = PageRequest::new(10, 0);
        let resp = PageResponse::new(vec![1u32; 10], 25, &page);
        assert!(resp.has_more());
        let resp = PageResponse::new(vec![1u32; 5], 5, &page);
        assert!(!resp.has_more());
    }
}
