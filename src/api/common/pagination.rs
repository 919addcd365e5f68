//
//  tf-collect
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Pagination Types
//!
//! Page envelopes for the two Bitbucket platforms:
//!
//! - **Cloud** returns a `next` URL until the last page.
//! - **Server/DC** returns `isLastPage` and, while more pages exist,
//!   `nextPageStart` to pass as the next `start` parameter.

use serde::Deserialize;

/// Number of items requested per page on both platforms.
pub const PAGE_SIZE: u32 = 100;

/// Paginated response from Bitbucket Cloud API v2.0.
///
/// # Example
///
/// ```rust
/// use tf_collect::api::common::PaginatedResponse;
///
/// let json = r#"{"values": [1, 2], "page": 1, "next": "https://api.bitbucket.org/2.0/x?page=2"}"#;
/// let page: PaginatedResponse<u32> = serde_json::from_str(json).unwrap();
/// assert_eq!(page.next.as_deref(), Some("https://api.bitbucket.org/2.0/x?page=2"));
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,

    /// Current page number (1-based).
    #[serde(default)]
    pub page: Option<u32>,

    /// Absolute URL of the next page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// Paginated response from Bitbucket Server/Data Center API v1.0.
///
/// | Field | Description |
/// |-------|-------------|
/// | `values` | Items in the current page |
/// | `isLastPage` | Whether this is the final page |
/// | `nextPageStart` | Offset for the next page, when not last |
#[derive(Debug, Clone, Deserialize)]
pub struct ServerPaginatedResponse<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,

    /// Whether this is the last page of results.
    #[serde(default = "default_true", rename = "isLastPage")]
    pub is_last_page: bool,

    /// Start offset for the next page.
    #[serde(default, rename = "nextPageStart")]
    pub next_page_start: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl<T> ServerPaginatedResponse<T> {
    /// Whether another page follows this one.
    pub fn has_next(&self) -> bool {
        !self.is_last_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_page_without_flag_is_last() {
        let page: ServerPaginatedResponse<String> =
            serde_json::from_str(r#"{"values": ["a"]}"#).unwrap();
        assert!(!page.has_next());
        assert_eq!(page.next_page_start, None);
    }

    #[test]
    fn test_server_next_page_start() {
        let json = r#"{"values": [], "size": 0, "limit": 100, "isLastPage": false, "nextPageStart": 100, "start": 0}"#;
        let page: ServerPaginatedResponse<String> = serde_json::from_str(json).unwrap();
        assert!(page.has_next());
        assert_eq!(page.next_page_start, Some(100));
    }

    #[test]
    fn test_cloud_last_page() {
        let page: PaginatedResponse<String> =
            serde_json::from_str(r#"{"values": ["x"], "page": 3, "pagelen": 100}"#).unwrap();
        assert_eq!(page.page, Some(3));
        assert_eq!(page.next, None);
    }
}
