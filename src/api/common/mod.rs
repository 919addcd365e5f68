//
//  tf-collect
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for Bitbucket Cloud and Server
//!
//! This module provides shared types used by both repository-listing
//! backends: the unified error type, clone links, and the pagination
//! envelopes (re-exported from the [`pagination`] submodule).
//!
//! # Example
//!
//! ```rust
//! use tf_collect::api::common::ApiError;
//!
//! fn describe(result: Result<(), ApiError>) -> String {
//!     match result {
//!         Ok(()) => "ok".to_string(),
//!         Err(ApiError::AuthFailed(reason)) => format!("check credentials: {reason}"),
//!         Err(e) => e.to_string(),
//!     }
//! }
//!
//! assert_eq!(describe(Err(ApiError::RateLimited)), "Rate limit exceeded");
//! ```

use serde::Deserialize;
use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Unified error type for Bitbucket API calls.
///
/// # Variants
///
/// | Variant | Description | HTTP Status |
/// |---------|-------------|-------------|
/// | `AuthFailed` | Invalid or expired credentials | 401 |
/// | `Forbidden` | Insufficient permissions | 403 |
/// | `NotFound` | Project or workspace does not exist | 404 |
/// | `RateLimited` | Too many requests | 429 |
/// | `ServerError` | Internal server error | 5xx |
/// | `Network` | Connectivity, TLS, or timeout failure | N/A |
/// | `Decode` | Response body did not match the expected shape | N/A |
/// | `InvalidUrl` | API root or pagination link is not a usable URL | N/A |
/// | `ForeignLink` | Pagination link leaves the API root's origin | N/A |
/// | `Unknown` | Any other non-success status | N/A |
///
/// # Notes
///
/// - The `Network` variant automatically converts from `reqwest::Error`
/// - Messages carry the human-readable part of the Bitbucket error body
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed due to invalid or expired credentials.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The authenticated user may not list this project or workspace.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// The requested project or workspace was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The Bitbucket instance answered with a 5xx status.
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Unexpected response body: {0}")]
    Decode(reqwest::Error),

    /// The API root or a pagination link could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A pagination link points at a different scheme, host, or port than
    /// the API root. Credentials are never sent there.
    #[error("Refusing to follow pagination link to another origin: {0}")]
    ForeignLink(String),

    /// An unknown or unexpected error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A named hyperlink, as found in the `links.clone` array of a repository.
///
/// Both platforms name their clone links: `"ssh"` and `"http"` on Server,
/// `"ssh"` and `"https"` on Cloud.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// The URL of the link.
    pub href: String,

    /// Protocol name of the link.
    #[serde(default)]
    pub name: Option<String>,
}

/// Returns the href of the link named `ssh`, if any.
pub fn ssh_href(links: &[Link]) -> Option<&str> {
    links
        .iter()
        .find(|link| link.name.as_deref() == Some("ssh"))
        .map(|link| link.href.as_str())
}
