//
//  tf-collect
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP access to the Bitbucket repository-listing endpoints used by
//! discovery.
//!
//! ## Supported Platforms
//!
//! - **Bitbucket Cloud**: API v2.0 at `api.bitbucket.org`
//! - **Bitbucket Server/Data Center**: API v1.0 at your custom host
//!
//! ## Architecture
//!
//! - [`client`]: Core HTTP client with authentication and error mapping
//! - [`cloud`]: Cloud repository payloads and workspace listing
//! - [`server`]: Server/DC repository payloads and project listing
//! - [`common`]: Shared types (pagination, errors, clone links)
//!
//! ## Error Handling
//!
//! API errors are returned as [`ApiError`] variants, which map to common HTTP error scenarios:
//!
//! - `AuthFailed`: 401 Unauthorized
//! - `Forbidden`: 403 Forbidden
//! - `NotFound`: 404 Not Found
//! - `RateLimited`: 429 Too Many Requests
//! - `ServerError`: 5xx Server Errors

/// Core HTTP client wrapper for Bitbucket APIs.
pub mod client;

/// Bitbucket Cloud API v2.0 repository listing.
pub mod cloud;

/// Bitbucket Server/Data Center API v1.0 repository listing.
pub mod server;

/// Common types shared between Cloud and Server APIs.
pub mod common;

pub use client::BitbucketClient;
pub use common::ApiError;
