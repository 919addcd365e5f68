//
//  tf-collect
//  api/server/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/Data Center API v1.0
//!
//! Self-hosted instances expose repositories per project key under
//! `/rest/api/1.0/projects/{projectKey}/repos`, paginated by offset.
//!
//! ## API Differences from Cloud
//!
//! - Uses project keys instead of workspace slugs
//! - Offset pagination (`start`, `limit`, `isLastPage`, `nextPageStart`)
//! - SSH clone links use the `ssh://git@host:port/...` form

pub mod repositories;

pub use repositories::{Repository, RepositoryLinks};
