//
//  tf-collect
//  api/server/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Repository API
//!
//! Repository payloads and the project repository listing.
//!
//! ## API Endpoint
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}/repos?start={start}&limit=100
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let client = BitbucketClient::server(&server.api_root())?.with_auth(auth);
//! for repo in client.list_project_repositories("INFRA").await? {
//!     println!("{} -> {:?}", repo.name, repo.ssh_clone_url());
//! }
//! ```

use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::client::BitbucketClient;
use crate::api::common::{ssh_href, ApiError, Link, ServerPaginatedResponse, PAGE_SIZE};

/// A repository in Bitbucket Server/Data Center.
///
/// Only the fields discovery needs are decoded; everything else in the
/// payload is ignored.
///
/// # Fields
///
/// * `name` - Display name, the value matched against `repo_pattern`
/// * `links` - Clone links (typically `ssh` and `http`)
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Human-readable name of the repository.
    pub name: String,

    /// Collection of links for accessing the repository.
    #[serde(default)]
    pub links: RepositoryLinks,
}

impl Repository {
    /// The `ssh` clone URL, e.g. `ssh://git@bitbucket.example.com:7999/infra/vpc.git`.
    pub fn ssh_clone_url(&self) -> Option<&str> {
        ssh_href(&self.links.clone)
    }
}

/// Links block of a Server repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryLinks {
    /// Clone URLs, one per protocol.
    #[serde(default)]
    pub clone: Vec<Link>,
}

impl BitbucketClient {
    /// Lists every repository of a project, following `nextPageStart` until
    /// the server reports the last page.
    ///
    /// # Parameters
    ///
    /// * `project_key` - The project key (e.g. `INFRA`)
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from a page request. Pages fetched before the failure
    /// are discarded.
    ///
    /// # Notes
    ///
    /// - A `nextPageStart` that does not move past the current offset ends the
    ///   listing with a warning instead of looping forever
    /// - So does a page that is not the last but carries no `nextPageStart`
    pub async fn list_project_repositories(
        &self,
        project_key: &str,
    ) -> Result<Vec<Repository>, ApiError> {
        let mut repositories = Vec::new();
        let mut start: u32 = 0;

        loop {
            let page: ServerPaginatedResponse<Repository> = self
                .get(
                    &["projects", project_key, "repos"],
                    &[("start", start.to_string()), ("limit", PAGE_SIZE.to_string())],
                )
                .await?;

            debug!(
                project = project_key,
                start,
                count = page.values.len(),
                "fetched repository page"
            );

            let more = page.has_next();
            let next = page.next_page_start;
            repositories.extend(page.values);

            if !more {
                break;
            }
            match next {
                Some(next_start) if next_start > start => start = next_start,
                Some(next_start) => {
                    warn!(
                        project = project_key,
                        start, next_start, "pagination did not advance, stopping"
                    );
                    break;
                }
                None => {
                    warn!(
                        project = project_key,
                        start,
                        fetched = repositories.len(),
                        "page is not the last but has no nextPageStart, stopping"
                    );
                    break;
                }
            }
        }

        Ok(repositories)
    }
}
