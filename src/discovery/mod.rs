//
//  tf-collect
//  discovery/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Discovery
//!
//! Enumerates repositories from Bitbucket Server and Bitbucket Cloud and keeps
//! the SSH clone URLs of those whose name matches a configured pattern.
//!
//! ## Failure Isolation
//!
//! Each backend is queried independently. When a backend cannot be used
//! (missing secret, authentication failure, network error on any page) its
//! contribution is empty and the failure is returned alongside the URLs of
//! the other backends:
//!
//! ```text
//! server ── 401 ──> DiscoveryError::Api      ┐
//! cloud  ── 200 ──> [git@bitbucket.org:...]  ┴─> Discovery { urls, errors }
//! ```
//!
//! ## Pattern Semantics
//!
//! Patterns are anchored at both ends and case-sensitive: `terraform-.*`
//! matches `terraform-vpc` but not `my-terraform-vpc`. An empty or invalid
//! pattern matches nothing.

use std::fmt;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, BitbucketClient};
use crate::auth::{resolve_secret_with, AuthCredential};
use crate::config::{
    BitbucketConfig, CloudConfig, FilterConfig, ServerConfig, CLOUD_APP_PASSWORD_ENV,
    SERVER_PASSWORD_ENV,
};

/// The kind of Bitbucket instance being queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Server,
    Cloud,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "Bitbucket Server"),
            Self::Cloud => write!(f, "Bitbucket Cloud"),
        }
    }
}

/// Why a backend contributed nothing.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Neither the config file nor the environment supplied a secret.
    #[error("{backend}: no secret configured (set it in the config file or via {env_var})")]
    MissingSecret {
        /// Backend that was skipped
        backend: Backend,
        /// Environment variable that would have supplied it
        env_var: &'static str,
    },

    /// The HTTP client could not be constructed.
    #[error("{backend}: cannot create HTTP client: {source}")]
    Client {
        backend: Backend,
        #[source]
        source: ApiError,
    },

    /// Listing a project or workspace failed.
    #[error("{backend}: listing '{container}' failed: {source}")]
    Api {
        /// Backend that failed
        backend: Backend,
        /// Project key or workspace slug
        container: String,
        /// The API failure
        #[source]
        source: ApiError,
    },
}

impl DiscoveryError {
    /// The backend this error belongs to.
    pub fn backend(&self) -> Backend {
        match self {
            Self::MissingSecret { backend, .. }
            | Self::Client { backend, .. }
            | Self::Api { backend, .. } => *backend,
        }
    }
}

/// One query unit: a project key or workspace slug plus the pattern a
/// repository name must match in full.
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    container_id: String,
    pattern: Option<Regex>,
}

impl DiscoveryFilter {
    /// Builds a filter. Empty or invalid patterns are logged and produce a
    /// filter that matches nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tf_collect::discovery::DiscoveryFilter;
    ///
    /// let filter = DiscoveryFilter::new("INFRA", "terraform-.*");
    /// assert!(filter.matches("terraform-vpc"));
    /// assert!(!filter.matches("my-terraform-vpc"));
    /// ```
    pub fn new(container_id: &str, pattern: &str) -> Self {
        let compiled = if pattern.is_empty() {
            warn!(
                container = container_id,
                "empty repo_pattern, no repositories will match"
            );
            None
        } else {
            match Regex::new(&format!("^(?:{pattern})$")) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(
                        container = container_id,
                        pattern,
                        error = %e,
                        "invalid repo_pattern, no repositories will match"
                    );
                    None
                }
            }
        };

        Self {
            container_id: container_id.to_string(),
            pattern: compiled,
        }
    }

    /// Project key or workspace slug.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Whether `name` matches the pattern in full.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(name))
    }
}

impl From<&FilterConfig> for DiscoveryFilter {
    fn from(config: &FilterConfig) -> Self {
        Self::new(&config.name, &config.repo_pattern)
    }
}

/// Result of a discovery run across every configured backend.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Matching SSH clone URLs in discovery order, possibly with duplicates.
    pub urls: Vec<String>,
    /// Backends that contributed nothing, and why.
    pub errors: Vec<DiscoveryError>,
}

/// Runs discovery against every configured backend, reading secret
/// overrides from the process environment.
pub async fn discover(config: &BitbucketConfig) -> Discovery {
    discover_with_env(config, |name| std::env::var(name).ok()).await
}

/// [`discover`] with an injectable environment lookup.
///
/// Server is queried before Cloud; within a backend, filters are queried in
/// configuration order.
pub async fn discover_with_env<F>(config: &BitbucketConfig, lookup: F) -> Discovery
where
    F: Fn(&str) -> Option<String>,
{
    let mut discovery = Discovery::default();

    let server = match &config.server {
        Some(server) => Some(discover_server(server, &lookup).await),
        None => None,
    };
    let cloud = match &config.cloud {
        Some(cloud) => Some(discover_cloud(cloud, &lookup).await),
        None => None,
    };

    for result in [server, cloud].into_iter().flatten() {
        match result {
            Ok(urls) => discovery.urls.extend(urls),
            Err(e) => {
                warn!(backend = %e.backend(), error = %e, "discovery backend skipped");
                discovery.errors.push(e);
            }
        }
    }

    info!(
        discovered = discovery.urls.len(),
        failed_backends = discovery.errors.len(),
        "discovery finished"
    );
    discovery
}

async fn discover_server<F>(server: &ServerConfig, lookup: &F) -> Result<Vec<String>, DiscoveryError>
where
    F: Fn(&str) -> Option<String>,
{
    let backend = Backend::Server;
    let password = resolve_secret_with(server.password.as_deref(), SERVER_PASSWORD_ENV, lookup)
        .ok_or(DiscoveryError::MissingSecret {
            backend,
            env_var: SERVER_PASSWORD_ENV,
        })?;

    let client = BitbucketClient::server(&server.api_root())
        .map_err(|source| DiscoveryError::Client { backend, source })?
        .with_auth(AuthCredential::Basic {
            username: server.username.clone(),
            password,
        });

    let mut urls = Vec::new();
    for filter in server.projects.iter().map(DiscoveryFilter::from) {
        let repos = client
            .list_project_repositories(filter.container_id())
            .await
            .map_err(|source| DiscoveryError::Api {
                backend,
                container: filter.container_id().to_string(),
                source,
            })?;

        urls.extend(select(
            backend,
            &filter,
            repos.iter().map(|r| (r.name.as_str(), r.ssh_clone_url())),
        ));
    }
    Ok(urls)
}

async fn discover_cloud<F>(cloud: &CloudConfig, lookup: &F) -> Result<Vec<String>, DiscoveryError>
where
    F: Fn(&str) -> Option<String>,
{
    let backend = Backend::Cloud;
    let password = resolve_secret_with(cloud.app_password.as_deref(), CLOUD_APP_PASSWORD_ENV, lookup)
        .ok_or(DiscoveryError::MissingSecret {
            backend,
            env_var: CLOUD_APP_PASSWORD_ENV,
        })?;

    let client = BitbucketClient::cloud(&cloud.api_url)
        .map_err(|source| DiscoveryError::Client { backend, source })?
        .with_auth(AuthCredential::AppPassword {
            username: cloud.username.clone(),
            password,
        });

    let mut urls = Vec::new();
    for filter in cloud.workspaces.iter().map(DiscoveryFilter::from) {
        let repos = client
            .list_workspace_repositories(filter.container_id())
            .await
            .map_err(|source| DiscoveryError::Api {
                backend,
                container: filter.container_id().to_string(),
                source,
            })?;

        urls.extend(select(
            backend,
            &filter,
            repos.iter().map(|r| (r.name.as_str(), r.ssh_clone_url())),
        ));
    }
    Ok(urls)
}

/// Keeps the SSH URLs of repositories whose name matches `filter`.
fn select<'a>(
    backend: Backend,
    filter: &DiscoveryFilter,
    repos: impl Iterator<Item = (&'a str, Option<&'a str>)>,
) -> Vec<String> {
    let mut urls = Vec::new();
    for (name, ssh_url) in repos {
        if !filter.matches(name) {
            debug!(%backend, container = filter.container_id(), repo = name, "skipping, name does not match");
            continue;
        }
        match ssh_url {
            Some(url) => {
                debug!(%backend, repo = name, url, "matched");
                urls.push(url.to_string());
            }
            None => warn!(
                %backend,
                container = filter.container_id(),
                repo = name,
                "no SSH clone link, skipping"
            ),
        }
    }
    urls
}
