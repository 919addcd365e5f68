//
//  tf-collect
//  resolver/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Source Resolver
//!
//! Turns configuration into the ordered, deduplicated list of repositories
//! every stage works on.
//!
//! ## Sources
//!
//! | Source | Invalid URL | Backend failure |
//! |--------|-------------|-----------------|
//! | `repositories` (static) | fatal [`ConfigError`] | n/a |
//! | `bitbucket` (discovery) | skipped with a warning | backend contributes nothing |
//!
//! Static entries come first, then discovered ones. Duplicates (same SSH URL)
//! keep their first position. Two different URLs deriving the same directory
//! name are a configuration error.
//!
//! ## Persistence
//!
//! [`write_discovery_output`] writes the list in the same shape the
//! `repositories` key accepts, so the output of `discover` can be fed back
//! in as a configuration file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{write_config_file, Config, ConfigError};
use crate::discovery::{self, Discovery, DiscoveryError};
use crate::repo::RepositorySpec;

/// The resolved repository set plus the discovery backends that failed.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Repositories in first-seen order.
    pub repositories: Vec<RepositorySpec>,
    /// Per-backend discovery failures, already logged.
    pub discovery_errors: Vec<DiscoveryError>,
}

/// Resolves the configured repository set, querying discovery backends
/// when a `bitbucket` section is present.
///
/// # Errors
///
/// [`ConfigError::InvalidRepository`] for a malformed static entry and
/// [`ConfigError::DuplicateName`] for a directory name collision.
pub async fn resolve(config: &Config) -> Result<Resolution, ConfigError> {
    let discovery = match &config.bitbucket {
        Some(bitbucket) => discovery::discover(bitbucket).await,
        None => Discovery::default(),
    };
    resolve_with(config.static_repositories(), discovery)
}

/// Merges static URLs with discovered ones.
///
/// Separated from [`resolve`] so the merge rules can be exercised without a
/// network.
pub fn resolve_with(static_urls: &[String], discovery: Discovery) -> Result<Resolution, ConfigError> {
    let mut candidates = Vec::with_capacity(static_urls.len() + discovery.urls.len());

    for url in static_urls {
        candidates.push(RepositorySpec::parse(url)?);
    }

    for url in &discovery.urls {
        match RepositorySpec::parse(url) {
            Ok(spec) => candidates.push(spec),
            Err(e) => warn!(url, error = %e, "skipping discovered repository"),
        }
    }

    let repositories = dedupe(candidates)?;
    info!(
        configured = static_urls.len(),
        discovered = discovery.urls.len(),
        resolved = repositories.len(),
        "repository set resolved"
    );

    Ok(Resolution {
        repositories,
        discovery_errors: discovery.errors,
    })
}

/// Drops repeated URLs, keeping first-seen order, and rejects name collisions.
fn dedupe(candidates: Vec<RepositorySpec>) -> Result<Vec<RepositorySpec>, ConfigError> {
    let mut seen_urls = HashSet::new();
    let mut names: HashMap<String, String> = HashMap::new();
    let mut unique = Vec::new();

    for spec in candidates {
        if !seen_urls.insert(spec.ssh_url().to_string()) {
            continue;
        }
        if let Some(first) = names.get(spec.name()) {
            return Err(ConfigError::DuplicateName {
                name: spec.name().to_string(),
                first: first.clone(),
                second: spec.ssh_url().to_string(),
            });
        }
        names.insert(spec.name().to_string(), spec.ssh_url().to_string());
        unique.push(spec);
    }

    Ok(unique)
}

/// `repos.yaml` contents.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiscoveryOutput {
    /// SSH URLs, in resolution order.
    pub repositories: Vec<String>,
}

impl DiscoveryOutput {
    /// Builds the output document for a resolved set.
    pub fn from_specs(specs: &[RepositorySpec]) -> Self {
        Self {
            repositories: specs.iter().map(|s| s.ssh_url().to_string()).collect(),
        }
    }
}

/// Writes the resolved set to `path` as YAML.
///
/// # Errors
///
/// [`ConfigError::Write`] when serialization or the write fails.
pub fn write_discovery_output(path: &Path, specs: &[RepositorySpec]) -> Result<(), ConfigError> {
    let write_error = |reason: String| ConfigError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let yaml = serde_yaml::to_string(&DiscoveryOutput::from_specs(specs))
        .map_err(|e| write_error(e.to_string()))?;
    write_config_file(path, &yaml).map_err(|e| write_error(e.to_string()))?;

    info!(path = %path.display(), count = specs.len(), "wrote discovery output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn names(resolution: &Resolution) -> Vec<&str> {
        resolution.repositories.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_static_only() {
        let resolution = resolve_with(
            &urls(&["git@bitbucket.org:team/a.git", "git@bitbucket.org:team/b.git"]),
            Discovery::default(),
        )
        .unwrap();
        assert_eq!(names(&resolution), vec!["a", "b"]);
    }

    #[test]
    fn test_union_dedupes_preserving_first_seen_order() {
        let discovery = Discovery {
            urls: urls(&[
                "git@bitbucket.org:team/c.git",
                "git@bitbucket.org:team/a.git",
                "git@bitbucket.org:team/c.git",
            ]),
            errors: Vec::new(),
        };
        let resolution = resolve_with(
            &urls(&["git@bitbucket.org:team/a.git", "git@bitbucket.org:team/b.git"]),
            discovery,
        )
        .unwrap();
        assert_eq!(names(&resolution), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_static_url_is_fatal() {
        let err = resolve_with(
            &urls(&["git@bitbucket.org:team/a.git", "https://bitbucket.org/team/b.git"]),
            Discovery::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRepository(_)));
    }

    #[test]
    fn test_invalid_discovered_url_is_skipped() {
        let discovery = Discovery {
            urls: urls(&["https://bitbucket.org/team/x.git", "git@bitbucket.org:team/y.git"]),
            errors: Vec::new(),
        };
        let resolution = resolve_with(&[], discovery).unwrap();
        assert_eq!(names(&resolution), vec!["y"]);
    }

    #[test]
    fn test_name_collision_is_config_error() {
        let err = resolve_with(
            &urls(&[
                "git@bitbucket.org:team-a/network.git",
                "ssh://git@bb.example.com:7999/infra/network.git",
            ]),
            Discovery::default(),
        )
        .unwrap_err();

        match err {
            ConfigError::DuplicateName { name, first, second } => {
                assert_eq!(name, "network");
                assert_eq!(first, "git@bitbucket.org:team-a/network.git");
                assert_eq!(second, "ssh://git@bb.example.com:7999/infra/network.git");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_static_list() {
        let resolution = resolve_with(&[], Discovery::default()).unwrap();
        assert!(resolution.repositories.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_without_bitbucket_uses_static_list() {
        let config = Config::from_yaml(
            "repositories:\n  - git@bitbucket.org:team/vpc.git\n",
            PathBuf::new(),
        )
        .unwrap();
        let resolution = resolve(&config).await.unwrap();
        assert_eq!(names(&resolution), vec!["vpc"]);
        assert!(resolution.discovery_errors.is_empty());
    }

    #[test]
    fn test_discovery_output_is_valid_static_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.yaml");
        let specs = resolve_with(
            &urls(&[
                "git@bitbucket.org:team/a.git",
                "ssh://git@bb.example.com:7999/infra/b.git",
            ]),
            Discovery::default(),
        )
        .unwrap()
        .repositories;

        write_discovery_output(&path, &specs).unwrap();

        let reloaded = Config::load(&path).unwrap();
        let again = resolve_with(reloaded.static_repositories(), Discovery::default()).unwrap();
        assert_eq!(again.repositories, specs);
    }
}
