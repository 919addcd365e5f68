//
//  tf-collect
//  repo/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Repository Identity
//!
//! A [`RepositorySpec`] is the unit of work every pipeline stage operates on.
//! It pairs the SSH clone URL with a name derived from it; the name doubles as
//! the directory the repository is cloned into under `repos/`.
//!
//! ## Accepted URL Shapes
//!
//! | Shape | Example |
//! |-------|---------|
//! | scp-like | `git@bitbucket.org:platform/terraform-vpc.git` |
//! | `ssh://` | `ssh://git@bitbucket.example.com:7999/infra/terraform-vpc.git` |
//!
//! HTTPS and local paths are rejected: the clone stage authenticates purely
//! through the user's SSH agent.
//!
//! ## Example
//!
//! ```rust
//! use tf_collect::repo::RepositorySpec;
//!
//! let repo = RepositorySpec::parse("git@bitbucket.org:platform/terraform-vpc.git").unwrap();
//! assert_eq!(repo.name(), "terraform-vpc");
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// `user@host:path`
static SCP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:(?P<path>[^\s:]+)$").expect("valid regex")
});

/// `ssh://user@host[:port]/path`
static SSH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ssh://[A-Za-z0-9._-]+@[A-Za-z0-9.-]+(?::\d+)?/(?P<path>\S+)$")
        .expect("valid regex")
});

/// Reasons an SSH URL cannot become a [`RepositorySpec`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoUrlError {
    /// The URL is not an SSH Git URL.
    #[error("unsupported repository URL '{0}': only SSH URLs (user@host:path/repo.git) are supported")]
    Unsupported(String),

    /// The URL has no usable final path segment.
    #[error("cannot derive a repository name from '{0}'")]
    NoName(String),
}

/// One repository to collect, identified by its SSH clone URL.
///
/// Constructed once during resolution and immutable afterwards. Two specs are
/// equal when their URLs are equal; the derived name is a pure function of
/// the URL.
///
/// # Fields
///
/// * `ssh_url` - The clone URL exactly as configured or discovered (trimmed)
/// * `name` - Last path segment with any `.git` suffix removed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySpec {
    ssh_url: String,
    name: String,
}

impl RepositorySpec {
    /// Validates an SSH URL and derives the repository name from it.
    ///
    /// # Parameters
    ///
    /// * `url` - An scp-like or `ssh://` Git URL; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// The parsed repository on success, or a [`RepoUrlError`] describing why the URL was
    /// rejected.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tf_collect::repo::RepositorySpec;
    ///
    /// let repo = RepositorySpec::parse("ssh://git@bb.example.com:7999/infra/network.git").unwrap();
    /// assert_eq!(repo.name(), "network");
    /// assert!(RepositorySpec::parse("https://bitbucket.org/team/repo.git").is_err());
    /// ```
    pub fn parse(url: &str) -> Result<Self, RepoUrlError> {
        let url = url.trim();
        let captures = SCP_URL
            .captures(url)
            .or_else(|| SSH_URL.captures(url))
            .ok_or_else(|| RepoUrlError::Unsupported(url.to_string()))?;

        let path = captures.name("path").map(|m| m.as_str()).unwrap_or_default();
        let name = derive_name(path).ok_or_else(|| RepoUrlError::NoName(url.to_string()))?;

        Ok(Self {
            ssh_url: url.to_string(),
            name,
        })
    }

    /// The SSH clone URL.
    pub fn ssh_url(&self) -> &str {
        &self.ssh_url
    }

    /// The derived repository name, used as the clone directory name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositorySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ssh_url)
    }
}

impl Serialize for RepositorySpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("RepositorySpec", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("ssh_url", &self.ssh_url)?;
        state.end()
    }
}

fn derive_name(path: &str) -> Option<String> {
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scp_url() {
        let repo = RepositorySpec::parse("git@bitbucket.org:platform/terraform-vpc.git").unwrap();
        assert_eq!(repo.name(), "terraform-vpc");
        assert_eq!(repo.ssh_url(), "git@bitbucket.org:platform/terraform-vpc.git");
    }

    #[test]
    fn test_parse_ssh_scheme_with_port() {
        let repo =
            RepositorySpec::parse("ssh://git@bitbucket.example.com:7999/infra/network.git").unwrap();
        assert_eq!(repo.name(), "network");
    }

    #[test]
    fn test_name_without_git_suffix() {
        let repo = RepositorySpec::parse("git@github.com:org/group/modules").unwrap();
        assert_eq!(repo.name(), "modules");
    }

    #[test]
    fn test_trims_whitespace() {
        let repo = RepositorySpec::parse("  git@github.com:org/repo.git\n").unwrap();
        assert_eq!(repo.ssh_url(), "git@github.com:org/repo.git");
    }

    #[test]
    fn test_rejects_non_ssh_urls() {
        for url in [
            "https://bitbucket.org/team/repo.git",
            "/srv/git/repo.git",
            "repo",
            "",
            "git@bitbucket.org",
        ] {
            assert!(
                matches!(RepositorySpec::parse(url), Err(RepoUrlError::Unsupported(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_empty_name() {
        assert_eq!(
            RepositorySpec::parse("git@bitbucket.org:team/.git"),
            Err(RepoUrlError::NoName("git@bitbucket.org:team/.git".to_string()))
        );
    }

    #[test]
    fn test_equality_follows_url() {
        let a = RepositorySpec::parse("git@a.org:x/repo.git").unwrap();
        let b = RepositorySpec::parse("git@b.org:y/repo.git").unwrap();
        assert_eq!(a.name(), b.name());
        assert_ne!(a, b);
    }
}
