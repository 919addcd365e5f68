//
//  tf-collect
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module loads and validates the YAML configuration that drives every
//! pipeline command. The same file feeds discovery, clone, override, and pull,
//! so each stage can be run on its own.
//!
//! ## Example Configuration File
//!
//! ```yaml
//! repositories:
//!   - git@bitbucket.org:platform/terraform-vpc.git
//! rate_limit: 0.5
//! override_sources:
//!   - ./aws_deployment_overrides
//! bitbucket:
//!   server:
//!     url: https://bitbucket.example.com
//!     username: ci-bot
//!     projects:
//!       - name: INFRA
//!         repo_pattern: "terraform-.*"
//!   cloud:
//!     username: ci-bot
//!     workspaces:
//!       - name: platform-team
//!         repo_pattern: ".*-terraform"
//! ```
//!
//! ## Path Resolution
//!
//! Relative paths (`repos_dir`, `override_sources`, `discovery_output`) are
//! resolved against the directory containing the configuration file, not the
//! process working directory.
//!
//! ## Submodules
//!
//! - [`file`]: Low-level configuration file I/O operations
//! - [`bitbucket`]: Discovery backend sections (`bitbucket.server`, `bitbucket.cloud`)

mod bitbucket;
mod file;

pub use bitbucket::*;
pub use file::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::repo::RepoUrlError;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Fatal configuration problems.
///
/// Any of these aborts the command before a single repository is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration file {}: {source}", path.display())]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected schema.
    #[error("cannot parse configuration file {}: {source}", path.display())]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying YAML error
        source: serde_yaml::Error,
    },

    /// Neither `repositories` nor `bitbucket` is configured.
    #[error("no repository source configured: add a 'repositories' list or a 'bitbucket' section")]
    NoRepositorySource,

    /// `rate_limit` is negative, not a number, or too large for a duration.
    #[error("rate_limit must be a non-negative number of seconds, got {0}")]
    InvalidRateLimit(f64),

    /// A statically configured repository URL is malformed.
    #[error("invalid entry in 'repositories': {0}")]
    InvalidRepository(#[from] RepoUrlError),

    /// Two repositories derive the same clone directory name.
    #[error("repositories '{first}' and '{second}' both resolve to directory name '{name}'")]
    DuplicateName {
        /// The colliding directory name
        name: String,
        /// URL that claimed the name first
        first: String,
        /// URL that collided with it
        second: String,
    },

    /// `bitbucket.server.url` is not an http(s) URL.
    #[error("invalid Bitbucket Server URL '{url}': {reason}")]
    InvalidServerUrl {
        /// The configured value
        url: String,
        /// What is wrong with it
        reason: String,
    },

    /// The discovery output could not be written.
    #[error("cannot write {}: {reason}", path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Serialization or I/O failure
        reason: String,
    },
}

/// Pipeline configuration loaded from YAML.
///
/// # Fields
///
/// * `repositories` - Static list of SSH URLs (`None` when the key is absent)
/// * `rate_limit` - Seconds to pause between first-pass items (default `0.1`)
/// * `override_sources` - Directories whose `*.tf` files are copied into each clone
/// * `bitbucket` - Optional discovery backends
/// * `repos_dir` - Where clones live (default `repos`)
/// * `discovery_output` - Where `discover` writes its result (default `repos.yaml`)
/// * `tools` - External executables and their timeout
/// * `base_dir` - Directory of the loaded file; not part of the YAML schema
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub repositories: Option<Vec<String>>,

    #[serde(default = "default_rate_limit")]
    pub rate_limit: f64,

    #[serde(default = "default_override_sources")]
    pub override_sources: Vec<PathBuf>,

    #[serde(default)]
    pub bitbucket: Option<BitbucketConfig>,

    #[serde(default = "default_repos_dir")]
    pub repos_dir: PathBuf,

    #[serde(default = "default_discovery_output")]
    pub discovery_output: PathBuf,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// External tool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    /// Git executable name or path.
    #[serde(default = "default_git")]
    pub git: String,

    /// Terraform executable name or path.
    #[serde(default = "default_terraform")]
    pub terraform: String,

    /// Upper bound for a single tool invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: default_git(),
            terraform: default_terraform(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_rate_limit() -> f64 {
    0.1
}

fn default_override_sources() -> Vec<PathBuf> {
    vec![
        PathBuf::from("./aws_deployment_overrides"),
        PathBuf::from("./k8s/deployment/overrides"),
    ]
}

fn default_repos_dir() -> PathBuf {
    PathBuf::from("repos")
}

fn default_discovery_output() -> PathBuf {
    PathBuf::from("repos.yaml")
}

fn default_git() -> String {
    "git".to_string()
}

fn default_terraform() -> String {
    "terraform".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Config {
    /// Loads and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] when the file is
    /// missing or malformed, and any validation error from [`Config::validate`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use tf_collect::config::Config;
    ///
    /// let config = Config::load("config.yaml".as_ref())?;
    /// println!("clones go to {}", config.repos_path().display());
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::from_yaml(&content, base_dir).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses configuration from a YAML string, resolving relative paths
    /// against `base_dir`.
    pub fn from_yaml(content: &str, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let mut config: Config =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        config.base_dir = base_dir;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repositories.is_none() && self.bitbucket.is_none() {
            return Err(ConfigError::NoRepositorySource);
        }

        if Duration::try_from_secs_f64(self.rate_limit).is_err() {
            return Err(ConfigError::InvalidRateLimit(self.rate_limit));
        }

        if let Some(server) = self.bitbucket.as_ref().and_then(|b| b.server.as_ref()) {
            server.validate_url()?;
        }

        Ok(())
    }

    /// Pause between successive first-pass operations.
    ///
    /// Zero when `rate_limit` does not fit a [`Duration`], which
    /// [`Config::validate`] already rejects.
    pub fn rate_limit_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.rate_limit).unwrap_or_default()
    }

    /// Per-invocation timeout for external tools.
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tools.timeout_secs)
    }

    /// Absolute-or-config-relative directory holding the clones.
    pub fn repos_path(&self) -> PathBuf {
        self.resolve_path(&self.repos_dir)
    }

    /// Override source directories, resolved against the config directory.
    pub fn override_paths(&self) -> Vec<PathBuf> {
        self.override_sources
            .iter()
            .map(|p| self.resolve_path(p))
            .collect()
    }

    /// Destination of the `discover` command.
    pub fn discovery_output_path(&self) -> PathBuf {
        self.resolve_path(&self.discovery_output)
    }

    /// Static repository URLs (empty when not configured).
    pub fn static_repositories(&self) -> &[String] {
        self.repositories.as_deref().unwrap_or_default()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_yaml("repositories: []\n", PathBuf::from("/work")).unwrap();
        assert_eq!(config.rate_limit, 0.1);
        assert_eq!(config.repos_path(), PathBuf::from("/work/repos"));
        assert_eq!(
            config.override_paths(),
            vec![
                PathBuf::from("/work/./aws_deployment_overrides"),
                PathBuf::from("/work/./k8s/deployment/overrides"),
            ]
        );
        assert_eq!(config.discovery_output_path(), PathBuf::from("/work/repos.yaml"));
        assert_eq!(config.tools.git, "git");
        assert_eq!(config.tools.terraform, "terraform");
        assert_eq!(config.tool_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let yaml = "repositories: []\nrepos_dir: /var/tf/repos\noverride_sources: [/etc/overrides]\n";
        let config = Config::from_yaml(yaml, PathBuf::from("/work")).unwrap();
        assert_eq!(config.repos_path(), PathBuf::from("/var/tf/repos"));
        assert_eq!(config.override_paths(), vec![PathBuf::from("/etc/overrides")]);
    }

    #[test]
    fn test_requires_a_repository_source() {
        let err = Config::from_yaml("rate_limit: 1\n", PathBuf::new()).unwrap_err();
        assert!(matches!(err, ConfigError::NoRepositorySource));
    }

    #[test]
    fn test_rejects_negative_rate_limit() {
        let err = Config::from_yaml("repositories: []\nrate_limit: -1\n", PathBuf::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRateLimit(_)));
    }

    #[test]
    fn test_rejects_oversized_rate_limit() {
        for value in ["1e30", ".inf", ".nan"] {
            let yaml = format!("repositories: []\nrate_limit: {value}\n");
            let err = Config::from_yaml(&yaml, PathBuf::new()).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidRateLimit(_)),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_rate_limit() {
        let config =
            Config::from_yaml("repositories: []\nrate_limit: 0\n", PathBuf::new()).unwrap();
        assert_eq!(config.rate_limit_duration(), Duration::ZERO);
    }

    #[test]
    fn test_parses_bitbucket_section() {
        let yaml = r#"
bitbucket:
  server:
    url: https://bitbucket.example.com
    username: ci
    password: hunter2
    projects:
      - name: INFRA
        repo_pattern: "terraform-.*"
  cloud:
    username: bot
    workspaces:
      - name: platform
        repo_pattern: ".*-terraform"
"#;
        let config = Config::from_yaml(yaml, PathBuf::new()).unwrap();
        let bitbucket = config.bitbucket.unwrap();
        let server = bitbucket.server.unwrap();
        assert_eq!(server.projects[0].name, "INFRA");
        assert_eq!(server.password.as_deref(), Some("hunter2"));
        let cloud = bitbucket.cloud.unwrap();
        assert_eq!(cloud.app_password, None);
        assert_eq!(cloud.api_url, DEFAULT_CLOUD_API_URL);
        assert_eq!(cloud.workspaces[0].repo_pattern, ".*-terraform");
    }

    #[test]
    fn test_rejects_bad_server_url() {
        let yaml = "bitbucket:\n  server:\n    url: bitbucket.example.com\n    username: ci\n";
        let err = Config::from_yaml(yaml, PathBuf::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidServerUrl { .. }));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here/config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_reports_parse_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "repositories: {not: [a list}\n").unwrap();

        match Config::load(&path).unwrap_err() {
            ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
