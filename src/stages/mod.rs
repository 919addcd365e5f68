//
//  tf-collect
//  stages/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stage Runners
//!
//! The three per-repository operations fed to the
//! [`RetryOnceExecutor`](crate::executor::RetryOnceExecutor):
//!
//! | Stage | Module | Works on |
//! |-------|--------|----------|
//! | clone | [`clone`] | `git` sparse, shallow clone into `repos/{name}` |
//! | override | [`overrides`] | top-level `*.tf` files copied from each override source |
//! | pull | [`pull`] | `terraform init` + `terraform state pull` into `terraform.tfstate` |
//!
//! Every failure surfaces as a [`StageError`]; nothing panics and nothing
//! escapes a runner. The executor turns the error into the result's `detail`.

pub mod clone;
pub mod overrides;
pub mod process;
pub mod pull;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::Config;
use crate::repo::RepositorySpec;

pub use clone::clone_repository;
pub use overrides::apply_overrides;
pub use process::{ensure_tool, run_tool, ToolOutput};
pub use pull::{pull_state, PullOutcome};

/// Why a single repository failed a stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// The external program could not be started.
    #[error("cannot run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The external program exceeded its time budget and was killed.
    #[error("'{command}' timed out after {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// The external program exited unsuccessfully.
    #[error("'{command}' exited with {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    ToolFailed {
        /// Shell-quoted command line
        command: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured diagnostic output
        stderr: String,
    },

    /// The repository has not been cloned.
    #[error("repository directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    /// A directory exists where a clone should be but it is not a working tree.
    #[error("{} exists but is not a git working tree: {reason}", path.display())]
    NotAWorkingTree { path: PathBuf, reason: String },

    /// A filesystem operation failed.
    #[error("{action} {}: {source}", path.display())]
    Io {
        /// What was being attempted, e.g. "cannot copy"
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StageError {
    pub(crate) fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Everything a stage needs to know besides the repository itself.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Directory that holds one clone per repository.
    pub repos_dir: PathBuf,
    /// Override source directories, already resolved.
    pub override_sources: Vec<PathBuf>,
    /// Git executable.
    pub git: String,
    /// Terraform executable.
    pub terraform: String,
    /// Per-invocation timeout for external tools.
    pub timeout: Duration,
}

impl StageContext {
    /// Builds the context from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            repos_dir: config.repos_path(),
            override_sources: config.override_paths(),
            git: config.tools.git.clone(),
            terraform: config.tools.terraform.clone(),
            timeout: config.tool_timeout(),
        }
    }

    /// `repos/{name}`.
    pub fn repo_dir(&self, repo: &RepositorySpec) -> PathBuf {
        self.repos_dir.join(repo.name())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_config() {
        let config = Config::from_yaml(
            "repositories: []\nrepos_dir: work\noverride_sources: [ovr]\ntools:\n  terraform: tofu\n  timeout_secs: 5\n",
            PathBuf::from("/srv"),
        )
        .unwrap();
        let ctx = StageContext::from_config(&config);

        assert_eq!(ctx.repos_dir, PathBuf::from("/srv/work"));
        assert_eq!(ctx.override_sources, vec![PathBuf::from("/srv/ovr")]);
        assert_eq!(ctx.git, "git");
        assert_eq!(ctx.terraform, "tofu");
        assert_eq!(ctx.timeout, Duration::from_secs(5));
        assert_eq!(
            ctx.repo_dir(&testing::repo("vpc")),
            PathBuf::from("/srv/work/vpc")
        );
    }

    #[test]
    fn test_tool_failure_message() {
        let err = StageError::ToolFailed {
            command: "git clone x".to_string(),
            code: Some(128),
            stderr: "fatal: repository not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'git clone x' exited with status 128: fatal: repository not found"
        );
    }
}
