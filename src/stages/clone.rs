//
//  tf-collect
//  stages/clone.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Clone Stage
//!
//! Shallow, sparse clone of each repository into `repos/{name}`, keeping only
//! Terraform sources in the working tree.
//!
//! ## Commands
//!
//! ```text
//! git clone --depth 1 --no-checkout <url> <name>     (in repos/)
//! git config core.sparseCheckout true                (in repos/<name>)
//! write .git/info/sparse-checkout: *.tf, **/*.tf
//! git read-tree -m -u HEAD                           (in repos/<name>)
//! ```
//!
//! ## Re-runs
//!
//! An existing `repos/{name}` that opens as a non-bare git repository is left
//! alone and counts as success. Any other existing path fails the item. A
//! failed attempt removes what it created so the retry starts from scratch.

use std::fs;
use std::path::Path;

use git2::Repository;
use tracing::{debug, info, warn};

use super::process::run_tool;
use super::{StageContext, StageError};
use crate::repo::RepositorySpec;

/// Sparse-checkout patterns selecting Terraform files at any depth.
pub const SPARSE_PATTERNS: &str = "*.tf\n**/*.tf\n";

/// Clones `repo` unless a working tree for it already exists.
///
/// # Errors
///
/// - [`StageError::NotAWorkingTree`] when `repos/{name}` exists but is not a
///   usable clone
/// - Any tool failure or timeout from the git invocations
/// - [`StageError::Io`] when the repos directory or sparse-checkout file
///   cannot be written
pub async fn clone_repository(ctx: &StageContext, repo: &RepositorySpec) -> Result<(), StageError> {
    let target = ctx.repo_dir(repo);

    if target.exists() {
        validate_working_tree(&target)?;
        info!(repo = %repo.name(), "already cloned, skipping");
        return Ok(());
    }

    fs::create_dir_all(&ctx.repos_dir).map_err(StageError::io("cannot create", &ctx.repos_dir))?;

    match clone_sparse(ctx, repo, &target).await {
        Ok(()) => {
            info!(repo = %repo.name(), path = %target.display(), "cloned");
            Ok(())
        }
        Err(e) => {
            if target.exists() {
                debug!(path = %target.display(), "removing partial clone");
                if let Err(cleanup) = fs::remove_dir_all(&target) {
                    warn!(path = %target.display(), error = %cleanup, "cannot remove partial clone");
                }
            }
            Err(e)
        }
    }
}

async fn clone_sparse(ctx: &StageContext, repo: &RepositorySpec, target: &Path) -> Result<(), StageError> {
    run_tool(
        &ctx.git,
        &["clone", "--depth", "1", "--no-checkout", repo.ssh_url(), repo.name()],
        Some(&ctx.repos_dir),
        ctx.timeout,
    )
    .await?;

    run_tool(
        &ctx.git,
        &["config", "core.sparseCheckout", "true"],
        Some(target),
        ctx.timeout,
    )
    .await?;

    let info_dir = target.join(".git").join("info");
    fs::create_dir_all(&info_dir).map_err(StageError::io("cannot create", &info_dir))?;
    let sparse_file = info_dir.join("sparse-checkout");
    fs::write(&sparse_file, SPARSE_PATTERNS).map_err(StageError::io("cannot write", &sparse_file))?;

    run_tool(
        &ctx.git,
        &["read-tree", "-m", "-u", "HEAD"],
        Some(target),
        ctx.timeout,
    )
    .await?;

    Ok(())
}

/// Accepts `path` only if it opens as a non-bare git repository.
pub fn validate_working_tree(path: &Path) -> Result<(), StageError> {
    let not_a_tree = |reason: String| StageError::NotAWorkingTree {
        path: path.to_path_buf(),
        reason,
    };

    let repository = Repository::open(path).map_err(|e| not_a_tree(e.message().to_string()))?;
    if repository.is_bare() {
        return Err(not_a_tree("repository is bare".to_string()));
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::stages::testing::{context, fake_tool, repo, tools_dir};

    /// A git stand-in that logs its arguments and behaves like a clone.
    const FAKE_GIT: &str = r#"echo "$*" >> "$(dirname "$0")/calls.log"
case "$1" in
  clone) mkdir -p "$6/.git" ;;
  config) ;;
  read-tree) echo 'resource "null_resource" "x" {}' > main.tf ;;
esac"#;

    #[tokio::test]
    async fn test_sparse_clone_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let bin = tools_dir(dir.path());
        let mut ctx = context(dir.path());
        ctx.git = fake_tool(&bin, "git", FAKE_GIT);

        clone_repository(&ctx, &repo("vpc")).await.unwrap();

        let target = ctx.repos_dir.join("vpc");
        assert!(target.join("main.tf").exists());
        assert_eq!(
            fs::read_to_string(target.join(".git/info/sparse-checkout")).unwrap(),
            "*.tf\n**/*.tf\n"
        );
        let calls = fs::read_to_string(bin.join("calls.log")).unwrap();
        let calls: Vec<_> = calls.lines().collect();
        assert_eq!(
            calls,
            vec![
                "clone --depth 1 --no-checkout git@bitbucket.org:team/vpc.git vpc",
                "config core.sparseCheckout true",
                "read-tree -m -u HEAD",
            ]
        );
    }

    #[tokio::test]
    async fn test_existing_working_tree_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        ctx.git = fake_tool(&tools_dir(dir.path()), "git", "exit 99");
        let target = ctx.repos_dir.join("vpc");
        Repository::init(&target).unwrap();

        clone_repository(&ctx, &repo("vpc")).await.unwrap();
        clone_repository(&ctx, &repo("vpc")).await.unwrap();
    }

    #[tokio::test]
    async fn test_existing_plain_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        fs::create_dir_all(ctx.repos_dir.join("vpc")).unwrap();

        let err = clone_repository(&ctx, &repo("vpc")).await.unwrap_err();
        assert!(matches!(err, StageError::NotAWorkingTree { .. }));
    }

    #[tokio::test]
    async fn test_bare_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        Repository::init_bare(ctx.repos_dir.join("vpc")).unwrap();

        let err = clone_repository(&ctx, &repo("vpc")).await.unwrap_err();
        assert!(matches!(err, StageError::NotAWorkingTree { ref reason, .. } if reason == "repository is bare"));
    }

    #[tokio::test]
    async fn test_failed_clone_removes_partial_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        ctx.git = fake_tool(
            &tools_dir(dir.path()),
            "git",
            "mkdir -p \"$6\"\necho 'fatal: Could not read from remote repository.' >&2\nexit 128",
        );

        let err = clone_repository(&ctx, &repo("vpc")).await.unwrap_err();
        assert!(err.to_string().contains("Could not read from remote repository"));
        assert!(!ctx.repos_dir.join("vpc").exists());
    }

    #[tokio::test]
    async fn test_failed_read_tree_removes_clone() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        ctx.git = fake_tool(
            &tools_dir(dir.path()),
            "git",
            "case \"$1\" in\n  clone) mkdir -p \"$6/.git\" ;;\n  read-tree) echo 'fatal: bad HEAD' >&2; exit 1 ;;\nesac",
        );

        let err = clone_repository(&ctx, &repo("vpc")).await.unwrap_err();
        assert!(matches!(err, StageError::ToolFailed { ref stderr, .. } if stderr == "fatal: bad HEAD"));
        assert!(!ctx.repos_dir.join("vpc").exists());
    }
}
