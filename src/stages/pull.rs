//
//  tf-collect
//  stages/pull.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Pull Stage
//!
//! Fetches the current remote state of each clone into
//! `repos/{name}/terraform.tfstate`.
//!
//! ```text
//! terraform init -backend=false
//! terraform state pull            > terraform.tfstate
//! ```
//!
//! ## Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | no `*.tf` files anywhere in the clone | success, terraform not run |
//! | `state pull` prints nothing | success, existing state file untouched |
//! | `state pull` prints a document | success, document written |
//! | either command exits non-zero | failure |

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::process::run_tool;
use super::{StageContext, StageError};
use crate::repo::RepositorySpec;

/// File name the pulled state is written to.
pub const STATE_FILE: &str = "terraform.tfstate";

/// What a successful pull did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The clone holds no Terraform sources.
    NoTerraform,
    /// Terraform reported no state.
    NoState,
    /// State written, with its size in bytes.
    Written(usize),
}

/// Initialises Terraform in the clone and saves its remote state.
///
/// # Errors
///
/// - [`StageError::MissingDirectory`] when the repository has not been cloned
/// - Any tool failure or timeout from either terraform invocation
/// - [`StageError::Io`] when the state file cannot be written
pub async fn pull_state(ctx: &StageContext, repo: &RepositorySpec) -> Result<PullOutcome, StageError> {
    let dir = ctx.repo_dir(repo);
    if !dir.is_dir() {
        return Err(StageError::MissingDirectory(dir));
    }

    if !has_terraform_files(&dir)? {
        info!(repo = %repo.name(), "no .tf files, skipping");
        return Ok(PullOutcome::NoTerraform);
    }

    run_tool(&ctx.terraform, &["init", "-backend=false"], Some(&dir), ctx.timeout).await?;
    let output = run_tool(&ctx.terraform, &["state", "pull"], Some(&dir), ctx.timeout).await?;

    if output.stdout.iter().all(u8::is_ascii_whitespace) {
        info!(repo = %repo.name(), "no state available");
        return Ok(PullOutcome::NoState);
    }

    let state_path = dir.join(STATE_FILE);
    fs::write(&state_path, &output.stdout).map_err(StageError::io("cannot write", &state_path))?;
    debug!(path = %state_path.display(), bytes = output.stdout.len(), "state written");
    info!(repo = %repo.name(), "state pulled");
    Ok(PullOutcome::Written(output.stdout.len()))
}

/// Whether any `*.tf` file exists under `dir`, ignoring `.git`.
fn has_terraform_files(dir: &Path) -> Result<bool, StageError> {
    let entries = fs::read_dir(dir).map_err(StageError::io("cannot list", dir))?;

    for entry in entries {
        let entry = entry.map_err(StageError::io("cannot list", dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(StageError::io("cannot stat", &path))?;

        if file_type.is_dir() {
            if entry.file_name() == ".git" {
                continue;
            }
            if has_terraform_files(&path)? {
                return Ok(true);
            }
        } else if path.extension().is_some_and(|ext| ext == "tf") {
            return Ok(true);
        }
    }
    Ok(false)
}
