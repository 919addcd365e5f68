//
//  tf-collect
//  stages/overrides.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Override stage: copies the top-level `*.tf` files of every override source
//! directory into the root of each clone, replacing same-named files.
//!
//! Sources are applied in configuration order, so a later source wins over an
//! earlier one for the same file name. A source directory that does not exist
//! contributes nothing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{StageContext, StageError};
use crate::repo::RepositorySpec;

/// Copies override files into `repos/{name}` and returns the copied file names.
///
/// # Errors
///
/// - [`StageError::MissingDirectory`] when the repository has not been cloned
/// - [`StageError::Io`] when a source cannot be listed or a file cannot be copied
pub fn apply_overrides(ctx: &StageContext, repo: &RepositorySpec) -> Result<Vec<String>, StageError> {
    let target = ctx.repo_dir(repo);
    if !target.is_dir() {
        return Err(StageError::MissingDirectory(target));
    }

    let mut copied = Vec::new();
    for source in &ctx.override_sources {
        if !source.is_dir() {
            debug!(source = %source.display(), "override source missing, skipping");
            continue;
        }

        for file in terraform_files(source)? {
            let Some(file_name) = file.file_name() else {
                continue;
            };
            let destination = target.join(file_name);
            fs::copy(&file, &destination).map_err(StageError::io("cannot copy", &file))?;
            copied.push(file_name.to_string_lossy().into_owned());
        }
    }

    if copied.is_empty() {
        info!(repo = %repo.name(), "no override files to copy");
    } else {
        info!(repo = %repo.name(), files = %copied.join(", "), "applied overrides");
    }
    Ok(copied)
}

/// Regular `*.tf` files directly inside `dir`, sorted by name.
fn terraform_files(dir: &Path) -> Result<Vec<PathBuf>, StageError> {
    let entries = fs::read_dir(dir).map_err(StageError::io("cannot list", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(StageError::io("cannot list", dir))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "tf") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
