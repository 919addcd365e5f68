//
//  tf-collect
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O Module
//!
//! Thin file-system helpers shared by the configuration loader and the
//! discovery output writer.
//!
//! ## Notes
//!
//! - All functions accept `&Path` to support both `Path` and `PathBuf`
//! - Write operations automatically create parent directories

use std::io;
use std::path::Path;

/// Reads the contents of a configuration file.
///
/// # Parameters
///
/// * `path` - The path to the configuration file to read
///
/// # Errors
///
/// This function will return an error if:
/// - The file does not exist
/// - The file cannot be opened (permissions, in use, etc.)
/// - The file contains invalid UTF-8 data
pub fn read_config_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Writes content to a file, creating parent directories as needed.
///
/// Used for `repos.yaml`, which is written in the same schema the
/// `repositories` field accepts so it can be fed straight back in as a
/// configuration file.
///
/// # Parameters
///
/// * `path` - The path where the file should be written
/// * `content` - The content to write to the file
///
/// # Notes
///
/// - **Warning**: This function overwrites existing files without warning
pub fn write_config_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/repos.yaml");
        write_config_file(&path, "repositories: []\n").unwrap();
        assert_eq!(read_config_file(&path).unwrap(), "repositories: []\n");
    }
}
