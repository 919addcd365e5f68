//
//  tf-collect
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Terraform Collector Library
//!
//! Collects Terraform sources and remote state from many Bitbucket
//! repositories into one local working directory.
//!
//! ## Overview
//!
//! A run resolves a repository set from configuration (a static list of SSH
//! URLs, Bitbucket Server/Cloud discovery, or both) and drives three
//! per-repository stages over it:
//!
//! ```text
//! clone     sparse, shallow checkout of *.tf files
//! override  copy local *.tf files into every clone
//! pull      terraform init + terraform state pull
//! ```
//!
//! Each stage retries its failures once, at the end of its first pass, and
//! reports which repositories succeeded and which did not.
//!
//! ## Module Structure
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`config`]: YAML configuration and its validation
//! - [`repo`]: SSH URL parsing and directory-name derivation
//! - [`api`]: HTTP clients for Bitbucket Cloud and Server/DC
//! - [`auth`]: Credentials for the discovery backends
//! - [`discovery`]: Paginated, regex-filtered repository listing
//! - [`resolver`]: Merging static and discovered repositories
//! - [`executor`]: The retry-once item executor
//! - [`stages`]: Clone, override, and pull for a single repository
//! - [`pipeline`]: Stage sequencing, tool preflight, and the final report
//! - [`output`]: Table and JSON report output
//! - [`util`]: Formatting helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tf_collect::pipeline::{self, Stage};
//! use tf_collect::Config;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::load(Path::new("config.yaml"))?;
//! let report = pipeline::collect(&config, &Stage::ALL).await?;
//! println!("{} failure(s)", report.failed_count());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
pub mod cli;

/// API client implementations for Bitbucket platforms.
///
/// Only the repository listing endpoints are covered:
/// - Bitbucket Cloud API v2.0
/// - Bitbucket Server/Data Center REST API v1.0
pub mod api;

/// Discovery credentials.
pub mod auth;

/// Configuration file management.
pub mod config;

/// Bitbucket repository discovery.
pub mod discovery;

/// Retry-once execution of per-repository work.
pub mod executor;

/// Output formatting for different modes.
pub mod output;

/// Stage sequencing and run reporting.
pub mod pipeline;

/// Repository identity derived from SSH URLs.
pub mod repo;

/// Repository set resolution.
pub mod resolver;

/// Per-repository stage runners.
pub mod stages;

/// Utility functions and helpers.
pub mod util;

/// Re-export of the main CLI struct for convenient access.
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::Config;

/// Application version constant.
///
/// Derived from Cargo.toml at compile time. Also used in the HTTP user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Example
///
/// ```rust
/// use tf_collect::config::ConfigError;
/// use tf_collect::exit_codes;
///
/// let err = anyhow::Error::new(ConfigError::NoRepositorySource);
/// assert_eq!(exit_codes::for_error(&err), exit_codes::CONFIG_ERROR);
/// ```
pub mod exit_codes {
    use crate::config::ConfigError;
    use crate::pipeline::PipelineError;

    /// Every repository succeeded in every stage that ran.
    pub const SUCCESS: i32 = 0;

    /// A repository failed after its retry, a required tool is missing,
    /// or `discover` found nothing.
    pub const ERROR: i32 = 1;

    /// The configuration is missing or invalid. Nothing was touched.
    pub const CONFIG_ERROR: i32 = 2;

    /// Maps a command failure to its exit code.
    pub fn for_error(err: &anyhow::Error) -> i32 {
        let config_error = err.chain().any(|cause| {
            cause.downcast_ref::<ConfigError>().is_some()
                || matches!(
                    cause.downcast_ref::<PipelineError>(),
                    Some(PipelineError::Config(_))
                )
        });

        if config_error {
            CONFIG_ERROR
        } else {
            ERROR
        }
    }

}
