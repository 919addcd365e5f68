//
//  tf-collect
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Command-Line Interface Module
//!
//! This module defines the CLI structure for `tfcollect` using the `clap`
//! crate's derive API.
//!
//! ## Command Structure
//!
//! ```text
//! tfcollect [--json] <COMMAND> [config]
//! ```
//!
//! ## Available Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `discover` | Resolve repositories and write `repos.yaml` |
//! | `clone` | Sparse, shallow clone of every repository |
//! | `override` | Copy override `*.tf` files into every clone |
//! | `pull` | Pull Terraform state into every clone |
//! | `run` | clone, override, and pull in sequence |
//! | `completion` | Generate shell completions |
//!
//! Every command except `completion` takes an optional path to the
//! configuration file, defaulting to `config.yaml`.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Every repository succeeded |
//! | 1 | A repository failed, a tool is missing, or discovery found nothing |
//! | 2 | The configuration is invalid |

mod completion;
mod discover;
mod stage;

pub use completion::CompletionCommand;
pub use discover::DiscoverCommand;
pub use stage::{RunCommand, StageCommand};

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{Config, DEFAULT_CONFIG_FILE};

/// Collect Terraform sources and state from Bitbucket repositories.
#[derive(Parser, Debug)]
#[command(
    name = "tfcollect",
    version,
    about = "Collect Terraform sources and remote state from Bitbucket repositories",
    long_about = "tfcollect resolves a set of repositories (a static list and/or Bitbucket \
                  discovery), sparse-clones their *.tf files, applies local overrides, and \
                  pulls each repository's Terraform state.\n\n\
                  Set LOG_LEVEL=DEBUG to see every git and terraform command.",
    propagate_version = true,
    after_help = "Use 'tfcollect <command> --help' for more information about a command."
)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Global options that apply to all commands
    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options shared by every command.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the repository set and write it to repos.yaml
    Discover(DiscoverCommand),

    /// Shallow, sparse clone of every repository (only *.tf files)
    Clone(StageCommand),

    /// Copy override *.tf files into every cloned repository
    Override(StageCommand),

    /// Run terraform init and state pull in every cloned repository
    Pull(StageCommand),

    /// Run clone, override, and pull in sequence
    Run(RunCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),
}

/// The configuration file argument shared by the pipeline commands.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the YAML configuration file
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl ConfigArgs {
    /// Loads the configuration file.
    ///
    /// The [`ConfigError`](crate::config::ConfigError) is returned unwrapped
    /// so the exit code mapping can recognise it.
    pub fn load(&self) -> Result<Config> {
        Ok(Config::load(&self.config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_defaults_to_config_yaml() {
        let cli = Cli::try_parse_from(["tfcollect", "clone"]).unwrap();
        match cli.command {
            Commands::Clone(cmd) => assert_eq!(cmd.args.config, PathBuf::from("config.yaml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_json_after_subcommand() {
        let cli = Cli::try_parse_from(["tfcollect", "run", "ci/config.yaml", "--json"]).unwrap();
        assert!(cli.global.json);
        match cli.command {
            Commands::Run(cmd) => assert_eq!(cmd.args.config, PathBuf::from("ci/config.yaml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
