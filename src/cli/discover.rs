//
//  tf-collect
//  cli/discover.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! `discover` command

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use super::{ConfigArgs, GlobalOptions};
use crate::output::{format_heading, OutputWriter, TableBuilder, TableOutput};
use crate::repo::RepositorySpec;
use crate::resolver::{self, write_discovery_output};

/// Resolve the repository set and persist it
#[derive(Args, Debug)]
pub struct DiscoverCommand {
    #[command(flatten)]
    pub args: ConfigArgs,
}

/// What `discover` wrote.
#[derive(Debug, Serialize)]
pub struct DiscoverySummary {
    pub output: PathBuf,
    pub repositories: Vec<RepositorySpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discovery_errors: Vec<String>,
}

impl TableOutput for DiscoverySummary {
    fn render_table(&self, color: bool) -> String {
        let mut sections: Vec<String> = self
            .discovery_errors
            .iter()
            .map(|e| format!("discovery: {e}"))
            .collect();

        sections.push(
            TableBuilder::new()
                .color(color)
                .headers(["Name", "SSH URL"])
                .rows(
                    self.repositories
                        .iter()
                        .map(|r| [r.name().to_string(), r.ssh_url().to_string()]),
                )
                .build()
                .to_string(),
        );
        sections.push(format_heading(
            &format!(
                "{} repositories written to {}",
                self.repositories.len(),
                self.output.display()
            ),
            color,
        ));

        sections.join("\n\n")
    }
}

impl DiscoverCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let config = self.args.load()?;
        let resolution = resolver::resolve(&config).await?;

        // An empty set leaves any previous output in place.
        if resolution.repositories.is_empty() {
            bail!("no repositories found");
        }

        let output = config.discovery_output_path();
        write_discovery_output(&output, &resolution.repositories)?;

        let summary = DiscoverySummary {
            output,
            repositories: resolution.repositories,
            discovery_errors: resolution
                .discovery_errors
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        OutputWriter::from_flag(global.json).write(&summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_table_lists_repositories() {
        let summary = DiscoverySummary {
            output: PathBuf::from("repos.yaml"),
            repositories: vec![RepositorySpec::parse("git@bitbucket.org:team/vpc.git").unwrap()],
            discovery_errors: vec!["Bitbucket Server: HTTP 401".to_string()],
        };
        let rendered = summary.render_table(false);
        assert!(rendered.starts_with("discovery: Bitbucket Server"));
        assert!(rendered.contains("git@bitbucket.org:team/vpc.git"));
        assert!(rendered.ends_with("1 repositories written to repos.yaml"));
    }
}
