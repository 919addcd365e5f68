//
//  tf-collect
//  cli/stage.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Stage commands: `clone`, `override`, `pull`, and `run`.
//!
//! Each resolves the repository set from the configuration, runs its
//! stage(s) over the full set, prints the report, and fails when any
//! repository failed.

use anyhow::Result;
use clap::Args;

use super::{ConfigArgs, GlobalOptions};
use crate::output::OutputWriter;
use crate::pipeline::{self, Stage};

/// Runs a single stage.
#[derive(Args, Debug)]
pub struct StageCommand {
    #[command(flatten)]
    pub args: ConfigArgs,
}

impl StageCommand {
    pub async fn run(&self, stage: Stage, global: &GlobalOptions) -> Result<()> {
        run_stages(&self.args, &[stage], global).await
    }
}

/// Runs clone, override, and pull in sequence.
#[derive(Args, Debug)]
pub struct RunCommand {
    #[command(flatten)]
    pub args: ConfigArgs,
}

impl RunCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        run_stages(&self.args, &Stage::ALL, global).await
    }
}

async fn run_stages(args: &ConfigArgs, stages: &[Stage], global: &GlobalOptions) -> Result<()> {
    let config = args.load()?;
    let report = pipeline::collect(&config, stages).await?;

    OutputWriter::from_flag(global.json).write(&report)?;
    report.into_result()?;
    Ok(())
}
