//
//  tf-collect
//  pipeline/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Pipeline Orchestrator
//!
//! Sequences the collection run:
//!
//! ```text
//! Resolve ──> Clone ──> Override ──> Pull ──> Done
//! ```
//!
//! Each stage is a barrier: every repository finishes the stage (including
//! its retry) before the next stage starts. Every stage runs over the full
//! resolved set, whatever happened earlier. A repository that failed to
//! clone therefore fails fast in override and pull on its missing directory.
//!
//! Before any repository is touched, the tools the selected stages need are
//! probed with `--version`; a missing tool aborts the run.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::executor::{RetryOnceExecutor, RunReport};
use crate::repo::RepositorySpec;
use crate::resolver;
use crate::stages::{self, StageContext, StageError};

/// One per-repository stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Clone,
    Override,
    Pull,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Clone, Stage::Override, Stage::Pull];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Clone => "clone",
            Stage::Override => "override",
            Stage::Pull => "pull",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run-level failures.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required external tool is not available.
    #[error("required tool '{tool}' is not available: {source}")]
    MissingTool {
        tool: String,
        #[source]
        source: StageError,
    },

    /// At least one repository failed a stage after its retry.
    #[error("{failed} repository operation(s) failed")]
    StageFailures { failed: usize },
}

/// Merged result of every stage that ran.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    /// The resolved repository set.
    pub repositories: Vec<RepositorySpec>,
    /// Discovery backends that contributed nothing, as messages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discovery_errors: Vec<String>,
    /// One report per stage, in execution order.
    pub stages: Vec<RunReport>,
}

impl PipelineReport {
    /// Total failed items across all stages.
    pub fn failed_count(&self) -> usize {
        self.stages.iter().map(RunReport::failed_count).sum()
    }

    /// `true` iff every stage's failed set is empty.
    pub fn is_success(&self) -> bool {
        self.stages.iter().all(RunReport::is_success)
    }

    /// Converts an unsuccessful report into [`PipelineError::StageFailures`].
    pub fn into_result(self) -> Result<Self, PipelineError> {
        match self.failed_count() {
            0 => Ok(self),
            failed => Err(PipelineError::StageFailures { failed }),
        }
    }
}

/// Runs stages over repositories with the configured tools and pacing.
#[derive(Debug, Clone)]
pub struct Pipeline {
    ctx: StageContext,
    executor: RetryOnceExecutor,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self::with_context(
            StageContext::from_config(config),
            RetryOnceExecutor::new(config.rate_limit_duration()),
        )
    }

    pub fn with_context(ctx: StageContext, executor: RetryOnceExecutor) -> Self {
        Self { ctx, executor }
    }

    /// Probes the tools `stages` depend on.
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingTool`] for the first tool that does not answer
    /// `--version` successfully within the probe timeout.
    pub async fn preflight(&self, stages: &[Stage]) -> Result<(), PipelineError> {
        let mut tools = Vec::new();
        if stages.contains(&Stage::Clone) {
            tools.push(&self.ctx.git);
        }
        if stages.contains(&Stage::Pull) {
            tools.push(&self.ctx.terraform);
        }

        for tool in tools {
            match stages::ensure_tool(tool).await {
                Ok(version) => info!(tool = %tool, version = %version, "tool available"),
                Err(source) => {
                    return Err(PipelineError::MissingTool {
                        tool: tool.clone(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    /// Runs one stage over `repos` through the retry-once executor.
    pub async fn run_stage(&self, stage: Stage, repos: &[RepositorySpec]) -> RunReport {
        let ctx = &self.ctx;
        match stage {
            Stage::Clone => {
                self.executor
                    .run(stage.name(), repos, move |repo| async move {
                        stages::clone_repository(ctx, &repo).await
                    })
                    .await
            }
            Stage::Override => {
                self.executor
                    .run(stage.name(), repos, move |repo| async move {
                        stages::apply_overrides(ctx, &repo).map(|_| ())
                    })
                    .await
            }
            Stage::Pull => {
                self.executor
                    .run(stage.name(), repos, move |repo| async move {
                        stages::pull_state(ctx, &repo).await.map(|_| ())
                    })
                    .await
            }
        }
    }

    /// Preflights and then runs `stages` in order over `repos`.
    pub async fn execute(
        &self,
        stages: &[Stage],
        repos: &[RepositorySpec],
    ) -> Result<Vec<RunReport>, PipelineError> {
        self.preflight(stages).await?;

        let mut reports = Vec::with_capacity(stages.len());
        for &stage in stages {
            reports.push(self.run_stage(stage, repos).await);
        }
        Ok(reports)
    }
}

/// Resolves the repository set from `config` and runs `stages` over it.
///
/// # Errors
///
/// - [`PipelineError::Config`] when resolution fails
/// - [`PipelineError::MissingTool`] when preflight fails
///
/// Item failures are not errors here; they are in the returned report. Use
/// [`PipelineReport::into_result`] to turn them into an exit status.
pub async fn collect(config: &Config, stages: &[Stage]) -> Result<PipelineReport, PipelineError> {
    let resolution = resolver::resolve(config).await?;
    if resolution.repositories.is_empty() {
        warn!("no repositories to process");
    }

    let reports = Pipeline::new(config)
        .execute(stages, &resolution.repositories)
        .await?;

    Ok(PipelineReport {
        repositories: resolution.repositories,
        discovery_errors: resolution
            .discovery_errors
            .iter()
            .map(ToString::to_string)
            .collect(),
        stages: reports,
    })
}
