//
//  tf-collect
//  executor/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Retry-Once Executor
//!
//! Runs one operation over a batch of repositories and partitions them into
//! succeeded and failed, giving every failed item exactly one more try.
//!
//! ```text
//! pass 1:  a ─ sleep ─ b ─ sleep ─ c        (b fails)
//! pass 2:  b                                (no sleep, input order)
//! report:  a ok/1   b ok/2 or failed/2   c ok/1
//! ```
//!
//! The executor knows nothing about Git, files, or Terraform. It only sees an
//! operation that may fail and a pause to keep between first-pass calls.
//! Total work is bounded by twice the number of items.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::repo::RepositorySpec;

/// Final outcome of one repository in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed,
}

/// The recorded result of one repository in one stage.
///
/// # Fields
///
/// * `repo` - The repository
/// * `outcome` - Success or Failed
/// * `attempt` - 1 or 2; the attempt that produced the outcome
/// * `detail` - Failure text from the most recent attempt (`None` on success)
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    pub repo: RepositorySpec,
    pub outcome: Outcome,
    pub attempt: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StageResult {
    fn success(repo: RepositorySpec, attempt: u8) -> Self {
        Self {
            repo,
            outcome: Outcome::Success,
            attempt,
            detail: None,
        }
    }

    fn failed(repo: RepositorySpec, attempt: u8, detail: String) -> Self {
        Self {
            repo,
            outcome: Outcome::Failed,
            attempt,
            detail: Some(detail),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// The partition produced by one stage run.
///
/// `results` holds exactly one entry per input item, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Stage name, e.g. `clone`.
    pub stage: String,
    /// When the first attempt started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time of both passes, in seconds.
    pub duration_secs: f64,
    pub results: Vec<StageResult>,
}

impl RunReport {
    /// Results with outcome Success.
    pub fn succeeded(&self) -> impl Iterator<Item = &StageResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// Results with outcome Failed.
    pub fn failed(&self) -> impl Iterator<Item = &StageResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// `true` iff no item failed.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }
}

/// Retry-once executor with a fixed first-pass pacing delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnceExecutor {
    rate_limit: Duration,
}

impl RetryOnceExecutor {
    /// Creates an executor that sleeps `rate_limit` between first-pass
    /// invocations. A zero duration disables pacing.
    pub fn new(rate_limit: Duration) -> Self {
        Self { rate_limit }
    }

    /// Runs `operation` over `items` with one retry pass.
    ///
    /// # Parameters
    ///
    /// * `stage` - Name used for logging and the report
    /// * `items` - Repositories, processed strictly in this order
    /// * `operation` - The fallible per-repository action
    ///
    /// # Returns
    ///
    /// A [`RunReport`] in which every item appears exactly once.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let executor = RetryOnceExecutor::new(config.rate_limit_duration());
    /// let report = executor
    ///     .run("clone", &repos, |repo| async move { clone(&ctx, &repo).await })
    ///     .await;
    /// assert_eq!(report.results.len(), repos.len());
    /// ```
    pub async fn run<F, Fut, E>(&self, stage: &str, items: &[RepositorySpec], mut operation: F) -> RunReport
    where
        F: FnMut(RepositorySpec) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(stage, count = items.len(), "starting stage");

        let mut results = Vec::with_capacity(items.len());
        let mut retry_queue = Vec::new();

        for (index, repo) in items.iter().enumerate() {
            if index > 0 && !self.rate_limit.is_zero() {
                sleep(self.rate_limit).await;
            }

            debug!(stage, repo = %repo.name(), attempt = 1, "running");
            match operation(repo.clone()).await {
                Ok(()) => {
                    info!(stage, repo = %repo.name(), "succeeded");
                    results.push(StageResult::success(repo.clone(), 1));
                }
                Err(e) => {
                    warn!(stage, repo = %repo.name(), error = %e, "failed, will retry");
                    results.push(StageResult::failed(repo.clone(), 1, e.to_string()));
                    retry_queue.push(index);
                }
            }
        }

        if !retry_queue.is_empty() {
            info!(stage, count = retry_queue.len(), "retrying failed repositories");
        }

        for index in retry_queue {
            let repo = items[index].clone();
            debug!(stage, repo = %repo.name(), attempt = 2, "running");
            results[index] = match operation(repo.clone()).await {
                Ok(()) => {
                    info!(stage, repo = %repo.name(), "succeeded on retry");
                    StageResult::success(repo, 2)
                }
                Err(e) => {
                    warn!(stage, repo = %repo.name(), error = %e, "failed after retry");
                    StageResult::failed(repo, 2, e.to_string())
                }
            };
        }

        let report = RunReport {
            stage: stage.to_string(),
            started_at,
            duration_secs: clock.elapsed().as_secs_f64(),
            results,
        };

        let failed: Vec<&str> = report.failed().map(|r| r.repo.name()).collect();
        if failed.is_empty() {
            info!(stage, succeeded = report.results.len(), "stage complete");
        } else {
            warn!(
                stage,
                succeeded = report.results.len() - failed.len(),
                failed = failed.len(),
                repos = %failed.join(", "),
                "stage complete with failures"
            );
        }
        report
    }
}
