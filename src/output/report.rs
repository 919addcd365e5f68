//
//  tf-collect
//  output/report.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Terminal rendering of stage and pipeline reports.

use super::{format_heading, format_outcome, TableBuilder, TableOutput};
use crate::executor::RunReport;
use crate::pipeline::PipelineReport;
use crate::util::{first_line, format_duration, format_timestamp, truncate};

/// Longest failure detail shown in a table cell.
const DETAIL_WIDTH: usize = 80;

impl TableOutput for RunReport {
    fn render_table(&self, color: bool) -> String {
        let heading = format!(
            "{}: {} succeeded, {} failed (started {}, took {})",
            self.stage,
            self.succeeded().count(),
            self.failed_count(),
            format_timestamp(&self.started_at),
            format_duration(self.duration()),
        );

        if self.results.is_empty() {
            return format!("{}\n(no repositories)", format_heading(&heading, color));
        }

        let table = TableBuilder::new()
            .color(color)
            .headers(["Repository", "Outcome", "Attempt", "Detail"])
            .rows(self.results.iter().map(|result| {
                [
                    result.repo.name().to_string(),
                    format_outcome(result.outcome, color),
                    result.attempt.to_string(),
                    result
                        .detail
                        .as_deref()
                        .map(|d| truncate(first_line(d), DETAIL_WIDTH))
                        .unwrap_or_default(),
                ]
            }))
            .build();

        format!("{}\n{}", format_heading(&heading, color), table)
    }
}

impl TableOutput for PipelineReport {
    fn render_table(&self, color: bool) -> String {
        let mut sections = Vec::new();

        for error in &self.discovery_errors {
            sections.push(format!("discovery: {error}"));
        }
        for stage in &self.stages {
            sections.push(stage.render_table(color));
        }

        let summary = if self.is_success() {
            format!(
                "{} repositories, {} stage(s), all succeeded",
                self.repositories.len(),
                self.stages.len()
            )
        } else {
            let failed: Vec<String> = self
                .stages
                .iter()
                .flat_map(|stage| {
                    stage
                        .failed()
                        .map(move |r| format!("{}/{}", stage.stage, r.repo.name()))
                })
                .collect();
            format!(
                "{} repositories, {} failure(s): {}",
                self.repositories.len(),
                failed.len(),
                failed.join(", ")
            )
        };
        sections.push(format_heading(&summary, color));

        sections.join("\n\n")
    }
}
