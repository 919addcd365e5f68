//
//  tf-collect
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output Formatting
//!
//! Table construction on top of `comfy-table` with the `UTF8_FULL` preset and
//! dynamic content arrangement, so wide columns wrap to the terminal width.
//!
//! ## Example
//!
//! ```rust
//! use tf_collect::output::TableBuilder;
//!
//! let table = TableBuilder::new()
//!     .color(false)
//!     .headers(["Repository", "Outcome"])
//!     .row(["terraform-vpc", "success"])
//!     .build();
//! assert!(table.to_string().contains("terraform-vpc"));
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::style;

use crate::executor::Outcome;

/// Creates a table with the standard preset.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Fluent builder for report tables.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    /// Creates a builder, detecting color support from the terminal.
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    /// Overrides color detection.
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Sets the header row; headers are cyan when color is enabled.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    /// Appends one row.
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        self.table.add_row(row);
        self
    }

    /// Appends many rows.
    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            let row: Vec<String> = row.into_iter().map(Into::into).collect();
            self.table.add_row(row);
        }
        self
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Styles an outcome: green for success, red for failure.
pub fn format_outcome(outcome: Outcome, color: bool) -> String {
    let label = match outcome {
        Outcome::Success => "success",
        Outcome::Failed => "failed",
    };
    if !color {
        return label.to_string();
    }
    match outcome {
        Outcome::Success => style(label).green().to_string(),
        Outcome::Failed => style(label).red().to_string(),
    }
}

/// Styles a section heading.
pub fn format_heading(text: &str, color: bool) -> String {
    if color {
        style(text).bold().to_string()
    } else {
        text.to_string()
    }
}
