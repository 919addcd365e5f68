//
//  tf-collect
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Formatting Module
//!
//! Renders the end-of-run report either as terminal tables for people or as
//! JSON for scripts (`--json`).
//!
//! ## Output Formats
//!
//! | Format | Use Case | Flag |
//! |--------|----------|------|
//! | Table | Interactive terminal use | (default) |
//! | JSON | Scripting and automation | `--json` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use tf_collect::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write(&report)?;
//! ```
//!
//! ## Color Support
//!
//! Table output is colored when the terminal supports it. `NO_COLOR` and
//! `CLICOLOR` are honored through the `console` crate.

mod json;
mod report;
mod table;

pub use json::*;
pub use table::*;

use serde::Serialize;

/// The format reports are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Table,

    /// Pretty-printed JSON on stdout.
    Json,
}

/// Writes values in the selected [`OutputFormat`].
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a writer, detecting color support from the terminal.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Picks JSON when `json` is set, tables otherwise.
    pub fn from_flag(json: bool) -> Self {
        Self::new(if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        })
    }

    /// Writes `value` to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(value),
            OutputFormat::Table => {
                value.print_table(self.color);
                Ok(())
            }
        }
    }
}

/// Types that can render themselves for the terminal.
pub trait TableOutput {
    /// Renders the value as text, tables included.
    ///
    /// # Parameters
    ///
    /// * `color` - Whether ANSI styling may be used
    fn render_table(&self, color: bool) -> String;

    /// Prints [`render_table`](Self::render_table) to stdout.
    fn print_table(&self, color: bool) {
        println!("{}", self.render_table(color));
    }
}
