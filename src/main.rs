//
//  tf-collect
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tf_collect::cli::{Cli, Commands};
use tf_collect::exit_codes;
use tf_collect::pipeline::Stage;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::for_error(&e));
        }
    }
}

/// Initialize logging from `LOG_LEVEL`
fn init_logging() {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| log_level(&value))
        .unwrap_or("info");

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(level))
        .init();
}

/// Maps a `LOG_LEVEL` value onto a filter directive.
fn log_level(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Discover(cmd) => cmd.run(&cli.global).await,
        Commands::Clone(cmd) => cmd.run(Stage::Clone, &cli.global).await,
        Commands::Override(cmd) => cmd.run(Stage::Override, &cli.global).await,
        Commands::Pull(cmd) => cmd.run(Stage::Pull, &cli.global).await,
        Commands::Run(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
    }
}
