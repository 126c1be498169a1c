//! ArticleFlow CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Load configuration**: `.env` via `dotenvy`, then [`workflow::Settings`]
//!    from the environment and an optional rubric JSON file.
//! 2. **Wire observability**: `tracing-subscriber` with a JSON or pretty layer
//!    on stderr, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Dispatch** one of the subcommands:
//!    - `score`: grade one markdown file and print the report and feedback,
//!      or only the quick pre-screen with `--quick`.
//!    - `rubric`: print the effective rubric as JSON.
//!    - `dry-run`: run drafts through the full workflow with in-memory
//!      research and publishing.

mod cli;
mod commands;
mod drafts;
mod observability;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = observability::init(cli.log_format)?;
    let result = commands::dispatch(cli).await;
    telemetry.shutdown();
    result
}
