//! Binary crate for the `skynow` command-line dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and search prompts
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skynow_core::telemetry::init("warn");

    let cmd = cli::Cli::parse();
    cmd.run().await
}
