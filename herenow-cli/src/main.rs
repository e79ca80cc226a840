//! Binary crate for the `herenow` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and the interactive alarm session
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod interactive;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    herenow_core::init_logging("warn");

    let cmd = cli::Cli::parse();
    cmd.run().await
}
