//! CLI entry point for reprint.

use anyhow::Result;
use clap::Parser;

mod app;
mod app_config;
mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    app::runtime::run(args).await
}
