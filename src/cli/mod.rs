//! CLI module for the knowledge chunker
//!
//! Provides subcommands:
//! - `process`: chunk a text file in memory and print the result
//! - `inspect`: show how a text would be gated, detected and routed
//! - `reprocess`: rerun the pipeline on stored items

pub mod inspect;
pub mod process;
pub mod reprocess;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Knowledge chunker - turns knowledge items into retrievable chunks
#[derive(Parser)]
#[command(name = "knowledge-chunker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Chunk a text file (or stdin) without touching a database
    Process(process::ProcessArgs),

    /// Show preflight metrics, detected format and routing for a text
    Inspect(inspect::InspectArgs),

    /// Rerun the pipeline on stored knowledge items
    Reprocess(reprocess::ReprocessArgs),
}

/// Load `.env`, configuration and logging for a command
fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);
    config
}

/// Read a file path, or stdin when the path is `-`
async fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read stdin")?;
        return Ok(text);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read '{}'", path))
}
