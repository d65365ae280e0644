use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};

use slackmap::stream::{ChangeHandler, StreamDispatcher};
use slackmap::telemetry::init_tracing;
use slackmap_core::entities::{registered_schemas, validate_registry};
use slackmap_core::keys::KeyAttr;
use slackmap_core::stream::{EntityChange, StreamRecord};

/// Slackmap - single-table storage tooling
#[derive(Parser, Debug)]
#[command(name = "slackmap")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the entity schemas and print their key layout
    Schemas,
    /// Decode a file of JSON-lines stream records and print the typed changes
    DecodeStream {
        /// Path to the records, one JSON object per line
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    validate_registry().context("Entity schemas are inconsistent")?;

    match cli.command {
        Command::Schemas => print_schemas(),
        Command::DecodeStream { path } => decode_stream(path).await?,
    }

    Ok(())
}

fn print_schemas() {
    for schema in registered_schemas() {
        println!("{}", schema.kind());
        for attr in KeyAttr::ALL {
            let tokens = schema.discriminators(attr);
            if !tokens.is_empty() {
                println!("  {:<8} {}", attr.name(), tokens.join(", "));
            }
        }
    }
}

struct PrintHandler;

#[async_trait]
impl ChangeHandler for PrintHandler {
    async fn handle(&self, change: EntityChange) -> Result<()> {
        println!("{} {:?}: {:?}", change.kind(), change.change(), change);
        Ok(())
    }
}

async fn decode_stream(path: PathBuf) -> Result<()> {
    let contents = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let records = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<StreamRecord>(line)
                .with_context(|| format!("Invalid stream record on line {}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = StreamDispatcher::new(PrintHandler)
        .dispatch(&records)
        .await?;

    tracing::info!(
        dispatched = summary.dispatched,
        skipped = summary.skipped,
        "Stream decoded"
    );
    Ok(())
}
