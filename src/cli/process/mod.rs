//! Process command - chunks one text in memory and prints the outcome

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::domain::chunking::ProcessingResult;
use crate::domain::knowledge::{KnowledgeChunk, KnowledgeItem, KnowledgeRepository};
use crate::infrastructure::chunking::ChunkingCoordinator;
use crate::infrastructure::knowledge::InMemoryKnowledgeRepository;

/// Arguments for the process command
#[derive(Args, Clone)]
pub struct ProcessArgs {
    /// Text file to chunk, or `-` for stdin
    pub input: String,

    /// Source label recorded on the item (e.g. manual, linkedin, blog)
    #[arg(long, default_value = "manual")]
    pub source: String,

    /// JSON file holding normalized claim artifacts for the item
    #[arg(long)]
    pub claims: Option<String>,

    /// Print only the processing result, without chunk rows
    #[arg(long)]
    pub summary: bool,
}

#[derive(Serialize)]
struct ProcessOutput {
    result: ProcessingResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<Vec<KnowledgeChunk>>,
}

/// Run the process command
pub async fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let text = super::read_input(&args.input).await?;
    let mut item = KnowledgeItem::new(text, args.source.as_str());

    if let Some(ref path) = args.claims {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read claims file '{}'", path))?;
        let claims: serde_json::Value =
            serde_json::from_str(&raw).with_context(|| format!("invalid JSON in '{}'", path))?;
        item = item.with_normalized_claims(claims);
    }

    let id = *item.id();
    let repository = Arc::new(InMemoryKnowledgeRepository::with_items([item.clone()]));
    let coordinator = ChunkingCoordinator::new(repository.clone(), config.chunking)?;

    let result = coordinator.process_item(&item).await?;
    info!(item_id = %id, status = %result.status(), "Processed input");

    let chunks = if args.summary {
        None
    } else {
        Some(repository.list_chunks(&id).await?)
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&ProcessOutput { result, chunks })?
    );

    Ok(())
}
