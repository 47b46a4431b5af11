//! Reprocess command - reruns the pipeline on items stored in PostgreSQL

use std::sync::Arc;

use clap::Args;
use tracing::{info, warn};

use crate::domain::knowledge::KnowledgeItemId;
use crate::infrastructure::chunking::ChunkingCoordinator;
use crate::infrastructure::knowledge::PostgresKnowledgeRepository;

/// Arguments for the reprocess command
#[derive(Args, Clone)]
pub struct ReprocessArgs {
    /// Knowledge item to reprocess (repeatable)
    #[arg(long = "item-id", required = true, num_args = 1..)]
    pub item_ids: Vec<String>,

    /// Create the chunk table and diagnostic columns before running
    #[arg(long)]
    pub ensure_schema: bool,
}

/// Run the reprocess command
pub async fn run(args: ReprocessArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let ids = args
        .item_ids
        .iter()
        .map(|id| KnowledgeItemId::parse(id))
        .collect::<Result<Vec<_>, _>>()?;

    let repository = PostgresKnowledgeRepository::connect(config.database()?).await?;
    if args.ensure_schema {
        repository.ensure_schema().await?;
    }

    let coordinator = ChunkingCoordinator::new(Arc::new(repository), config.chunking.clone())?;
    let batch = coordinator.process_batch_by_id(&ids).await?;

    info!(
        total = batch.total_items,
        created = batch.created,
        skipped = batch.skipped,
        failed = batch.failed,
        errored = batch.errored,
        chunks = batch.total_chunks_created(),
        "Reprocessing finished"
    );

    if batch.errored > 0 {
        warn!(errored = batch.errored, "Some items could not be processed");
    }

    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}
