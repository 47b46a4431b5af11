//! Knowledge repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::chunk::KnowledgeChunk;
use super::item::{KnowledgeItem, KnowledgeItemId};
use crate::domain::DomainError;
use crate::domain::chunking::ChunkingDiagnostics;

#[cfg(test)]
use mockall::automock;

/// Storage for knowledge items and the chunks derived from them
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KnowledgeRepository: Send + Sync + Debug {
    /// Get a knowledge item by ID
    async fn get_item(&self, id: &KnowledgeItemId) -> Result<Option<KnowledgeItem>, DomainError>;

    /// List the current chunk set of an item
    async fn list_chunks(&self, id: &KnowledgeItemId) -> Result<Vec<KnowledgeChunk>, DomainError>;

    /// Atomically replace the item's chunk set and its diagnostics.
    ///
    /// Either every prior chunk is removed, the new set is inserted and the
    /// diagnostics are written, or nothing changes.
    async fn replace_chunks(
        &self,
        id: &KnowledgeItemId,
        chunks: Vec<KnowledgeChunk>,
        diagnostics: ChunkingDiagnostics,
    ) -> Result<(), DomainError>;

    /// Overwrite the item's diagnostics without touching its chunks
    async fn record_diagnostics(
        &self,
        id: &KnowledgeItemId,
        diagnostics: ChunkingDiagnostics,
    ) -> Result<(), DomainError>;
}
