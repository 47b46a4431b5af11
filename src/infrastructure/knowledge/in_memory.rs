//! In-memory knowledge repository implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chunking::ChunkingDiagnostics;
use crate::domain::error::DomainError;
use crate::domain::knowledge::{KnowledgeChunk, KnowledgeItem, KnowledgeItemId, KnowledgeRepository};

#[derive(Debug, Default)]
struct Store {
    items: HashMap<KnowledgeItemId, KnowledgeItem>,
    chunks: HashMap<KnowledgeItemId, Vec<KnowledgeChunk>>,
}

/// In-memory implementation of KnowledgeRepository.
///
/// Items and chunks live behind a single lock, so a replacement is
/// observed either entirely or not at all.
#[derive(Debug)]
pub struct InMemoryKnowledgeRepository {
    store: Arc<RwLock<Store>>,
    fail_next_write: AtomicBool,
}

impl InMemoryKnowledgeRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            fail_next_write: AtomicBool::new(false),
        }
    }

    /// Create a repository seeded with items
    pub fn with_items(items: impl IntoIterator<Item = KnowledgeItem>) -> Self {
        let store = Store {
            items: items.into_iter().map(|item| (*item.id(), item)).collect(),
            chunks: HashMap::new(),
        };

        Self {
            store: Arc::new(RwLock::new(store)),
            fail_next_write: AtomicBool::new(false),
        }
    }

    /// Insert or replace an item
    pub async fn insert_item(&self, item: KnowledgeItem) {
        let mut store = self.store.write().await;
        store.items.insert(*item.id(), item);
    }

    /// Make the next write fail with a storage error before anything changes
    #[cfg(test)]
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn check_injected_failure(&self) -> Result<(), DomainError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(DomainError::storage("Injected write failure"));
        }
        Ok(())
    }
}

impl Default for InMemoryKnowledgeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeRepository for InMemoryKnowledgeRepository {
    async fn get_item(&self, id: &KnowledgeItemId) -> Result<Option<KnowledgeItem>, DomainError> {
        let store = self.store.read().await;
        Ok(store.items.get(id).cloned())
    }

    async fn list_chunks(&self, id: &KnowledgeItemId) -> Result<Vec<KnowledgeChunk>, DomainError> {
        let store = self.store.read().await;
        Ok(store.chunks.get(id).cloned().unwrap_or_default())
    }

    async fn replace_chunks(
        &self,
        id: &KnowledgeItemId,
        chunks: Vec<KnowledgeChunk>,
        diagnostics: ChunkingDiagnostics,
    ) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        self.check_injected_failure()?;

        let item = store
            .items
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("Knowledge item '{}'", id)))?;
        item.set_diagnostics(diagnostics);

        store.chunks.insert(*id, chunks);
        Ok(())
    }

    async fn record_diagnostics(
        &self,
        id: &KnowledgeItemId,
        diagnostics: ChunkingDiagnostics,
    ) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        self.check_injected_failure()?;

        let item = store
            .items
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("Knowledge item '{}'", id)))?;
        item.set_diagnostics(diagnostics);

        Ok(())
    }
}
