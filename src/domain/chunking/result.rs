//! Processing result types

use serde::{Deserialize, Serialize};

use super::diagnostics::{ChunkingErrorCode, ChunkingMetrics, ChunkingStatus};
use super::preflight::SkipReason;
use crate::domain::knowledge::KnowledgeItemId;

/// Outcome of processing one knowledge item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingResult {
    Skipped {
        reason: SkipReason,
        metrics: ChunkingMetrics,
    },
    Failed {
        error_code: ChunkingErrorCode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_message: Option<String>,
        metrics: ChunkingMetrics,
    },
    Created {
        chunks_created: usize,
        metrics: ChunkingMetrics,
        strategy: String,
    },
}

impl ProcessingResult {
    pub fn status(&self) -> ChunkingStatus {
        match self {
            Self::Skipped { .. } => ChunkingStatus::Skipped,
            Self::Failed { .. } => ChunkingStatus::Failed,
            Self::Created { .. } => ChunkingStatus::Created,
        }
    }

    pub fn metrics(&self) -> &ChunkingMetrics {
        match self {
            Self::Skipped { metrics, .. }
            | Self::Failed { metrics, .. }
            | Self::Created { metrics, .. } => metrics,
        }
    }

    pub fn chunks_created(&self) -> usize {
        match self {
            Self::Created { chunks_created, .. } => *chunks_created,
            _ => 0,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Result for one item of a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub item_id: KnowledgeItemId,
    #[serde(flatten)]
    pub outcome: BatchItemOutcome,
}

/// Either a processing result or the infrastructure error that stopped the item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItemOutcome {
    Processed(ProcessingResult),
    Error { error: String },
}

/// Result of batch processing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchProcessingResult {
    pub total_items: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Items that hit a persistence error
    pub errored: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchProcessingResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a processed item to the batch
    pub fn add(&mut self, item_id: KnowledgeItemId, result: ProcessingResult) {
        self.total_items += 1;

        match result.status() {
            ChunkingStatus::Created => self.created += 1,
            ChunkingStatus::Skipped => self.skipped += 1,
            ChunkingStatus::Failed => self.failed += 1,
        }

        self.results.push(BatchItemResult {
            item_id,
            outcome: BatchItemOutcome::Processed(result),
        });
    }

    /// Add an item whose run was aborted by an infrastructure error
    pub fn add_error(&mut self, item_id: KnowledgeItemId, error: impl Into<String>) {
        self.total_items += 1;
        self.errored += 1;
        self.results.push(BatchItemResult {
            item_id,
            outcome: BatchItemOutcome::Error {
                error: error.into(),
            },
        });
    }

    /// Get total chunks created across all items
    pub fn total_chunks_created(&self) -> usize {
        self.results
            .iter()
            .map(|r| match &r.outcome {
                BatchItemOutcome::Processed(result) => result.chunks_created(),
                BatchItemOutcome::Error { .. } => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(n: usize) -> ProcessingResult {
        ProcessingResult::Created {
            chunks_created: n,
            metrics: ChunkingMetrics::default(),
            strategy: "fallback_sentence".to_string(),
        }
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let value = serde_json::to_value(created(2)).unwrap();
        assert_eq!(value["status"], "created");
        assert_eq!(value["chunks_created"], 2);
        assert_eq!(value["strategy"], "fallback_sentence");

        let skipped = ProcessingResult::Skipped {
            reason: SkipReason::BelowMinTokens,
            metrics: ChunkingMetrics::default(),
        };
        let value = serde_json::to_value(skipped).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["reason"], "below_min_tokens");
    }

    #[test]
    fn test_batch_counts() {
        let mut batch = BatchProcessingResult::new();
        batch.add(KnowledgeItemId::new(), created(3));
        batch.add(KnowledgeItemId::new(), created(2));
        batch.add(
            KnowledgeItemId::new(),
            ProcessingResult::Failed {
                error_code: ChunkingErrorCode::ExtractorReturnedEmpty,
                error_message: None,
                metrics: ChunkingMetrics::default(),
            },
        );
        batch.add_error(KnowledgeItemId::new(), "Storage error: connection reset");

        assert_eq!(batch.total_items, 4);
        assert_eq!(batch.created, 2);
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.errored, 1);
        assert_eq!(batch.total_chunks_created(), 5);
    }
}
