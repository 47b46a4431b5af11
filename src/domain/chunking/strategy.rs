//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;
use crate::domain::knowledge::{ChunkDraft, KnowledgeItem};

/// Strategy name recorded when normalized claim artifacts were used
pub const LLM_CLAIM_EXTRACTOR: &str = "llm_claim_extractor";

/// Deterministic strategies the router can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Numbered or year-keyed lists become data points
    ListToDataPoints,
    /// Short posts yield up to two claim sentences
    ShortPostClaim,
    /// Scored sentence extraction for everything else
    FallbackSentence,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListToDataPoints => "list_to_data_points",
            Self::ShortPostClaim => "short_post_claim",
            Self::FallbackSentence => "fallback_sentence",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for chunking strategies.
///
/// Implementations are pure transformations from text to drafts. An empty
/// result is reported by the caller as `extractor_returned_empty`; an error
/// as `parser_error`.
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Generate chunk drafts from the item's cleaned text
    fn generate_chunks(
        &self,
        item: &KnowledgeItem,
        text: &str,
    ) -> Result<Vec<ChunkDraft>, DomainError>;

    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Get the strategy name
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
