//! Factory for creating chunking strategies

use std::sync::Arc;

use crate::domain::chunking::{ChunkingStrategy, StrategyKind};

use super::strategies::{
    FallbackSentenceStrategy, ListToDataPointsStrategy, ShortPostClaimStrategy,
};

/// Factory for creating chunking strategies
#[derive(Debug, Default)]
pub struct StrategyFactory;

impl StrategyFactory {
    /// Create a strategy for the given kind
    pub fn create(kind: StrategyKind) -> Arc<dyn ChunkingStrategy> {
        match kind {
            StrategyKind::ListToDataPoints => Arc::new(ListToDataPointsStrategy::new()),
            StrategyKind::ShortPostClaim => Arc::new(ShortPostClaimStrategy::new()),
            StrategyKind::FallbackSentence => Arc::new(FallbackSentenceStrategy::new()),
        }
    }

    /// Get a list of all available strategy kinds
    pub fn available_kinds() -> Vec<StrategyKind> {
        vec![
            StrategyKind::ListToDataPoints,
            StrategyKind::ShortPostClaim,
            StrategyKind::FallbackSentence,
        ]
    }
}
