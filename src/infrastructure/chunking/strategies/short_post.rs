//! Short post strategy: up to two claim sentences

use crate::domain::chunking::text::{char_count, estimate_tokens, is_url_only, non_empty_lines, split_sentences};
use crate::domain::chunking::{ChunkingStrategy, StrategyKind};
use crate::domain::knowledge::{
    Authority, ChunkDraft, ChunkRole, KnowledgeItem, SourceSpan, TransformationType,
};
use crate::domain::DomainError;

/// Lines shorter than this are dropped before sentence splitting
const MIN_LINE_CHARS: usize = 10;
/// A qualifying sentence is longer than this
const MIN_SENTENCE_CHARS: usize = 20;
const MIN_SENTENCE_TOKENS: usize = 8;
const MAX_SENTENCES: usize = 2;
const CONFIDENCE: f64 = 0.6;

/// Strategy for short posts and promotional snippets
#[derive(Debug, Clone, Default)]
pub struct ShortPostClaimStrategy;

impl ShortPostClaimStrategy {
    pub fn new() -> Self {
        Self
    }

    fn qualifies(sentence: &str) -> bool {
        char_count(sentence) > MIN_SENTENCE_CHARS && estimate_tokens(sentence) >= MIN_SENTENCE_TOKENS
    }

    /// Collect the first qualifying sentences, scanning across lines
    pub fn collect_sentences(text: &str) -> Vec<&str> {
        non_empty_lines(text)
            .into_iter()
            .filter(|line| !is_url_only(line) && char_count(line) >= MIN_LINE_CHARS)
            .flat_map(split_sentences)
            .filter(|sentence| Self::qualifies(sentence))
            .take(MAX_SENTENCES)
            .collect()
    }
}

impl ChunkingStrategy for ShortPostClaimStrategy {
    fn generate_chunks(
        &self,
        _item: &KnowledgeItem,
        text: &str,
    ) -> Result<Vec<ChunkDraft>, DomainError> {
        let chunks = Self::collect_sentences(text)
            .into_iter()
            .enumerate()
            .map(|(position, sentence)| {
                let role = if position == 0 {
                    ChunkRole::StrategicClaim
                } else {
                    ChunkRole::Instruction
                };

                ChunkDraft::new(
                    sentence,
                    role,
                    Authority::Medium,
                    CONFIDENCE,
                    TransformationType::Extractive,
                )
                .with_source_text(sentence)
                .with_span(SourceSpan::locate(text, sentence))
            })
            .collect();

        Ok(chunks)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::ShortPostClaim
    }
}
