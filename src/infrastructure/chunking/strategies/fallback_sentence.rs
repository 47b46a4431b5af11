//! Fallback strategy: scored sentence extraction

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::chunking::text::{char_count, estimate_tokens, split_sentences, starts_with_url};
use crate::domain::chunking::{ChunkingStrategy, StrategyKind};
use crate::domain::knowledge::{
    Authority, ChunkDraft, ChunkRole, KnowledgeItem, SourceSpan, TransformationType,
};
use crate::domain::DomainError;

static CAUSAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(because|therefore|thus|so|leads to|results in|causes)\b").unwrap()
});

const INSTRUCTION_VERBS: &[&str] = &[
    "do", "use", "seed", "add", "include", "ensure", "avoid", "create", "build",
];

/// Sentences this short are discarded before scoring
const MAX_DISCARDED_CHARS: usize = 30;
const TOP_SENTENCES: usize = 3;
const CONFIDENCE: f64 = 0.5;

const DIGIT_WEIGHT: f64 = 2.0;
const CAUSAL_WEIGHT: f64 = 1.5;
const INSTRUCTION_WEIGHT: f64 = 1.0;
const LENGTH_WEIGHT: f64 = 1.0;
const IDEAL_TOKENS: std::ops::RangeInclusive<usize> = 12..=40;

/// Strategy that keeps the highest scoring sentences as heuristics
#[derive(Debug, Clone, Default)]
pub struct FallbackSentenceStrategy;

impl FallbackSentenceStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Score a sentence; zero means no signal
    pub fn score(sentence: &str) -> f64 {
        let mut score = 0.0;

        if sentence.chars().any(|c| c.is_ascii_digit()) {
            score += DIGIT_WEIGHT;
        }

        if CAUSAL_PATTERN.is_match(sentence) {
            score += CAUSAL_WEIGHT;
        }

        let lowered = sentence.to_lowercase();
        if INSTRUCTION_VERBS
            .iter()
            .any(|verb| lowered.contains(&format!(" {} ", verb)))
        {
            score += INSTRUCTION_WEIGHT;
        }

        if IDEAL_TOKENS.contains(&estimate_tokens(sentence)) {
            score += LENGTH_WEIGHT;
        }

        score
    }

    /// Rank candidate sentences; ties keep their original order
    pub fn rank(text: &str) -> Vec<(&str, f64)> {
        let mut scored: Vec<(&str, f64)> = split_sentences(text)
            .into_iter()
            .filter(|s| char_count(s) > MAX_DISCARDED_CHARS && !starts_with_url(s))
            .map(|s| (s, Self::score(s)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(TOP_SENTENCES);
        scored
    }
}

impl ChunkingStrategy for FallbackSentenceStrategy {
    fn generate_chunks(
        &self,
        _item: &KnowledgeItem,
        text: &str,
    ) -> Result<Vec<ChunkDraft>, DomainError> {
        let chunks = Self::rank(text)
            .into_iter()
            .map(|(sentence, score)| {
                ChunkDraft::new(
                    sentence,
                    ChunkRole::Heuristic,
                    Authority::Low,
                    CONFIDENCE,
                    TransformationType::Extractive,
                )
                .with_source_text(sentence)
                .with_span(SourceSpan::locate(text, sentence))
                .with_metadata("score", serde_json::json!(score))
            })
            .collect();

        Ok(chunks)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::FallbackSentence
    }
}
