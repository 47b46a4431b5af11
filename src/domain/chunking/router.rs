//! Strategy routing

use super::config::ChunkingConfig;
use super::format::ContentFormat;
use super::strategy::StrategyKind;

/// Maps (format, token count) to a strategy and decides on the LLM path
#[derive(Debug, Clone)]
pub struct StrategyRouter {
    short_text_max_tokens: usize,
    llm_min_tokens: usize,
    llm_max_tokens: usize,
}

impl Default for StrategyRouter {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

impl StrategyRouter {
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self {
            short_text_max_tokens: config.short_text_max_tokens,
            llm_min_tokens: config.llm_min_tokens,
            llm_max_tokens: config.llm_max_tokens,
        }
    }

    /// Pick the deterministic strategy
    pub fn select_strategy(&self, format: ContentFormat, token_count: usize) -> StrategyKind {
        match format {
            ContentFormat::NumericList => StrategyKind::ListToDataPoints,
            ContentFormat::BulletList if token_count < self.short_text_max_tokens => {
                StrategyKind::ShortPostClaim
            }
            ContentFormat::BulletList => StrategyKind::FallbackSentence,
            ContentFormat::ShortPost | ContentFormat::PromoCta => StrategyKind::ShortPostClaim,
            ContentFormat::PlainText | ContentFormat::Unknown => StrategyKind::FallbackSentence,
        }
    }

    /// Plain text inside the inclusive LLM token band
    pub fn should_use_llm_extraction(&self, format: ContentFormat, token_count: usize) -> bool {
        format == ContentFormat::PlainText
            && (self.llm_min_tokens..=self.llm_max_tokens).contains(&token_count)
    }
}
