//! Chunking pipeline configuration

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Thresholds and limits for the chunking pipeline.
///
/// Every field has a named default; values missing from a config source
/// fall back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Minimum cleaned character count for an item to be processed
    pub min_clean_chars: usize,
    /// Minimum estimated token count for an item to be processed
    pub min_clean_tokens_est: usize,
    /// Texts below this token count are short (exclusive bound)
    pub short_text_max_tokens: usize,
    /// Lower bound of the LLM extraction band (inclusive)
    pub llm_min_tokens: usize,
    /// Upper bound of the LLM extraction band (inclusive)
    pub llm_max_tokens: usize,
    /// Maximum number of normalized artifacts turned into chunks
    pub llm_max_artifacts: usize,
    /// Persisted error messages are cut to this many characters
    pub error_message_max_chars: usize,
    /// Items processed at once by batch runs
    pub max_concurrency: usize,
}

pub const DEFAULT_MIN_CLEAN_CHARS: usize = 80;
pub const DEFAULT_MIN_CLEAN_TOKENS_EST: usize = 20;
pub const DEFAULT_SHORT_TEXT_MAX_TOKENS: usize = 60;
pub const DEFAULT_LLM_MIN_TOKENS: usize = 60;
pub const DEFAULT_LLM_MAX_TOKENS: usize = 800;
pub const DEFAULT_LLM_MAX_ARTIFACTS: usize = 200;
pub const DEFAULT_ERROR_MESSAGE_MAX_CHARS: usize = 1000;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_clean_chars: DEFAULT_MIN_CLEAN_CHARS,
            min_clean_tokens_est: DEFAULT_MIN_CLEAN_TOKENS_EST,
            short_text_max_tokens: DEFAULT_SHORT_TEXT_MAX_TOKENS,
            llm_min_tokens: DEFAULT_LLM_MIN_TOKENS,
            llm_max_tokens: DEFAULT_LLM_MAX_TOKENS,
            llm_max_artifacts: DEFAULT_LLM_MAX_ARTIFACTS,
            error_message_max_chars: DEFAULT_ERROR_MESSAGE_MAX_CHARS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl ChunkingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_clean_chars(mut self, min_clean_chars: usize) -> Self {
        self.min_clean_chars = min_clean_chars;
        self
    }

    pub fn with_min_clean_tokens_est(mut self, min_clean_tokens_est: usize) -> Self {
        self.min_clean_tokens_est = min_clean_tokens_est;
        self
    }

    pub fn with_llm_band(mut self, min_tokens: usize, max_tokens: usize) -> Self {
        self.llm_min_tokens = min_tokens;
        self.llm_max_tokens = max_tokens;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.short_text_max_tokens == 0 {
            return Err(DomainError::validation(
                "short_text_max_tokens must be greater than 0",
            ));
        }

        if self.llm_min_tokens > self.llm_max_tokens {
            return Err(DomainError::validation(
                "llm_min_tokens must be less than or equal to llm_max_tokens",
            ));
        }

        if self.error_message_max_chars == 0 {
            return Err(DomainError::validation(
                "error_message_max_chars must be greater than 0",
            ));
        }

        if self.max_concurrency == 0 {
            return Err(DomainError::validation("max_concurrency must be greater than 0"));
        }

        Ok(())
    }
}
