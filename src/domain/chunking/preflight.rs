//! Preflight eligibility gate

use serde::{Deserialize, Serialize};

use super::config::ChunkingConfig;
use super::text::{char_count, contains_url, estimate_tokens, is_url_only};

/// Why an item was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyAfterClean,
    UrlOnly,
    BelowMinChars,
    BelowMinTokens,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyAfterClean => "empty_after_clean",
            Self::UrlOnly => "url_only",
            Self::BelowMinChars => "below_min_chars",
            Self::BelowMinTokens => "below_min_tokens",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Measurements taken by the gate, returned whether or not the item passes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightMetrics {
    pub raw_chars: usize,
    pub clean_chars: usize,
    pub contains_url: bool,
    pub is_url_only: bool,
    pub raw_tokens_est: usize,
    pub clean_tokens_est: usize,
}

/// Gate verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightVerdict {
    /// `None` when eligible
    pub skip_reason: Option<SkipReason>,
    pub metrics: PreflightMetrics,
}

impl PreflightVerdict {
    pub fn is_eligible(&self) -> bool {
        self.skip_reason.is_none()
    }
}

/// Decide whether raw text is worth processing.
///
/// Checks run in order: empty, bare URL, character minimum, token minimum.
pub fn run_preflight(raw_text: &str, config: &ChunkingConfig) -> PreflightVerdict {
    let clean = raw_text.trim();

    let mut metrics = PreflightMetrics {
        raw_chars: char_count(raw_text),
        raw_tokens_est: estimate_tokens(raw_text),
        ..Default::default()
    };

    if clean.is_empty() {
        return PreflightVerdict {
            skip_reason: Some(SkipReason::EmptyAfterClean),
            metrics,
        };
    }

    metrics.clean_chars = char_count(clean);
    metrics.clean_tokens_est = estimate_tokens(clean);
    metrics.contains_url = contains_url(clean);
    metrics.is_url_only = is_url_only(clean);

    let skip_reason = if metrics.is_url_only {
        Some(SkipReason::UrlOnly)
    } else if metrics.clean_chars < config.min_clean_chars {
        Some(SkipReason::BelowMinChars)
    } else if metrics.clean_tokens_est < config.min_clean_tokens_est {
        Some(SkipReason::BelowMinTokens)
    } else {
        None
    };

    PreflightVerdict {
        skip_reason,
        metrics,
    }
}
