//! Per-run diagnostics written back onto a knowledge item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::ContentFormat;
use super::preflight::{PreflightMetrics, SkipReason};

/// Terminal outcome of a chunking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStatus {
    Created,
    Skipped,
    Failed,
}

impl ChunkingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ChunkingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a run that passed preflight produced no chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingErrorCode {
    /// The strategy ran and produced nothing usable
    ExtractorReturnedEmpty,
    /// The strategy returned an error
    ParserError,
}

impl ChunkingErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractorReturnedEmpty => "extractor_returned_empty",
            Self::ParserError => "parser_error",
        }
    }
}

impl std::fmt::Display for ChunkingErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened on the LLM-artifact path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmPathOutcome {
    /// Format or size outside the LLM band
    NotEligible,
    /// In the band, but no usable artifacts were found
    AttemptedEmpty,
    /// Artifacts produced the persisted chunks
    Used,
}

/// Measurements recorded for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkingMetrics {
    #[serde(flatten)]
    pub preflight: PreflightMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_format: Option<ContentFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_path: Option<LlmPathOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
}

impl ChunkingMetrics {
    pub fn from_preflight(preflight: PreflightMetrics) -> Self {
        Self {
            preflight,
            ..Default::default()
        }
    }
}

/// Diagnostics value object, written once per run and swapped as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingDiagnostics {
    pub status: ChunkingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ChunkingErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub metrics: ChunkingMetrics,
    pub recorded_at: DateTime<Utc>,
}

impl ChunkingDiagnostics {
    pub fn skipped(reason: SkipReason, metrics: ChunkingMetrics) -> Self {
        Self {
            status: ChunkingStatus::Skipped,
            skip_reason: Some(reason),
            error_code: None,
            error_message: None,
            metrics,
            recorded_at: Utc::now(),
        }
    }

    pub fn failed(
        error_code: ChunkingErrorCode,
        error_message: Option<String>,
        metrics: ChunkingMetrics,
    ) -> Self {
        Self {
            status: ChunkingStatus::Failed,
            skip_reason: None,
            error_code: Some(error_code),
            error_message,
            metrics,
            recorded_at: Utc::now(),
        }
    }

    pub fn created(metrics: ChunkingMetrics) -> Self {
        Self {
            status: ChunkingStatus::Created,
            skip_reason: None,
            error_code: None,
            error_message: None,
            metrics,
            recorded_at: Utc::now(),
        }
    }
}
