//! Knowledge chunk types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::KnowledgeItemId;

/// Chunk type stamped on every chunk produced by the pipeline
pub const NORMALIZED_KNOWLEDGE_CHUNK_TYPE: &str = "normalized_knowledge";

/// A 4-digit year not embedded in a longer number ("fy2026" and "2026q1" match)
static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(19\d{2}|20\d{2})(?:\D|$)").unwrap());

/// Semantic role of a chunk, used by retrieval weighting downstream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChunkRole {
    StrategicClaim,
    Instruction,
    Metric,
    Heuristic,
    /// Role string supplied by the normalization step
    Other(String),
}

impl ChunkRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::StrategicClaim => "strategic_claim",
            Self::Instruction => "instruction",
            Self::Metric => "metric",
            Self::Heuristic => "heuristic",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for ChunkRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "strategic_claim" => Self::StrategicClaim,
            "instruction" => Self::Instruction,
            "metric" => Self::Metric,
            "heuristic" => Self::Heuristic,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ChunkRole {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ChunkRole> for String {
    fn from(role: ChunkRole) -> Self {
        match role {
            ChunkRole::Other(role) => role,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ChunkRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse trust label, independent of confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    Low,
    #[default]
    Medium,
    High,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a label case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Coarse temporal bucket derived from a timeframe string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    #[default]
    Unknown,
    Current,
    NearTerm,
    LongTerm,
}

impl TimeHorizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Current => "current",
            Self::NearTerm => "near_term",
            Self::LongTerm => "long_term",
        }
    }

    /// Bucket a timeframe relative to `current_year`.
    ///
    /// An explicit year wins over keywords. Years more than two years in
    /// the past are `Unknown`.
    pub fn from_timeframe(timeframe: Option<&str>, current_year: i32) -> Self {
        let Some(timeframe) = timeframe else {
            return Self::Unknown;
        };

        let timeframe = timeframe.to_lowercase();

        if let Some(year) = YEAR_PATTERN
            .captures(&timeframe)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
        {
            return match year - current_year {
                -2..=0 => Self::Current,
                1 => Self::NearTerm,
                d if d >= 2 => Self::LongTerm,
                _ => Self::Unknown,
            };
        }

        if timeframe.contains("next") || timeframe.contains("soon") {
            Self::NearTerm
        } else if timeframe.contains("long") || timeframe.contains("year") {
            Self::LongTerm
        } else {
            Self::Unknown
        }
    }
}

/// How a chunk's text relates to the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationType {
    /// Rewritten by the normalization step
    Normalized,
    /// Copied or derived directly from the source text
    Extractive,
}

impl TransformationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::Extractive => "extractive",
        }
    }
}

/// Byte range of a chunk's evidence inside the cleaned text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Locate `fragment` inside `text`
    pub fn locate(text: &str, fragment: &str) -> Option<Self> {
        if fragment.is_empty() {
            return None;
        }

        text.find(fragment)
            .map(|start| Self::new(start, start + fragment.len()))
    }
}

/// Chunk produced by a strategy, before persistence assigns identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDraft {
    pub chunk_text: String,
    pub chunk_role: ChunkRole,
    pub authority: Authority,
    pub confidence: f64,
    pub transformation_type: TransformationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_spans: Vec<SourceSpan>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ChunkDraft {
    /// Create a draft; confidence is clamped to [0, 1]
    pub fn new(
        chunk_text: impl Into<String>,
        chunk_role: ChunkRole,
        authority: Authority,
        confidence: f64,
        transformation_type: TransformationType,
    ) -> Self {
        Self {
            chunk_text: chunk_text.into(),
            chunk_role,
            authority,
            confidence: clamp_confidence(confidence),
            transformation_type,
            domain: None,
            actor: None,
            timeframe: None,
            source_text: None,
            source_spans: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    pub fn with_source_text(mut self, source_text: impl Into<String>) -> Self {
        self.source_text = Some(source_text.into());
        self
    }

    pub fn with_span(mut self, span: Option<SourceSpan>) -> Self {
        if let Some(span) = span {
            self.source_spans.push(span);
        }
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Clamp a confidence to [0, 1]; NaN becomes 0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Persisted chunk row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub id: Uuid,
    pub knowledge_item_id: KnowledgeItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion_source_id: Option<String>,
    pub chunk_type: String,
    pub chunk_text: String,
    pub chunk_role: ChunkRole,
    pub authority: Authority,
    pub confidence: f64,
    pub time_horizon: TimeHorizon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub source_type: String,
    pub source_variant: TransformationType,
    pub source_ref: serde_json::Value,
    pub token_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_spans: Vec<SourceSpan>,
    pub transformation_type: TransformationType,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
