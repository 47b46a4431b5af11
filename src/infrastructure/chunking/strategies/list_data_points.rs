//! Numeric list strategy: one summary plus one chunk per data point

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::domain::chunking::text::{non_empty_lines, truncate_chars};
use crate::domain::chunking::{ChunkingStrategy, StrategyKind};
use crate::domain::knowledge::{
    Authority, ChunkDraft, ChunkRole, KnowledgeItem, SourceSpan, TransformationType,
};
use crate::domain::DomainError;

/// `YYYY = value[/mo|/month|k|K|m|M] (optional note)`
static YEAR_VALUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<year>\d{4})\s*=\s*(?P<value>[$€£]?\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:/month|/mo|[kKmM])\b)?)\s*(?P<note>.*)$",
    )
    .unwrap()
});

/// `N. value` or `N) value`
static INDEXED_VALUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<index>\d+)[.)]\s+(?P<value>.+)$").unwrap());

/// Characters of the original text kept as evidence on the summary chunk
const SUMMARY_SOURCE_CHARS: usize = 500;

const SUMMARY_CONFIDENCE: f64 = 0.8;
const POINT_CONFIDENCE: f64 = 0.7;

/// A value parsed from one list line
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub year: Option<u32>,
    pub index: Option<u32>,
    pub value: String,
    pub note: Option<String>,
    pub source_line: String,
}

impl DataPoint {
    /// Parse a line, trying the year pattern before the indexed one
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();

        if let Some(caps) = YEAR_VALUE_PATTERN.captures(line) {
            let note = caps
                .name("note")
                .map(|m| clean_note(m.as_str()))
                .filter(|n| !n.is_empty());

            return Some(Self {
                year: caps["year"].parse().ok(),
                index: None,
                value: caps["value"].trim().to_string(),
                note,
                source_line: line.to_string(),
            });
        }

        let caps = INDEXED_VALUE_PATTERN.captures(line)?;

        Some(Self {
            year: None,
            index: caps["index"].parse().ok(),
            value: caps["value"].trim().to_string(),
            note: None,
            source_line: line.to_string(),
        })
    }

    fn chunk_text(&self) -> String {
        let mut text = match (self.year, self.index) {
            (Some(year), _) => format!("{}: {}", year, self.value),
            (None, Some(index)) => format!("{}. {}", index, self.value),
            (None, None) => self.value.clone(),
        };

        if let Some(ref note) = self.note {
            text.push_str(&format!(" ({})", note));
        }

        text
    }

    fn metadata(&self) -> serde_json::Value {
        json!({
            "year": self.year,
            "index": self.index,
            "value": self.value,
            "note": self.note,
        })
    }
}

fn clean_note(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['(', '-', '–', ',', ':'])
        .trim_end_matches(')')
        .trim()
        .to_string()
}

/// Strategy that turns numbered or year-keyed lists into metric chunks
#[derive(Debug, Clone, Default)]
pub struct ListToDataPointsStrategy;

impl ListToDataPointsStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Parse every line that matches a data point pattern
    pub fn parse_points(text: &str) -> Vec<DataPoint> {
        non_empty_lines(text)
            .into_iter()
            .filter_map(DataPoint::parse)
            .collect()
    }

    fn summarize(points: &[DataPoint]) -> String {
        let count = points.len();
        let noun = if count == 1 { "data point" } else { "data points" };
        let years: Vec<u32> = points.iter().filter_map(|p| p.year).collect();

        if years.len() == count {
            let first = years.iter().copied().min().unwrap_or_default();
            let last = years.iter().copied().max().unwrap_or_default();
            let span = last - first;

            format!(
                "Time series from {} to {} covering {} year{} with {} {}.",
                first,
                last,
                span,
                if span == 1 { "" } else { "s" },
                count,
                noun
            )
        } else {
            format!("List of {} {}.", count, noun)
        }
    }
}

impl ChunkingStrategy for ListToDataPointsStrategy {
    fn generate_chunks(
        &self,
        _item: &KnowledgeItem,
        text: &str,
    ) -> Result<Vec<ChunkDraft>, DomainError> {
        let points = Self::parse_points(text);

        if points.is_empty() {
            return Ok(vec![]);
        }

        let mut summary = ChunkDraft::new(
            Self::summarize(&points),
            ChunkRole::Metric,
            Authority::Medium,
            SUMMARY_CONFIDENCE,
            TransformationType::Extractive,
        )
        .with_source_text(truncate_chars(text, SUMMARY_SOURCE_CHARS))
        .with_metadata("point_count", json!(points.len()));

        let years: Vec<u32> = points.iter().filter_map(|p| p.year).collect();
        if let (Some(start), Some(end)) = (years.iter().min(), years.iter().max()) {
            summary = summary
                .with_metadata("year_start", json!(start))
                .with_metadata("year_end", json!(end));
        }

        let mut chunks = Vec::with_capacity(points.len() + 1);
        chunks.push(summary);

        for point in &points {
            chunks.push(
                ChunkDraft::new(
                    point.chunk_text(),
                    ChunkRole::Metric,
                    Authority::Medium,
                    POINT_CONFIDENCE,
                    TransformationType::Extractive,
                )
                .with_source_text(point.source_line.clone())
                .with_span(SourceSpan::locate(text, &point.source_line))
                .with_metadata("data_point", point.metadata()),
            );
        }

        Ok(chunks)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::ListToDataPoints
    }
}
