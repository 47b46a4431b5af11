//! Content format detection

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::config::DEFAULT_SHORT_TEXT_MAX_TOKENS;
use super::text::{char_count, contains_url, estimate_tokens, non_empty_lines};

/// Year followed by `=`, or `N.` / `N)` list numbering
static NUMERIC_LINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}\s*=|\d+[.)]\s)").unwrap());

/// Lines shorter than this do not vote on numeric-list detection
const MIN_NUMERIC_CANDIDATE_CHARS: usize = 5;

/// Minimum number of lines for list formats
const MIN_LIST_LINES: usize = 3;

const BULLET_MARKERS: &[char] = &['-', '•', '*'];

/// Call-to-action phrases, matched case-insensitively as substrings
const CTA_PHRASES: &[&str] = &[
    "comment",
    "dm me",
    "link in bio",
    "limited",
    "sign up",
    "subscribe",
    "register now",
    "book a call",
    "join now",
];

/// Shape of a knowledge item's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    NumericList,
    BulletList,
    ShortPost,
    PromoCta,
    PlainText,
    Unknown,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumericList => "numeric_list",
            Self::BulletList => "bullet_list",
            Self::ShortPost => "short_post",
            Self::PromoCta => "promo_cta",
            Self::PlainText => "plain_text",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies cleaned text; the first matching rule wins
#[derive(Debug, Clone)]
pub struct FormatDetector {
    short_text_max_tokens: usize,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_TEXT_MAX_TOKENS)
    }
}

impl FormatDetector {
    pub fn new(short_text_max_tokens: usize) -> Self {
        Self {
            short_text_max_tokens,
        }
    }

    pub fn detect(&self, text: &str) -> ContentFormat {
        let text = text.trim();

        if text.is_empty() {
            return ContentFormat::Unknown;
        }

        let lines = non_empty_lines(text);

        if lines.len() >= MIN_LIST_LINES && is_numeric_list(&lines) {
            return ContentFormat::NumericList;
        }

        if lines.len() >= MIN_LIST_LINES && count_bullet_lines(&lines) >= MIN_LIST_LINES {
            return ContentFormat::BulletList;
        }

        if estimate_tokens(text) < self.short_text_max_tokens {
            if has_cta_phrase(text) && contains_url(text) {
                return ContentFormat::PromoCta;
            }
            return ContentFormat::ShortPost;
        }

        ContentFormat::PlainText
    }
}

/// Detect with default thresholds
pub fn detect_format(text: &str) -> ContentFormat {
    FormatDetector::default().detect(text)
}

/// More than half of the candidate lines look numbered
fn is_numeric_list(lines: &[&str]) -> bool {
    let candidates: Vec<&&str> = lines
        .iter()
        .filter(|line| char_count(line) >= MIN_NUMERIC_CANDIDATE_CHARS)
        .collect();

    if candidates.is_empty() {
        return false;
    }

    let matching = candidates
        .iter()
        .filter(|line| NUMERIC_LINE_PATTERN.is_match(line))
        .count();

    matching * 2 > candidates.len()
}

fn count_bullet_lines(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|line| line.starts_with(BULLET_MARKERS))
        .count()
}

fn has_cta_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    CTA_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
