//! Text helpers shared by the gate, the detector and the strategies

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Whole string is a single bare URL
static URL_ONLY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?://|www\.)\S+$").unwrap());

/// A URL anywhere in the string
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(https?://|www\.)\S+").unwrap());

/// Terminal punctuation followed by whitespace or the end of the text
static SENTENCE_END_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").unwrap());

/// Count whitespace-delimited tokens.
///
/// A cheap sizing proxy, not a model tokenizer.
pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Check whether the trimmed text is exactly one URL
pub fn is_url_only(text: &str) -> bool {
    URL_ONLY_PATTERN.is_match(text.trim())
}

/// Check whether the text contains a URL anywhere
pub fn contains_url(text: &str) -> bool {
    URL_PATTERN.is_match(text)
}

/// Check whether the text starts with a URL
pub fn starts_with_url(text: &str) -> bool {
    URL_PATTERN
        .find(text.trim_start())
        .is_some_and(|m| m.start() == 0)
}

/// Trimmed, non-empty lines
pub fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Split on sentence boundaries, returning trimmed non-empty sentences.
///
/// Unicode boundaries first, then any `.`/`!`/`?` followed by whitespace,
/// so a lowercase continuation still starts a new sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.unicode_sentences()
        .flat_map(split_on_terminals)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_on_terminals(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for end in SENTENCE_END_PATTERN.find_iter(text) {
        pieces.push(&text[start..end.end()]);
        start = end.end();
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

/// Character count (Unicode scalar values)
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Keep at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("   \n\t "), 0);
        assert_eq!(estimate_tokens("one"), 1);
        assert_eq!(estimate_tokens("  one   two\nthree\tfour  "), 4);
    }

    #[test]
    fn test_url_detection() {
        assert!(is_url_only("https://example.com/path?q=1"));
        assert!(is_url_only("  www.example.com  "));
        assert!(!is_url_only("see https://example.com"));

        assert!(contains_url("see https://example.com for more"));
        assert!(!contains_url("no links here"));

        assert!(starts_with_url("https://example.com is where it lives"));
        assert!(!starts_with_url("Visit https://example.com"));
    }

    #[test]
    fn test_non_empty_lines() {
        let lines = non_empty_lines("  first \n\n   \nsecond\n");
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("First one here. Second one here! Third one?");
        assert_eq!(
            sentences,
            vec!["First one here.", "Second one here!", "Third one?"]
        );
    }

    #[test]
    fn test_split_sentences_keeps_decimals() {
        let sentences = split_sentences("Revenue grew 1.5x last year. Costs stayed flat.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("1.5x"));
    }

    #[test]
    fn test_split_sentences_lowercase_continuation() {
        let sentences = split_sentences(
            "Growth stalled in 2023 after the launch. then we changed pricing because churn rose.",
        );
        assert_eq!(
            sentences,
            vec![
                "Growth stalled in 2023 after the launch.",
                "then we changed pricing because churn rose."
            ]
        );

        let sentences = split_sentences("ship it!! then measure... then repeat");
        assert_eq!(sentences, vec!["ship it!!", "then measure...", "then repeat"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
