//! Domain canonicalization for claim context

/// Synonym groups, canonical name first
const DOMAIN_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "seo",
        &["seo", "search", "search engine optimization", "organic search"],
    ),
    (
        "content marketing",
        &["content", "content marketing", "content strategy", "blogging"],
    ),
    (
        "social media",
        &["social", "social media", "social media marketing", "smm"],
    ),
    (
        "email marketing",
        &["email", "email marketing", "newsletter", "newsletters"],
    ),
    (
        "paid advertising",
        &["ads", "paid ads", "ppc", "paid media", "advertising", "paid advertising"],
    ),
    ("sales", &["sales", "selling", "outbound"]),
    ("product", &["product", "product management"]),
];

/// Collapse a free-text domain onto its canonical name.
///
/// Unknown domains pass through trimmed and lowercased; blank input
/// yields `None`.
pub fn canonicalize_domain(domain: &str) -> Option<String> {
    let normalized = domain.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

    if normalized.is_empty() {
        return None;
    }

    let canonical = DOMAIN_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.contains(&normalized.as_str()))
        .map(|(canonical, _)| canonical.to_string());

    Some(canonical.unwrap_or(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_collapse() {
        assert_eq!(canonicalize_domain("Search").as_deref(), Some("seo"));
        assert_eq!(canonicalize_domain("content").as_deref(), Some("content marketing"));
        assert_eq!(canonicalize_domain("  Paid   Ads ").as_deref(), Some("paid advertising"));
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(canonicalize_domain("  Supply Chain ").as_deref(), Some("supply chain"));
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(canonicalize_domain("   "), None);
    }
}
