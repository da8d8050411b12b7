//! Text utilities for the domain layer.
//!
//! Evidence fingerprints, relevance filtering and lexical ranking all go
//! through the same normalization so that they agree with each other.

use std::collections::BTreeSet;

/// Words ignored when extracting keywords from headings and queries.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "how", "in",
    "into", "is", "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to",
    "was", "were", "what", "when", "which", "while", "who", "why", "with", "within", "without",
];

/// Minimum keyword length kept by [`keywords`].
const MIN_KEYWORD_LEN: usize = 3;

/// Normalize text for fingerprinting: lower-case, punctuation stripped,
/// whitespace collapsed to single spaces.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Split text into normalized tokens.
pub fn tokens(text: &str) -> impl Iterator<Item = String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}

/// Distinct, sorted keywords of a text (stop words and short tokens removed).
pub fn keywords(text: &str) -> BTreeSet<String> {
    tokens(text)
        .filter(|t| t.chars().count() >= MIN_KEYWORD_LEN && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Whether `text` contains any of the given keywords as a whole token.
pub fn mentions_any(text: &str, keywords: &BTreeSet<String>) -> bool {
    if keywords.is_empty() {
        return false;
    }
    tokens(text).any(|t| keywords.contains(&t))
}

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Turn a display name into a roster id (`"Data Engineer"` → `"data-engineer"`).
pub fn slugify(name: &str) -> String {
    normalize(name).replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_case_punctuation_and_whitespace() {
        assert_eq!(
            normalize("  Quantum   Entanglement,\n is REAL! "),
            "quantum entanglement is real"
        );
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_keywords_drop_stop_words_and_short_tokens() {
        let kw = keywords("The Role of Quantum Entanglement in QKD");
        assert!(kw.contains("quantum"));
        assert!(kw.contains("entanglement"));
        assert!(kw.contains("role"));
        assert!(kw.contains("qkd"));
        assert!(!kw.contains("the"));
        assert!(!kw.contains("of"));
    }

    #[test]
    fn test_mentions_any_is_token_based() {
        let kw = keywords("Entanglement");
        assert!(mentions_any("Bell tests confirm entanglement.", &kw));
        assert!(!mentions_any("disentanglements are different tokens", &kw));
        assert!(!mentions_any("anything", &BTreeSet::new()));
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Data Engineer"), "data-engineer");
        assert_eq!(slugify("  Literature  Reviewer! "), "literature-reviewer");
    }
}
