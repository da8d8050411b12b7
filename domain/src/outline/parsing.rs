//! Outline extraction from free-form model output.
//!
//! Accepted heading forms (one per line):
//!
//! | Form | Example |
//! |------|---------|
//! | Numbered | `1. Introduction`, `2) Methods` |
//! | Markdown heading | `## Results` |
//! | Bold line | `**Discussion**` |
//!
//! Bulleted lines (`-`, `*`, `+`) and nested numbering (`1.1`) under a
//! heading become that heading's hints. Everything else is ignored, so
//! prose preambles like "Here is the outline:" do not produce headings.

use super::entities::{Outline, OutlineSection};

/// Parse model output into outline sections.
///
/// Returns an empty vector when no heading could be found; callers decide
/// whether that is a retryable condition.
pub fn parse_outline(text: &str) -> Vec<OutlineSection> {
    let mut sections: Vec<OutlineSection> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        if let Some(hint) = parse_hint(line) {
            if let Some(current) = sections.last_mut()
                && !hint.is_empty()
            {
                current.hints.push(hint);
            }
            continue;
        }

        if let Some(title) = parse_heading(line) {
            sections.push(OutlineSection::new(title));
        }
    }

    sections
}

/// Parse output directly into an [`Outline`], if it has any heading.
pub fn parse_outline_strict(text: &str) -> Option<Outline> {
    Outline::new(parse_outline(text)).ok()
}

fn parse_heading(line: &str) -> Option<String> {
    // "# Title" / "## Title"
    if line.starts_with('#') {
        let title = line.trim_start_matches('#').trim();
        return non_empty(clean_title(title));
    }

    // "**Title**"
    if line.starts_with("**") && line.ends_with("**") && line.len() > 4 {
        return non_empty(clean_title(&line[2..line.len() - 2]));
    }

    // "1. Title" / "1) Title" (single-level numbering only)
    let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let rest = &line[digits.len()..];
    let rest = rest
        .strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))?;
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    non_empty(clean_title(rest.trim()))
}

fn parse_hint(line: &str) -> Option<String> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(clean_title(rest.trim()));
        }
    }

    // Nested numbering like "1.1 Background" or "2.3. Sampling"
    let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        let rest = &line[digits.len()..];
        if let Some(after_dot) = rest.strip_prefix('.')
            && after_dot.starts_with(|c: char| c.is_ascii_digit())
        {
            let body = after_dot.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
            return Some(clean_title(body.trim()));
        }
    }
    None
}

/// Strip emphasis markers and a trailing rationale after " — " / " - " / ":".
fn clean_title(raw: &str) -> String {
    let stripped = raw.replace("**", "").replace('`', "");
    let title = stripped
        .split(" — ")
        .next()
        .unwrap_or_default()
        .split(" - ")
        .next()
        .unwrap_or_default();
    let title = match title.split_once(':') {
        Some((head, _)) if !head.trim().is_empty() => head,
        _ => title,
    };
    title.trim().trim_end_matches('.').trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_outline_with_hints() {
        let text = "Here is a proposed outline:\n\n\
                    1. Introduction - why entanglement matters\n   \
                    - Motivation\n   \
                    - Scope\n\
                    2. **Methods**\n\
                    3) Results: what we found\n";
        let sections = parse_outline(text);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "Methods", "Results"]);
        assert_eq!(sections[0].hints, vec!["Motivation", "Scope"]);
    }

    #[test]
    fn test_parse_markdown_headings() {
        let sections = parse_outline("# Background\n## Experimental Setup\ntext body");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].title, "Experimental Setup");
    }

    #[test]
    fn test_nested_numbering_is_a_hint() {
        let sections = parse_outline("1. Methods\n1.1 Sampling\n1.2. Controls\n2. Discussion");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].hints, vec!["Sampling", "Controls"]);
    }

    #[test]
    fn test_prose_only_yields_nothing() {
        assert!(parse_outline("I cannot produce an outline for this request.").is_empty());
        assert!(parse_outline_strict("").is_none());
    }

    #[test]
    fn test_year_like_prefix_without_dot_is_not_a_heading() {
        assert!(parse_outline("2024 was a good year").is_empty());
    }
}
