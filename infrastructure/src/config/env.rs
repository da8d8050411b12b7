//! `${VAR}` / `$VAR` expansion in configuration strings.

use regex::Regex;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .unwrap_or_else(|e| unreachable!("invalid env pattern: {e}"))
    })
}

/// Expand references using the process environment.
///
/// Returns `None` when a referenced variable is unset, so optional
/// credentials like `${TAVILY_API_KEY}` do not leak through as literals.
pub fn expand_env(value: &str) -> Option<String> {
    expand_env_with(value, |name| std::env::var(name).ok())
}

/// Expand references using `lookup`.
pub fn expand_env_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let mut missing = false;
    let expanded = pattern().replace_all(value, |caps: &regex::Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        lookup(name).unwrap_or_else(|| {
            missing = true;
            String::new()
        })
    });
    (!missing).then(|| expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_braced_and_bare_references() {
        let env = lookup(&[("HOST", "gpu-box"), ("PORT", "11434")]);
        assert_eq!(
            expand_env_with("http://${HOST}:$PORT/api", &env).as_deref(),
            Some("http://gpu-box:11434/api")
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        let env = lookup(&[]);
        assert_eq!(expand_env_with("http://localhost:8000", &env).as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_missing_variable_yields_none() {
        let env = lookup(&[("A", "1")]);
        assert_eq!(expand_env_with("${A}-${B}", &env), None);
    }
}
