//! Rewrites placeholder tokens in one text unit into positional format specifiers.
//!
//! Every distinct placeholder gets the next 1-based index in order of first
//! appearance; repeated occurrences reuse it, however they are spelled.
//!
//! ```rust
//! use fmtsanitize::normalize;
//!
//! let out = normalize("{user} • {user}");
//! assert_eq!(out.text, "%1$s • %1$s");
//! assert!(out.changed);
//! ```

use serde::Serialize;

use crate::matcher::TokenMatcher;

/// Canonical replacement for the placeholder with the given 1-based index.
pub fn format_specifier(index: usize) -> String {
    format!("%{}$s", index)
}

/// Insertion-ordered assignment of indices to canonical keys.
///
/// Scoped to a single normalization pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexAssignment {
    keys: Vec<String>,
}

impl IndexAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `key`, assigning the next one on first sight.
    pub fn index_of(&mut self, key: &str) -> usize {
        match self.keys.iter().position(|k| k == key) {
            Some(pos) => pos + 1,
            None => {
                self.keys.push(key.to_string());
                self.keys.len()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn into_keys(self) -> Vec<String> {
        self.keys
    }
}

/// Result of normalizing one text unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub text: String,
    /// True iff at least one placeholder was replaced.
    pub changed: bool,
    /// Number of replaced occurrences.
    pub replacements: usize,
    /// Distinct canonical keys; the key at position `i` received index `i + 1`.
    pub keys: Vec<String>,
}

impl Normalized {
    fn unchanged(text: &str) -> Self {
        Normalized {
            text: text.to_string(),
            changed: false,
            replacements: 0,
            keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    matcher: TokenMatcher,
}

impl Normalizer {
    pub fn new(matcher: TokenMatcher) -> Self {
        Normalizer { matcher }
    }

    /// Shorthand for a normalizer over a custom keyword set.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(TokenMatcher::new(keywords))
    }

    pub fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    /// Rewrites every recognized placeholder in `text`.
    ///
    /// Text outside placeholder spans is copied through untouched.
    pub fn normalize(&self, text: &str) -> Normalized {
        let mut matches = self.matcher.find_iter(text).peekable();
        if matches.peek().is_none() {
            return Normalized::unchanged(text);
        }

        let mut assignment = IndexAssignment::new();
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut replacements = 0;

        for m in matches {
            out.push_str(&text[cursor..m.start]);
            let index = assignment.index_of(&m.canonical_key(text));
            out.push_str(&format_specifier(index));
            cursor = m.end;
            replacements += 1;
        }
        out.push_str(&text[cursor..]);

        Normalized {
            text: out,
            changed: true,
            replacements,
            keys: assignment.into_keys(),
        }
    }
}

/// Normalizes `text` with the default keyword set.
pub fn normalize(text: &str) -> Normalized {
    Normalizer::default().normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_index_for_repeated_placeholder() {
        let out = normalize("{user} • {user}");
        assert_eq!(out.text, "%1$s • %1$s");
        assert!(out.changed);
        assert_eq!(out.replacements, 2);
        assert_eq!(out.keys, vec!["user"]);
    }

    #[test]
    fn test_assigns_sequential_indices_to_distinct_placeholders() {
        let out = normalize("{user}:{org}");
        assert_eq!(out.text, "%1$s:%2$s");
        assert_eq!(out.keys, vec!["user", "org"]);
    }

    #[test]
    fn test_ignores_whitespace_differences() {
        assert_eq!(normalize("{ user } vs {\tuser\n}").text, "%1$s vs %1$s");
    }

    #[test]
    fn test_all_encodings_share_one_index() {
        let out = normalize(r"{str} and \u007bstr\u007d and &#x7b;STR&#x7D;");
        assert_eq!(out.text, "%1$s and %1$s and %1$s");
        assert_eq!(out.replacements, 3);
    }

    #[test]
    fn test_first_seen_order_wins() {
        let out = normalize("{org} {user} {ORG} {str}");
        assert_eq!(out.text, "%1$s %2$s %1$s %3$s");
    }

    #[test]
    fn test_non_keyword_is_untouched() {
        let out = normalize("{string}");
        assert_eq!(out.text, "{string}");
        assert!(!out.changed);
        assert_eq!(out.replacements, 0);
    }

    #[test]
    fn test_empty_input() {
        let out = normalize("");
        assert_eq!(out.text, "");
        assert!(!out.changed);
    }

    #[test]
    fn test_unclosed_opener_is_passed_through() {
        let out = normalize("Hello {user and goodbye");
        assert_eq!(out.text, "Hello {user and goodbye");
        assert!(!out.changed);
    }

    #[test]
    fn test_surrounding_text_is_preserved() {
        let out = normalize("\"{str}\" 50% off, {not a token}");
        assert_eq!(out.text, "\"%1$s\" 50% off, {not a token}");
    }

    #[test]
    fn test_already_canonical_text_is_stable() {
        let once = normalize("Hi {user}, welcome to {org}");
        let twice = normalize(&once.text);
        assert_eq!(twice.text, once.text);
        assert!(!twice.changed);
    }

    #[test]
    fn test_custom_keywords() {
        let normalizer = Normalizer::with_keywords(["name"]);
        assert_eq!(normalizer.normalize("{name}/{user}").text, "%1$s/{user}");
    }

    #[test]
    fn test_index_assignment() {
        let mut assignment = IndexAssignment::new();
        assert!(assignment.is_empty());
        assert_eq!(assignment.index_of("a"), 1);
        assert_eq!(assignment.index_of("b"), 2);
        assert_eq!(assignment.index_of("a"), 1);
        assert_eq!(assignment.len(), 2);
    }

    #[test]
    fn test_format_specifier() {
        assert_eq!(format_specifier(1), "%1$s");
        assert_eq!(format_specifier(12), "%12$s");
    }
}
