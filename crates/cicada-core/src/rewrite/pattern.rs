//! Single-wildcard patterns used by alias keys, alias candidates and
//! vendor export maps.

use crate::error::{Error, Result};
use std::fmt;

/// The wildcard glyph.
pub const WILDCARD: char = '*';

/// Result of a successful [`Pattern::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternMatch {
    /// The pattern has no wildcard and matched exactly.
    Exact,
    /// The pattern has a wildcard; holds the text it stood for.
    Captured(String),
}

/// A pattern with at most one `*`.
///
/// `right` is present iff the source string contained a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    left: String,
    right: Option<String>,
}

impl Pattern {
    /// Parse a pattern string.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the string has two or more wildcards.
    pub fn parse(source: &str) -> Result<Self> {
        match source.split_once(WILDCARD) {
            Some((left, right)) => {
                if right.contains(WILDCARD) {
                    return Err(Error::configuration(format!(
                        "A pattern can have at most one wildcard '{WILDCARD}': {source}"
                    )));
                }
                Ok(Self {
                    left: left.to_string(),
                    right: Some(right.to_string()),
                })
            }
            None => Ok(Self {
                left: source.to_string(),
                right: None,
            }),
        }
    }

    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.right.is_some()
    }

    /// Replace the wildcard with `value`. Patterns without one ignore `value`.
    #[must_use]
    pub fn substitute(&self, value: &str) -> String {
        match &self.right {
            Some(right) => format!("{}{value}{right}", self.left),
            None => self.left.clone(),
        }
    }

    /// Match `candidate` against the pattern.
    ///
    /// A wildcard pattern matches when `candidate` starts with the left part
    /// and ends with the right part without the two overlapping.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> Option<PatternMatch> {
        match &self.right {
            None => (candidate == self.left).then_some(PatternMatch::Exact),
            Some(right) => {
                if candidate.len() < self.left.len() + right.len() {
                    return None;
                }
                let middle = candidate
                    .strip_prefix(self.left.as_str())?
                    .strip_suffix(right.as_str())?;
                Some(PatternMatch::Captured(middle.to_string()))
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Some(right) => write!(f, "{}{WILDCARD}{right}", self.left),
            None => f.write_str(&self.left),
        }
    }
}

impl std::str::FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern_matches_only_itself() {
        let pat = Pattern::parse("package.json").unwrap();
        assert!(!pat.has_wildcard());
        assert_eq!(pat.matches("package.json"), Some(PatternMatch::Exact));
        assert_eq!(pat.matches("package.json5"), None);
        assert_eq!(pat.matches("package"), None);
    }

    #[test]
    fn test_exact_pattern_substitute_ignores_value() {
        let pat = Pattern::parse("lib/index.js").unwrap();
        assert_eq!(pat.substitute("x"), "lib/index.js");
        assert_eq!(pat.substitute(""), "lib/index.js");
    }

    #[test]
    fn test_wildcard_capture() {
        let pat = Pattern::parse("@lib/*.js").unwrap();
        assert!(pat.has_wildcard());
        assert_eq!(
            pat.matches("@lib/util/strings.js"),
            Some(PatternMatch::Captured("util/strings".to_string()))
        );
        assert_eq!(pat.matches("@lib/util.ts"), None);
        assert_eq!(pat.matches("lib/util.js"), None);
    }

    #[test]
    fn test_wildcard_empty_capture() {
        let pat = Pattern::parse("@lib/*").unwrap();
        assert_eq!(
            pat.matches("@lib/"),
            Some(PatternMatch::Captured(String::new()))
        );
    }

    #[test]
    fn test_overlapping_left_and_right_do_not_match() {
        let pat = Pattern::parse("ab*ba").unwrap();
        assert_eq!(pat.matches("aba"), None);
        assert_eq!(
            pat.matches("abba"),
            Some(PatternMatch::Captured(String::new()))
        );
    }

    #[test]
    fn test_round_trip_through_substitute() {
        let pat = Pattern::parse("vendor/*/index.js").unwrap();
        for value in ["a", "deep/path", "", "with-dash"] {
            let rendered = pat.substitute(value);
            let Some(PatternMatch::Captured(captured)) = pat.matches(&rendered) else {
                panic!("expected capture for {rendered}");
            };
            assert_eq!(captured, value);
            assert_eq!(pat.substitute(&captured), rendered);
        }
    }

    #[test]
    fn test_two_wildcards_rejected() {
        let err = Pattern::parse("a/*/b/*").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(Pattern::parse("**").is_err());
    }

    #[test]
    fn test_display_renders_wildcard() {
        assert_eq!(Pattern::parse("x/*.js").unwrap().to_string(), "x/*.js");
        assert_eq!(Pattern::parse("x/y").unwrap().to_string(), "x/y");
    }
}
