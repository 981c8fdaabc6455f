//! Per-test-case substitution filters applied to actual values before
//! comparison or acceptance.
//!
//! Filters mask non-deterministic output (addresses, timings, temp paths) so
//! expectations stay stable. Patterns are literal strings, applied together in
//! one leftmost-first pass, so an earlier substitution can never feed a later
//! one.

use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("cannot remap {pattern:?} to {replacement:?} (existing mapping is {existing:?})")]
    DuplicatePattern {
        pattern: String,
        replacement: String,
        existing: String,
    },

    #[error("failed to compile filter set: {0}")]
    Compile(#[from] regex::Error),
}

/// Ordered mapping from literal pattern to replacement for one test case.
#[derive(Debug, Default)]
pub struct Filters {
    /// Insertion order, used to build the alternation.
    patterns: Vec<String>,
    replacements: HashMap<String, String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Register a substitution. Registering the same pattern twice is a hard
    /// error at registration time: two rules for one pattern would mask
    /// output ambiguously and the mistake should surface immediately.
    pub fn insert(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<(), FilterError> {
        let pattern = pattern.into();
        let replacement = replacement.into();
        if let Some(existing) = self.replacements.get(&pattern) {
            return Err(FilterError::DuplicatePattern {
                pattern,
                replacement,
                existing: existing.clone(),
            });
        }
        self.patterns.push(pattern.clone());
        self.replacements.insert(pattern, replacement);
        Ok(())
    }

    /// Apply every registered substitution to `text`, each exactly once, in a
    /// single pass. Overlapping candidates resolve leftmost-first, with ties
    /// broken by registration order.
    pub fn apply(&self, text: &str) -> Result<String, FilterError> {
        if self.patterns.is_empty() {
            return Ok(text.to_string());
        }
        let alternation = self
            .patterns
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&alternation)?;
        Ok(re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                // Patterns are escaped literals, so the matched text is
                // exactly one registered pattern.
                self.replacements[&caps[0]].clone()
            })
            .into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_pass_text_through() {
        let filters = Filters::new();
        assert_eq!(filters.apply("unchanged").unwrap(), "unchanged");
    }

    #[test]
    fn single_substitution() {
        let mut filters = Filters::new();
        filters.insert("0x7f2a", "ADDR").unwrap();
        assert_eq!(filters.apply("ptr at 0x7f2a end").unwrap(), "ptr at ADDR end");
    }

    #[test]
    fn all_patterns_applied_in_one_pass() {
        let mut filters = Filters::new();
        filters.insert("a", "b").unwrap();
        filters.insert("b", "c").unwrap();
        // "a" becomes "b" but is not re-fed to the second rule
        assert_eq!(filters.apply("a b").unwrap(), "b c");
    }

    #[test]
    fn registration_order_breaks_ties() {
        let mut filters = Filters::new();
        filters.insert("abc", "FIRST").unwrap();
        filters.insert("ab", "SECOND").unwrap();
        assert_eq!(filters.apply("abcd").unwrap(), "FIRSTd");
    }

    #[test]
    fn patterns_are_literal_not_regex() {
        let mut filters = Filters::new();
        filters.insert("a.c", "X").unwrap();
        assert_eq!(filters.apply("abc a.c").unwrap(), "abc X");
    }

    #[test]
    fn duplicate_pattern_is_rejected() {
        let mut filters = Filters::new();
        filters.insert("p", "one").unwrap();
        let err = filters.insert("p", "two").unwrap_err();
        assert!(matches!(err, FilterError::DuplicatePattern { .. }));
    }
}
