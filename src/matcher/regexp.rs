use regex::Regex;

use super::DomainMatcher;
use crate::error::{DomainSetError, Result};

/// Regexp rules, compiled once at insert time.
///
/// Matching is an unanchored search: a pattern matches if it is found
/// anywhere in the domain, unless the pattern anchors itself.
#[derive(Debug, Clone)]
pub struct RegexpList {
    regexps: Vec<Regex>,
}

impl RegexpList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            regexps: Vec::with_capacity(capacity),
        }
    }

    /// Compile and add a pattern.
    pub fn insert(&mut self, pattern: &str) -> Result<()> {
        let regexp = Regex::new(pattern).map_err(|source| DomainSetError::PatternCompile {
            pattern: pattern.to_string(),
            source,
        })?;
        self.regexps.push(regexp);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.regexps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regexps.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.regexps.iter().map(|r| r.as_str())
    }
}

impl DomainMatcher for RegexpList {
    fn matches(&self, domain: &str) -> bool {
        self.regexps.iter().any(|r| r.is_match(domain))
    }
}
