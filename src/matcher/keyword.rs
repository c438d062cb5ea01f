use super::DomainMatcher;
use crate::text::RuleText;

/// Keyword rules: a domain matches if it contains any keyword as a substring.
///
/// Case-sensitive, no label boundaries. Keyword lists are short in practice,
/// so a linear scan in insertion order is enough.
#[derive(Debug, Clone)]
pub struct KeywordList<S> {
    keywords: Vec<S>,
}

impl<S: RuleText> KeywordList<S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keywords: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, keyword: S) {
        self.keywords.push(keyword);
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.as_ref())
    }
}

impl<S: RuleText> DomainMatcher for KeywordList<S> {
    fn matches(&self, domain: &str) -> bool {
        self.keywords.iter().any(|k| domain.contains(k.as_ref()))
    }
}
