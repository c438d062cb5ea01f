pub mod exact;
pub mod keyword;
pub mod regexp;
pub mod suffix;
pub mod trie;

use std::borrow::Cow;

pub use exact::{HashExact, LinearExact};
pub use keyword::KeywordList;
pub use regexp::RegexpList;
pub use suffix::{match_domain_suffix, HashSuffix, LinearSuffix};
pub use trie::{DomainSuffixTrie, FrozenSuffixTrie};

use crate::error::Result;
use crate::options::{BuildOptions, ExactStrategy, SuffixStrategy};
use crate::text::RuleText;
use crate::types::RuleKind;

/// Trait for domain matchers
pub trait DomainMatcher: Send + Sync {
    /// Check if the domain matches this matcher
    fn matches(&self, domain: &str) -> bool;
}

/// Mutable accumulator for the rules of one kind.
#[derive(Debug, Clone)]
pub enum MatcherBuilder<S> {
    LinearExact(LinearExact<S>),
    HashExact(HashExact<S>),
    LinearSuffix(LinearSuffix<S>),
    HashSuffix(HashSuffix<S>),
    SuffixTrie(DomainSuffixTrie<S>),
    Keyword(KeywordList<S>),
    Regexp(RegexpList),
}

impl<S: RuleText> MatcherBuilder<S> {
    /// Create the builder `options` selects for `kind`, pre-sized to `capacity`.
    pub fn new(kind: RuleKind, options: &BuildOptions, capacity: usize) -> Self {
        match kind {
            RuleKind::Domain => match options.exact {
                ExactStrategy::Linear => {
                    MatcherBuilder::LinearExact(LinearExact::with_capacity(capacity))
                }
                ExactStrategy::Hash => MatcherBuilder::HashExact(HashExact::with_capacity(capacity)),
            },
            RuleKind::Suffix => match options.suffix {
                SuffixStrategy::Linear => {
                    MatcherBuilder::LinearSuffix(LinearSuffix::with_capacity(capacity))
                }
                SuffixStrategy::Hash => {
                    MatcherBuilder::HashSuffix(HashSuffix::with_capacity(capacity))
                }
                SuffixStrategy::Trie => MatcherBuilder::SuffixTrie(DomainSuffixTrie::new(
                    options.traversal,
                    capacity,
                )),
            },
            RuleKind::Keyword => MatcherBuilder::Keyword(KeywordList::with_capacity(capacity)),
            RuleKind::Regexp => MatcherBuilder::Regexp(RegexpList::with_capacity(capacity)),
        }
    }

    /// Rule kind this builder accepts
    pub fn kind(&self) -> RuleKind {
        match self {
            MatcherBuilder::LinearExact(_) | MatcherBuilder::HashExact(_) => RuleKind::Domain,
            MatcherBuilder::LinearSuffix(_)
            | MatcherBuilder::HashSuffix(_)
            | MatcherBuilder::SuffixTrie(_) => RuleKind::Suffix,
            MatcherBuilder::Keyword(_) => RuleKind::Keyword,
            MatcherBuilder::Regexp(_) => RuleKind::Regexp,
        }
    }

    /// Add one rule. Only regexp rules can fail.
    pub fn insert(&mut self, rule: S) -> Result<()> {
        match self {
            MatcherBuilder::LinearExact(b) => b.insert(rule),
            MatcherBuilder::HashExact(b) => b.insert(rule),
            MatcherBuilder::LinearSuffix(b) => b.insert(rule),
            MatcherBuilder::HashSuffix(b) => b.insert(rule),
            MatcherBuilder::SuffixTrie(b) => b.insert(rule),
            MatcherBuilder::Keyword(b) => b.insert(rule),
            MatcherBuilder::Regexp(b) => b.insert(rule.as_ref())?,
        }
        Ok(())
    }

    /// Number of rules accepted so far
    pub fn len(&self) -> usize {
        match self {
            MatcherBuilder::LinearExact(b) => b.len(),
            MatcherBuilder::HashExact(b) => b.len(),
            MatcherBuilder::LinearSuffix(b) => b.len(),
            MatcherBuilder::HashSuffix(b) => b.len(),
            MatcherBuilder::SuffixTrie(b) => b.len(),
            MatcherBuilder::Keyword(b) => b.len(),
            MatcherBuilder::Regexp(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a frozen matcher.
    ///
    /// Linear and hash builders are adopted as-is. The suffix trie is
    /// compacted, which fails if the trie is in an invalid state.
    pub fn finalize(self) -> Result<Matcher<S>> {
        Ok(match self {
            MatcherBuilder::LinearExact(b) => Matcher::LinearExact(b),
            MatcherBuilder::HashExact(b) => Matcher::HashExact(b),
            MatcherBuilder::LinearSuffix(b) => Matcher::LinearSuffix(b),
            MatcherBuilder::HashSuffix(b) => Matcher::HashSuffix(b),
            MatcherBuilder::SuffixTrie(b) => Matcher::SuffixTrie(b.finalize()?),
            MatcherBuilder::Keyword(b) => Matcher::Keyword(b),
            MatcherBuilder::Regexp(b) => Matcher::Regexp(b),
        })
    }
}

/// Enum wrapper for all frozen matcher types
#[derive(Debug, Clone)]
pub enum Matcher<S> {
    LinearExact(LinearExact<S>),
    HashExact(HashExact<S>),
    LinearSuffix(LinearSuffix<S>),
    HashSuffix(HashSuffix<S>),
    SuffixTrie(FrozenSuffixTrie<S>),
    Keyword(KeywordList<S>),
    Regexp(RegexpList),
}

impl<S: RuleText> Matcher<S> {
    /// Rule kind this matcher answers for
    pub fn kind(&self) -> RuleKind {
        match self {
            Matcher::LinearExact(_) | Matcher::HashExact(_) => RuleKind::Domain,
            Matcher::LinearSuffix(_) | Matcher::HashSuffix(_) | Matcher::SuffixTrie(_) => {
                RuleKind::Suffix
            }
            Matcher::Keyword(_) => RuleKind::Keyword,
            Matcher::Regexp(_) => RuleKind::Regexp,
        }
    }

    /// Number of rules held. For the trie this is the count after pruning.
    pub fn len(&self) -> usize {
        match self {
            Matcher::LinearExact(m) => m.len(),
            Matcher::HashExact(m) => m.len(),
            Matcher::LinearSuffix(m) => m.len(),
            Matcher::HashSuffix(m) => m.len(),
            Matcher::SuffixTrie(m) => m.len(),
            Matcher::Keyword(m) => m.len(),
            Matcher::Regexp(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate the rules this matcher holds.
    ///
    /// Hash-backed matchers yield rules in no particular order. The trie
    /// yields its pruned suffix set, which matches the same domains.
    pub fn rules(&self) -> Vec<Cow<'_, str>> {
        match self {
            Matcher::LinearExact(m) => m.rules().map(Cow::Borrowed).collect(),
            Matcher::HashExact(m) => m.rules().map(Cow::Borrowed).collect(),
            Matcher::LinearSuffix(m) => m.rules().map(Cow::Borrowed).collect(),
            Matcher::HashSuffix(m) => m.rules().map(Cow::Borrowed).collect(),
            Matcher::SuffixTrie(m) => m.rules().into_iter().map(Cow::Owned).collect(),
            Matcher::Keyword(m) => m.rules().map(Cow::Borrowed).collect(),
            Matcher::Regexp(m) => m.rules().map(Cow::Borrowed).collect(),
        }
    }
}

impl<S: RuleText> DomainMatcher for Matcher<S> {
    #[inline]
    fn matches(&self, domain: &str) -> bool {
        match self {
            Matcher::LinearExact(m) => m.matches(domain),
            Matcher::HashExact(m) => m.matches(domain),
            Matcher::LinearSuffix(m) => m.matches(domain),
            Matcher::HashSuffix(m) => m.matches(domain),
            Matcher::SuffixTrie(m) => m.matches(domain),
            Matcher::Keyword(m) => m.matches(domain),
            Matcher::Regexp(m) => m.matches(domain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Traversal;

    #[test]
    fn test_factory_selects_strategy() {
        let options = BuildOptions::new()
            .with_exact(ExactStrategy::Linear)
            .with_suffix(SuffixStrategy::Hash);
        let b: MatcherBuilder<&str> = MatcherBuilder::new(RuleKind::Domain, &options, 0);
        assert!(matches!(b, MatcherBuilder::LinearExact(_)));
        let b: MatcherBuilder<&str> = MatcherBuilder::new(RuleKind::Suffix, &options, 0);
        assert!(matches!(b, MatcherBuilder::HashSuffix(_)));

        let options = BuildOptions::new().with_traversal(Traversal::Recursive);
        let b: MatcherBuilder<&str> = MatcherBuilder::new(RuleKind::Suffix, &options, 0);
        match b {
            MatcherBuilder::SuffixTrie(t) => assert_eq!(t.traversal(), Traversal::Recursive),
            other => panic!("expected trie, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_kind_and_len() {
        let options = BuildOptions::default();
        for kind in RuleKind::ALL {
            let mut b: MatcherBuilder<&str> = MatcherBuilder::new(kind, &options, 4);
            assert_eq!(b.kind(), kind);
            assert!(b.is_empty());
            b.insert("example").unwrap();
            assert_eq!(b.len(), 1);
            let m = b.finalize().unwrap();
            assert_eq!(m.kind(), kind);
            assert!(m.matches("example"));
        }
    }

    #[test]
    fn test_regexp_builder_propagates_compile_error() {
        let mut b: MatcherBuilder<&str> =
            MatcherBuilder::new(RuleKind::Regexp, &BuildOptions::default(), 0);
        assert!(b.insert("[").is_err());
        assert!(b.is_empty());
    }

    #[test]
    fn test_trie_rules_are_pruned() {
        let mut b: MatcherBuilder<&str> =
            MatcherBuilder::new(RuleKind::Suffix, &BuildOptions::default(), 0);
        b.insert("a.example.com").unwrap();
        b.insert("example.com").unwrap();
        let m = b.finalize().unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.rules(), vec![Cow::<str>::Owned("example.com".to_string())]);
    }
}
