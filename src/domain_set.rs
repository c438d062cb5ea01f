use std::borrow::Cow;

use crate::error::{DomainSetError, Result};
use crate::matcher::{DomainMatcher, Matcher};
use crate::options::BuildOptions;
use crate::parser::{format_capacity_hint, parse_rules};
use crate::text::{Alias, Arena, ArenaStr, Duplicate, RuleText};
use crate::types::{CapacityHint, RuleKind};

/// Immutable set of domain rules.
///
/// A domain matches the set if any of its matchers matches. Matchers are
/// consulted in the order chosen at build time and the first hit wins.
/// `matches` takes `&self` and never mutates, so a set can be shared
/// across threads (e.g. behind an `Arc`) without locking.
#[derive(Debug, Clone)]
pub struct DomainSet<S> {
    matchers: Vec<Matcher<S>>,
}

impl<S: RuleText> DomainSet<S> {
    pub(crate) fn new(matchers: Vec<Matcher<S>>) -> Self {
        Self { matchers }
    }

    /// Check whether `domain` matches any rule in the set
    #[inline]
    pub fn matches(&self, domain: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(domain))
    }

    /// Frozen matchers, in match order
    pub fn matchers(&self) -> &[Matcher<S>] {
        &self.matchers
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.iter().all(Matcher::is_empty)
    }

    /// Total number of rules held (suffixes counted after pruning)
    pub fn rule_count(&self) -> usize {
        self.matchers.iter().map(Matcher::len).sum()
    }

    /// Number of rules held for `kind`
    pub fn count(&self, kind: RuleKind) -> usize {
        self.matcher(kind).map_or(0, Matcher::len)
    }

    /// Rules held for `kind`.
    ///
    /// Hash-backed matchers return rules in no particular order.
    pub fn rules(&self, kind: RuleKind) -> Vec<Cow<'_, str>> {
        self.matcher(kind).map_or_else(Vec::new, Matcher::rules)
    }

    /// Per-kind rule counts, suitable for pre-sizing a rebuild
    pub fn capacity_hint(&self) -> CapacityHint {
        CapacityHint::new(
            self.count(RuleKind::Domain),
            self.count(RuleKind::Suffix),
            self.count(RuleKind::Keyword),
            self.count(RuleKind::Regexp),
        )
    }

    /// Render the set as rule text, led by a capacity hint line.
    ///
    /// Parsing the output of a non-empty set builds a set that matches the
    /// same domains. A rule containing `\n` or ending in `\r` has no line
    /// form and fails with [`DomainSetError::UnrepresentableRule`].
    pub fn to_text(&self) -> Result<String> {
        let mut out = format_capacity_hint(&self.capacity_hint());
        out.push('\n');
        for kind in RuleKind::ALL {
            for rule in self.rules(kind) {
                if rule.contains('\n') || rule.ends_with('\r') {
                    return Err(DomainSetError::UnrepresentableRule {
                        kind,
                        rule: rule.into_owned(),
                    });
                }
                out.push_str(kind.prefix());
                out.push_str(&rule);
                out.push('\n');
            }
        }
        Ok(out)
    }

    fn matcher(&self, kind: RuleKind) -> Option<&Matcher<S>> {
        self.matchers.iter().find(|m| m.kind() == kind)
    }
}

impl DomainSet<Box<str>> {
    /// Build an owned set from rule text, copying every rule.
    pub fn from_text(text: &str, options: &BuildOptions) -> Result<Self> {
        parse_rules(text, &mut Duplicate, options)?.freeze()
    }
}

impl DomainSet<ArenaStr> {
    /// Build an owned set from rule text, packing rules into shared chunks.
    pub fn from_text_arena(text: &str, options: &BuildOptions) -> Result<Self> {
        parse_rules(text, &mut Arena::new(), options)?.freeze()
    }
}

impl<'a> DomainSet<&'a str> {
    /// Build a set that borrows its rules from `text` without copying.
    pub fn from_text_borrowed(text: &'a str, options: &BuildOptions) -> Result<Self> {
        parse_rules(text, &mut Alias, options)?.freeze()
    }
}

impl<S: RuleText> DomainMatcher for DomainSet<S> {
    #[inline]
    fn matches(&self, domain: &str) -> bool {
        DomainSet::matches(self, domain)
    }
}
