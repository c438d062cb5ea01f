use tracing::debug;

use crate::domain_set::DomainSet;
use crate::error::{DomainSetError, Result};
use crate::matcher::MatcherBuilder;
use crate::options::BuildOptions;
use crate::text::RuleText;
use crate::types::{CapacityHint, RuleKind};

/// Largest per-kind pre-size taken from a hint. Bigger sets grow on insert.
pub const MAX_PRESIZE: usize = 1 << 20;

/// Mutable rule accumulator, one matcher builder per rule kind.
///
/// Filled by [`parse_rules`](crate::parser::parse_rules) or by calling
/// [`insert`](Self::insert) directly, then turned into an immutable
/// [`DomainSet`] with [`freeze`](Self::freeze).
#[derive(Debug, Clone)]
pub struct Builder<S> {
    builders: [MatcherBuilder<S>; 4],
    options: BuildOptions,
}

impl<S: RuleText> Builder<S> {
    pub fn new(options: &BuildOptions) -> Self {
        Self::with_capacity(options, CapacityHint::default())
    }

    /// Create a builder whose per-kind containers are pre-sized from `hint`.
    ///
    /// Counts above [`MAX_PRESIZE`] are reduced to it, so an oversized hint
    /// costs at most a bounded allocation.
    pub fn with_capacity(options: &BuildOptions, hint: CapacityHint) -> Self {
        let hint = hint.cap(MAX_PRESIZE);
        Self {
            builders: RuleKind::ALL.map(|kind| MatcherBuilder::new(kind, options, hint.get(kind))),
            options: options.clone(),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Add a rule of the given kind.
    ///
    /// Regexp rules are compiled here; a pattern that fails to compile
    /// is returned as [`DomainSetError::PatternCompile`].
    pub fn insert(&mut self, kind: RuleKind, rule: S) -> Result<()> {
        self.builders[kind.index()].insert(rule)
    }

    /// Number of rules accepted for `kind`
    pub fn count(&self, kind: RuleKind) -> usize {
        self.builders[kind.index()].len()
    }

    /// Total number of rules accepted
    pub fn len(&self) -> usize {
        self.builders.iter().map(MatcherBuilder::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.iter().all(MatcherBuilder::is_empty)
    }

    /// Convert into an immutable [`DomainSet`].
    ///
    /// Matchers are arranged in `options.match_order`. Kinds with no rules
    /// contribute nothing. Fails with [`DomainSetError::BuildConversion`] if
    /// the match order repeats a kind or a suffix trie cannot be compacted.
    pub fn freeze(self) -> Result<DomainSet<S>> {
        let Builder { builders, options } = self;

        debug!(
            domains = builders[RuleKind::Domain.index()].len(),
            suffixes = builders[RuleKind::Suffix.index()].len(),
            keywords = builders[RuleKind::Keyword.index()].len(),
            regexps = builders[RuleKind::Regexp.index()].len(),
            exact = ?options.exact,
            suffix = ?options.suffix,
            traversal = ?options.traversal,
            "freezing domain set"
        );

        let mut slots = builders.map(Some);
        let mut matchers = Vec::with_capacity(slots.len());

        for kind in options.match_order {
            let builder = slots[kind.index()].take().ok_or_else(|| {
                DomainSetError::BuildConversion(format!(
                    "match order lists {:?} more than once",
                    kind
                ))
            })?;
            if builder.is_empty() {
                continue;
            }
            matchers.push(builder.finalize()?);
        }

        Ok(DomainSet::new(matchers))
    }
}
