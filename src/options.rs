//! Build options.
//!
//! Selects the backing strategy of each matcher. All strategies answer the
//! same queries identically; they only trade build cost against query cost.

use serde::Deserialize;

use crate::types::RuleKind;

/// Backing form for exact domain rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactStrategy {
    /// Vec with linear scan: cheapest to build, O(n) lookup
    Linear,
    /// HashSet: O(1) average lookup
    #[default]
    Hash,
}

/// Backing form for suffix rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixStrategy {
    /// Vec with linear scan, in insertion order
    Linear,
    /// HashSet probed once per label boundary of the domain
    Hash,
    /// Label trie with pruning of redundant suffixes
    #[default]
    Trie,
}

/// Traversal used by the suffix trie for insertion and lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    #[default]
    Iterative,
    Recursive,
}

/// Options for building a domain set
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Strategy for exact domain rules
    pub exact: ExactStrategy,
    /// Strategy for suffix rules
    pub suffix: SuffixStrategy,
    /// Trie traversal (only used by [`SuffixStrategy::Trie`])
    pub traversal: Traversal,
    /// Honour the capacity hint line at the top of rule text
    pub capacity_hint: bool,
    /// Order in which matchers are consulted at match time
    pub match_order: [RuleKind; 4],
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            exact: ExactStrategy::default(),
            suffix: SuffixStrategy::default(),
            traversal: Traversal::default(),
            capacity_hint: true,
            match_order: RuleKind::ALL,
        }
    }
}

impl BuildOptions {
    /// Create default build options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set exact domain strategy.
    pub fn with_exact(mut self, strategy: ExactStrategy) -> Self {
        self.exact = strategy;
        self
    }

    /// Set suffix strategy.
    pub fn with_suffix(mut self, strategy: SuffixStrategy) -> Self {
        self.suffix = strategy;
        self
    }

    /// Set trie traversal.
    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    /// Enable or disable the capacity hint.
    pub fn with_capacity_hint(mut self, enabled: bool) -> Self {
        self.capacity_hint = enabled;
        self
    }

    /// Set the order in which matchers are consulted.
    ///
    /// Put the kind most likely to match first to shorten positive lookups.
    pub fn with_match_order(mut self, order: [RuleKind; 4]) -> Self {
        self.match_order = order;
        self
    }
}
