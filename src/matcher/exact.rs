use std::collections::HashSet;

use super::DomainMatcher;
use crate::text::RuleText;

/// Exact domain rules in a Vec, scanned in insertion order.
#[derive(Debug, Clone)]
pub struct LinearExact<S> {
    domains: Vec<S>,
}

impl<S: RuleText> LinearExact<S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            domains: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, domain: S) {
        self.domains.push(domain);
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.as_ref())
    }
}

impl<S: RuleText> DomainMatcher for LinearExact<S> {
    fn matches(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d.as_ref() == domain)
    }
}

/// Exact domain rules in a HashSet (O(1) lookup).
#[derive(Debug, Clone)]
pub struct HashExact<S> {
    domains: HashSet<S>,
}

impl<S: RuleText> HashExact<S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            domains: HashSet::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, domain: S) {
        self.domains.insert(domain);
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.as_ref())
    }
}

impl<S: RuleText> DomainMatcher for HashExact<S> {
    #[inline]
    fn matches(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }
}
