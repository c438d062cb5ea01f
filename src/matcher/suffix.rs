use std::collections::HashSet;

use super::DomainMatcher;
use crate::text::RuleText;

/// Boundary-aware suffix match.
///
/// `domain` matches `suffix` if they are equal, or if `domain` ends with
/// `"." + suffix`. Plain string suffixes do not count: `notcube.com` does not
/// match `cube.com`.
#[inline]
pub fn match_domain_suffix(domain: &str, suffix: &str) -> bool {
    domain == suffix
        || domain.len() > suffix.len()
            && domain.as_bytes()[domain.len() - suffix.len() - 1] == b'.'
            && domain.ends_with(suffix)
}

/// Suffix rules in a Vec, each tested against the domain in insertion order.
#[derive(Debug, Clone)]
pub struct LinearSuffix<S> {
    suffixes: Vec<S>,
}

impl<S: RuleText> LinearSuffix<S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            suffixes: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, suffix: S) {
        self.suffixes.push(suffix);
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(|s| s.as_ref())
    }
}

impl<S: RuleText> DomainMatcher for LinearSuffix<S> {
    fn matches(&self, domain: &str) -> bool {
        self.suffixes
            .iter()
            .any(|suffix| match_domain_suffix(domain, suffix.as_ref()))
    }
}

/// Suffix rules in a single HashSet.
///
/// Lookup walks the domain from right to left and probes the set with the
/// text after every dot, shortest candidate first, then with the whole
/// domain. One lookup per label.
#[derive(Debug, Clone)]
pub struct HashSuffix<S> {
    suffixes: HashSet<S>,
}

impl<S: RuleText> HashSuffix<S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            suffixes: HashSet::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, suffix: S) {
        self.suffixes.insert(suffix);
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(|s| s.as_ref())
    }
}

impl<S: RuleText> DomainMatcher for HashSuffix<S> {
    fn matches(&self, domain: &str) -> bool {
        let bytes = domain.as_bytes();
        for i in (0..bytes.len()).rev() {
            if bytes[i] == b'.' && self.suffixes.contains(&domain[i + 1..]) {
                return true;
            }
        }
        self.suffixes.contains(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_domain_suffix() {
        assert!(match_domain_suffix("cube.com", "cube.com"));
        assert!(match_domain_suffix("www.cube.com", "cube.com"));
        assert!(match_domain_suffix("a.b.cube.com", "cube.com"));
        assert!(!match_domain_suffix("notcube.com", "cube.com"));
        assert!(!match_domain_suffix("xcube.com", "cube.com"));
        assert!(!match_domain_suffix("cube.com", "www.cube.com"));
        assert!(!match_domain_suffix("com", "cube.com"));
        assert!(!match_domain_suffix("cube.com.cn", "cube.com"));
        assert!(!match_domain_suffix("", "com"));
    }

    #[test]
    fn test_match_domain_suffix_dot_edge_cases() {
        // The character before the tail must be a dot, wherever the tail starts.
        assert!(match_domain_suffix(".com", "com"));
        assert!(match_domain_suffix("x.", ""));
        assert!(match_domain_suffix("", ""));
        assert!(!match_domain_suffix("x", ""));
    }

    fn check(matcher: &dyn DomainMatcher) {
        assert!(matcher.matches("example.com"));
        assert!(matcher.matches("www.example.com"));
        assert!(!matcher.matches("gobyexample.com"));
        assert!(!matcher.matches("example.org"));
        assert!(!matcher.matches("com"));
        assert!(matcher.matches("github.com"));
        assert!(matcher.matches("api.github.com"));
        assert!(!matcher.matches("raw.githubusercontent.com"));
        assert!(!matcher.matches("github.blog"));
        assert!(matcher.matches("api.ipify.org"));
        assert!(!matcher.matches("ipify.org"));
        assert!(!matcher.matches("api64.ipify.org"));
        assert!(!matcher.matches(""));
    }

    #[test]
    fn test_linear_suffix() {
        let mut m = LinearSuffix::with_capacity(3);
        m.insert("example.com");
        m.insert("github.com");
        m.insert("api.ipify.org");
        assert_eq!(m.len(), 3);
        check(&m);
    }

    #[test]
    fn test_hash_suffix() {
        let mut m = HashSuffix::with_capacity(3);
        m.insert("example.com");
        m.insert("github.com");
        m.insert("api.ipify.org");
        assert_eq!(m.len(), 3);
        check(&m);
    }

    #[test]
    fn test_hash_suffix_single_label_rule() {
        let mut m = HashSuffix::with_capacity(1);
        m.insert("com");
        assert!(m.matches("com"));
        assert!(m.matches("example.com"));
        assert!(!m.matches("example.net"));
        assert!(!m.matches("xcom"));
    }
}
