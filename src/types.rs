use serde::Deserialize;

/// Rule tag for exact domain rules
pub const DOMAIN_PREFIX: &str = "domain:";
/// Rule tag for hierarchical suffix rules
pub const SUFFIX_PREFIX: &str = "suffix:";
/// Rule tag for substring keyword rules
pub const KEYWORD_PREFIX: &str = "keyword:";
/// Rule tag for regular expression rules
pub const REGEXP_PREFIX: &str = "regexp:";

/// Kind of a domain rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Exact match: "example.com" matches only "example.com"
    Domain,
    /// Suffix match: "example.com" matches "example.com" and "foo.example.com"
    Suffix,
    /// Keyword match: "dev" matches any domain containing "dev"
    Keyword,
    /// Regexp match: unanchored search over the domain
    Regexp,
}

impl RuleKind {
    /// All kinds, in canonical order
    pub const ALL: [RuleKind; 4] = [
        RuleKind::Domain,
        RuleKind::Suffix,
        RuleKind::Keyword,
        RuleKind::Regexp,
    ];

    /// Text tag that introduces a rule of this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            RuleKind::Domain => DOMAIN_PREFIX,
            RuleKind::Suffix => SUFFIX_PREFIX,
            RuleKind::Keyword => KEYWORD_PREFIX,
            RuleKind::Regexp => REGEXP_PREFIX,
        }
    }

    /// Position of this kind in [`RuleKind::ALL`]
    pub fn index(&self) -> usize {
        match self {
            RuleKind::Domain => 0,
            RuleKind::Suffix => 1,
            RuleKind::Keyword => 2,
            RuleKind::Regexp => 3,
        }
    }

    /// Split a rule line into its kind and payload.
    ///
    /// Tags are case-sensitive and the payload is returned as-is.
    pub fn split_line(line: &str) -> Option<(RuleKind, &str)> {
        RuleKind::ALL
            .iter()
            .find_map(|kind| line.strip_prefix(kind.prefix()).map(|rest| (*kind, rest)))
    }
}

/// Expected number of rules per kind, used to pre-size containers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityHint {
    pub domains: usize,
    pub suffixes: usize,
    pub keywords: usize,
    pub regexps: usize,
}

impl CapacityHint {
    /// Create a hint from the four counts in canonical order
    pub fn new(domains: usize, suffixes: usize, keywords: usize, regexps: usize) -> Self {
        Self {
            domains,
            suffixes,
            keywords,
            regexps,
        }
    }

    /// Expected count for a single kind
    pub fn get(&self, kind: RuleKind) -> usize {
        match kind {
            RuleKind::Domain => self.domains,
            RuleKind::Suffix => self.suffixes,
            RuleKind::Keyword => self.keywords,
            RuleKind::Regexp => self.regexps,
        }
    }

    /// Limit each count to the most rules of that kind `text_len` bytes
    /// can hold, one tag per rule at least.
    pub fn fit_text(&self, text_len: usize) -> Self {
        let fit = |kind: RuleKind| self.get(kind).min(text_len / kind.prefix().len());
        Self::new(
            fit(RuleKind::Domain),
            fit(RuleKind::Suffix),
            fit(RuleKind::Keyword),
            fit(RuleKind::Regexp),
        )
    }

    /// Limit each count to `max`
    pub fn cap(&self, max: usize) -> Self {
        Self::new(
            self.domains.min(max),
            self.suffixes.min(max),
            self.keywords.min(max),
            self.regexps.min(max),
        )
    }
}
