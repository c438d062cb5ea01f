//! Domain Set - a domain name classification engine for Rust
//!
//! This library answers "does this domain belong to the set?" against a
//! list of rules, with support for:
//! - Exact domain matching
//! - Suffix matching on label boundaries (trie with pruning, hash or linear)
//! - Keyword (substring) matching
//! - Regular expression matching
//! - Capacity hints for pre-sizing containers
//! - Zero-copy, per-string or arena string storage
//! - Binary snapshots that restore without re-parsing
//!
//! # Example
//!
//! ```rust
//! use domainset::{BuildOptions, DomainSet};
//!
//! let rules_text = "\
//! ## domainset capacity hint 1 2 1 1 DSKR
//! domain:www.example.net
//! suffix:example.com
//! suffix:github.com
//! keyword:dev
//! regexp:^adservice\\.google\\.([a-z]{2}|com?)(\\.[a-z]{2})?$
//! ";
//!
//! // Build an owned set
//! let set = DomainSet::from_text(rules_text, &BuildOptions::default()).unwrap();
//!
//! assert!(set.matches("www.example.net"));
//! assert!(!set.matches("example.net"));
//! assert!(set.matches("api.github.com"));
//! assert!(!set.matches("gobyexample.com"));
//! assert!(set.matches("go.dev"));
//! assert!(set.matches("adservice.google.co.uk"));
//! ```
//!
//! # Rule Syntax
//!
//! One rule per line; empty lines and lines starting with `#` are ignored.
//!
//! | Tag | Example | Description |
//! |-----|---------|-------------|
//! | `domain:` | `domain:example.com` | Exact domain match |
//! | `suffix:` | `suffix:example.com` | Domain and all subdomains |
//! | `keyword:` | `keyword:dev` | Domain contains the text |
//! | `regexp:` | `regexp:^ad[0-9]+\.` | Regular expression search |
//!
//! ## Capacity Hint
//!
//! The first non-empty line may be
//! `# domainset capacity hint <domains> <suffixes> <keywords> <regexps> DSKR`.
//! It only pre-sizes containers and never changes what matches.

pub mod builder;
pub mod domain_set;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod options;
pub mod parser;
pub mod snapshot;
pub mod text;
pub mod types;

// Re-export commonly used items
pub use builder::Builder;
pub use domain_set::DomainSet;
pub use error::{DomainSetError, Result, SnapshotErrorKind};
pub use matcher::{match_domain_suffix, DomainMatcher, Matcher, MatcherBuilder};
pub use options::{BuildOptions, ExactStrategy, SuffixStrategy, Traversal};
pub use parser::{format_capacity_hint, parse_capacity_hint, parse_rules};
pub use text::{Alias, Arena, ArenaStr, Duplicate, Materializer, RuleText};
pub use types::{CapacityHint, RuleKind};

// Re-export loader types
#[cfg(feature = "async")]
pub use loader::load_file_async;
pub use loader::{load_file, DomainSetConfig, DomainSetFormat};
