use thiserror::Error;

use crate::types::RuleKind;

/// Classifies snapshot decoding errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotErrorKind {
    /// Data does not start with the snapshot magic
    InvalidMagic,
    /// Snapshot was written by an unknown format version
    UnsupportedVersion,
    /// Data ended in the middle of a record
    Truncated,
    /// Record content is invalid (varint overflow, oversized string, bad UTF-8, trailing bytes)
    InvalidData,
}

/// Domain set error types
#[derive(Error, Debug)]
pub enum DomainSetError {
    #[error("empty ruleset")]
    EmptyRuleset,

    #[error("malformed capacity hint: {0}")]
    MalformedHint(String),

    #[error("invalid line {line}: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("failed to compile regexp {pattern}: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("build conversion error: {0}")]
    BuildConversion(String),

    #[error("snapshot error: {message}")]
    Snapshot {
        kind: SnapshotErrorKind,
        message: String,
    },

    #[error("{kind:?} rule {rule:?} cannot be written as a text line")]
    UnrepresentableRule { kind: RuleKind, rule: String },

    #[error("rule text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("unknown domain set format: {0}")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DomainSetError {
    pub(crate) fn snapshot(kind: SnapshotErrorKind, message: impl Into<String>) -> Self {
        DomainSetError::Snapshot {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainSetError>;
