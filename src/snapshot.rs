//! Binary snapshot of a frozen domain set.
//!
//! Layout:
//!
//! ```text
//! magic "DSET" | version u8 | 4 sections (domain, suffix, keyword, regexp)
//! section = uvarint count, then count * (uvarint length, UTF-8 bytes)
//! ```
//!
//! Restoring skips text parsing. Strings are handed to the caller's
//! materializer, so restoring with [`Alias`](crate::text::Alias) borrows
//! them straight out of the snapshot bytes.

use std::io::Write;

use tracing::debug;

use crate::builder::Builder;
use crate::domain_set::DomainSet;
use crate::error::{DomainSetError, Result, SnapshotErrorKind};
use crate::options::BuildOptions;
use crate::text::{Materializer, RuleText};
use crate::types::{CapacityHint, RuleKind};

/// File magic
pub const MAGIC: &[u8; 4] = b"DSET";
/// Current format version
pub const VERSION: u8 = 1;

/// Maximum length of a single stored string (10 MB).
const MAX_VSTRING_LENGTH: usize = 10 * 1024 * 1024;

/// Encode a domain set into a new buffer.
pub fn serialize<S: RuleText>(set: &DomainSet<S>) -> Vec<u8> {
    let mut buf = Vec::new();
    encode(set, &mut buf);
    buf
}

/// Encode a domain set into `writer`.
pub fn write_to<S: RuleText, W: Write>(set: &DomainSet<S>, writer: &mut W) -> Result<()> {
    writer.write_all(&serialize(set))?;
    Ok(())
}

/// Restore a domain set from snapshot bytes.
///
/// The whole input is validated before any rule is inserted. Regexps are
/// recompiled. Matcher strategies come from `options`; its capacity hint
/// flag is ignored since exact counts are known up front.
pub fn deserialize<'a, M>(
    data: &'a [u8],
    materializer: &mut M,
    options: &BuildOptions,
) -> Result<DomainSet<M::Text>>
where
    M: Materializer<'a>,
{
    let mut reader = SliceReader::new(data);

    let magic = reader.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        return Err(DomainSetError::snapshot(
            SnapshotErrorKind::InvalidMagic,
            format!("expected {:?}, found {:?}", MAGIC, magic),
        ));
    }

    let version = reader.read_byte()?;
    if version != VERSION {
        return Err(DomainSetError::snapshot(
            SnapshotErrorKind::UnsupportedVersion,
            format!("version {} (supported: {})", version, VERSION),
        ));
    }

    let mut sections: [Vec<&'a str>; 4] = Default::default();
    for kind in RuleKind::ALL {
        let count = reader.read_count()?;
        let section = &mut sections[kind.index()];
        section.reserve(count);
        for _ in 0..count {
            section.push(reader.read_vstr()?);
        }
    }

    if reader.remaining() > 0 {
        return Err(DomainSetError::snapshot(
            SnapshotErrorKind::InvalidData,
            format!("{} trailing bytes", reader.remaining()),
        ));
    }

    let hint = CapacityHint::new(
        sections[RuleKind::Domain.index()].len(),
        sections[RuleKind::Suffix.index()].len(),
        sections[RuleKind::Keyword.index()].len(),
        sections[RuleKind::Regexp.index()].len(),
    );
    debug!(
        bytes = data.len(),
        domains = hint.domains,
        suffixes = hint.suffixes,
        keywords = hint.keywords,
        regexps = hint.regexps,
        "restoring snapshot"
    );

    let mut builder = Builder::with_capacity(options, hint);
    for kind in RuleKind::ALL {
        for &rule in &sections[kind.index()] {
            builder.insert(kind, materializer.materialize(rule))?;
        }
    }
    builder.freeze()
}

fn encode<S: RuleText>(set: &DomainSet<S>, buf: &mut Vec<u8>) {
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    for kind in RuleKind::ALL {
        let rules = set.rules(kind);
        write_uvarint(buf, rules.len() as u64);
        for rule in &rules {
            write_uvarint(buf, rule.len() as u64);
            buf.extend_from_slice(rule.as_bytes());
        }
    }
}

fn write_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Cursor over snapshot bytes that hands out borrowed strings.
struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(DomainSetError::snapshot(
                SnapshotErrorKind::Truncated,
                format!(
                    "need {} bytes at offset {}, {} left",
                    len,
                    self.pos,
                    self.remaining()
                ),
            ));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_uvarint(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;

        loop {
            let byte = self.read_byte()?;
            if shift == 63 && byte > 1 {
                return Err(DomainSetError::snapshot(
                    SnapshotErrorKind::InvalidData,
                    "varint overflow",
                ));
            }
            result |= ((byte & 0x7f) as u64) << shift;

            if byte & 0x80 == 0 {
                break;
            }

            shift += 7;
            if shift >= 64 {
                return Err(DomainSetError::snapshot(
                    SnapshotErrorKind::InvalidData,
                    "varint overflow",
                ));
            }
        }

        Ok(result)
    }

    /// Read a section count. Every entry takes at least one byte, so a
    /// count larger than what is left cannot be satisfied.
    fn read_count(&mut self) -> Result<usize> {
        let count = self.read_uvarint()?;
        match usize::try_from(count) {
            Ok(count) if count <= self.remaining() => Ok(count),
            _ => Err(DomainSetError::snapshot(
                SnapshotErrorKind::Truncated,
                format!("{} entries announced, {} bytes left", count, self.remaining()),
            )),
        }
    }

    fn read_vstr(&mut self) -> Result<&'a str> {
        let length = self.read_uvarint()?;
        let length = match usize::try_from(length) {
            Ok(length) if length <= MAX_VSTRING_LENGTH => length,
            _ => {
                return Err(DomainSetError::snapshot(
                    SnapshotErrorKind::InvalidData,
                    format!(
                        "string length {} exceeds limit of {} bytes",
                        length, MAX_VSTRING_LENGTH
                    ),
                ))
            }
        };
        let bytes = self.read_bytes(length)?;
        std::str::from_utf8(bytes).map_err(|e| {
            DomainSetError::snapshot(
                SnapshotErrorKind::InvalidData,
                format!("invalid UTF-8 string: {}", e),
            )
        })
    }
}
