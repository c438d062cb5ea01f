//! Storage strategies for rule strings.
//!
//! Every rule payload extracted from the input text goes through a
//! [`Materializer`] before it reaches a builder. The materializer decides who
//! owns the bytes:
//!
//! | Materializer | Stored as | Allocation | Borrows input |
//! |--------------|-----------|------------|---------------|
//! | [`Alias`] | `&'a str` | none | yes |
//! | [`Duplicate`] | `Box<str>` | one per string | no |
//! | [`Arena`] | [`ArenaStr`] | one per chunk | no |
//!
//! With [`Alias`] the resulting set is `DomainSet<&'a str>`, so the borrow
//! checker keeps the input buffer alive for as long as the set is used.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Range};

use bytes::{Bytes, BytesMut};

/// Default chunk size for [`Arena`]: 64 KiB
pub const DEFAULT_ARENA_CHUNK_SIZE: usize = 64 * 1024;

/// A stored rule string.
///
/// `Hash` and `Eq` must agree with `str`, so that sets of `Self` can be
/// queried with a plain `&str`.
pub trait RuleText:
    AsRef<str> + Borrow<str> + Hash + Eq + Clone + fmt::Debug + Send + Sync
{
    /// Sub-string of this text. `range` must lie on char boundaries.
    fn slice(&self, range: Range<usize>) -> Self;
}

impl<'a> RuleText for &'a str {
    fn slice(&self, range: Range<usize>) -> Self {
        let s: &'a str = *self;
        &s[range]
    }
}

impl RuleText for Box<str> {
    fn slice(&self, range: Range<usize>) -> Self {
        self[range].into()
    }
}

/// Turns a borrowed slice of the input into a stored rule string.
pub trait Materializer<'a> {
    type Text: RuleText + 'a;

    fn materialize(&mut self, s: &'a str) -> Self::Text;
}

/// Zero-copy materializer: stores references into the input text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alias;

impl<'a> Materializer<'a> for Alias {
    type Text = &'a str;

    #[inline]
    fn materialize(&mut self, s: &'a str) -> &'a str {
        s
    }
}

/// Copies every string into its own allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Duplicate;

impl<'a> Materializer<'a> for Duplicate {
    type Text = Box<str>;

    #[inline]
    fn materialize(&mut self, s: &'a str) -> Box<str> {
        s.into()
    }
}

/// Bulk materializer: copies strings into shared chunks.
///
/// Each string is appended to the current chunk and handed out as an
/// [`ArenaStr`] view. When a string does not fit in what is left of the
/// chunk, a fresh chunk is allocated and the old one is left to the views
/// that still reference it. Issued views are never invalidated.
#[derive(Debug)]
pub struct Arena {
    buf: BytesMut,
    chunk_size: usize,
    chunks: usize,
}

impl Arena {
    /// Create an arena with the default chunk size
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_ARENA_CHUNK_SIZE)
    }

    /// Create an arena that allocates chunks of at least `chunk_size` bytes
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            chunk_size: chunk_size.max(1),
            chunks: 0,
        }
    }

    /// Number of chunks allocated so far
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    fn alloc(&mut self, s: &str) -> ArenaStr {
        // After `split` the buffer is empty, so capacity is what remains of the chunk.
        if self.buf.capacity() < s.len() {
            self.buf = BytesMut::with_capacity(self.chunk_size.max(s.len()));
            self.chunks += 1;
        }
        self.buf.extend_from_slice(s.as_bytes());
        ArenaStr(self.buf.split().freeze())
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Materializer<'a> for Arena {
    type Text = ArenaStr;

    #[inline]
    fn materialize(&mut self, s: &'a str) -> ArenaStr {
        self.alloc(s)
    }
}

/// A string view into an [`Arena`] chunk.
///
/// Cloning and slicing share the chunk and never allocate.
#[derive(Clone)]
pub struct ArenaStr(Bytes);

impl ArenaStr {
    pub fn as_str(&self) -> &str {
        // The bytes were copied from a `&str` and `slice` only cuts on char
        // boundaries, so validation always succeeds.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl RuleText for ArenaStr {
    fn slice(&self, range: Range<usize>) -> Self {
        // Panics on a non-boundary range, same as slicing a str.
        let _ = &self.as_str()[range.clone()];
        ArenaStr(self.0.slice(range))
    }
}

impl Deref for ArenaStr {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for ArenaStr {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for ArenaStr {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for ArenaStr {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ArenaStr {}

impl Hash for ArenaStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Debug for ArenaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ArenaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
