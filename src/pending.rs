//! Pending region: bytes received since the last delimiter match.
//!
//! Two interchangeable representations are provided:
//!
//! - [`LazyPending`] keeps incoming fragments in a list and concatenates
//!   them with a single copy only when a line is cut. Chunks without a
//!   delimiter cost one copy each, regardless of how many arrive.
//! - [`EagerPending`] keeps one flat buffer and appends every chunk to it.
//!   Simpler, but cutting a line out of the front shifts the remainder.
//!
//! Both uphold the same invariant: after `ingest` returns, the stored
//! region contains no full delimiter match.

use crate::config::PendingStrategy;
use crate::delimiter::Delimiter;
use crate::error::Result;

/// Fragment list with deferred concatenation.
#[derive(Debug, Default)]
pub struct LazyPending {
    fragments: Vec<Vec<u8>>,
    len: usize,
}

impl LazyPending {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `chunk` against the pending fragments, emitting every completed
    /// line in order. Returns the number of lines emitted.
    pub fn ingest<F>(&mut self, chunk: &[u8], delim: &Delimiter, mut emit: F) -> Result<usize>
    where
        F: FnMut(Vec<u8>) -> Result<()>,
    {
        let mut rest = chunk;
        let mut lines = 0;

        // A match may start in the stored tail and finish inside this chunk.
        if let Some(end) = self.straddling_match(rest, delim) {
            emit(self.cut(&rest[..end])?)?;
            lines += 1;
            rest = &rest[end..];
        }

        while let Some(pos) = delim.find(rest) {
            let end = pos + delim.len();
            emit(self.cut(&rest[..end])?)?;
            lines += 1;
            rest = &rest[end..];
        }

        if !rest.is_empty() {
            let mut fragment = Vec::new();
            fragment.try_reserve_exact(rest.len())?;
            fragment.extend_from_slice(rest);
            self.fragments.try_reserve(1)?;
            self.fragments.push(fragment);
            self.len += rest.len();
        }

        Ok(lines)
    }

    /// Take whatever is pending as one buffer, leaving the region empty.
    pub fn take_remainder(&mut self) -> Result<Option<Vec<u8>>> {
        if self.len == 0 {
            return Ok(None);
        }
        self.cut(&[]).map(Some)
    }

    /// Number of pending bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stored fragments.
    #[inline]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Find a delimiter match that begins in the pending tail and ends in
    /// `chunk`. Returns how many bytes of `chunk` the match consumes.
    ///
    /// Only the last `overlap` pending bytes and the first `overlap` chunk
    /// bytes can take part in such a match, so the seam is at most
    /// `2 * (delim.len() - 1)` bytes.
    fn straddling_match(&self, chunk: &[u8], delim: &Delimiter) -> Option<usize> {
        let overlap = delim.overlap();
        let tail_len = self.len.min(overlap);
        let head_len = chunk.len().min(overlap);
        if tail_len == 0 || head_len == 0 {
            return None;
        }

        let mut parts: Vec<&[u8]> = Vec::new();
        let mut needed = tail_len;
        for fragment in self.fragments.iter().rev() {
            if needed == 0 {
                break;
            }
            let take = needed.min(fragment.len());
            parts.push(&fragment[fragment.len() - take..]);
            needed -= take;
        }

        let mut seam = Vec::with_capacity(tail_len + head_len);
        for part in parts.iter().rev() {
            seam.extend_from_slice(part);
        }
        seam.extend_from_slice(&chunk[..head_len]);

        match delim.find(&seam) {
            Some(pos) if pos < tail_len => Some(pos + delim.len() - tail_len),
            _ => None,
        }
    }

    /// Concatenate all fragments followed by `head` into one line.
    fn cut(&mut self, head: &[u8]) -> Result<Vec<u8>> {
        let line = if self.fragments.len() == 1 {
            let mut line = self.fragments.pop().unwrap_or_default();
            line.try_reserve_exact(head.len())?;
            line.extend_from_slice(head);
            line
        } else {
            let mut line = Vec::new();
            line.try_reserve_exact(self.len + head.len())?;
            for fragment in self.fragments.drain(..) {
                line.extend_from_slice(&fragment);
            }
            line.extend_from_slice(head);
            line
        };
        self.len = 0;
        Ok(line)
    }
}

/// Single flat buffer, re-extended on every chunk.
#[derive(Debug, Default)]
pub struct EagerPending {
    buf: Vec<u8>,
}

impl EagerPending {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and cut every completed line, in order.
    pub fn ingest<F>(&mut self, chunk: &[u8], delim: &Delimiter, mut emit: F) -> Result<usize>
    where
        F: FnMut(Vec<u8>) -> Result<()>,
    {
        // Bytes before this point were already scanned and hold no match.
        let mut from = self.buf.len().saturating_sub(delim.overlap());
        self.buf.try_reserve(chunk.len())?;
        self.buf.extend_from_slice(chunk);

        let mut start = 0;
        let mut lines = 0;
        while let Some(pos) = delim.find(&self.buf[from..]) {
            let end = from + pos + delim.len();
            let mut line = Vec::new();
            line.try_reserve_exact(end - start)?;
            line.extend_from_slice(&self.buf[start..end]);
            emit(line)?;
            lines += 1;
            start = end;
            from = end;
        }

        if start > 0 {
            self.buf.drain(..start);
        }
        Ok(lines)
    }

    pub fn take_remainder(&mut self) -> Result<Option<Vec<u8>>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.buf)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Pending region selected by [`PendingStrategy`].
#[derive(Debug)]
pub enum PendingRegion {
    Lazy(LazyPending),
    Eager(EagerPending),
}

impl PendingRegion {
    pub fn new(strategy: PendingStrategy) -> Self {
        match strategy {
            PendingStrategy::Lazy => PendingRegion::Lazy(LazyPending::new()),
            PendingStrategy::Eager => PendingRegion::Eager(EagerPending::new()),
        }
    }

    #[inline]
    pub fn ingest<F>(&mut self, chunk: &[u8], delim: &Delimiter, emit: F) -> Result<usize>
    where
        F: FnMut(Vec<u8>) -> Result<()>,
    {
        match self {
            PendingRegion::Lazy(p) => p.ingest(chunk, delim, emit),
            PendingRegion::Eager(p) => p.ingest(chunk, delim, emit),
        }
    }

    pub fn take_remainder(&mut self) -> Result<Option<Vec<u8>>> {
        match self {
            PendingRegion::Lazy(p) => p.take_remainder(),
            PendingRegion::Eager(p) => p.take_remainder(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            PendingRegion::Lazy(p) => p.len(),
            PendingRegion::Eager(p) => p.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn strategy(&self) -> PendingStrategy {
        match self {
            PendingRegion::Lazy(_) => PendingStrategy::Lazy,
            PendingRegion::Eager(_) => PendingStrategy::Eager,
        }
    }
}
