//! Line delimiter and delimiter search.
//!
//! Single-byte delimiters are located with `memchr`, multi-byte ones with
//! a prebuilt `memmem::Finder`. Both are SIMD-accelerated.

use crate::error::{Result, SplitError};
use memchr::memchr;
use memchr::memmem::Finder;
use std::fmt;

/// Default delimiter: a single linefeed byte.
pub const DEFAULT_DELIMITER: &[u8] = b"\n";

/// An immutable, non-empty byte sequence marking line boundaries.
#[derive(Clone)]
pub struct Delimiter {
    finder: Finder<'static>,
}

impl Delimiter {
    /// Create a delimiter from raw bytes.
    ///
    /// Fails with [`SplitError::InvalidDelimiter`] if `bytes` is empty.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(SplitError::InvalidDelimiter(
                "delimiter must contain at least one byte".to_string(),
            ));
        }
        Ok(Self {
            finder: Finder::new(bytes).into_owned(),
        })
    }

    /// Parse a delimiter written with backslash escapes, as typed on a
    /// command line.
    ///
    /// Recognized escapes: `\n`, `\r`, `\t`, `\0`, `\\` and `\xHH`.
    ///
    /// # Example
    ///
    /// ```
    /// use linesplit::Delimiter;
    ///
    /// let crlf = Delimiter::parse_escaped(r"\r\n").unwrap();
    /// assert_eq!(crlf.as_bytes(), b"\r\n");
    /// ```
    pub fn parse_escaped(text: &str) -> Result<Self> {
        let mut out = Vec::with_capacity(text.len());
        let mut bytes = text.bytes();

        while let Some(b) = bytes.next() {
            if b != b'\\' {
                out.push(b);
                continue;
            }
            let escaped = match bytes.next() {
                Some(b'n') => b'\n',
                Some(b'r') => b'\r',
                Some(b't') => b'\t',
                Some(b'0') => 0,
                Some(b'\\') => b'\\',
                Some(b'x') => {
                    let hi = bytes.next().and_then(hex_value);
                    let lo = bytes.next().and_then(hex_value);
                    match (hi, lo) {
                        (Some(hi), Some(lo)) => (hi << 4) | lo,
                        _ => {
                            return Err(SplitError::InvalidDelimiter(format!(
                                "'\\x' must be followed by two hex digits in '{}'",
                                text
                            )))
                        }
                    }
                }
                Some(other) => {
                    return Err(SplitError::InvalidDelimiter(format!(
                        "unknown escape '\\{}' in '{}'",
                        other as char, text
                    )))
                }
                None => {
                    return Err(SplitError::InvalidDelimiter(format!(
                        "trailing backslash in '{}'",
                        text
                    )))
                }
            };
            out.push(escaped);
        }

        Self::new(out)
    }

    /// The delimiter bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.finder.needle()
    }

    /// Number of bytes in the delimiter (always at least 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.finder.needle().len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Maximum number of delimiter bytes that can sit at the end of a region
    /// without forming a full match.
    #[inline]
    pub fn overlap(&self) -> usize {
        self.len() - 1
    }

    /// Position of the leftmost delimiter match in `haystack`.
    #[inline]
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        match self.as_bytes() {
            [single] => memchr(*single, haystack),
            _ => self.finder.find(haystack),
        }
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self {
            finder: Finder::new(DEFAULT_DELIMITER).into_owned(),
        }
    }
}

impl PartialEq for Delimiter {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Delimiter {}

impl fmt::Debug for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Delimiter")
            .field(&self.as_bytes().escape_ascii().to_string())
            .finish()
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_bytes().escape_ascii())
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
