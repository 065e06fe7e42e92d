//! Splitter configuration.
//!
//! A [`SplitConfig`] is validated when it is built: the only configuration
//! error, an empty delimiter, is rejected by [`Delimiter::new`] before any
//! data is processed.

use crate::delimiter::Delimiter;
use std::fmt;
use std::str::FromStr;

/// How the pending region (bytes not yet resolved into a line) is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingStrategy {
    /// Keep incoming fragments in a list and copy them together only once a
    /// delimiter match completes a line.
    #[default]
    Lazy,
    /// Keep one flat buffer, appending every incoming chunk to it.
    Eager,
}

impl FromStr for PendingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lazy" => Ok(PendingStrategy::Lazy),
            "eager" => Ok(PendingStrategy::Eager),
            other => Err(format!(
                "unknown pending strategy '{}' (expected 'lazy' or 'eager')",
                other
            )),
        }
    }
}

impl fmt::Display for PendingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingStrategy::Lazy => write!(f, "lazy"),
            PendingStrategy::Eager => write!(f, "eager"),
        }
    }
}

/// Construction options for a [`LineSplitter`](crate::LineSplitter).
///
/// # Example
///
/// ```
/// use linesplit::{Delimiter, PendingStrategy, SplitConfig};
///
/// let config = SplitConfig::new()
///     .with_delimiter(Delimiter::new(b"\r\n").unwrap())
///     .with_strategy(PendingStrategy::Eager);
/// assert_eq!(config.delimiter.as_bytes(), b"\r\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitConfig {
    /// Byte sequence marking line boundaries (default: `\n`).
    pub delimiter: Delimiter,
    /// Representation of the pending region (default: lazy).
    pub strategy: PendingStrategy,
}

impl SplitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line delimiter.
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the pending-region strategy.
    pub fn with_strategy(mut self, strategy: PendingStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SplitConfig::new();
        assert_eq!(config.delimiter, Delimiter::default());
        assert_eq!(config.strategy, PendingStrategy::Lazy);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("lazy".parse::<PendingStrategy>(), Ok(PendingStrategy::Lazy));
        assert_eq!(
            "eager".parse::<PendingStrategy>(),
            Ok(PendingStrategy::Eager)
        );
        assert!("fast".parse::<PendingStrategy>().is_err());
        assert_eq!(PendingStrategy::Eager.to_string(), "eager");
    }
}
