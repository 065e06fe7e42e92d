//! linesplit: incremental line splitting for chunked byte streams
//!
//! This library turns a byte stream delivered in chunks of arbitrary size and
//! alignment into a sequence of delimiter-terminated lines, independent of
//! how the source fragmented the bytes.
//!
//! # Features
//!
//! - **Chunk invariance**: delimiters split across two writes, including
//!   multi-byte delimiters, are recognized as a single match
//! - **Backpressure**: a write that completes lines is acknowledged only once
//!   the consumer has drained them
//! - **Two pending-region strategies**: lazy fragment lists (default) or an
//!   eager flat buffer
//! - **No I/O in the core**: adapters for `Read`/`Write` live in [`io`]
//!
//! # Example
//!
//! ```rust
//! use linesplit::{Delimiter, LineSplitter, Pull, SplitConfig};
//!
//! let config = SplitConfig::new().with_delimiter(Delimiter::new(b"\n\n").unwrap());
//! let mut splitter = LineSplitter::new(config);
//!
//! splitter.write(b"foo\n", || {}).unwrap();
//! splitter.write(b"\nbar", || {}).unwrap();
//! assert_eq!(splitter.pull().unwrap(), Pull::Line(b"foo\n\n".to_vec()));
//! assert_eq!(splitter.pull().unwrap(), Pull::Pending);
//!
//! splitter.end().unwrap();
//! assert_eq!(splitter.pull().unwrap(), Pull::Line(b"bar".to_vec()));
//! assert_eq!(splitter.pull().unwrap(), Pull::End);
//! ```

pub mod commands;
pub mod config;
pub mod delimiter;
pub mod error;
pub mod io;
pub mod pending;
pub mod shared;
pub mod sink;
pub mod splitter;
pub mod stream;

// Re-export commonly used types
pub use config::{PendingStrategy, SplitConfig};
pub use delimiter::Delimiter;
pub use error::{Result, SplitError};
pub use io::{split_reader, LineReader};
pub use shared::SharedSplitter;
pub use sink::LineSink;
pub use splitter::{Demand, Drained, LineSplitter, Pull, SplitStats, WriteOutcome};
pub use stream::SplitStream;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{PendingStrategy, SplitConfig};
    pub use crate::delimiter::Delimiter;
    pub use crate::error::{Result, SplitError};
    pub use crate::io::{split_reader, LineReader, LineWriter};
    pub use crate::sink::LineSink;
    pub use crate::splitter::{Drained, LineSplitter, Pull, WriteOutcome};
    pub use crate::stream::SplitStream;
}
