//! Error type shared by the splitter, its adapters and the CLI.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Errors that can occur while splitting a byte stream into lines.
///
/// Every error surfaces synchronously from the operation that raised it.
/// Nothing is retried or logged inside the library.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    #[error("Allocation failed while buffering line data: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("Write after end of input")]
    WriteAfterEnd,

    #[error("End of input was already signalled")]
    AlreadyEnded,

    #[error("Previous write has not been acknowledged yet")]
    AwaitingAck,

    #[error("Stream is finished: the end marker was already delivered")]
    Finished,

    #[error("Splitter was dropped before acknowledging the write")]
    Disconnected,
}

impl SplitError {
    /// True for errors caused by calling the producer/consumer operations
    /// out of order, as opposed to configuration, allocation or I/O failures.
    pub fn is_protocol_misuse(&self) -> bool {
        matches!(
            self,
            SplitError::WriteAfterEnd
                | SplitError::AlreadyEnded
                | SplitError::AwaitingAck
                | SplitError::Finished
        )
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_misuse_classification() {
        assert!(SplitError::WriteAfterEnd.is_protocol_misuse());
        assert!(SplitError::Finished.is_protocol_misuse());
        assert!(!SplitError::InvalidDelimiter("empty".into()).is_protocol_misuse());

        let io_err = SplitError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(!io_err.is_protocol_misuse());
        assert_eq!(io_err.to_string(), "I/O error: closed");
    }
}
