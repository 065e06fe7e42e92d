//! Thread-safe splitter handle.
//!
//! Producer and consumer run on separate threads and share one
//! [`LineSplitter`] behind a mutex. The pending acknowledgment becomes a
//! one-slot channel: a producer whose write completed lines blocks on the
//! receiving end until a consumer demand finds the queue drained. Consumers
//! wait on a condition variable for new data.

use crate::config::SplitConfig;
use crate::error::{Result, SplitError};
use crate::splitter::{LineSplitter, Pull, SplitStats, WriteOutcome};
use crossbeam_channel::bounded;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

struct Inner {
    splitter: Mutex<LineSplitter>,
    ready: Condvar,
}

/// Cloneable handle to a splitter shared between threads.
#[derive(Clone)]
pub struct SharedSplitter {
    inner: Arc<Inner>,
}

impl SharedSplitter {
    pub fn new(config: SplitConfig) -> Self {
        Self::from_splitter(LineSplitter::new(config))
    }

    pub fn from_splitter(splitter: LineSplitter) -> Self {
        Self {
            inner: Arc::new(Inner {
                splitter: Mutex::new(splitter),
                ready: Condvar::new(),
            }),
        }
    }

    /// Write a chunk and block until it is acknowledged.
    ///
    /// Returns immediately if the chunk completed no line. Otherwise the
    /// calling thread sleeps until a consumer has drained the lines.
    pub fn write_blocking(&self, chunk: &[u8]) -> Result<WriteOutcome> {
        let (tx, rx) = bounded::<()>(1);
        let outcome = self.inner.splitter.lock().write(chunk, move || {
            let _ = tx.send(());
        })?;

        if let WriteOutcome::Deferred { .. } = outcome {
            self.inner.ready.notify_all();
            rx.recv().map_err(|_| SplitError::Disconnected)?;
        }
        Ok(outcome)
    }

    /// Signal end of input and wake waiting consumers.
    pub fn end(&self) -> Result<()> {
        self.inner.splitter.lock().end()?;
        self.inner.ready.notify_all();
        Ok(())
    }

    /// Non-blocking single-item demand.
    pub fn pull(&self) -> Result<Pull> {
        self.inner.splitter.lock().pull()
    }

    /// Demand one item, sleeping while nothing is queued.
    ///
    /// Never returns [`Pull::Pending`].
    pub fn pull_blocking(&self) -> Result<Pull> {
        let mut splitter = self.inner.splitter.lock();
        loop {
            match splitter.pull()? {
                Pull::Pending => self.inner.ready.wait(&mut splitter),
                item => return Ok(item),
            }
        }
    }

    /// Snapshot of the splitter counters.
    pub fn stats(&self) -> SplitStats {
        *self.inner.splitter.lock().stats()
    }

    /// Run `f` with exclusive access to the splitter.
    pub fn with_splitter<R>(&self, f: impl FnOnce(&mut LineSplitter) -> R) -> R {
        f(&mut self.inner.splitter.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_producer_blocks_until_consumer_drains() {
        let shared = SharedSplitter::new(SplitConfig::default());
        let producer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for chunk in [&b"al"[..], b"pha\nbe", b"ta\ngamma\n", b"delta"] {
                    shared.write_blocking(chunk).unwrap();
                }
                shared.end().unwrap();
            })
        };

        let mut lines = Vec::new();
        loop {
            match shared.pull_blocking().unwrap() {
                Pull::Line(line) => lines.push(line),
                Pull::End => break,
                Pull::Pending => unreachable!("pull_blocking never reports Pending"),
            }
        }
        producer.join().unwrap();

        assert_eq!(
            lines,
            vec![
                b"alpha\n".to_vec(),
                b"beta\n".to_vec(),
                b"gamma\n".to_vec(),
                b"delta".to_vec(),
            ]
        );
        assert_eq!(shared.stats().deferred_writes, 2);
    }

    #[test]
    fn test_write_without_line_does_not_block() {
        let shared = SharedSplitter::new(SplitConfig::default());
        assert_eq!(
            shared.write_blocking(b"no newline").unwrap(),
            WriteOutcome::Acknowledged
        );
        assert_eq!(shared.with_splitter(|s| s.pending_len()), 10);
        assert_eq!(shared.pull().unwrap(), Pull::Pending);
    }
}
