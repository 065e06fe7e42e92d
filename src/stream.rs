//! Duplex wiring: a splitter bound to its consumer.
//!
//! [`SplitStream`] owns a [`LineSplitter`] and a [`LineSink`]. A consumer
//! demand that found nothing to deliver stays outstanding, and the next
//! `write` or `end` that queues data pushes it through immediately instead
//! of waiting for another `read`.

use crate::config::SplitConfig;
use crate::error::Result;
use crate::sink::LineSink;
use crate::splitter::{Demand, Drained, LineSplitter, SplitStats, WriteOutcome};

pub struct SplitStream<S: LineSink> {
    splitter: LineSplitter,
    sink: S,
}

impl<S: LineSink> SplitStream<S> {
    pub fn new(config: SplitConfig, sink: S) -> Self {
        Self::from_splitter(LineSplitter::new(config), sink)
    }

    pub fn from_splitter(splitter: LineSplitter, sink: S) -> Self {
        Self { splitter, sink }
    }

    /// Producer write. See [`LineSplitter::write`].
    pub fn write<F>(&mut self, chunk: &[u8], on_ack: F) -> Result<WriteOutcome>
    where
        F: FnOnce() + Send + 'static,
    {
        let outcome = self.splitter.write(chunk, on_ack)?;
        if matches!(outcome, WriteOutcome::Deferred { .. }) {
            self.flush_outstanding()?;
        }
        Ok(outcome)
    }

    /// Producer end-of-input. Returns the drain result if a consumer demand
    /// was outstanding and the flush went straight through.
    pub fn end(&mut self) -> Result<Option<Drained>> {
        self.splitter.end()?;
        self.flush_outstanding()
    }

    /// Consumer demand signal.
    pub fn read(&mut self) -> Result<Drained> {
        self.splitter.drain(&mut self.sink)
    }

    fn flush_outstanding(&mut self) -> Result<Option<Drained>> {
        if self.splitter.demand() == Demand::AwaitingData {
            return self.splitter.drain(&mut self.sink).map(Some);
        }
        Ok(None)
    }

    /// True while the last write is unacknowledged.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.splitter.awaiting_ack()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.splitter.is_done()
    }

    pub fn splitter(&self) -> &LineSplitter {
        &self.splitter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn stats(&self) -> &SplitStats {
        self.splitter.stats()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::Delimiter;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_outstanding_demand_flushes_on_write() {
        let mut stream = SplitStream::new(SplitConfig::default(), Vec::<Vec<u8>>::new());
        // Consumer asks first; nothing is there yet.
        assert_eq!(stream.read().unwrap(), Drained::Waiting { delivered: 0 });

        let acked = Arc::new(AtomicBool::new(false));
        let flag = acked.clone();
        let outcome = stream
            .write(b"foo\nbar\n", move || flag.store(true, Ordering::SeqCst))
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Deferred { lines: 2 });
        assert_eq!(stream.sink().len(), 2);

        // Lines went out, but the producer is released by the next demand.
        assert!(stream.is_blocked());
        assert!(!acked.load(Ordering::SeqCst));
        stream.read().unwrap();
        assert!(acked.load(Ordering::SeqCst));
        assert!(!stream.is_blocked());
    }

    #[test]
    fn test_no_demand_means_lines_wait() {
        let mut stream = SplitStream::new(SplitConfig::default(), Vec::<Vec<u8>>::new());
        stream.write(b"foo\n", || {}).unwrap();
        assert!(stream.sink().is_empty());
        assert_eq!(stream.splitter().queued(), 1);

        assert_eq!(stream.read().unwrap(), Drained::Waiting { delivered: 1 });
        assert_eq!(stream.sink(), &vec![b"foo\n".to_vec()]);
    }

    #[test]
    fn test_end_with_outstanding_demand_finishes() {
        let config = SplitConfig::new().with_delimiter(Delimiter::new(b"\n\n").unwrap());
        let mut stream = SplitStream::new(config, Vec::<Vec<u8>>::new());
        stream.read().unwrap();
        stream.write(b"foo\n", || {}).unwrap();
        stream.read().unwrap();
        stream.write(b"\nbar", || {}).unwrap();
        stream.read().unwrap();

        assert_eq!(
            stream.end().unwrap(),
            Some(Drained::Finished { delivered: 1 })
        );
        assert!(stream.is_done());
        assert_eq!(
            stream.into_sink(),
            vec![b"foo\n\n".to_vec(), b"bar".to_vec()]
        );
    }

    #[test]
    fn test_end_without_demand_waits_for_read() {
        let mut stream = SplitStream::new(SplitConfig::default(), Vec::<Vec<u8>>::new());
        stream.write(b"tail", || {}).unwrap();
        assert_eq!(stream.end().unwrap(), None);
        assert!(stream.sink().is_empty());
        assert_eq!(stream.read().unwrap(), Drained::Finished { delivered: 1 });
    }
}
