//! The incremental line splitter.
//!
//! [`LineSplitter`] sits between a producer that pushes byte chunks of any
//! size and a consumer that pulls delimiter-terminated lines.
//!
//! # Write path
//!
//! 1. The chunk is scanned together with the pending region, so a delimiter
//!    split across two writes is still found.
//! 2. Every completed line (delimiter included) is appended to the output
//!    queue; the unmatched remainder becomes the new pending region.
//! 3. If no line was completed the write is acknowledged immediately.
//!    Otherwise its continuation is parked until the consumer has drained
//!    the queue.
//!
//! # Read path
//!
//! A demand (`pull` or `drain`) first releases a parked acknowledgment if
//! the queue is empty, then delivers queued lines in FIFO order until the
//! consumer pauses, the queue runs dry, or the end marker is delivered.
//!
//! # Example
//!
//! ```
//! use linesplit::{LineSplitter, Pull};
//!
//! let mut splitter = LineSplitter::default();
//! splitter.write(b"foo\nba", || {}).unwrap();
//! splitter.write(b"r", || {}).unwrap_err(); // first write is still parked
//!
//! assert_eq!(splitter.pull().unwrap(), Pull::Line(b"foo\n".to_vec()));
//! assert_eq!(splitter.pull().unwrap(), Pull::Pending); // releases the ack
//!
//! splitter.write(b"r", || {}).unwrap();
//! splitter.end().unwrap();
//! assert_eq!(splitter.pull().unwrap(), Pull::Line(b"bar".to_vec()));
//! assert_eq!(splitter.pull().unwrap(), Pull::End);
//! ```

use crate::config::{PendingStrategy, SplitConfig};
use crate::delimiter::Delimiter;
use crate::error::{Result, SplitError};
use crate::pending::PendingRegion;
use crate::sink::LineSink;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace};

/// Result of a single-item demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pull {
    /// The next completed line, delimiter included (except possibly the last).
    Line(Vec<u8>),
    /// Terminal marker: every line has been delivered.
    End,
    /// Nothing is queued yet.
    Pending,
}

/// Acknowledgment status returned by [`LineSplitter::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No line was completed; the continuation has already run.
    Acknowledged,
    /// `lines` lines were completed; the continuation runs once they drain.
    Deferred { lines: usize },
}

/// Result of a multi-item demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drained {
    /// The sink asked to pause; lines may remain queued.
    Paused { delivered: usize },
    /// The queue ran dry before end of input.
    Waiting { delivered: usize },
    /// The end marker was delivered.
    Finished { delivered: usize },
}

impl Drained {
    /// Lines delivered during this demand.
    pub fn delivered(&self) -> usize {
        match *self {
            Drained::Paused { delivered }
            | Drained::Waiting { delivered }
            | Drained::Finished { delivered } => delivered,
        }
    }
}

/// Consumer demand state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Demand {
    /// No demand outstanding.
    #[default]
    Idle,
    /// The consumer asked for data and found the queue empty.
    AwaitingData,
    /// A drain is delivering lines.
    Draining,
    /// The end marker was delivered; no further operations are accepted.
    Done,
}

enum Queued {
    Line(Vec<u8>),
    End,
}

/// The parked continuation of the last write that completed a line.
struct PendingAck(Box<dyn FnOnce() + Send + 'static>);

impl fmt::Debug for PendingAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingAck(..)")
    }
}

/// Counters describing the work done by a splitter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitStats {
    /// Number of `write` calls accepted
    pub chunks_written: usize,
    /// Total bytes accepted
    pub bytes_written: usize,
    /// Lines completed, including the unterminated final remainder
    pub lines_emitted: usize,
    /// Writes whose acknowledgment was deferred
    pub deferred_writes: usize,
    /// Largest pending region observed, in bytes
    pub max_pending: usize,
}

impl SplitStats {
    /// Average emitted line length in bytes.
    pub fn mean_line_len(&self) -> f64 {
        if self.lines_emitted == 0 {
            0.0
        } else {
            self.bytes_written as f64 / self.lines_emitted as f64
        }
    }
}

impl fmt::Display for SplitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunks: {}, Bytes: {}, Lines: {}, Deferred: {}, Max pending: {}, Mean line: {:.2}",
            self.chunks_written,
            self.bytes_written,
            self.lines_emitted,
            self.deferred_writes,
            self.max_pending,
            self.mean_line_len()
        )
    }
}

/// Incremental delimiter-based splitter with deferred write acknowledgment.
#[derive(Debug)]
pub struct LineSplitter {
    delimiter: Delimiter,
    pending: PendingRegion,
    queue: VecDeque<Queued>,
    ack: Option<PendingAck>,
    demand: Demand,
    ended: bool,
    stats: SplitStats,
}

impl fmt::Debug for Queued {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Queued::Line(line) => write!(f, "Line({} bytes)", line.len()),
            Queued::End => f.write_str("End"),
        }
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(SplitConfig::default())
    }
}

impl LineSplitter {
    /// Create a splitter from a validated configuration.
    pub fn new(config: SplitConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            pending: PendingRegion::new(config.strategy),
            queue: VecDeque::new(),
            ack: None,
            demand: Demand::Idle,
            ended: false,
            stats: SplitStats::default(),
        }
    }

    /// Create a splitter for `delimiter` with the default strategy.
    pub fn with_delimiter(delimiter: Delimiter) -> Self {
        Self::new(SplitConfig::new().with_delimiter(delimiter))
    }

    /// Feed one chunk from the producer.
    ///
    /// `on_ack` runs immediately when the chunk completes no line. Otherwise
    /// it is parked and runs during the first demand that finds the output
    /// queue empty. Only one write may be unacknowledged at a time.
    pub fn write<F>(&mut self, chunk: &[u8], on_ack: F) -> Result<WriteOutcome>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.ended {
            return Err(SplitError::WriteAfterEnd);
        }
        if self.ack.is_some() {
            return Err(SplitError::AwaitingAck);
        }

        let queue = &mut self.queue;
        let lines = self.pending.ingest(chunk, &self.delimiter, |line| {
            queue.try_reserve(1)?;
            queue.push_back(Queued::Line(line));
            Ok(())
        })?;

        self.stats.chunks_written += 1;
        self.stats.bytes_written += chunk.len();
        self.stats.lines_emitted += lines;
        self.stats.max_pending = self.stats.max_pending.max(self.pending.len());

        if lines == 0 {
            on_ack();
            return Ok(WriteOutcome::Acknowledged);
        }

        trace!(
            lines,
            queued = self.queue.len(),
            "deferring write acknowledgment"
        );
        self.stats.deferred_writes += 1;
        self.ack = Some(PendingAck(Box::new(on_ack)));
        Ok(WriteOutcome::Deferred { lines })
    }

    /// Signal end of input.
    ///
    /// A non-empty pending region is queued verbatim as the final line,
    /// followed by the end marker.
    pub fn end(&mut self) -> Result<()> {
        if self.ended {
            return Err(SplitError::AlreadyEnded);
        }
        if self.ack.is_some() {
            return Err(SplitError::AwaitingAck);
        }

        if let Some(rest) = self.pending.take_remainder()? {
            self.queue.try_reserve(2)?;
            self.queue.push_back(Queued::Line(rest));
            self.stats.lines_emitted += 1;
        } else {
            self.queue.try_reserve(1)?;
        }
        self.queue.push_back(Queued::End);
        self.ended = true;

        debug!(
            queued = self.queue.len(),
            bytes = self.stats.bytes_written,
            "end of input"
        );
        Ok(())
    }

    /// Demand a single item.
    pub fn pull(&mut self) -> Result<Pull> {
        if self.demand == Demand::Done {
            return Err(SplitError::Finished);
        }
        self.release_if_drained();

        match self.queue.pop_front() {
            Some(Queued::Line(line)) => {
                self.demand = Demand::Idle;
                Ok(Pull::Line(line))
            }
            Some(Queued::End) => {
                self.demand = Demand::Done;
                Ok(Pull::End)
            }
            None => {
                self.demand = Demand::AwaitingData;
                Ok(Pull::Pending)
            }
        }
    }

    /// Demand as many items as `sink` will take.
    ///
    /// Delivery stops when the sink returns `false`, when the queue is
    /// empty, or after the end marker. Lines left in the queue are delivered
    /// first on the next demand.
    pub fn drain<S>(&mut self, sink: &mut S) -> Result<Drained>
    where
        S: LineSink + ?Sized,
    {
        if self.demand == Demand::Done {
            return Err(SplitError::Finished);
        }
        self.release_if_drained();
        self.demand = Demand::Draining;

        let mut delivered = 0;
        loop {
            match self.queue.pop_front() {
                Some(Queued::Line(line)) => {
                    delivered += 1;
                    if !sink.accept(line)? {
                        self.demand = Demand::Idle;
                        return Ok(Drained::Paused { delivered });
                    }
                }
                Some(Queued::End) => {
                    self.demand = Demand::Done;
                    sink.finish()?;
                    return Ok(Drained::Finished { delivered });
                }
                None => {
                    self.demand = Demand::AwaitingData;
                    return Ok(Drained::Waiting { delivered });
                }
            }
        }
    }

    fn release_if_drained(&mut self) {
        if !self.queue.is_empty() {
            return;
        }
        if let Some(PendingAck(ack)) = self.ack.take() {
            trace!("queue drained, releasing write acknowledgment");
            ack();
        }
    }

    /// Current consumer demand state.
    #[inline]
    pub fn demand(&self) -> Demand {
        self.demand
    }

    /// True once the end marker has been delivered.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.demand == Demand::Done
    }

    /// True once `end` has been called.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// True while a write acknowledgment is parked.
    #[inline]
    pub fn awaiting_ack(&self) -> bool {
        self.ack.is_some()
    }

    /// Number of queued lines (the end marker is not counted).
    pub fn queued(&self) -> usize {
        self.queue
            .iter()
            .filter(|item| matches!(item, Queued::Line(_)))
            .count()
    }

    /// Bytes held in the pending region.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    #[inline]
    pub fn strategy(&self) -> PendingStrategy {
        self.pending.strategy()
    }

    #[inline]
    pub fn stats(&self) -> &SplitStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let acks = Arc::new(AtomicUsize::new(0));
        let handle = acks.clone();
        let make = move || {
            let acks = handle.clone();
            Box::new(move || {
                acks.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce() + Send>
        };
        (acks, make)
    }

    #[test]
    fn test_write_without_line_acks_immediately() {
        let (acks, ack) = counter();
        let mut splitter = LineSplitter::default();

        assert_eq!(
            splitter.write(b"foo", ack()).unwrap(),
            WriteOutcome::Acknowledged
        );
        assert_eq!(acks.load(Ordering::SeqCst), 1);
        assert!(!splitter.awaiting_ack());
        assert_eq!(splitter.pending_len(), 3);
    }

    #[test]
    fn test_empty_write_acks_immediately() {
        let (acks, ack) = counter();
        let mut splitter = LineSplitter::default();
        assert_eq!(
            splitter.write(b"", ack()).unwrap(),
            WriteOutcome::Acknowledged
        );
        assert_eq!(acks.load(Ordering::SeqCst), 1);
        assert_eq!(splitter.stats().chunks_written, 1);
    }

    #[test]
    fn test_ack_deferred_until_queue_drained() {
        let (acks, ack) = counter();
        let mut splitter = LineSplitter::default();

        assert_eq!(
            splitter.write(b"a\nb\nc", ack()).unwrap(),
            WriteOutcome::Deferred { lines: 2 }
        );
        assert!(splitter.awaiting_ack());
        assert_eq!(splitter.queued(), 2);

        assert_eq!(splitter.pull().unwrap(), Pull::Line(b"a\n".to_vec()));
        assert_eq!(splitter.pull().unwrap(), Pull::Line(b"b\n".to_vec()));
        // Queue is empty now, but release happens on the next demand.
        assert_eq!(acks.load(Ordering::SeqCst), 0);

        assert_eq!(splitter.pull().unwrap(), Pull::Pending);
        assert_eq!(acks.load(Ordering::SeqCst), 1);
        assert_eq!(splitter.demand(), Demand::AwaitingData);
    }

    #[test]
    fn test_write_while_awaiting_ack_is_rejected() {
        let mut splitter = LineSplitter::default();
        splitter.write(b"x\n", || {}).unwrap();
        assert!(matches!(
            splitter.write(b"y", || {}),
            Err(SplitError::AwaitingAck)
        ));
        assert!(matches!(splitter.end(), Err(SplitError::AwaitingAck)));
        // The rejected write left no trace.
        assert_eq!(splitter.pending_len(), 0);
        assert_eq!(splitter.stats().chunks_written, 1);
    }

    #[test]
    fn test_end_flushes_remainder_then_marker() {
        let mut splitter = LineSplitter::default();
        splitter.write(b"foo\nbar", || {}).unwrap();
        assert_eq!(splitter.pull().unwrap(), Pull::Line(b"foo\n".to_vec()));
        assert_eq!(splitter.pull().unwrap(), Pull::Pending);

        splitter.end().unwrap();
        assert!(splitter.is_ended());
        assert_eq!(splitter.queued(), 1);
        assert_eq!(splitter.pull().unwrap(), Pull::Line(b"bar".to_vec()));
        assert_eq!(splitter.pull().unwrap(), Pull::End);
        assert!(splitter.is_done());
    }

    #[test]
    fn test_empty_input_yields_only_end() {
        let mut splitter = LineSplitter::default();
        splitter.end().unwrap();
        assert_eq!(splitter.pull().unwrap(), Pull::End);
        assert_eq!(splitter.stats().lines_emitted, 0);
    }

    #[test]
    fn test_protocol_misuse_fails_deterministically() {
        let mut splitter = LineSplitter::default();
        splitter.end().unwrap();
        assert!(matches!(
            splitter.write(b"late", || {}),
            Err(SplitError::WriteAfterEnd)
        ));
        assert!(matches!(splitter.end(), Err(SplitError::AlreadyEnded)));

        assert_eq!(splitter.pull().unwrap(), Pull::End);
        assert!(matches!(splitter.pull(), Err(SplitError::Finished)));
        let mut sink: Vec<Vec<u8>> = Vec::new();
        assert!(matches!(
            splitter.drain(&mut sink),
            Err(SplitError::Finished)
        ));
    }

    struct Throttled {
        lines: Vec<Vec<u8>>,
        budget: usize,
        finished: bool,
    }

    impl LineSink for Throttled {
        fn accept(&mut self, line: Vec<u8>) -> Result<bool> {
            self.lines.push(line);
            self.budget = self.budget.saturating_sub(1);
            Ok(self.budget > 0)
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn test_drain_pauses_and_resumes_in_order() {
        let (acks, ack) = counter();
        let mut splitter = LineSplitter::default();
        splitter.write(b"1\n2\n3\n4\n5\n", ack()).unwrap();

        let mut sink = Throttled {
            lines: Vec::new(),
            budget: 2,
            finished: false,
        };
        assert_eq!(
            splitter.drain(&mut sink).unwrap(),
            Drained::Paused { delivered: 2 }
        );
        assert_eq!(splitter.queued(), 3);
        assert_eq!(acks.load(Ordering::SeqCst), 0);

        sink.budget = 10;
        assert_eq!(
            splitter.drain(&mut sink).unwrap(),
            Drained::Waiting { delivered: 3 }
        );
        assert_eq!(acks.load(Ordering::SeqCst), 0);

        assert_eq!(
            splitter.drain(&mut sink).unwrap(),
            Drained::Waiting { delivered: 0 }
        );
        assert_eq!(acks.load(Ordering::SeqCst), 1);

        splitter.end().unwrap();
        assert_eq!(
            splitter.drain(&mut sink).unwrap(),
            Drained::Finished { delivered: 0 }
        );
        assert!(sink.finished);
        let expected: Vec<Vec<u8>> = (1..=5).map(|i| format!("{}\n", i).into_bytes()).collect();
        assert_eq!(sink.lines, expected);
    }

    #[test]
    fn test_dropping_splitter_discards_parked_ack() {
        let (acks, ack) = counter();
        let mut splitter = LineSplitter::default();
        splitter.write(b"a\n", ack()).unwrap();
        drop(splitter);
        assert_eq!(acks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stats() {
        let mut splitter = LineSplitter::new(
            SplitConfig::new().with_strategy(PendingStrategy::Eager),
        );
        splitter.write(b"abc", || {}).unwrap();
        splitter.write(b"d\nef", || {}).unwrap();
        while splitter.pull().unwrap() != Pull::Pending {}
        splitter.end().unwrap();

        let stats = splitter.stats();
        assert_eq!(stats.chunks_written, 2);
        assert_eq!(stats.bytes_written, 7);
        assert_eq!(stats.lines_emitted, 2);
        assert_eq!(stats.deferred_writes, 1);
        assert_eq!(stats.max_pending, 3);
        assert!(stats.to_string().starts_with("Chunks: 2, Bytes: 7, Lines: 2"));
        assert_eq!(splitter.strategy(), PendingStrategy::Eager);
    }
}
