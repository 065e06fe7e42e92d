//! Streaming split: re-emit an input line by line.
//!
//! Reads the input in fixed-size chunks, runs them through a splitter and
//! writes each completed line to the output as soon as it is produced.
//!
//! # Memory Complexity
//!
//! O(chunk + longest line): only the current chunk, the pending region and
//! the output buffer are held.

use crate::config::SplitConfig;
use crate::error::Result;
use crate::io::buffers::{output_buffer_size, DEFAULT_CHUNK_SIZE};
use crate::io::{split_reader, LineWriter};
use crate::splitter::SplitStats;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

/// Split command configuration.
#[derive(Debug, Clone)]
pub struct SplitCommand {
    /// Delimiter and pending-region strategy
    pub config: SplitConfig,
    /// Bytes handed to the splitter per write
    pub chunk_size: usize,
    /// Prefix every line with its 1-based number
    pub number: bool,
    /// Use a smaller output buffer
    pub low_memory: bool,
}

impl Default for SplitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitCommand {
    pub fn new() -> Self {
        Self {
            config: SplitConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            number: false,
            low_memory: false,
        }
    }

    /// Set the splitter configuration.
    pub fn with_config(mut self, config: SplitConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the read chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enable line numbering.
    pub fn with_numbering(mut self, number: bool) -> Self {
        self.number = number;
        self
    }

    /// Execute split on a file.
    pub fn run<P: AsRef<Path>, W: Write>(&self, input_path: P, output: &mut W) -> Result<SplitStats> {
        let file = File::open(input_path.as_ref())?;
        self.run_reader(file, output)
    }

    /// Execute split on stdin.
    pub fn run_stdin<W: Write>(&self, output: &mut W) -> Result<SplitStats> {
        let stdin = io::stdin();
        self.run_reader(stdin.lock(), output)
    }

    /// Core split loop over any reader.
    pub fn run_reader<R: Read, W: Write>(&self, reader: R, output: &mut W) -> Result<SplitStats> {
        debug!(
            delimiter = %self.config.delimiter,
            strategy = %self.config.strategy,
            chunk_size = self.chunk_size,
            "splitting input"
        );
        let writer = LineWriter::with_capacity(output_buffer_size(self.low_memory), output)
            .numbered(self.number);
        let (_writer, stats) = split_reader(reader, self.config.clone(), writer, self.chunk_size)?;
        Ok(stats)
    }
}
