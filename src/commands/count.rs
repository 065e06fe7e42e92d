//! Line counting over many inputs, in parallel.
//!
//! Each file gets its own splitter; files are processed on the Rayon pool
//! and results are reported in argument order.

use crate::config::SplitConfig;
use crate::error::Result;
use crate::io::buffers::DEFAULT_CHUNK_SIZE;
use crate::io::{split_reader, CountingSink, LineWriter};
use rayon::prelude::*;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Count command configuration.
#[derive(Debug, Clone)]
pub struct CountCommand {
    /// Delimiter and pending-region strategy
    pub config: SplitConfig,
    /// Bytes handed to the splitter per write
    pub chunk_size: usize,
}

impl Default for CountCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CountCommand {
    pub fn new() -> Self {
        Self {
            config: SplitConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_config(mut self, config: SplitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Count lines from any reader.
    pub fn count_reader<R: Read>(&self, reader: R) -> Result<CountingSink> {
        let (sink, _stats) = split_reader(
            reader,
            self.config.clone(),
            CountingSink::new(),
            self.chunk_size,
        )?;
        Ok(sink)
    }

    /// Count lines in one file.
    pub fn count_file<P: AsRef<Path>>(&self, path: P) -> Result<CountingSink> {
        let file = File::open(path.as_ref())?;
        self.count_reader(file)
    }

    /// Count every file in parallel and write `count<TAB>path` lines.
    ///
    /// With more than one file a final `total` line is added. The first
    /// failing file aborts the command.
    pub fn run<W: Write>(&self, paths: &[PathBuf], output: &mut W) -> Result<CountStats> {
        let counts: Vec<Result<CountingSink>> =
            paths.par_iter().map(|p| self.count_file(p)).collect();

        let mut writer = LineWriter::new(output);
        let mut stats = CountStats::default();
        for (path, count) in paths.iter().zip(counts) {
            let count = count?;
            writer.write_count(count.lines, path.to_string_lossy().as_bytes())?;
            stats.files += 1;
            stats.lines += count.lines;
            stats.bytes += count.bytes;
        }
        if paths.len() > 1 {
            writer.write_count(stats.lines, b"total")?;
        }
        writer.flush()?;
        Ok(stats)
    }
}

/// Totals for a count run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountStats {
    pub files: usize,
    pub lines: u64,
    pub bytes: u64,
}

impl std::fmt::Display for CountStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Files: {}, Lines: {}, Bytes: {}",
            self.files, self.lines, self.bytes
        )
    }
}
