//! Line sinks backed by writers.
//!
//! Uses itoa for integer formatting to avoid allocation in the hot path.

use crate::error::Result;
use crate::io::buffers::DEFAULT_OUTPUT_BUFFER;
use crate::sink::LineSink;
use std::io::{BufWriter, Write};

/// Buffered sink that writes every line verbatim.
///
/// Lines already carry their delimiter (except possibly the last one), so
/// nothing is added between them. With numbering enabled each line is
/// prefixed by its 1-based index and a tab.
pub struct LineWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    number: bool,
    lines_written: u64,
    bytes_written: u64,
}

impl<W: Write> LineWriter<W> {
    /// Create a new LineWriter with the default 2MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a new LineWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            number: false,
            lines_written: 0,
            bytes_written: 0,
        }
    }

    /// Prefix every line with its line number.
    pub fn numbered(mut self, number: bool) -> Self {
        self.number = number;
        self
    }

    /// Write one line as-is, with an optional number prefix.
    #[inline]
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.lines_written += 1;
        if self.number {
            self.writer
                .write_all(self.itoa_buf.format(self.lines_written).as_bytes())?;
            self.writer.write_all(b"\t")?;
        }
        self.writer.write_all(line)?;
        self.bytes_written += line.len() as u64;
        Ok(())
    }

    /// Write `count<TAB>label<LF>`.
    #[inline]
    pub fn write_count(&mut self, count: u64, label: &[u8]) -> Result<()> {
        self.writer.write_all(self.itoa_buf.format(count).as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(label)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Lines written so far.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Line payload bytes written so far, excluding number prefixes.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Get mutable reference to the underlying writer.
    pub fn inner_mut(&mut self) -> &mut BufWriter<W> {
        &mut self.writer
    }
}

impl<W: Write> LineSink for LineWriter<W> {
    fn accept(&mut self, line: Vec<u8>) -> Result<bool> {
        self.write_line(&line)?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<()> {
        self.flush()
    }
}

/// Sink that only counts what passes through it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingSink {
    pub lines: u64,
    pub bytes: u64,
    /// Whether the end marker was seen.
    pub finished: bool,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineSink for CountingSink {
    #[inline]
    fn accept(&mut self, line: Vec<u8>) -> Result<bool> {
        self.lines += 1;
        self.bytes += line.len() as u64;
        Ok(true)
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
