//! Feeding `Read` sources into a splitter.

use crate::config::SplitConfig;
use crate::error::Result;
use crate::io::buffers::DEFAULT_CHUNK_SIZE;
use crate::sink::LineSink;
use crate::splitter::{LineSplitter, Pull, SplitStats};
use crate::stream::SplitStream;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read the next chunk, retrying on `Interrupted`. Returns 0 at EOF.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// A pull-driven line reader over any readable source.
///
/// Chunks are read only when the splitter has nothing left to hand out, so
/// at most one chunk's worth of lines is buffered at a time.
pub struct LineReader<R: Read> {
    reader: R,
    splitter: LineSplitter,
    buf: Vec<u8>,
    done: bool,
}

impl LineReader<File> {
    /// Open a file with the default configuration.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> LineReader<R> {
    /// Create a reader splitting on `\n` with the default chunk size.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, SplitConfig::default(), DEFAULT_CHUNK_SIZE)
    }

    /// Create a reader with a custom configuration and chunk size.
    pub fn with_config(reader: R, config: SplitConfig, chunk_size: usize) -> Self {
        Self {
            reader,
            splitter: LineSplitter::new(config),
            buf: vec![0; chunk_size.max(1)],
            done: false,
        }
    }

    /// Read the next line, or `None` once the source is exhausted.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        if self.done {
            return Ok(None);
        }
        loop {
            match self.splitter.pull()? {
                Pull::Line(line) => return Ok(Some(line)),
                Pull::End => {
                    self.done = true;
                    return Ok(None);
                }
                Pull::Pending => self.fill()?,
            }
        }
    }

    fn fill(&mut self) -> Result<()> {
        let n = read_chunk(&mut self.reader, &mut self.buf)?;
        if n == 0 {
            self.splitter.end()
        } else {
            self.splitter.write(&self.buf[..n], || {}).map(|_| ())
        }
    }

    pub fn stats(&self) -> &SplitStats {
        self.splitter.stats()
    }

    /// Get an iterator over all lines.
    pub fn lines(self) -> Lines<R> {
        Lines { reader: self }
    }
}

/// Iterator over lines.
pub struct Lines<R: Read> {
    reader: LineReader<R>,
}

impl<R: Read> Iterator for Lines<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(e) => {
                self.reader.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Pump `reader` through a [`SplitStream`] into `sink`.
///
/// The consumer side keeps a demand outstanding, so lines reach the sink
/// as soon as they complete. After each write the pump keeps demanding
/// until the write is acknowledged. Returns the sink and the splitter
/// counters.
pub fn split_reader<R: Read, S: LineSink>(
    mut reader: R,
    config: SplitConfig,
    sink: S,
    chunk_size: usize,
) -> Result<(S, SplitStats)> {
    let mut stream = SplitStream::new(config, sink);
    let mut buf = vec![0; chunk_size.max(1)];

    stream.read()?;
    loop {
        let n = read_chunk(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        stream.write(&buf[..n], || {})?;
        while stream.is_blocked() {
            stream.read()?;
        }
    }

    stream.end()?;
    while !stream.is_done() {
        stream.read()?;
    }

    let stats = *stream.stats();
    Ok((stream.into_sink(), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::Delimiter;

    /// Source that returns at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_line_reader_basic() {
        let reader = LineReader::new(&b"foo\nbar\nbaz"[..]);
        let lines: Vec<_> = reader.lines().collect::<Result<_>>().unwrap();
        assert_eq!(
            lines,
            vec![b"foo\n".to_vec(), b"bar\n".to_vec(), b"baz".to_vec()]
        );
    }

    #[test]
    fn test_line_reader_tiny_chunks_multi_byte_delimiter() {
        let config = SplitConfig::new().with_delimiter(Delimiter::new(b"\r\n").unwrap());
        let source = Trickle {
            data: b"GET / HTTP/1.1\r\nHost: x\r\n\r\n",
            step: 1,
        };
        let lines: Vec<_> = LineReader::with_config(source, config, 3)
            .lines()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            lines,
            vec![
                b"GET / HTTP/1.1\r\n".to_vec(),
                b"Host: x\r\n".to_vec(),
                b"\r\n".to_vec(),
            ]
        );
    }

    #[test]
    fn test_line_reader_empty_source() {
        let mut reader = LineReader::new(&b""[..]);
        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.stats().lines_emitted, 0);
    }

    #[test]
    fn test_split_reader_collects_everything() {
        let source = Trickle {
            data: b"one\ntwo\nthree\nfour",
            step: 5,
        };
        let (lines, stats) =
            split_reader(source, SplitConfig::default(), Vec::<Vec<u8>>::new(), 4).unwrap();
        assert_eq!(lines.concat(), b"one\ntwo\nthree\nfour".to_vec());
        assert_eq!(lines.len(), 4);
        assert_eq!(stats.lines_emitted, 4);
        assert_eq!(stats.bytes_written, 18);
    }

    #[test]
    fn test_split_reader_propagates_io_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }
        let err = split_reader(Broken, SplitConfig::default(), Vec::<Vec<u8>>::new(), 16)
            .unwrap_err();
        assert!(matches!(err, crate::SplitError::Io(_)));
    }
}
