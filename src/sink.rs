//! Consumer side of the splitter.

use crate::error::Result;

/// A downstream consumer of completed lines.
///
/// `accept` takes ownership of one line and reports whether the consumer can
/// take another one right away. Returning `false` is the consumer's
/// back-pressure signal: delivery pauses and resumes on the next demand.
pub trait LineSink {
    /// Receive the next line. Return `Ok(false)` to pause delivery.
    fn accept(&mut self, line: Vec<u8>) -> Result<bool>;

    /// Called exactly once, when the end marker is delivered.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects every line; never applies back-pressure.
impl LineSink for Vec<Vec<u8>> {
    fn accept(&mut self, line: Vec<u8>) -> Result<bool> {
        self.try_reserve(1)?;
        self.push(line);
        Ok(true)
    }
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn accept(&mut self, line: Vec<u8>) -> Result<bool> {
        (**self).accept(line)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn accept(&mut self, line: Vec<u8>) -> Result<bool> {
        (**self).accept(line)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
