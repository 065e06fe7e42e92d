//! Adapters between the splitter and `std::io`.
//!
//! The splitter performs no I/O of its own. These helpers read chunks from
//! any [`Read`](std::io::Read) source into it and write lines out to any
//! [`Write`](std::io::Write) sink.

pub mod buffers;
pub mod output;
pub mod reader;

pub use buffers::{output_buffer_size, DEFAULT_CHUNK_SIZE, DEFAULT_OUTPUT_BUFFER};
pub use output::{CountingSink, LineWriter};
pub use reader::{split_reader, LineReader, Lines};
