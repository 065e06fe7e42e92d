//! Buffer size constants for the I/O adapters.
//!
//! These control memory usage vs I/O throughput tradeoffs. The splitter
//! itself never reads; these sizes only decide how large the chunks handed
//! to it are, and how much output is buffered before hitting the sink.

/// Default read chunk size (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Large read chunk size (512 KB), used for bulk throughput runs.
pub const LARGE_CHUNK_SIZE: usize = 512 * 1024;

/// Default output buffer size (2 MB).
pub const DEFAULT_OUTPUT_BUFFER: usize = 2 * 1024 * 1024;

/// Low-memory output buffer size (256 KB).
pub const LOW_MEMORY_OUTPUT_BUFFER: usize = 256 * 1024;

/// Returns the appropriate output buffer size based on low_memory flag.
#[inline]
pub const fn output_buffer_size(low_memory: bool) -> usize {
    if low_memory {
        LOW_MEMORY_OUTPUT_BUFFER
    } else {
        DEFAULT_OUTPUT_BUFFER
    }
}
