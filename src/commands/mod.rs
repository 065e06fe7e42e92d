//! Command implementations for the linesplit CLI.

pub mod count;
pub mod split;

pub use count::{CountCommand, CountStats};
pub use split::SplitCommand;
