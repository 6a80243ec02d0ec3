//! Error types for the generator.
//!
//! Both generator errors are precondition violations: the schema and the
//! requested row counts are fixed inputs, so neither error is retried and a
//! failed scenario leaves no partially-written file pair behind.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The schema declares a column type the engine does not recognize.
    #[error("unknown column type: {0}")]
    UnknownColumnType(String),

    /// A row index exceeds the representable range of a bounded TEXT column.
    /// Continuing would silently emit duplicate or mis-ordered values.
    #[error("cannot generate TEXT({max_len}) value for index {index}: exceeds 62^{max_len}")]
    ValueCapacityExceeded { index: u64, max_len: u32 },

    #[error(transparent)]
    Io(#[from] io::Error),
}
