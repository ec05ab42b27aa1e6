use thiserror::Error;

/// Errors that can occur during byte buffer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeError {
    /// Read before flip(), or past the written byte count
    #[error("Read of {requested} byte(s) at position {position} but only {readable} byte(s) are readable. Call flip() after writing and never read past byte_count()")]
    BufferUnderrun {
        position: usize,
        requested: usize,
        readable: usize,
    },
}
