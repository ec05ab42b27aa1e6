use thiserror::Error;

use super::buffer::BufferMode;

/// Errors that can occur during staging buffer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    /// Operation attempted while the buffer was gated in another mode
    #[error("Cannot {op} {kind} while the staging buffer is {mode:?}; {op} requires {required:?} mode. Mode transitions are driven by the transfer coordinator")]
    ModeViolation {
        op: &'static str,
        kind: &'static str,
        mode: BufferMode,
        required: BufferMode,
    },

    /// Read of a position that was never written
    #[error("Read of {kind} element {position} but only {written} were written. Read back exactly what was written, in write order")]
    UnsafeAccess {
        kind: &'static str,
        position: usize,
        written: usize,
    },
}
