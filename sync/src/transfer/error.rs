use thiserror::Error;

use crate::rounds::error::{RoundError, StringCodecError};
use crate::staging::error::StagingError;

/// Errors that can occur while coordinating a transfer. Every variant is a
/// contract violation — a caller or host bug that fails fast and is never
/// retried. A source departing mid-transfer is not an error: it travels
/// through the completion callback as an aborted outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Staging buffer error
    #[error("Staging buffer error: {0}")]
    Staging(#[from] StagingError),

    /// Round transport error
    #[error("Round transport error: {0}")]
    Round(#[from] RoundError),

    /// String codec error
    #[error("String codec error: {0}")]
    StringCodec(#[from] StringCodecError),
}
