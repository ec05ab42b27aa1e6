use thiserror::Error;

use crate::staging::error::StagingError;
use crate::transport::broadcast::{PartitionKey, ScalarKind};
use crate::types::SlotIndex;

/// Errors that can occur during single-round transport operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// Slot index advanced past the partition's round capacity
    #[error("Slot index would exceed the {capacity}-slot round capacity of partition {key:?}. Chunk the payload across more rounds instead of widening one")]
    CapacityExceeded {
        key: PartitionKey,
        capacity: SlotIndex,
    },

    /// Read of a slot whose broadcast has not been received yet
    #[error("Slot {slot} of partition {key:?} has not been delivered yet. Wait for the round's delivery barrier before reading")]
    NotYetPresent { key: PartitionKey, slot: SlotIndex },

    /// Adapter bound to one scalar type received another
    #[error("Partition {key:?} delivered a {found:?} value where a {expected:?} adapter was reading. Each adapter must stay bound to a single scalar type")]
    TypeMismatch {
        key: PartitionKey,
        expected: ScalarKind,
        found: ScalarKind,
    },
}

/// Errors that can occur while bridging strings through the scalar
/// transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringCodecError {
    /// String longer than the 2-byte length prefix can express
    #[error("String of {length} bytes exceeds the {limit}-byte limit of the length-prefixed encoding. Split the value before staging it")]
    StringTooLong { length: usize, limit: usize },

    /// Staging buffer rejected a read or write
    #[error("Staging buffer error: {0}")]
    Staging(#[from] StagingError),
}
