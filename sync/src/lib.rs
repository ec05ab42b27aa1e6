//! # Groupcast Sync
//! Propagates a typed payload (ints, reals, bools, strings) from one source
//! participant to every other participant in a fixed-size group, over a
//! transport that can only broadcast small fixed-key scalar values in a
//! globally consistent order. Payloads larger than one round's capacity are
//! chunked across as many rounds as the negotiated metadata dictates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use groupcast_serde::{Base64Decoder, Base64Encoder, ByteBuffer, SerdeError};

mod constants;
mod rounds;
mod staging;
mod transfer;
mod transport;
mod types;

pub use constants::{DEFAULT_MAX_CHUNK_LEN, DEFAULT_WORK_SLICE, METADATA_SLOTS};
pub use rounds::{
    adapter::RoundTransportAdapter,
    error::{RoundError, StringCodecError},
    string_codec::StringCodecAdapter,
};
pub use staging::{
    buffer::{BufferMode, StagingBuffer},
    error::StagingError,
};
pub use transfer::{
    coordinator::{
        CompletionCallback, StepStatus, SynchronizationCoordinator, TransferConfig,
        TransferOutcome, TransferState,
    },
    error::TransferError,
    metadata::TransferMetadata,
};
pub use transport::{
    broadcast::{BroadcastTransport, Lane, PartitionKey, Scalar, ScalarKind, ScalarValue},
    local::{LocalBroadcast, LocalBroadcastNetwork},
};
pub use types::{ParticipantId, RoundIndex, SlotIndex, TransferId, TransferRole};
