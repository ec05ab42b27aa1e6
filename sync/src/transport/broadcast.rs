use crate::types::{ParticipantId, SlotIndex, TransferId};

/// One value crossing the broadcast transport in a single keyed slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarValue {
    Int(i32),
    Real(f32),
    Bool(bool),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Int(_) => ScalarKind::Int,
            ScalarValue::Real(_) => ScalarKind::Real,
            ScalarValue::Bool(_) => ScalarKind::Bool,
        }
    }
}

/// The scalar families the transport can broadcast natively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Real,
    Bool,
}

/// Types that fit a single broadcast slot. Binding an adapter to one
/// `Scalar` makes wrong-type usage unrepresentable at the call site; the
/// only remaining mismatch is a delivered value of the wrong kind, surfaced
/// by `from_value`.
pub trait Scalar: Copy {
    const KIND: ScalarKind;
    fn into_value(self) -> ScalarValue;
    fn from_value(value: ScalarValue) -> Option<Self>;
}

impl Scalar for i32 {
    const KIND: ScalarKind = ScalarKind::Int;

    fn into_value(self) -> ScalarValue {
        ScalarValue::Int(self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Int(inner) => Some(inner),
            _ => None,
        }
    }
}

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::Real;

    fn into_value(self) -> ScalarValue {
        ScalarValue::Real(self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Real(inner) => Some(inner),
            _ => None,
        }
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn into_value(self) -> ScalarValue {
        ScalarValue::Bool(self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(inner) => Some(inner),
            _ => None,
        }
    }
}

/// The lanes one transfer partitions the transport's key space into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    Metadata,
    Int,
    Real,
    Bool,
    EncodedChars,
}

/// Transport-level identifier isolating one transfer lane's keyed storage
/// from every other transfer and lane. Keys are derived from the transfer's
/// identity, never from ambient globals, so concurrent transfers cannot
/// contaminate each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    transfer: TransferId,
    lane: Lane,
}

impl PartitionKey {
    pub fn new(transfer: TransferId, lane: Lane) -> Self {
        Self { transfer, lane }
    }

    pub fn transfer(&self) -> TransferId {
        self.transfer
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }
}

/// The broadcast capability this subsystem consumes. Implementations must
/// deliver published scalars to every participant in the same relative
/// order they were published; that ordering is what lets each participant
/// attribute a delivered value to a round and type without any tagging.
pub trait BroadcastTransport {
    /// Maximum keyed slots one partition may occupy in a single round.
    fn slot_capacity(&self) -> SlotIndex;

    /// Broadcasts `value` into `slot` of `key`'s partition.
    fn publish_scalar(&mut self, key: PartitionKey, slot: SlotIndex, value: ScalarValue);

    /// Whether `slot` of `key` has been delivered locally.
    fn has_scalar(&self, key: PartitionKey, slot: SlotIndex) -> bool;

    /// Reads a delivered slot; `None` until delivery.
    fn read_scalar(&self, key: PartitionKey, slot: SlotIndex) -> Option<ScalarValue>;

    /// Clears the local replica of one partition.
    fn clear_partition(&mut self, key: PartitionKey);

    /// Delivery barrier: true once every present participant has observed
    /// everything published so far by `source`, in publish order. May
    /// ingest pending deliveries as a side effect.
    fn synchronized(&mut self, source: ParticipantId) -> bool;

    /// Whether `participant` is still in the group.
    fn is_present(&self, participant: ParticipantId) -> bool;

    fn local_participant(&self) -> ParticipantId;
}
