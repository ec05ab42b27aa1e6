/// Identifies one participant within the fixed-size group.
pub type ParticipantId = u16;
/// Index of one keyed slot within a partition, bounded by the transport's
/// per-round slot capacity.
pub type SlotIndex = u16;
/// Zero-based index of one bounded exchange within a transfer.
pub type RoundIndex = u32;
/// Identity of one transfer; its partitions derive their keys from it.
pub type TransferId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferRole {
    Source,
    Receiver,
}

impl TransferRole {
    pub fn is_source(self) -> bool {
        matches!(self, TransferRole::Source)
    }
}
