use crate::constants::METADATA_SLOTS;
use crate::rounds::adapter::RoundTransportAdapter;
use crate::rounds::error::RoundError;
use crate::transport::broadcast::{BroadcastTransport, PartitionKey, ScalarValue};
use crate::types::SlotIndex;

/// Counts negotiated once per transfer: computed by the source from its
/// populated payload, broadcast once through the metadata partition, and
/// authoritative for every participant until the transfer ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferMetadata {
    pub int_count: u32,
    pub real_count: u32,
    pub bool_count: u32,
    pub encoded_char_count: u32,
    pub round_count: u32,
}

impl TransferMetadata {
    /// Derives the metadata record from per-type totals and the per-round
    /// slot capacity. The round count covers the largest sequence; shorter
    /// sequences simply finish draining in earlier rounds.
    pub fn compute(
        int_count: u32,
        real_count: u32,
        bool_count: u32,
        encoded_char_count: u32,
        capacity: SlotIndex,
    ) -> Self {
        let largest = int_count
            .max(real_count)
            .max(bool_count)
            .max(encoded_char_count);
        let round_count = largest / u32::from(capacity) + 1;
        Self {
            int_count,
            real_count,
            bool_count,
            encoded_char_count,
            round_count,
        }
    }

    /// Largest per-type total, the one that dictates the round count.
    pub fn largest_count(&self) -> u32 {
        self.int_count
            .max(self.real_count)
            .max(self.bool_count)
            .max(self.encoded_char_count)
    }

    /// Stages the record into the metadata partition, one integer per slot
    /// in the documented slot order.
    pub(crate) fn try_stage(
        &self,
        adapter: &mut RoundTransportAdapter<i32>,
    ) -> Result<(), RoundError> {
        for value in [
            self.int_count,
            self.real_count,
            self.bool_count,
            self.encoded_char_count,
            self.round_count,
        ] {
            adapter.try_write_scalar(value as i32)?;
        }
        Ok(())
    }

    /// Extracts the record from a delivered metadata partition; `None`
    /// until every metadata slot is present locally.
    pub(crate) fn try_extract(
        key: PartitionKey,
        transport: &impl BroadcastTransport,
    ) -> Option<Self> {
        let mut values = [0u32; METADATA_SLOTS as usize];
        for (slot, value) in values.iter_mut().enumerate() {
            match transport.read_scalar(key, slot as SlotIndex)? {
                ScalarValue::Int(inner) => *value = inner as u32,
                _ => return None,
            }
        }
        Some(Self {
            int_count: values[0],
            real_count: values[1],
            bool_count: values[2],
            encoded_char_count: values[3],
            round_count: values[4],
        })
    }
}

/// Cumulative per-type counts of elements moved so far this transfer.
/// Reset at transfer start, monotonically increasing, and equal to the
/// metadata counts once the final round completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RoundCounters {
    pub ints: u32,
    pub reals: u32,
    pub bools: u32,
    pub chars: u32,
}
