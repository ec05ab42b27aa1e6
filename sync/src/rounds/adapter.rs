use super::error::RoundError;
use crate::transport::broadcast::{BroadcastTransport, PartitionKey, Scalar};
use crate::types::SlotIndex;

/// Bounded, indexed, single-round write/read surface over one partition of
/// the broadcast transport, for exactly one scalar type. Writes stage
/// values against increasing slot indices; `publish()` is the operation
/// through which staged data actually crosses participant boundaries.
pub struct RoundTransportAdapter<T: Scalar> {
    key: PartitionKey,
    capacity: SlotIndex,
    staged: Vec<T>,
    read_index: SlotIndex,
}

impl<T: Scalar> RoundTransportAdapter<T> {
    pub fn new(key: PartitionKey, capacity: SlotIndex) -> Self {
        Self {
            key,
            capacity,
            staged: Vec::new(),
            read_index: 0,
        }
    }

    pub fn key(&self) -> PartitionKey {
        self.key
    }

    pub fn capacity(&self) -> SlotIndex {
        self.capacity
    }

    /// Slots written this round.
    pub fn written(&self) -> SlotIndex {
        self.staged.len() as SlotIndex
    }

    /// Slots read back this round.
    pub fn read_count(&self) -> SlotIndex {
        self.read_index
    }

    pub fn try_write_scalar(&mut self, value: T) -> Result<(), RoundError> {
        if self.staged.len() >= usize::from(self.capacity) {
            return Err(RoundError::CapacityExceeded {
                key: self.key,
                capacity: self.capacity,
            });
        }
        self.staged.push(value);
        Ok(())
    }

    /// # Panics
    /// Panics past the round capacity. For the checked version, use
    /// `try_write_scalar`.
    pub fn write_scalar(&mut self, value: T) {
        self.try_write_scalar(value)
            .expect("round write exceeded the partition's slot capacity");
    }

    pub fn try_read_scalar(
        &mut self,
        transport: &impl BroadcastTransport,
    ) -> Result<T, RoundError> {
        if usize::from(self.read_index) >= usize::from(self.capacity) {
            return Err(RoundError::CapacityExceeded {
                key: self.key,
                capacity: self.capacity,
            });
        }
        let slot = self.read_index;
        let Some(value) = transport.read_scalar(self.key, slot) else {
            return Err(RoundError::NotYetPresent {
                key: self.key,
                slot,
            });
        };
        let Some(typed) = T::from_value(value) else {
            return Err(RoundError::TypeMismatch {
                key: self.key,
                expected: T::KIND,
                found: value.kind(),
            });
        };
        self.read_index += 1;
        Ok(typed)
    }

    /// # Panics
    /// Panics on an undelivered slot, a wrong-kind value, or a read past
    /// the round capacity. For the checked version, use `try_read_scalar`.
    pub fn read_scalar(&mut self, transport: &impl BroadcastTransport) -> T {
        self.try_read_scalar(transport)
            .expect("round read failed against the partition")
    }

    /// Whether the next slot to read has been delivered locally.
    pub fn next_present(&self, transport: &impl BroadcastTransport) -> bool {
        transport.has_scalar(self.key, self.read_index)
    }

    /// Broadcasts every written slot for this round, in increasing index
    /// order.
    pub fn publish(&self, transport: &mut impl BroadcastTransport) {
        for (slot, value) in self.staged.iter().enumerate() {
            transport.publish_scalar(self.key, slot as SlotIndex, value.into_value());
        }
    }

    /// Clears write/read indices and the partition's backing storage ahead
    /// of a new round. Keyed storage is reused across rounds and would
    /// otherwise leak stale values forward.
    pub fn reset(&mut self, transport: &mut impl BroadcastTransport) {
        self.staged.clear();
        self.read_index = 0;
        transport.clear_partition(self.key);
    }
}
