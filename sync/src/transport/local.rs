use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use log::trace;

use super::broadcast::{BroadcastTransport, PartitionKey, ScalarValue};
use crate::types::{ParticipantId, SlotIndex};

/// In-memory broadcast implementation. Routes published scalars between
/// participants without network I/O: publishes append to one globally
/// ordered log, and each participant ingests the log into its own replica
/// when it polls the delivery barrier. That keeps a participant's view
/// stable between barrier polls, exactly the property the round mechanics
/// rely on.
struct Shared {
    capacity: SlotIndex,
    log: Vec<(PartitionKey, SlotIndex, ScalarValue)>,
    replicas: HashMap<ParticipantId, HashMap<(PartitionKey, SlotIndex), ScalarValue>>,
    observed: HashMap<ParticipantId, usize>,
    present: HashSet<ParticipantId>,
}

impl Shared {
    fn ingest(&mut self, participant: ParticipantId) {
        let seen = self.observed.get(&participant).copied().unwrap_or(0);
        if seen < self.log.len() {
            let fresh: Vec<_> = self.log[seen..].to_vec();
            let replica = self.replicas.entry(participant).or_default();
            for (key, slot, value) in fresh {
                replica.insert((key, slot), value);
            }
            self.observed.insert(participant, self.log.len());
        }
    }
}

/// The group-wide side of the in-memory transport. `join()` hands out one
/// [`LocalBroadcast`] per participant; all handles share the same ordered
/// log.
pub struct LocalBroadcastNetwork {
    shared: Arc<Mutex<Shared>>,
}

impl LocalBroadcastNetwork {
    pub fn new(capacity: SlotIndex) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                capacity,
                log: Vec::new(),
                replicas: HashMap::new(),
                observed: HashMap::new(),
                present: HashSet::new(),
            })),
        }
    }

    /// Adds `participant` to the group and returns its transport handle.
    /// A participant observes only what is published after it joins.
    pub fn join(&self, participant: ParticipantId) -> LocalBroadcast {
        let mut shared = lock(&self.shared);
        shared.present.insert(participant);
        shared.replicas.entry(participant).or_default();
        let already_published = shared.log.len();
        shared.observed.insert(participant, already_published);
        trace!("participant {} joined the local group", participant);
        LocalBroadcast {
            local: participant,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Removes `participant` from the group. Its handle stays valid but the
    /// delivery barrier stops waiting on it.
    pub fn depart(&self, participant: ParticipantId) {
        let mut shared = lock(&self.shared);
        shared.present.remove(&participant);
        trace!("participant {} departed the local group", participant);
    }

    pub fn present_count(&self) -> usize {
        lock(&self.shared).present.len()
    }
}

/// One participant's handle onto the in-memory broadcast group.
pub struct LocalBroadcast {
    local: ParticipantId,
    shared: Arc<Mutex<Shared>>,
}

fn lock(shared: &Arc<Mutex<Shared>>) -> MutexGuard<'_, Shared> {
    shared.lock().expect("local broadcast state poisoned")
}

impl BroadcastTransport for LocalBroadcast {
    fn slot_capacity(&self) -> SlotIndex {
        lock(&self.shared).capacity
    }

    fn publish_scalar(&mut self, key: PartitionKey, slot: SlotIndex, value: ScalarValue) {
        let mut shared = lock(&self.shared);
        shared.log.push((key, slot, value));
        trace!(
            "participant {} published {:?} slot {}",
            self.local,
            key,
            slot
        );
    }

    fn has_scalar(&self, key: PartitionKey, slot: SlotIndex) -> bool {
        lock(&self.shared)
            .replicas
            .get(&self.local)
            .is_some_and(|replica| replica.contains_key(&(key, slot)))
    }

    fn read_scalar(&self, key: PartitionKey, slot: SlotIndex) -> Option<ScalarValue> {
        lock(&self.shared)
            .replicas
            .get(&self.local)?
            .get(&(key, slot))
            .copied()
    }

    fn clear_partition(&mut self, key: PartitionKey) {
        let mut shared = lock(&self.shared);
        if let Some(replica) = shared.replicas.get_mut(&self.local) {
            replica.retain(|(stored, _), _| *stored != key);
        }
    }

    fn synchronized(&mut self, _source: ParticipantId) -> bool {
        let mut shared = lock(&self.shared);
        shared.ingest(self.local);
        let published = shared.log.len();
        shared
            .present
            .iter()
            .all(|participant| shared.observed.get(participant).copied().unwrap_or(0) == published)
    }

    fn is_present(&self, participant: ParticipantId) -> bool {
        lock(&self.shared).present.contains(&participant)
    }

    fn local_participant(&self) -> ParticipantId {
        self.local
    }
}
