use log::{info, trace, warn};

use crate::constants::{DEFAULT_MAX_CHUNK_LEN, DEFAULT_WORK_SLICE, METADATA_SLOTS};
use crate::rounds::adapter::RoundTransportAdapter;
use crate::rounds::error::RoundError;
use crate::rounds::string_codec::StringCodecAdapter;
use crate::staging::buffer::{BufferMode, StagingBuffer};
use crate::transfer::error::TransferError;
use crate::transfer::metadata::{RoundCounters, TransferMetadata};
use crate::transport::broadcast::{BroadcastTransport, Lane, PartitionKey};
use crate::types::{ParticipantId, RoundIndex, TransferId, TransferRole};

/// Tuning knobs for one transfer.
#[derive(Clone, Copy, Debug)]
pub struct TransferConfig {
    /// Elements moved per `step()` call before control returns to the host
    /// scheduler.
    pub work_slice: usize,
    /// Longest printable chunk the base64 encoder may emit.
    pub max_chunk_len: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            work_slice: DEFAULT_WORK_SLICE,
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
        }
    }
}

/// Where a transfer stands in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferState {
    Preparing,
    SendingRound,
    Finished,
}

/// How a transfer ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    Aborted,
}

/// What one `step()` call accomplished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// Progress was made; call `step()` again.
    Working,
    /// Blocked on the delivery barrier or on undelivered slots; call
    /// `step()` again on a later scheduling tick.
    Waiting,
    /// The transfer ended with this outcome. Further steps are no-ops.
    Finished(TransferOutcome),
}

/// Invoked exactly once when the transfer finishes. On `Success` the
/// staging buffer is readable and holds the full payload in write order; on
/// `Aborted` it is empty — partially transferred data carries no guarantee
/// and is discarded. Read everything needed inside the callback: the buffer
/// is torn down with the coordinator.
pub type CompletionCallback = Box<dyn FnOnce(TransferOutcome, &mut StagingBuffer)>;

// Sub-state inside SendingRound. Every transition is a safe suspension
// point: the data in flight is exclusively owned by this transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RoundPhase {
    Start,
    Drain,
    AwaitDelivery,
    ReadBack,
    Advance,
}

/// Drives one transfer through the broadcast transport: computes and
/// publishes the metadata record, then runs `round_count` bounded rounds of
/// drain / publish / barrier / read-back, and finishes by handing the
/// reconstructed payload to the completion callback.
///
/// A departed source is the only expected runtime failure: it is checked at
/// metadata exchange, at the start of every round, and whenever a receiver
/// waits at the delivery barrier, and surfaces as an `Aborted` outcome
/// through the callback, never as an error. A
/// non-source participant departing instead leaves that participant's
/// transfer unfinished while the rest of the group completes; no timeout is
/// imposed here.
pub struct SynchronizationCoordinator<B: BroadcastTransport> {
    transport: B,
    transfer: TransferId,
    source: ParticipantId,
    role: TransferRole,
    config: TransferConfig,
    staging: StagingBuffer,
    state: TransferState,
    phase: RoundPhase,
    outcome: Option<TransferOutcome>,
    metadata: Option<TransferMetadata>,
    moved: RoundCounters,
    completed_rounds: RoundIndex,
    ints: RoundTransportAdapter<i32>,
    reals: RoundTransportAdapter<f32>,
    bools: RoundTransportAdapter<bool>,
    chars: RoundTransportAdapter<i32>,
    meta: RoundTransportAdapter<i32>,
    string_codec: StringCodecAdapter,
    on_complete: Option<CompletionCallback>,
}

impl<B: BroadcastTransport> SynchronizationCoordinator<B> {
    /// Builds the coordinator for one transfer. On the source, `staging`
    /// holds the populated payload; on every other participant it starts
    /// empty and is filled by the transfer.
    ///
    /// # Panics
    /// Panics if the transport reports a zero-slot round capacity.
    pub fn new(
        transport: B,
        transfer: TransferId,
        source: ParticipantId,
        staging: StagingBuffer,
        config: TransferConfig,
        on_complete: CompletionCallback,
    ) -> Self {
        let capacity = transport.slot_capacity();
        if capacity == 0 {
            panic!("broadcast transport reports a zero-slot round capacity");
        }
        let role = if transport.local_participant() == source {
            TransferRole::Source
        } else {
            TransferRole::Receiver
        };
        Self {
            ints: RoundTransportAdapter::new(PartitionKey::new(transfer, Lane::Int), capacity),
            reals: RoundTransportAdapter::new(PartitionKey::new(transfer, Lane::Real), capacity),
            bools: RoundTransportAdapter::new(PartitionKey::new(transfer, Lane::Bool), capacity),
            chars: RoundTransportAdapter::new(
                PartitionKey::new(transfer, Lane::EncodedChars),
                capacity,
            ),
            meta: RoundTransportAdapter::new(
                PartitionKey::new(transfer, Lane::Metadata),
                METADATA_SLOTS,
            ),
            string_codec: StringCodecAdapter::new(config.max_chunk_len),
            transport,
            transfer,
            source,
            role,
            config,
            staging,
            state: TransferState::Preparing,
            phase: RoundPhase::Start,
            outcome: None,
            metadata: None,
            moved: RoundCounters::default(),
            completed_rounds: 0,
            on_complete: Some(on_complete),
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn role(&self) -> TransferRole {
        self.role
    }

    pub fn completed_rounds(&self) -> RoundIndex {
        self.completed_rounds
    }

    /// The negotiated record, once computed (source) or adopted (others).
    pub fn metadata(&self) -> Option<TransferMetadata> {
        self.metadata
    }

    /// Performs one bounded slice of work.
    pub fn step(&mut self) -> Result<StepStatus, TransferError> {
        match self.state {
            TransferState::Preparing => self.step_preparing(),
            TransferState::SendingRound => match self.phase {
                RoundPhase::Start => self.round_start(),
                RoundPhase::Drain => self.round_drain(),
                RoundPhase::AwaitDelivery => self.round_await(),
                RoundPhase::ReadBack => self.round_read_back(),
                RoundPhase::Advance => self.round_advance(),
            },
            TransferState::Finished => Ok(StepStatus::Finished(
                self.outcome.expect("finished transfer has an outcome"),
            )),
        }
    }

    /// Drives `step()` until the transfer finishes. Only suitable when the
    /// delivery barrier can be satisfied without yielding to other local
    /// work — e.g. a single-participant group, or a transport whose other
    /// participants progress on their own. Cooperative hosts should call
    /// `step()` from their scheduler instead.
    pub fn run_to_completion(&mut self) -> Result<TransferOutcome, TransferError> {
        loop {
            if let StepStatus::Finished(outcome) = self.step()? {
                return Ok(outcome);
            }
        }
    }

    fn step_preparing(&mut self) -> Result<StepStatus, TransferError> {
        if !self.transport.is_present(self.source) {
            warn!(
                "transfer {}: source {} absent at metadata exchange, aborting",
                self.transfer, self.source
            );
            return Ok(self.finish(TransferOutcome::Aborted));
        }
        if self.role.is_source() {
            // strings serialize up front: their encoded length is part of
            // the record every participant adopts
            self.staging.set_mode(BufferMode::Read);
            let encoded_chars = self.string_codec.encode_strings(&mut self.staging)?;
            self.staging.set_mode(BufferMode::Locked);

            let metadata = TransferMetadata::compute(
                self.staging.int_count() as u32,
                self.staging.real_count() as u32,
                self.staging.bool_count() as u32,
                encoded_chars,
                self.transport.slot_capacity(),
            );
            self.meta.reset(&mut self.transport);
            metadata.try_stage(&mut self.meta)?;
            self.meta.publish(&mut self.transport);
            info!(
                "transfer {}: published metadata {:?} from source {}",
                self.transfer, metadata, self.source
            );
            self.metadata = Some(metadata);
        } else {
            self.staging.clear();
            self.staging.set_mode(BufferMode::Locked);
        }
        self.state = TransferState::SendingRound;
        self.phase = RoundPhase::Start;
        Ok(StepStatus::Working)
    }

    fn round_start(&mut self) -> Result<StepStatus, TransferError> {
        if !self.transport.is_present(self.source) {
            warn!(
                "transfer {}: source {} departed after {} completed round(s), aborting",
                self.transfer, self.source, self.completed_rounds
            );
            return Ok(self.finish(TransferOutcome::Aborted));
        }
        // keyed storage is reused across rounds; stale slots must not leak
        // into this one
        self.ints.reset(&mut self.transport);
        self.reals.reset(&mut self.transport);
        self.bools.reset(&mut self.transport);
        self.chars.reset(&mut self.transport);

        if self.role.is_source() {
            self.staging.set_mode(BufferMode::Read);
            self.phase = RoundPhase::Drain;
        } else {
            self.phase = RoundPhase::AwaitDelivery;
        }
        Ok(StepStatus::Working)
    }

    // Source only: move up to one round capacity of each type out of the
    // staging buffer, then publish.
    fn round_drain(&mut self) -> Result<StepStatus, TransferError> {
        let metadata = self.metadata.expect("source computed metadata before round one");
        let capacity = u32::from(self.transport.slot_capacity());
        let mut budget = self.config.work_slice;

        let int_target = capacity.min(metadata.int_count - self.moved.ints);
        while budget > 0 && u32::from(self.ints.written()) < int_target {
            let value = self.staging.try_read_int()?;
            self.ints.try_write_scalar(value)?;
            budget -= 1;
        }

        let real_target = capacity.min(metadata.real_count - self.moved.reals);
        while budget > 0 && u32::from(self.reals.written()) < real_target {
            let value = self.staging.try_read_real()?;
            self.reals.try_write_scalar(value)?;
            budget -= 1;
        }

        let bool_target = capacity.min(metadata.bool_count - self.moved.bools);
        while budget > 0 && u32::from(self.bools.written()) < bool_target {
            let value = self.staging.try_read_bool()?;
            self.bools.try_write_scalar(value)?;
            budget -= 1;
        }

        let char_target = capacity.min(metadata.encoded_char_count - self.moved.chars);
        while budget > 0 && u32::from(self.chars.written()) < char_target {
            let value = self
                .string_codec
                .pop_char()
                .expect("encoded character stream matches the negotiated count");
            self.chars.try_write_scalar(value)?;
            budget -= 1;
        }

        let drained = u32::from(self.ints.written()) == int_target
            && u32::from(self.reals.written()) == real_target
            && u32::from(self.bools.written()) == bool_target
            && u32::from(self.chars.written()) == char_target;
        if drained {
            self.staging.set_mode(BufferMode::Locked);
            self.ints.publish(&mut self.transport);
            self.reals.publish(&mut self.transport);
            self.bools.publish(&mut self.transport);
            self.chars.publish(&mut self.transport);
            trace!(
                "transfer {}: round {} published ({} ints, {} reals, {} bools, {} chars)",
                self.transfer,
                self.completed_rounds,
                self.ints.written(),
                self.reals.written(),
                self.bools.written(),
                self.chars.written()
            );
            self.phase = RoundPhase::AwaitDelivery;
        }
        Ok(StepStatus::Working)
    }

    fn round_await(&mut self) -> Result<StepStatus, TransferError> {
        let all_observed = self.transport.synchronized(self.source);
        if self.role.is_source() {
            // the source must not clear and reuse the keyed storage until
            // every present participant has observed this round
            if !all_observed {
                return Ok(StepStatus::Waiting);
            }
            self.phase = RoundPhase::Advance;
            return Ok(StepStatus::Working);
        }
        // receivers proceed on their own ingestion; an undelivered slot
        // bounces read-back straight back to this barrier. A departed
        // source can strand a receiver here mid-round, so the abort check
        // applies on re-entry as well as at round start
        if !self.transport.is_present(self.source) {
            warn!(
                "transfer {}: source {} departed at the delivery barrier, aborting",
                self.transfer, self.source
            );
            return Ok(self.finish(TransferOutcome::Aborted));
        }
        if self.metadata.is_none() {
            let Some(metadata) = TransferMetadata::try_extract(self.meta.key(), &self.transport)
            else {
                return Ok(StepStatus::Waiting);
            };
            info!(
                "transfer {}: adopted metadata {:?} from source {}",
                self.transfer, metadata, self.source
            );
            self.metadata = Some(metadata);
        }
        self.staging.set_mode(BufferMode::Write);
        self.phase = RoundPhase::ReadBack;
        Ok(StepStatus::Working)
    }

    // Receivers only: read this round's delivered slots back into the
    // staging buffer (encoded characters into the codec).
    fn round_read_back(&mut self) -> Result<StepStatus, TransferError> {
        let metadata = self.metadata.expect("read-back follows metadata adoption");
        let capacity = u32::from(self.transport.slot_capacity());
        let mut budget = self.config.work_slice;

        let int_target = capacity.min(metadata.int_count - self.moved.ints);
        while budget > 0 && u32::from(self.ints.read_count()) < int_target {
            match self.ints.try_read_scalar(&self.transport) {
                Ok(value) => self.staging.try_write_int(value)?,
                Err(RoundError::NotYetPresent { .. }) => return Ok(self.revisit_barrier()),
                Err(other) => return Err(other.into()),
            }
            budget -= 1;
        }

        let real_target = capacity.min(metadata.real_count - self.moved.reals);
        while budget > 0 && u32::from(self.reals.read_count()) < real_target {
            match self.reals.try_read_scalar(&self.transport) {
                Ok(value) => self.staging.try_write_real(value)?,
                Err(RoundError::NotYetPresent { .. }) => return Ok(self.revisit_barrier()),
                Err(other) => return Err(other.into()),
            }
            budget -= 1;
        }

        let bool_target = capacity.min(metadata.bool_count - self.moved.bools);
        while budget > 0 && u32::from(self.bools.read_count()) < bool_target {
            match self.bools.try_read_scalar(&self.transport) {
                Ok(value) => self.staging.try_write_bool(value)?,
                Err(RoundError::NotYetPresent { .. }) => return Ok(self.revisit_barrier()),
                Err(other) => return Err(other.into()),
            }
            budget -= 1;
        }

        let char_target = capacity.min(metadata.encoded_char_count - self.moved.chars);
        while budget > 0 && u32::from(self.chars.read_count()) < char_target {
            match self.chars.try_read_scalar(&self.transport) {
                Ok(value) => self.string_codec.push_char(value),
                Err(RoundError::NotYetPresent { .. }) => return Ok(self.revisit_barrier()),
                Err(other) => return Err(other.into()),
            }
            budget -= 1;
        }

        let read_back = u32::from(self.ints.read_count()) == int_target
            && u32::from(self.reals.read_count()) == real_target
            && u32::from(self.bools.read_count()) == bool_target
            && u32::from(self.chars.read_count()) == char_target;
        if read_back {
            self.staging.set_mode(BufferMode::Locked);
            self.phase = RoundPhase::Advance;
        }
        Ok(StepStatus::Working)
    }

    // An undelivered slot mid-read means this participant outpaced
    // delivery; fall back to the barrier so the next step ingests what has
    // arrived since.
    fn revisit_barrier(&mut self) -> StepStatus {
        self.phase = RoundPhase::AwaitDelivery;
        StepStatus::Waiting
    }

    fn round_advance(&mut self) -> Result<StepStatus, TransferError> {
        let metadata = self.metadata.expect("advance follows metadata adoption");
        if self.role.is_source() {
            self.moved.ints += u32::from(self.ints.written());
            self.moved.reals += u32::from(self.reals.written());
            self.moved.bools += u32::from(self.bools.written());
            self.moved.chars += u32::from(self.chars.written());
        } else {
            self.moved.ints += u32::from(self.ints.read_count());
            self.moved.reals += u32::from(self.reals.read_count());
            self.moved.bools += u32::from(self.bools.read_count());
            self.moved.chars += u32::from(self.chars.read_count());
        }
        self.completed_rounds += 1;
        trace!(
            "transfer {}: round {}/{} complete",
            self.transfer,
            self.completed_rounds,
            metadata.round_count
        );
        if self.completed_rounds < metadata.round_count {
            self.phase = RoundPhase::Start;
            return Ok(StepStatus::Working);
        }
        self.finalize(metadata)
    }

    fn finalize(&mut self, metadata: TransferMetadata) -> Result<StepStatus, TransferError> {
        debug_assert_eq!(self.moved.ints, metadata.int_count);
        debug_assert_eq!(self.moved.reals, metadata.real_count);
        debug_assert_eq!(self.moved.bools, metadata.bool_count);
        debug_assert_eq!(self.moved.chars, metadata.encoded_char_count);

        if self.role == TransferRole::Receiver {
            self.staging.set_mode(BufferMode::Write);
            self.string_codec.decode_into(&mut self.staging)?;
        }
        self.staging.set_mode(BufferMode::Read);
        self.staging.reset_read();
        info!(
            "transfer {}: complete after {} round(s)",
            self.transfer, self.completed_rounds
        );
        Ok(self.finish(TransferOutcome::Success))
    }

    fn finish(&mut self, outcome: TransferOutcome) -> StepStatus {
        if outcome == TransferOutcome::Aborted {
            // partial data carries no guarantee
            self.staging.clear();
            self.staging.set_mode(BufferMode::Read);
        }
        self.state = TransferState::Finished;
        self.outcome = Some(outcome);
        if let Some(callback) = self.on_complete.take() {
            callback(outcome, &mut self.staging);
        }
        StepStatus::Finished(outcome)
    }
}
