//! Multi-participant transfer fixtures over the in-memory broadcast group.

use std::cell::RefCell;
use std::rc::Rc;

use groupcast_sync::{
    CompletionCallback, LocalBroadcast, LocalBroadcastNetwork, ParticipantId, SlotIndex,
    StagingBuffer, StepStatus, SynchronizationCoordinator, TransferConfig, TransferOutcome,
};

/// Payload snapshot taken inside a completion callback, in write order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapturedPayload {
    pub outcome: Option<TransferOutcome>,
    pub ints: Vec<i32>,
    pub reals: Vec<f32>,
    pub bools: Vec<bool>,
    pub strings: Vec<String>,
}

pub type PayloadCell = Rc<RefCell<CapturedPayload>>;

/// Completion callback that drains the delivered payload into `cell`.
/// Reading happens inside the callback because the buffer is torn down
/// right after it returns.
pub fn capture_into(cell: &PayloadCell) -> CompletionCallback {
    let cell = Rc::clone(cell);
    Box::new(move |outcome, payload| {
        let mut captured = cell.borrow_mut();
        captured.outcome = Some(outcome);
        if outcome == TransferOutcome::Success {
            while payload.has_int() {
                captured.ints.push(payload.read_int());
            }
            while payload.has_real() {
                captured.reals.push(payload.read_real());
            }
            while payload.has_bool() {
                captured.bools.push(payload.read_bool());
            }
            while payload.has_string() {
                captured.strings.push(payload.read_string());
            }
        }
    })
}

/// One broadcast group with a coordinator per participant. Index `i` holds
/// participant `i + 1`.
pub struct TestGroup {
    pub network: LocalBroadcastNetwork,
    pub coordinators: Vec<SynchronizationCoordinator<LocalBroadcast>>,
    pub captures: Vec<PayloadCell>,
}

/// Builds a group of participants `1..=participants`; `source` gets
/// `payload`, everyone else starts empty.
pub fn build_group(
    capacity: SlotIndex,
    participants: ParticipantId,
    source: ParticipantId,
    payload: StagingBuffer,
    config: TransferConfig,
) -> TestGroup {
    let network = LocalBroadcastNetwork::new(capacity);
    let mut payload = Some(payload);
    let mut coordinators = Vec::new();
    let mut captures = Vec::new();
    for participant in 1..=participants {
        let transport = network.join(participant);
        let staging = if participant == source {
            payload.take().expect("exactly one source in the group")
        } else {
            StagingBuffer::new()
        };
        let cell: PayloadCell = Rc::new(RefCell::new(CapturedPayload::default()));
        coordinators.push(SynchronizationCoordinator::new(
            transport,
            42,
            source,
            staging,
            config,
            capture_into(&cell),
        ));
        captures.push(cell);
    }
    TestGroup {
        network,
        coordinators,
        captures,
    }
}

/// Steps every coordinator round-robin until all of them finish. Panics if
/// the group stops making progress.
pub fn drive(coordinators: &mut [SynchronizationCoordinator<LocalBroadcast>]) {
    let mut idle_passes = 0;
    loop {
        let mut all_finished = true;
        let mut any_working = false;
        for coordinator in coordinators.iter_mut() {
            match coordinator.step().expect("transfer step failed") {
                StepStatus::Working => {
                    all_finished = false;
                    any_working = true;
                }
                StepStatus::Waiting => {
                    all_finished = false;
                }
                StepStatus::Finished(_) => {}
            }
        }
        if all_finished {
            return;
        }
        if any_working {
            idle_passes = 0;
        } else {
            idle_passes += 1;
            assert!(idle_passes < 1_000, "transfer group stopped making progress");
        }
    }
}
