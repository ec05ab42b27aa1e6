use groupcast_test::helpers::{build_group, drive};

use groupcast_sync::{StagingBuffer, TransferConfig, TransferOutcome};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn multi_round_payload() -> StagingBuffer {
    let mut payload = StagingBuffer::new();
    for value in 0..12 {
        payload.write_int(value);
    }
    payload.write_string("never fully delivered".to_string());
    payload
}

#[test]
fn test_source_departing_mid_transfer_aborts_every_receiver() {
    init_logging();

    let mut group = build_group(2, 3, 1, multi_round_payload(), TransferConfig::default());

    // run the group until each receiver has a completed round behind it,
    // then pull the source out before the transfer can finish
    let mut passes = 0;
    while group.coordinators[1..]
        .iter()
        .any(|coordinator| coordinator.completed_rounds() < 1)
    {
        for coordinator in group.coordinators.iter_mut() {
            coordinator.step().unwrap();
        }
        passes += 1;
        assert!(passes < 10_000, "group never completed its first round");
    }
    let round_count = group.coordinators[1].metadata().unwrap().round_count;
    assert!(round_count > 2);

    group.network.depart(1);
    drive(&mut group.coordinators[1..]);

    for capture in &group.captures[1..] {
        let captured = capture.borrow();
        assert_eq!(captured.outcome, Some(TransferOutcome::Aborted));
        // partially transferred data is discarded, not surfaced
        assert!(captured.ints.is_empty());
        assert!(captured.strings.is_empty());
    }
    for coordinator in &group.coordinators[1..] {
        assert!(coordinator.completed_rounds() < round_count);
    }
}

#[test]
fn test_departure_before_metadata_aborts_immediately() {
    init_logging();

    let mut group = build_group(4, 2, 1, multi_round_payload(), TransferConfig::default());
    group.network.depart(1);

    drive(&mut group.coordinators[1..]);

    let captured = group.captures[1].borrow();
    assert_eq!(captured.outcome, Some(TransferOutcome::Aborted));
    assert_eq!(group.coordinators[1].completed_rounds(), 0);
}

#[test]
fn test_receiver_departure_does_not_stop_the_rest() {
    init_logging();

    let mut group = build_group(3, 3, 1, multi_round_payload(), TransferConfig::default());

    // participant 3 drops out before anything happens; the remaining
    // participants still complete
    group.network.depart(3);
    drive(&mut group.coordinators[..2]);

    for capture in &group.captures[..2] {
        let captured = capture.borrow();
        assert_eq!(captured.outcome, Some(TransferOutcome::Success));
        assert_eq!(captured.ints, (0..12).collect::<Vec<i32>>());
        assert_eq!(
            captured.strings,
            vec!["never fully delivered".to_string()]
        );
    }
}
