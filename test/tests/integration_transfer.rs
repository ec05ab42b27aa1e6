use groupcast_test::helpers::{build_group, drive};

use groupcast_sync::{StagingBuffer, TransferConfig, TransferOutcome, TransferState};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_full_transfer_between_two_participants() {
    init_logging();

    let mut payload = StagingBuffer::new();
    payload.write_int(10);
    payload.write_int(-20);
    payload.write_int(30);
    payload.write_real(1.5);
    payload.write_bool(true);
    payload.write_bool(false);
    payload.write_string("sync me".to_string());

    let mut group = build_group(4, 2, 1, payload, TransferConfig::default());
    drive(&mut group.coordinators);

    // "sync me" is 9 prefixed bytes, 12 encoded characters; at capacity 4
    // the character stream dictates 12 / 4 + 1 = 4 rounds
    let metadata = group.coordinators[0].metadata().unwrap();
    assert_eq!(metadata.int_count, 3);
    assert_eq!(metadata.real_count, 1);
    assert_eq!(metadata.bool_count, 2);
    assert_eq!(metadata.encoded_char_count, 12);
    assert_eq!(metadata.round_count, 4);

    for (coordinator, capture) in group.coordinators.iter().zip(&group.captures) {
        assert_eq!(coordinator.state(), TransferState::Finished);
        assert_eq!(coordinator.completed_rounds(), 4);
        assert_eq!(coordinator.metadata(), Some(metadata));

        let captured = capture.borrow();
        assert_eq!(captured.outcome, Some(TransferOutcome::Success));
        assert_eq!(captured.ints, vec![10, -20, 30]);
        assert_eq!(captured.reals, vec![1.5]);
        assert_eq!(captured.bools, vec![true, false]);
        assert_eq!(captured.strings, vec!["sync me".to_string()]);
    }
}

#[test]
fn test_source_reads_back_its_own_payload_alone() {
    init_logging();

    let mut payload = StagingBuffer::new();
    payload.write_int(7);
    payload.write_string("solo".to_string());

    let mut group = build_group(8, 1, 1, payload, TransferConfig::default());
    let outcome = group.coordinators[0].run_to_completion().unwrap();
    assert_eq!(outcome, TransferOutcome::Success);

    let captured = group.captures[0].borrow();
    assert_eq!(captured.ints, vec![7]);
    assert_eq!(captured.strings, vec!["solo".to_string()]);
}

#[test]
fn test_empty_payload_still_completes_in_one_round() {
    init_logging();

    let mut group = build_group(8, 3, 2, StagingBuffer::new(), TransferConfig::default());
    drive(&mut group.coordinators);

    for (coordinator, capture) in group.coordinators.iter().zip(&group.captures) {
        assert_eq!(coordinator.metadata().unwrap().round_count, 1);
        assert_eq!(coordinator.completed_rounds(), 1);

        let captured = capture.borrow();
        assert_eq!(captured.outcome, Some(TransferOutcome::Success));
        assert!(captured.ints.is_empty());
        assert!(captured.reals.is_empty());
        assert!(captured.bools.is_empty());
        assert!(captured.strings.is_empty());
    }
}

#[test]
fn test_tiny_work_slices_only_change_pacing() {
    init_logging();

    let mut payload = StagingBuffer::new();
    for value in 0..20 {
        payload.write_int(value);
        payload.write_bool(value % 3 == 0);
    }
    payload.write_string("sliced into many steps".to_string());

    let config = TransferConfig {
        work_slice: 1,
        max_chunk_len: 4,
    };
    let mut group = build_group(6, 3, 1, payload, config);
    drive(&mut group.coordinators);

    for capture in &group.captures {
        let captured = capture.borrow();
        assert_eq!(captured.outcome, Some(TransferOutcome::Success));
        assert_eq!(captured.ints, (0..20).collect::<Vec<i32>>());
        assert_eq!(
            captured.bools,
            (0..20).map(|value| value % 3 == 0).collect::<Vec<bool>>()
        );
        assert_eq!(captured.strings, vec!["sliced into many steps".to_string()]);
    }
}
