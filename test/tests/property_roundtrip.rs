use proptest::collection::vec;
use proptest::prelude::*;

use groupcast_serde::{Base64Decoder, Base64Encoder};
use groupcast_sync::{BufferMode, StagingBuffer, TransferConfig, TransferOutcome};
use groupcast_test::helpers::{build_group, drive};

proptest! {
    #[test]
    fn base64_round_trips_any_byte_stream(
        bytes in vec(any::<u8>(), 0..512),
        chunk_len in 1usize..96,
    ) {
        let mut encoder = Base64Encoder::new(chunk_len);
        for &byte in &bytes {
            encoder.write_byte(byte);
        }
        encoder.encode();

        let mut decoder = Base64Decoder::new();
        while let Some(chunk) = encoder.pop_chunk() {
            prop_assert!(chunk.len() <= chunk_len);
            decoder.push_chunk(&chunk);
        }
        decoder.decode();

        let mut output = decoder.take_output();
        let mut round_tripped = Vec::new();
        while output.remaining() > 0 {
            round_tripped.push(output.read_byte());
        }
        prop_assert_eq!(round_tripped, bytes);
    }

    #[test]
    fn staging_reads_reproduce_writes_in_order(
        ints in vec(any::<i32>(), 0..32),
        reals in vec(-1.0e6f32..1.0e6, 0..32),
        bools in vec(any::<bool>(), 0..32),
        strings in vec("[ -~]{0,24}", 0..8),
    ) {
        let mut buffer = StagingBuffer::new();
        for &value in &ints {
            buffer.write_int(value);
        }
        for &value in &reals {
            buffer.write_real(value);
        }
        for &value in &bools {
            buffer.write_bool(value);
        }
        for value in &strings {
            buffer.write_string(value.clone());
        }

        buffer.set_mode(BufferMode::Read);
        for &value in &ints {
            prop_assert_eq!(buffer.read_int(), value);
        }
        for &value in &reals {
            prop_assert_eq!(buffer.read_real(), value);
        }
        for &value in &bools {
            prop_assert_eq!(buffer.read_bool(), value);
        }
        for value in &strings {
            prop_assert_eq!(&buffer.read_string(), value);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn group_transfer_round_trips_any_payload(
        ints in vec(any::<i32>(), 0..40),
        reals in vec(-1.0e6f32..1.0e6, 0..40),
        bools in vec(any::<bool>(), 0..40),
        strings in vec("[ -~]{0,48}", 0..6),
        capacity in 1u16..16,
    ) {
        let mut payload = StagingBuffer::new();
        for &value in &ints {
            payload.write_int(value);
        }
        for &value in &reals {
            payload.write_real(value);
        }
        for &value in &bools {
            payload.write_bool(value);
        }
        for value in &strings {
            payload.write_string(value.clone());
        }

        let config = TransferConfig {
            work_slice: 7,
            max_chunk_len: 11,
        };
        let mut group = build_group(capacity, 3, 1, payload, config);
        drive(&mut group.coordinators);

        for capture in &group.captures {
            let captured = capture.borrow();
            prop_assert_eq!(captured.outcome, Some(TransferOutcome::Success));
            prop_assert_eq!(&captured.ints, &ints);
            prop_assert_eq!(&captured.reals, &reals);
            prop_assert_eq!(&captured.bools, &bools);
            prop_assert_eq!(&captured.strings, &strings);
        }
    }
}
