use bytes::Bytes;
use quickcheck::QuickCheck;

use super::fixtures::{Published, SelfDescribing};
use crate::{ConsumptionResult, MemorySource, StreamingConsumer, produce_chunks};

fn run_split(payload: &Bytes, chunks: Vec<Bytes>) -> (Vec<Published>, usize) {
    let mut consumer = StreamingConsumer::new(
        MemorySource::default(),
        SelfDescribing::default(),
        0,
        payload.len() as u64,
    );
    for chunk in chunks {
        match consumer.feed(chunk).expect("consumption failed") {
            ConsumptionResult::Continue => {}
            ConsumptionResult::Stop { .. } => break,
            ConsumptionResult::Skip(_) => unreachable!("the tagged format never skips"),
        }
    }
    let p = consumer.processor();
    (p.published.clone(), p.end_states)
}

/// Property: for any byte sequence and any partition of it into buffers
/// (1-byte buffers included), the values published to the processor are
/// identical to the single-buffer case, and the end state is verified
/// exactly once.
#[test]
fn partition_invariance_quickcheck() {
    fn prop(payload: Vec<u8>, splits: Vec<usize>) -> bool {
        if payload.is_empty() {
            return true;
        }
        let payload = Bytes::from(payload);
        let (reference, reference_ends) = run_split(&payload, vec![payload.clone()]);

        // Partition the payload into arbitrarily sized chunks derived
        // from `splits`.
        let mut chunks = Vec::new();
        let mut idx = 0;
        let mut remaining = payload.len();
        for s in splits {
            if remaining == 0 {
                break;
            }
            let size = 1 + (s % remaining);
            chunks.push(payload.slice(idx..idx + size));
            idx += size;
            remaining -= size;
        }
        if remaining > 0 {
            chunks.push(payload.slice(idx..));
        }
        let (split, split_ends) = run_split(&payload, chunks);

        reference == split && reference_ends == 1 && split_ends == 1
    }

    let tests = if cfg!(feature = "test-fast") {
        100
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    };

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>) -> bool);
}

/// A fixed tagged stream delivered one byte at a time publishes the same
/// values as the single-buffer run.
#[test]
fn one_byte_delivery_matches_single_buffer() {
    // tag 1 -> u16 0xABCD, tag 4 -> 3-byte fragment "abc", tag 0 -> u8 0x7F
    let payload = Bytes::from_static(&[
        0x01, 0xAB, 0xCD, 0x04, 0x03, b'a', b'b', b'c', 0x00, 0x7F,
    ]);
    let expected = vec![
        Published::Int(0xABCD),
        Published::Bytes(Bytes::from_static(b"abc")),
        Published::Int(0x7F),
    ];

    let (single, _) = run_split(&payload, vec![payload.clone()]);
    assert_eq!(single, expected);

    let (one_by_one, ends) = run_split(&payload, produce_chunks(&payload, payload.len()));
    assert_eq!(one_by_one, expected);
    assert_eq!(ends, 1);
}
