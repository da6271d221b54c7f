//! Benchmark – `bytemodem::StreamingConsumer`
#![allow(missing_docs)]

use std::time::Duration;

use bytemodem::{
    ConsumeError, ConsumptionResult, MemorySource, Proceed, ProcessingResult, ReadStatus,
    StateProcessor, StreamingConsumer, WireReader, produce_chunks,
};
use bytes::{BufMut, Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

#[derive(Debug, Clone, Copy)]
enum State {
    KeyLen,
    KeyLenResume,
    Key(usize),
    KeyResume,
    Offset,
    OffsetResume,
}

/// The shape of a typical index reader: `u16 key_len, key, u64 offset`,
/// repeated until the window ends.
struct IndexProcessor {
    state: State,
    entries: usize,
}

impl IndexProcessor {
    fn new() -> Self {
        Self {
            state: State::KeyLen,
            entries: 0,
        }
    }
}

impl StateProcessor for IndexProcessor {
    fn process_state(
        &mut self,
        data: &mut Bytes,
        reader: &mut WireReader,
    ) -> Result<ProcessingResult, ConsumeError> {
        match self.state {
            State::KeyLen => match reader.read_u16(data) {
                ReadStatus::Ready => self.state = State::Key(usize::from(reader.last_u16)),
                ReadStatus::Waiting => self.state = State::KeyLenResume,
            },
            State::KeyLenResume => self.state = State::Key(usize::from(reader.last_u16)),
            State::Key(len) => match reader.read_bytes(data, len) {
                ReadStatus::Ready => {
                    black_box(reader.take_bytes());
                    self.state = State::Offset;
                }
                ReadStatus::Waiting => self.state = State::KeyResume,
            },
            State::KeyResume => {
                black_box(reader.take_bytes());
                self.state = State::Offset;
            }
            State::Offset => match reader.read_u64(data) {
                ReadStatus::Ready => {
                    black_box(reader.last_u64);
                    self.entries += 1;
                    self.state = State::KeyLen;
                }
                ReadStatus::Waiting => self.state = State::OffsetResume,
            },
            State::OffsetResume => {
                black_box(reader.last_u64);
                self.entries += 1;
                self.state = State::KeyLen;
            }
        }
        Ok(Proceed::Yes.into())
    }

    fn non_consuming(&self) -> bool {
        matches!(
            self.state,
            State::KeyLenResume | State::KeyResume | State::OffsetResume
        )
    }

    fn verify_end_state(&mut self) -> Result<(), ConsumeError> {
        Ok(())
    }
}

/// Produce a deterministic entry payload of at least `target_len` bytes.
fn make_payload(target_len: usize) -> Bytes {
    let mut payload = BytesMut::with_capacity(target_len + 64);
    let mut i = 0u64;
    while payload.len() < target_len {
        let key = format!("key-{i:012}");
        payload.put_u16(key.len() as u16);
        payload.put_slice(key.as_bytes());
        payload.put_u64(i * 4096);
        i += 1;
    }
    payload.freeze()
}

/// Feed the payload split into `parts` chunks, returning the number of
/// decoded entries so Criterion can black-box the work.
fn run_consumer(payload: &Bytes, parts: usize) -> usize {
    let mut consumer = StreamingConsumer::new(
        MemorySource::default(),
        IndexProcessor::new(),
        0,
        payload.len() as u64,
    );
    for chunk in produce_chunks(payload, parts) {
        match consumer.feed(chunk).expect("payload is well-formed") {
            ConsumptionResult::Continue => {}
            ConsumptionResult::Stop { .. } => break,
            ConsumptionResult::Skip(_) => unreachable!("index entries never skip"),
        }
    }
    consumer.processor().entries
}

fn bench_consume_split(c: &mut Criterion) {
    let payload = make_payload(256 * 1024);

    let mut group = c.benchmark_group("consume_split");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for &parts in &[1usize, 64, 4_096, 65_536] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| {
                let entries = run_consumer(black_box(&payload), parts);
                black_box(entries);
            });
        });
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_consume_split }
criterion_main!(benches);
