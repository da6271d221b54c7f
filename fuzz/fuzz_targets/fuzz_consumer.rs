#![no_main]

use bytemodem::{
    ConsumeError, ConsumptionResult, MemorySource, Proceed, ProcessingResult, ReadStatus,
    StateProcessor, StreamingConsumer, WireReader,
};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

const HEADER: usize = 8; // split seed

#[derive(Debug, Clone, Copy)]
enum Width {
    U8,
    U16,
    U32,
    U64,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Tag,
    TagResume,
    Int(Width),
    IntResume(Width),
    Len,
    LenResume,
    Data(usize),
    DataResume,
}

/// Decodes the self-describing tagged format: a tag byte selects the
/// primitive, fragments carry a one-byte length prefix. Every byte string
/// is a valid stream prefix.
struct Tagged {
    state: State,
    published: Vec<(u8, u64, Bytes)>,
}

impl Tagged {
    fn new() -> Self {
        Self {
            state: State::Tag,
            published: Vec::new(),
        }
    }

    fn dispatch(&mut self, tag: u8) {
        self.state = match tag % 5 {
            0 => State::Int(Width::U8),
            1 => State::Int(Width::U16),
            2 => State::Int(Width::U32),
            3 => State::Int(Width::U64),
            _ => State::Len,
        };
    }

    fn publish_int(&mut self, width: Width, reader: &WireReader) {
        let value = match width {
            Width::U8 => u64::from(reader.last_u8),
            Width::U16 => u64::from(reader.last_u16),
            Width::U32 => u64::from(reader.last_u32),
            Width::U64 => reader.last_u64,
        };
        self.published.push((0, value, Bytes::new()));
        self.state = State::Tag;
    }
}

impl StateProcessor for Tagged {
    fn process_state(
        &mut self,
        data: &mut Bytes,
        reader: &mut WireReader,
    ) -> Result<ProcessingResult, ConsumeError> {
        match self.state {
            State::Tag => match reader.read_u8(data) {
                ReadStatus::Ready => {
                    let tag = reader.last_u8;
                    self.dispatch(tag);
                }
                ReadStatus::Waiting => self.state = State::TagResume,
            },
            State::TagResume => {
                let tag = reader.last_u8;
                self.dispatch(tag);
            }
            State::Int(width) => {
                let status = match width {
                    Width::U8 => reader.read_u8(data),
                    Width::U16 => reader.read_u16(data),
                    Width::U32 => reader.read_u32(data),
                    Width::U64 => reader.read_u64(data),
                };
                match status {
                    ReadStatus::Ready => self.publish_int(width, reader),
                    ReadStatus::Waiting => self.state = State::IntResume(width),
                }
            }
            State::IntResume(width) => self.publish_int(width, reader),
            State::Len => match reader.read_u8(data) {
                ReadStatus::Ready => self.state = State::Data(usize::from(reader.last_u8)),
                ReadStatus::Waiting => self.state = State::LenResume,
            },
            State::LenResume => self.state = State::Data(usize::from(reader.last_u8)),
            State::Data(len) => match reader.read_bytes(data, len) {
                ReadStatus::Ready => {
                    self.published.push((1, 0, reader.take_bytes()));
                    self.state = State::Tag;
                }
                ReadStatus::Waiting => self.state = State::DataResume,
            },
            State::DataResume => {
                self.published.push((1, 0, reader.take_bytes()));
                self.state = State::Tag;
            }
        }
        Ok(Proceed::Yes.into())
    }

    fn non_consuming(&self) -> bool {
        matches!(
            self.state,
            State::TagResume | State::IntResume(_) | State::LenResume | State::DataResume
        )
    }

    fn verify_end_state(&mut self) -> Result<(), ConsumeError> {
        Ok(())
    }
}

fn run(payload: &Bytes, chunks: Vec<Bytes>) -> Vec<(u8, u64, Bytes)> {
    let mut consumer = StreamingConsumer::new(
        MemorySource::default(),
        Tagged::new(),
        0,
        payload.len() as u64,
    );
    for chunk in chunks {
        match consumer.feed(chunk).expect("tagged format never errors") {
            ConsumptionResult::Continue => {}
            ConsumptionResult::Stop { .. } => break,
            ConsumptionResult::Skip(_) => unreachable!("tagged format never skips"),
        }
    }
    std::mem::take(&mut consumer.processor_mut().published)
}

/// Split `payload` into boundary-arbitrary chunks using a deterministic
/// seed. Every chunk is at least one byte.
fn split_chunks(payload: &Bytes, split_seed: u64) -> Vec<Bytes> {
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < payload.len() {
        let remaining = payload.len() - start;
        let size = (split_seed as usize % remaining) + 1;
        chunks.push(payload.slice(start..start + size));
        start += size;
    }
    chunks
}

fuzz_target!(|data: &[u8]| {
    if data.len() < HEADER {
        return;
    }
    let split_seed = u64::from_le_bytes(data[..HEADER].try_into().unwrap());
    let payload = Bytes::copy_from_slice(&data[HEADER..]);
    if payload.is_empty() {
        return;
    }

    // The published sequence must not depend on how the stream is sliced.
    let reference = run(&payload, vec![payload.clone()]);
    let split = run(&payload, split_chunks(&payload, split_seed));
    assert_eq!(reference, split);
});
