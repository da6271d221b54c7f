#![allow(missing_docs)]
#![allow(dead_code)]

use core::mem;

use bytemodem::{
    ConsumeError, Proceed, ProcessingResult, ReadStatus, StateProcessor, StreamingConsumer,
    WireReader,
};
use bytes::{BufMut, Bytes, BytesMut};

#[derive(Debug, Clone, Copy)]
enum State {
    KeyLen,
    KeyLenResume,
    Key(usize),
    KeyResume,
    Offset,
    OffsetResume,
}

/// Parses a run of index entries: `u16 key_len, key bytes, u64 offset`,
/// repeated until the window ends.
pub struct IndexProcessor {
    state: State,
    key: Bytes,
    pub entries: Vec<(Bytes, u64)>,
}

impl Default for IndexProcessor {
    fn default() -> Self {
        Self {
            state: State::KeyLen,
            key: Bytes::new(),
            entries: Vec::new(),
        }
    }
}

impl IndexProcessor {
    fn push_entry(&mut self, offset: u64) {
        let key = mem::take(&mut self.key);
        self.entries.push((key, offset));
        self.state = State::KeyLen;
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
                    self.key = reader.take_bytes();
                    self.state = State::Offset;
                }
                ReadStatus::Waiting => self.state = State::KeyResume,
            },
            State::KeyResume => {
                self.key = reader.take_bytes();
                self.state = State::Offset;
            }
            State::Offset => match reader.read_u64(data) {
                ReadStatus::Ready => {
                    let offset = reader.last_u64;
                    self.push_entry(offset);
                }
                ReadStatus::Waiting => self.state = State::OffsetResume,
            },
            State::OffsetResume => {
                let offset = reader.last_u64;
                self.push_entry(offset);
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
        match self.state {
            State::KeyLen => Ok(()),
            _ => Err(ConsumeError::malformed("truncated index entry")),
        }
    }
}

/// Serialized size of one entry produced by [`build_entries`].
pub const ENTRY_SIZE: usize = 2 + 9 + 8;

/// Build `count` index entries with fixed-width keys, returning the wire
/// payload and the expected decode.
pub fn build_entries(count: usize) -> (Bytes, Vec<(Bytes, u64)>) {
    let mut payload = BytesMut::new();
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let key = format!("key-{i:05}");
        payload.put_u16(key.len() as u16);
        payload.put_slice(key.as_bytes());
        payload.put_u64(i as u64 * 4096);
        entries.push((Bytes::from(key.into_bytes()), i as u64 * 4096));
    }
    (payload.freeze(), entries)
}

#[test]
fn build_entries_round_trips_through_feed() {
    let (payload, expected) = build_entries(8);
    assert_eq!(payload.len(), 8 * ENTRY_SIZE);

    let mut consumer = StreamingConsumer::new(
        bytemodem::MemorySource::default(),
        IndexProcessor::default(),
        0,
        payload.len() as u64,
    );
    consumer.feed(payload).unwrap();
    assert_eq!(consumer.processor().entries, expected);
    assert!(consumer.eof());
}
