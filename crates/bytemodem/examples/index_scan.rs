//! Scan a small on-disk index with a `StateProcessor`.
//!
//! Writes a throwaway file of `u16 key_len, key, u64 offset` entries,
//! then drives a consumer over it in deliberately tiny chunks so that
//! reads straddle buffer boundaries.
#![allow(missing_docs)]

use std::io::Write;

use bytemodem::{
    ConsumeError, FileSource, FileSourceOptions, Proceed, ProcessingResult, ReadStatus,
    StateProcessor, StreamingConsumer, WireReader,
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

struct IndexProcessor {
    state: State,
    key: Bytes,
    entries: Vec<(Bytes, u64)>,
}

impl IndexProcessor {
    fn new() -> Self {
        Self {
            state: State::KeyLen,
            key: Bytes::new(),
            entries: Vec::new(),
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
                    self.entries.push((std::mem::take(&mut self.key), offset));
                    self.state = State::KeyLen;
                }
                ReadStatus::Waiting => self.state = State::OffsetResume,
            },
            State::OffsetResume => {
                let offset = reader.last_u64;
                self.entries.push((std::mem::take(&mut self.key), offset));
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
        match self.state {
            State::KeyLen => Ok(()),
            _ => Err(ConsumeError::malformed("truncated index entry")),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut payload = BytesMut::new();
    for i in 0..16u64 {
        let key = format!("partition-{i:03}");
        payload.put_u16(key.len() as u16);
        payload.put_slice(key.as_bytes());
        payload.put_u64(i * 65_536);
    }
    let payload = payload.freeze();

    let path = std::env::temp_dir().join("bytemodem-index-scan.bin");
    std::fs::File::create(&path)?.write_all(&payload)?;

    // Five-byte chunks: every entry spans several buffers.
    let source = FileSource::open_with(&path, 0, FileSourceOptions { chunk_size: 5 }).await?;
    let mut consumer =
        StreamingConsumer::new(source, IndexProcessor::new(), 0, payload.len() as u64);
    consumer.consume_input().await?;

    for (key, offset) in &consumer.processor().entries {
        println!("{:>12}  {}", offset, String::from_utf8_lossy(key));
    }
    consumer.close().await?;
    std::fs::remove_file(&path)?;
    Ok(())
}
