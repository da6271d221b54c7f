//! Resumable, zero-copy consumption of chunked byte streams.
//!
//! `bytemodem` is the machinery on which concrete parsers of on-disk
//! table files — index, summary, statistics, and data-block readers — are
//! built. A concrete parser is a [`StateProcessor`]: a state machine whose
//! transitions read big-endian integers and length-prefixed byte fragments
//! from the stream. The framework handles everything those transitions
//! should not have to think about:
//!
//! - **Cross-buffer reads.** A primitive may begin in one chunk and
//!   complete several chunks later; the [`WireReader`] suspends and
//!   resumes it without losing a byte, and without the processor
//!   noticing. Reads fully contained in the current chunk take a
//!   straight-line fast path; fragment reads on that path are shared
//!   views of the chunk's storage, not copies.
//! - **Bounded consumption.** A [`StreamingConsumer`] operates over a
//!   logical window of the stream, returns excess bytes to the source
//!   exactly, translates skips larger than the current chunk into
//!   stream-level seeks, and fast-forwards to arbitrary offsets.
//! - **Three-valued control flow.** The processor answers each step with
//!   proceed, pause, or skip-N; the drive loop keeps the position
//!   accounts straight in every case.
//!
//! # Example
//!
//! A processor that reads one big-endian `u32` — correctly even when the
//! integer is split across chunks — and then pauses:
//!
//! ```
//! use bytemodem::{
//!     ConsumeError, MemorySource, Proceed, ProcessingResult, ReadStatus, StateProcessor,
//!     StreamingConsumer, WireReader,
//! };
//! use bytes::Bytes;
//!
//! #[derive(Default)]
//! struct CountHeader {
//!     count: Option<u32>,
//!     resuming: bool,
//! }
//!
//! impl StateProcessor for CountHeader {
//!     fn process_state(
//!         &mut self,
//!         data: &mut Bytes,
//!         reader: &mut WireReader,
//!     ) -> Result<ProcessingResult, ConsumeError> {
//!         if self.resuming {
//!             self.resuming = false;
//!             self.count = Some(reader.last_u32);
//!             return Ok(Proceed::No.into());
//!         }
//!         match reader.read_u32(data) {
//!             ReadStatus::Ready => {
//!                 self.count = Some(reader.last_u32);
//!                 Ok(Proceed::No.into())
//!             }
//!             ReadStatus::Waiting => {
//!                 self.resuming = true;
//!                 Ok(Proceed::Yes.into())
//!             }
//!         }
//!     }
//!
//!     fn non_consuming(&self) -> bool {
//!         self.resuming
//!     }
//!
//!     fn verify_end_state(&mut self) -> Result<(), ConsumeError> {
//!         Ok(())
//!     }
//! }
//!
//! let payload = Bytes::from_static(&[0x00, 0x00, 0x02, 0x9A]);
//! // Deliver three bytes, then one: the read suspends mid-integer.
//! let source = MemorySource::with_chunk_size(payload, 3);
//! let mut consumer = StreamingConsumer::new(source, CountHeader::default(), 0, 4);
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(consumer.consume_input()).unwrap();
//! assert_eq!(consumer.processor().count, Some(666));
//! ```

mod chunks;
mod consumer;
mod error;
mod processor;
mod reader;
mod source;
mod window;

pub use chunks::produce_chunks;
pub use consumer::{ConsumptionResult, StreamingConsumer};
pub use error::ConsumeError;
pub use processor::{Proceed, ProcessingResult, StateProcessor};
pub use reader::{ReadStatus, WireReader};
pub use source::{ChunkSource, FileSource, FileSourceOptions, MemorySource};
pub use window::ReaderPosition;

#[cfg(test)]
mod tests;
