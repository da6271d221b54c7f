use bytes::Bytes;

use crate::{error::ConsumeError, reader::WireReader};

/// Whether the consumer should keep driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proceed {
    /// Pause consumption; the stream hands back the unconsumed tail.
    No,
    /// Keep consuming.
    Yes,
}

/// A state processor's reply to one [`process_state`] call.
///
/// [`process_state`]: StateProcessor::process_state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingResult {
    /// Keep driving, or pause.
    Proceed(Proceed),
    /// Discard the next `n` bytes of the window without delivering them.
    ///
    /// Only legal once the current buffer is fully drained; a skip that
    /// fits inside the buffer should be a plain `advance` instead. `n`
    /// must be greater than zero.
    SkipBytes(u64),
}

impl From<Proceed> for ProcessingResult {
    fn from(p: Proceed) -> Self {
        Self::Proceed(p)
    }
}

impl PartialEq<Proceed> for ProcessingResult {
    fn eq(&self, other: &Proceed) -> bool {
        matches!(self, Self::Proceed(p) if p == other)
    }
}

/// The state machine a concrete parser supplies to [`StreamingConsumer`].
///
/// Implementations advance one transition per call, reading primitives
/// through the [`WireReader`] passed in. Any multi-byte read must go
/// through the reader so that a value straddling a buffer boundary is
/// suspended and resumed instead of lost: when a primitive returns
/// [`ReadStatus::Waiting`], return `Proceed::Yes`, remember which value is
/// outstanding, and report [`non_consuming`] until the completed value has
/// been collected from the reader's slot.
///
/// [`StreamingConsumer`]: crate::StreamingConsumer
/// [`ReadStatus::Waiting`]: crate::ReadStatus::Waiting
/// [`non_consuming`]: StateProcessor::non_consuming
pub trait StateProcessor {
    /// Advance the state machine, consuming from `data`.
    ///
    /// Must not decode past the bytes actually in `data`; the read
    /// primitives on `reader` enforce this when used for every multi-byte
    /// read.
    fn process_state(
        &mut self,
        data: &mut Bytes,
        reader: &mut WireReader,
    ) -> Result<ProcessingResult, ConsumeError>;

    /// True when the current state does useful work without needing input,
    /// e.g. publishing a value that a suspended read has just completed.
    /// Such states are scheduled even when the buffer is empty.
    fn non_consuming(&self) -> bool {
        false
    }

    /// Called exactly once when the window is exhausted or the stream hits
    /// end-of-file. Return an error if the state machine is not in a
    /// legitimate terminal state.
    fn verify_end_state(&mut self) -> Result<(), ConsumeError>;
}
