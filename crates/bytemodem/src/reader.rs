//! Resumable reads of wire primitives across input-buffer boundaries.
//!
//! A primitive value — a big-endian integer or an *n*-byte fragment — may
//! begin in one input buffer and complete in the next, or the next
//! several. [`WireReader`] gives state processors a fast path for reads
//! fully contained in the current buffer, and a slow path that records the
//! partial value as an explicit pending read, to be resumed when the next
//! buffer arrives. The suspension is a tagged variant with a small scratch
//! area, not a coroutine: the hot path stays a straight-line branch, and
//! the cold path allocates only for byte-fragment reads.

use core::mem;

use bytes::{Buf, Bytes, BytesMut};

/// Outcome of one primitive read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a Waiting read must suspend the state machine"]
pub enum ReadStatus {
    /// The value is available now, in the matching slot.
    Ready,
    /// The buffer ran dry mid-value; a pending read has been armed and the
    /// caller must hand control back to the drive loop.
    Waiting,
}

/// Which integer slot a pending read publishes to on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntSlot {
    U8,
    U16,
    U32,
    U64,
}

impl IntSlot {
    fn width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }
}

/// A primitive read in progress across buffers.
#[derive(Debug)]
enum PendingRead {
    Idle,
    /// Reassembling an integer in the scratch area; `filled < width`.
    Int {
        slot: IntSlot,
        filled: usize,
        scratch: [u8; 8],
    },
    /// Accumulating a byte fragment into an owned buffer of exactly
    /// `total` bytes.
    Bytes { buf: BytesMut, total: usize },
}

/// Reads 8/16/32/64-bit big-endian integers and length-prefixed byte
/// fragments from a chunked stream, suspending and resuming any read that
/// straddles a buffer boundary.
///
/// Completed integers land in the `last_*` slots; completed fragments are
/// collected with [`take_bytes`]. When a read returns
/// [`ReadStatus::Waiting`], the slot is filled before the processor's next
/// `process_state` call, so a state machine can pop the value from the
/// slot in the state it transitions to.
///
/// [`take_bytes`]: WireReader::take_bytes
#[derive(Debug, Default)]
pub struct WireReader {
    pending: PendingRead,
    completed_bytes: Option<Bytes>,
    /// Most recently completed 8-bit read.
    pub last_u8: u8,
    /// Most recently completed 16-bit read.
    pub last_u16: u16,
    /// Most recently completed 32-bit read.
    pub last_u32: u32,
    /// Most recently completed 64-bit read.
    pub last_u64: u64,
}

impl Default for PendingRead {
    fn default() -> Self {
        Self::Idle
    }
}

impl WireReader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True while a suspended read is waiting for more input.
    pub fn is_pending(&self) -> bool {
        !matches!(self.pending, PendingRead::Idle)
    }

    /// Read a big-endian `u8` into `last_u8`.
    pub fn read_u8(&mut self, data: &mut Bytes) -> ReadStatus {
        if !data.is_empty() {
            self.last_u8 = data.get_u8();
            ReadStatus::Ready
        } else {
            self.arm_int(IntSlot::U8, data);
            ReadStatus::Waiting
        }
    }

    /// Read a big-endian `u16` into `last_u16`. If the whole value is in
    /// the buffer (the common case) it is decoded immediately; otherwise
    /// the partial bytes are stashed and the read resumes on the next
    /// buffer.
    pub fn read_u16(&mut self, data: &mut Bytes) -> ReadStatus {
        if data.len() >= 2 {
            self.last_u16 = data.get_u16();
            ReadStatus::Ready
        } else {
            self.arm_int(IntSlot::U16, data);
            ReadStatus::Waiting
        }
    }

    /// Read a big-endian `u32` into `last_u32`.
    pub fn read_u32(&mut self, data: &mut Bytes) -> ReadStatus {
        if data.len() >= 4 {
            self.last_u32 = data.get_u32();
            ReadStatus::Ready
        } else {
            self.arm_int(IntSlot::U32, data);
            ReadStatus::Waiting
        }
    }

    /// Read a big-endian `u64` into `last_u64`.
    pub fn read_u64(&mut self, data: &mut Bytes) -> ReadStatus {
        if data.len() >= 8 {
            self.last_u64 = data.get_u64();
            ReadStatus::Ready
        } else {
            self.arm_int(IntSlot::U64, data);
            ReadStatus::Waiting
        }
    }

    /// Read a fragment of exactly `len` bytes, collected afterwards with
    /// [`take_bytes`].
    ///
    /// When the buffer already holds `len` bytes the fragment is a shared
    /// view of the buffer's storage — no copy, no allocation. Otherwise an
    /// owned buffer of exactly `len` bytes is allocated, the available
    /// prefix copied in, and the read resumes on the next buffer.
    ///
    /// [`take_bytes`]: WireReader::take_bytes
    pub fn read_bytes(&mut self, data: &mut Bytes, len: usize) -> ReadStatus {
        if data.len() >= len {
            self.completed_bytes = Some(data.split_to(len));
            ReadStatus::Ready
        } else {
            let mut buf = BytesMut::with_capacity(len);
            buf.extend_from_slice(data);
            data.clear();
            self.pending = PendingRead::Bytes { buf, total: len };
            ReadStatus::Waiting
        }
    }

    /// Collect the most recently completed fragment read, leaving an empty
    /// buffer in its place.
    pub fn take_bytes(&mut self) -> Bytes {
        self.completed_bytes.take().unwrap_or_default()
    }

    fn arm_int(&mut self, slot: IntSlot, data: &mut Bytes) {
        debug_assert!(data.len() < slot.width());
        let mut scratch = [0u8; 8];
        let filled = data.len();
        scratch[..filled].copy_from_slice(data);
        data.clear();
        self.pending = PendingRead::Int {
            slot,
            filled,
            scratch,
        };
    }

    /// Drain a pending read from the front of `data`. Called on entry to
    /// the drive loop, before the state processor may observe another
    /// byte. Publishes the assembled value and disarms once complete; if
    /// `data` runs dry first, the pending read stays armed for the buffer
    /// after this one.
    pub(crate) fn resume(&mut self, data: &mut Bytes) {
        match mem::take(&mut self.pending) {
            PendingRead::Idle => {}
            PendingRead::Int {
                slot,
                mut filled,
                mut scratch,
            } => {
                let width = slot.width();
                debug_assert!(filled < width);
                let n = usize::min(width - filled, data.len());
                scratch[filled..filled + n].copy_from_slice(&data[..n]);
                data.advance(n);
                filled += n;
                if filled == width {
                    self.publish_int(slot, &scratch);
                } else {
                    self.pending = PendingRead::Int {
                        slot,
                        filled,
                        scratch,
                    };
                }
            }
            PendingRead::Bytes { mut buf, total } => {
                let n = usize::min(total - buf.len(), data.len());
                buf.extend_from_slice(&data[..n]);
                data.advance(n);
                if buf.len() == total {
                    self.completed_bytes = Some(buf.freeze());
                } else {
                    self.pending = PendingRead::Bytes { buf, total };
                }
            }
        }
    }

    /// Discard any suspended read and its partial bytes. The integer slots
    /// keep their previous values.
    pub(crate) fn reset(&mut self) {
        self.pending = PendingRead::Idle;
        self.completed_bytes = None;
    }

    fn publish_int(&mut self, slot: IntSlot, scratch: &[u8; 8]) {
        match slot {
            IntSlot::U8 => self.last_u8 = scratch[0],
            IntSlot::U16 => self.last_u16 = u16::from_be_bytes([scratch[0], scratch[1]]),
            IntSlot::U32 => {
                self.last_u32 =
                    u32::from_be_bytes([scratch[0], scratch[1], scratch[2], scratch[3]]);
            }
            IntSlot::U64 => self.last_u64 = u64::from_be_bytes(*scratch),
        }
    }
}
