/// Absolute stream position and bytes left of the logical window
/// `[start, start + maxlen)` a consumer is authorised to read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    /// Absolute offset of the next byte to be delivered to the processor.
    pub(crate) position: u64,
    /// Bytes left in the window.
    pub(crate) remaining: u64,
    /// The window length fixed at construction.
    total: u64,
}

impl Window {
    pub(crate) fn new(start: u64, maxlen: u64) -> Self {
        Self {
            position: start,
            remaining: maxlen,
            total: maxlen,
        }
    }

    pub(crate) fn eof(&self) -> bool {
        self.remaining == 0
    }

    pub(crate) fn snapshot(&self) -> ReaderPosition {
        ReaderPosition {
            position: self.position,
            total: self.total,
        }
    }
}

/// A point-in-time view of a consumer's progress: the absolute position of
/// the next byte it will deliver, and the total window length it was
/// created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderPosition {
    /// Absolute offset of the next byte to be delivered.
    pub position: u64,
    /// The window length (`maxlen`) fixed at construction; unaffected by
    /// fast-forwards.
    pub total: u64,
}
