//! The drive loop: alternates between the pending-read machine and the
//! state processor, interprets verdicts, and keeps the window accounts.

use bytes::{Buf, Bytes};

use crate::{
    error::ConsumeError,
    processor::{Proceed, ProcessingResult, StateProcessor},
    reader::WireReader,
    source::ChunkSource,
    window::{ReaderPosition, Window},
};

/// What one [`feed`] call instructs the upstream stream to do next.
///
/// [`feed`]: StreamingConsumer::feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumptionResult {
    /// Deliver another chunk.
    Continue,
    /// Stop delivering; `tail` holds the bytes the consumer did not touch
    /// (possibly empty). Do not fold a skip into this variant: the stream
    /// could no longer tell a seek from a cancellation, and the position
    /// accounts would diverge.
    Stop {
        /// The unconsumed tail, to be requeued upstream.
        tail: Bytes,
    },
    /// Seek `n` bytes forward before delivering the next chunk.
    Skip(u64),
}

/// A resumable, bounded consumer of a chunked byte stream.
///
/// The consumer owns an input source and a [`StateProcessor`], and drives
/// the processor over the logical window `[start, start + maxlen)` of the
/// stream. Reads that straddle chunk boundaries are suspended and resumed
/// transparently; the processor never observes a partial integer or a
/// short fragment. Consumption stops when the window is exhausted, the
/// stream ends, or the processor pauses — whichever comes first — and any
/// excess bytes are returned to the source exactly.
///
/// A consumer is owned by one logical task; none of its operations are
/// reentrant. Only [`consume_input`], [`fast_forward_to`], [`skip_to`],
/// and [`close`] suspend; everything else runs to completion
/// synchronously.
///
/// [`consume_input`]: StreamingConsumer::consume_input
/// [`fast_forward_to`]: StreamingConsumer::fast_forward_to
/// [`skip_to`]: StreamingConsumer::skip_to
/// [`close`]: StreamingConsumer::close
#[derive(Debug)]
pub struct StreamingConsumer<P, S> {
    input: S,
    processor: P,
    reader: WireReader,
    window: Window,
    end_verified: bool,
}

impl<P, S> StreamingConsumer<P, S>
where
    P: StateProcessor,
    S: ChunkSource,
{
    /// Create a consumer over the window `[start, start + maxlen)`. The
    /// source is assumed positioned at absolute offset `start`.
    pub fn new(input: S, processor: P, start: u64, maxlen: u64) -> Self {
        Self {
            input,
            processor,
            reader: WireReader::new(),
            window: Window::new(start, maxlen),
            end_verified: false,
        }
    }

    /// The state processor.
    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// The state processor, mutably.
    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    /// Absolute offset of the next byte to be delivered to the processor.
    pub fn position(&self) -> u64 {
        self.window.position
    }

    /// The current position together with the window length fixed at
    /// construction.
    pub fn reader_position(&self) -> ReaderPosition {
        self.window.snapshot()
    }

    /// True once the window is exhausted.
    pub fn eof(&self) -> bool {
        self.window.eof()
    }

    /// Drive the source until it stops: end-of-file, window exhausted, or
    /// the processor paused. The unconsumed tail, if any, is requeued on
    /// the source, so a later call resumes exactly where this one left
    /// off.
    pub async fn consume_input(&mut self) -> Result<(), ConsumeError> {
        loop {
            let chunk = self.input.next_chunk().await?;
            match self.feed(chunk)? {
                ConsumptionResult::Continue => {}
                ConsumptionResult::Stop { tail } => {
                    tracing::trace!(
                        tail_len = tail.len(),
                        position = self.window.position,
                        "consumption stopped"
                    );
                    if !tail.is_empty() {
                        self.input.requeue(tail);
                    }
                    return Ok(());
                }
                ConsumptionResult::Skip(n) => {
                    tracing::trace!(n, "skipping ahead in stream");
                    self.input.skip(n).await?;
                }
            }
        }
    }

    /// The chunk-callback entry point: consume as much of `data` as the
    /// window and the processor allow, and report what the stream should
    /// do next. [`consume_input`] calls this per chunk; tests and custom
    /// drivers may call it directly.
    ///
    /// # Panics
    ///
    /// Panics if the processor returns a skip verdict while the buffer
    /// still holds bytes — a skip that fits in the buffer must be a plain
    /// `advance` inside `process_state` instead.
    ///
    /// [`consume_input`]: StreamingConsumer::consume_input
    pub fn feed(&mut self, mut data: Bytes) -> Result<ConsumptionResult, ConsumeError> {
        if data.len() as u64 >= self.window.remaining {
            // More data than the window cares about: process an aliased
            // share of the prefix and hand everything unconsumed back.
            let prefix_len = self.window.remaining as usize;
            let mut segment = data.slice(..prefix_len);
            let verdict = self.process(&mut segment)?;
            let consumed = prefix_len - segment.len();
            data.advance(consumed);
            self.window.position += consumed as u64;
            self.window.remaining -= consumed as u64;
            if self.window.remaining == 0 && verdict == Proceed::Yes {
                self.verify_end_state()?;
            }
            Ok(ConsumptionResult::Stop { tail: data })
        } else if data.is_empty() {
            // End of file.
            self.verify_end_state()?;
            Ok(ConsumptionResult::Stop { tail: data })
        } else {
            // The whole buffer is inside the window. Optimistically charge
            // the full size, then refund whatever the processor left.
            let orig_len = data.len();
            self.window.position += orig_len as u64;
            match self.process(&mut data)? {
                ProcessingResult::Proceed(p) => {
                    self.window.remaining -= (orig_len - data.len()) as u64;
                    self.window.position -= data.len() as u64;
                    match p {
                        Proceed::Yes => Ok(ConsumptionResult::Continue),
                        Proceed::No => Ok(ConsumptionResult::Stop { tail: data }),
                    }
                }
                ProcessingResult::SkipBytes(n) => {
                    // A skip is only for reaching beyond the delivered
                    // buffer; anything shorter is the processor's own
                    // trimming business.
                    assert!(data.is_empty(), "skip requested with an undrained buffer");
                    self.window.remaining -= orig_len as u64;
                    if n >= self.window.remaining {
                        // The skip exhausts the window.
                        self.window.position += self.window.remaining;
                        self.window.remaining = 0;
                        self.verify_end_state()?;
                        Ok(ConsumptionResult::Stop { tail: data })
                    } else {
                        self.window.position += n;
                        self.window.remaining -= n;
                        Ok(ConsumptionResult::Skip(n))
                    }
                }
            }
        }
    }

    /// The inner loop: drain any pending read, then let the processor
    /// advance, until the buffer is exhausted (and no state wants to run
    /// without input) or the processor returns a non-proceed verdict.
    fn process(&mut self, data: &mut Bytes) -> Result<ProcessingResult, ConsumeError> {
        while !data.is_empty() || self.processor.non_consuming() {
            self.reader.resume(data);
            if self.reader.is_pending() {
                // The buffer was too small to complete the suspended read
                // even this time; ask the stream for more.
                debug_assert!(data.is_empty());
                return Ok(Proceed::Yes.into());
            }
            let verdict = self.processor.process_state(data, &mut self.reader)?;
            if verdict != Proceed::Yes {
                return Ok(verdict);
            }
        }
        Ok(Proceed::Yes.into())
    }

    fn verify_end_state(&mut self) -> Result<(), ConsumeError> {
        if self.end_verified {
            return Ok(());
        }
        self.end_verified = true;
        self.processor.verify_end_state()
    }

    /// Reposition to a new window `[begin, end)`. Requires `begin` at or
    /// past the current position; the gap is skipped at the stream level.
    ///
    /// Any suspended read is discarded, partial bytes included; callers
    /// must ensure their state machine is prepared for that.
    ///
    /// # Panics
    ///
    /// Panics if `begin` precedes the current position or `end` precedes
    /// `begin`.
    pub async fn fast_forward_to(&mut self, begin: u64, end: u64) -> Result<(), ConsumeError> {
        assert!(
            begin >= self.window.position,
            "fast-forward must not move backwards"
        );
        assert!(end >= begin, "window end precedes its begin");
        let gap = begin - self.window.position;
        self.window.position = begin;
        self.window.remaining = end - begin;
        if self.reader.is_pending() {
            tracing::debug!(position = begin, "discarding suspended read at fast-forward");
        }
        self.reader.reset();
        self.end_verified = false;
        self.input.skip(gap).await?;
        Ok(())
    }

    /// Reposition to `begin`, keeping the window's end where it is.
    pub async fn skip_to(&mut self, begin: u64) -> Result<(), ConsumeError> {
        let end = self.window.position + self.window.remaining;
        self.fast_forward_to(begin, end).await
    }

    /// Release the underlying source.
    pub async fn close(&mut self) -> Result<(), ConsumeError> {
        self.input.close().await?;
        Ok(())
    }
}
