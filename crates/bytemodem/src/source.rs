//! Chunk sources feeding a consumer.
//!
//! A [`ChunkSource`] owns the upstream byte stream: it produces buffers on
//! demand, accepts an unconsumed tail back, seeks forward on skips, and
//! closes. [`FileSource`] is the production path for on-disk table files;
//! [`MemorySource`] serves tests, benchmarks, and documentation.

use std::collections::VecDeque;
use std::io::{self, SeekFrom};
use std::path::Path;

use bytes::{Buf, Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// The upstream stream contract a consumer drives.
///
/// Implementations are owned exclusively by one consumer; none of the
/// methods are reentrant. An empty chunk from [`next_chunk`] signals
/// end-of-file.
///
/// [`next_chunk`]: ChunkSource::next_chunk
#[allow(async_fn_in_trait)]
pub trait ChunkSource {
    /// Produce the next buffer, awaiting more data if necessary. Returns
    /// an empty buffer at end-of-file.
    async fn next_chunk(&mut self) -> io::Result<Bytes>;

    /// Hand back an unconsumed tail; it is delivered again by the next
    /// [`next_chunk`] call, ahead of fresh data.
    ///
    /// [`next_chunk`]: ChunkSource::next_chunk
    fn requeue(&mut self, tail: Bytes);

    /// Advance the stream `n` bytes without producing them.
    async fn skip(&mut self, n: u64) -> io::Result<()>;

    /// Release the underlying resource.
    async fn close(&mut self) -> io::Result<()>;
}

/// Configuration for [`FileSource`].
///
/// # Default
///
/// `chunk_size` defaults to 64 KiB, a reasonable unit for sequential
/// scans of block-structured table files.
#[derive(Debug, Clone, Copy)]
pub struct FileSourceOptions {
    /// Upper bound on the size of each produced chunk, in bytes.
    pub chunk_size: usize,
}

impl Default for FileSourceOptions {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
        }
    }
}

/// A [`ChunkSource`] over a file, positioned at a starting offset and
/// read in fixed-size chunks. Skips translate to forward seeks, so a
/// consumer skipping most of a large region never pages it in.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    pending: Option<Bytes>,
    chunk_size: usize,
}

impl FileSource {
    /// Open `path` for reading, positioned at absolute offset `start`,
    /// with default options.
    pub async fn open(path: impl AsRef<Path>, start: u64) -> io::Result<Self> {
        Self::open_with(path, start, FileSourceOptions::default()).await
    }

    /// Open `path` for reading, positioned at absolute offset `start`.
    pub async fn open_with(
        path: impl AsRef<Path>,
        start: u64,
        options: FileSourceOptions,
    ) -> io::Result<Self> {
        let mut file = File::open(path).await?;
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }
        Ok(Self {
            file,
            pending: None,
            chunk_size: options.chunk_size.max(1),
        })
    }
}

impl ChunkSource for FileSource {
    async fn next_chunk(&mut self) -> io::Result<Bytes> {
        if let Some(tail) = self.pending.take() {
            if !tail.is_empty() {
                return Ok(tail);
            }
        }
        let mut buf = BytesMut::with_capacity(self.chunk_size);
        self.file.read_buf(&mut buf).await?;
        Ok(buf.freeze())
    }

    fn requeue(&mut self, tail: Bytes) {
        debug_assert!(self.pending.is_none(), "requeue while a tail is pending");
        self.pending = Some(tail);
    }

    async fn skip(&mut self, n: u64) -> io::Result<()> {
        let mut n = n;
        if let Some(mut tail) = self.pending.take() {
            if (tail.len() as u64) > n {
                tail.advance(n as usize);
                self.pending = Some(tail);
                return Ok(());
            }
            n -= tail.len() as u64;
        }
        if n > 0 {
            let n = i64::try_from(n).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "skip distance overflows a seek")
            })?;
            self.file.seek(SeekFrom::Current(n)).await?;
        }
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.pending = None;
        Ok(())
    }
}

/// An in-memory [`ChunkSource`] delivering a scripted sequence of chunks.
///
/// The chunk boundaries are delivered exactly as scripted, which makes
/// this the tool of choice for exercising reads that straddle buffers.
#[derive(Debug, Default)]
pub struct MemorySource {
    chunks: VecDeque<Bytes>,
}

impl MemorySource {
    /// A source delivering `data` as one single chunk.
    pub fn new(data: Bytes) -> Self {
        Self::from_chunks([data])
    }

    /// A source delivering `data` in chunks of at most `chunk_size`
    /// bytes. The chunks share storage with `data`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn with_chunk_size(data: Bytes, chunk_size: usize) -> Self {
        assert!(chunk_size > 0);
        let mut chunks = VecDeque::new();
        let mut start = 0;
        while start < data.len() {
            let end = usize::min(start + chunk_size, data.len());
            chunks.push_back(data.slice(start..end));
            start = end;
        }
        Self { chunks }
    }

    /// A source delivering exactly the given chunks, in order.
    pub fn from_chunks(chunks: impl IntoIterator<Item = Bytes>) -> Self {
        Self {
            chunks: chunks.into_iter().filter(|c| !c.is_empty()).collect(),
        }
    }
}

impl ChunkSource for MemorySource {
    async fn next_chunk(&mut self) -> io::Result<Bytes> {
        Ok(self.chunks.pop_front().unwrap_or_default())
    }

    fn requeue(&mut self, tail: Bytes) {
        self.chunks.push_front(tail);
    }

    async fn skip(&mut self, n: u64) -> io::Result<()> {
        let mut n = n;
        while n > 0 {
            let Some(front) = self.chunks.front_mut() else {
                // Skipping past the end surfaces as end-of-file on the
                // next read.
                return Ok(());
            };
            if (front.len() as u64) > n {
                front.advance(n as usize);
                return Ok(());
            }
            n -= front.len() as u64;
            self.chunks.pop_front();
        }
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.chunks.clear();
        Ok(())
    }
}
