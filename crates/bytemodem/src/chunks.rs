use bytes::Bytes;

/// Split `payload` into `parts` approximately equal-sized chunks. The
/// chunks share storage with `payload`.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &Bytes, parts: usize) -> Vec<Bytes> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let end = usize::min(start + chunk_size, len);
        chunks.push(payload.slice(start..end));
        start = end;
    }
    chunks
}
