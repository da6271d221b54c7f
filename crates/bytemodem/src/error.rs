use thiserror::Error;

/// Errors surfaced while driving a consumer.
///
/// Precondition violations (seeking backwards, requesting a stream-level
/// skip while the buffer still holds bytes) are programming errors, not
/// data faults; those panic instead of producing a variant here.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The input violated the wire format: a state processor rejected the
    /// data mid-stream, or its end-state check failed at the window
    /// boundary. The consumer is unusable afterwards.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// An I/O failure from the underlying chunk source, passed through
    /// unchanged. Retrying is the stream owner's responsibility.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConsumeError {
    /// Shorthand for a [`ConsumeError::MalformedInput`] with the given
    /// message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }
}
