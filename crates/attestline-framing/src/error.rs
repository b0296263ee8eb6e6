//! Error types for response framing.

use thiserror::Error;

/// Framing violations detected by the demultiplexer itself.
///
/// These never originate from the transport or from a callback. They are
/// raised only when a non-default policy in
/// [`DemuxConfig`](crate::DemuxConfig) asks for them, and are converted
/// into the stream's error type via `From<FramingError>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("response stream ended after {chunks} chunk(s) without a terminal chunk")]
    Truncated { chunks: u64 },

    #[error("response head received on chunk {index}; a head is only valid on the first chunk")]
    UnexpectedHead { index: u64 },
}

/// General-purpose error for response streams.
///
/// Callers with their own transport error type only need
/// `From<FramingError>` on it; this type is provided for callers that
/// don't have one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("callback error: {0}")]
    Callback(String),

    #[error(transparent)]
    Framing(#[from] FramingError),
}

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }

    /// Whether this error was raised by the demultiplexer rather than by
    /// the transport or a callback.
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::Framing(_))
    }
}

/// Result alias for response stream items.
pub type StreamResult<T, E = Error> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_display() {
        let err = FramingError::Truncated { chunks: 3 };
        assert_eq!(
            err.to_string(),
            "response stream ended after 3 chunk(s) without a terminal chunk"
        );
    }

    #[test]
    fn framing_error_converts_transparently() {
        let err: Error = FramingError::UnexpectedHead { index: 2 }.into();
        assert!(err.is_framing());
        assert_eq!(
            err.to_string(),
            "response head received on chunk 2; a head is only valid on the first chunk"
        );
    }

    #[test]
    fn transport_and_callback_display() {
        assert_eq!(Error::transport("reset").to_string(), "transport error: reset");
        assert_eq!(Error::callback("bad status").to_string(), "callback error: bad status");
        assert!(!Error::callback("x").is_framing());
    }

    #[test]
    fn error_is_std_error() {
        let err = Error::transport("test");
        let _: &dyn std::error::Error = &err;
    }
}
