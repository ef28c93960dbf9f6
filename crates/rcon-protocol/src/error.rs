//! Errors that can arise at the wire codec layer.

use std::fmt;

/// Errors produced while encoding or decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The XOR key supplied by the server was empty.
    EmptyKey,

    /// A frame declared a length larger than [`crate::MAX_FRAME_LEN`].
    FrameTooLarge(usize),

    /// The stream ended while a frame's declared length was still
    /// unsatisfied.
    Truncated,

    /// A tab array's declared count does not match the entries present.
    ///
    /// This usually means the response spans multiple frames and more
    /// data must be awaited before unpacking again.
    IncompleteArray { expected: usize, got: usize },

    /// A tab array carried a non-numeric count element.
    InvalidArrayHeader(String),

    /// Decoded payload was not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::EmptyKey => write!(f, "game server returned an empty XOR key"),
            CodecError::FrameTooLarge(len) => write!(f, "declared frame length {} exceeds limit", len),
            CodecError::Truncated => write!(f, "stream ended mid-frame"),
            CodecError::IncompleteArray { expected, got } => {
                write!(f, "expected array size {} but got {}", expected, got)
            }
            CodecError::InvalidArrayHeader(head) => {
                write!(f, "array header is not a count: {:?}", head)
            }
            CodecError::InvalidUtf8 => write!(f, "payload is not valid UTF-8"),
        }
    }
}

impl std::error::Error for CodecError {}
