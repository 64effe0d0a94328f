//! Decode errors for the image format.
//!
//! Every variant is fatal: the codec layers stop at the first problem and
//! never attempt partial recovery.

/// Image decode error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input ended before a declared length or fixed-width field.
    #[error("truncated input at offset {offset}: {needed} more bytes required")]
    TruncatedInput { offset: usize, needed: u64 },

    /// A varuint ran past the maximum encoded width or its target type.
    #[error("malformed varint at offset {offset}")]
    MalformedVarint { offset: usize },

    /// A string payload is not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("invalid magic: expected QUILLIMG")]
    InvalidMagic,

    /// The major version is not one this implementation understands.
    #[error("unsupported image version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    /// An enumeration byte inside a known section has no meaning.
    #[error("invalid {what} tag {tag:#04x} at offset {offset}")]
    InvalidTag {
        what: &'static str,
        tag: u8,
        offset: usize,
    },

    /// A structural limit from [`Limits`](crate::Limits) was exceeded.
    #[error("{what} {value} exceeds limit {limit}")]
    LimitExceeded {
        what: &'static str,
        value: u64,
        limit: u64,
    },

    /// Bytes remain after the last declared section.
    #[error("unexpected trailing bytes at offset {offset}")]
    TrailingBytes { offset: usize },
}

impl DecodeError {
    /// Byte offset the error was detected at, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedInput { offset, .. }
            | Self::MalformedVarint { offset }
            | Self::InvalidUtf8 { offset }
            | Self::InvalidTag { offset, .. }
            | Self::TrailingBytes { offset } => Some(*offset),
            Self::InvalidMagic => Some(0),
            Self::UnsupportedVersion { .. } | Self::LimitExceeded { .. } => None,
        }
    }
}
