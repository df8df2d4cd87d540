//! Decode error types
//!
//! Errors that can occur while turning a request body into JSON documents.
//!
//! Three classes are fatal for the whole payload (`PayloadTooLarge`,
//! `UnsupportedEncoding`, `DecompressionFailure`); the record-level errors (`TruncatedRecord`,
//! `MalformedField`) end the record stream but keep every record decoded
//! before the fault. Non-fatal issues are reported as [`DecodeWarning`].

use std::fmt;

use thiserror::Error;

/// Errors that can occur during payload decoding
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body larger than the configured maximum, rejected before decoding
    #[error("payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Content-Encoding value the decoder does not understand
    #[error("unsupported content encoding: {0:?}")]
    UnsupportedEncoding(String),

    /// Compressed stream could not be inflated
    #[error("{encoding} decompression failed: {message}")]
    DecompressionFailure {
        encoding: &'static str,
        message: String,
    },

    /// Buffer ended inside a record
    #[error(
        "record {record} truncated at offset {offset}: needed {needed} more bytes, {available} available"
    )]
    TruncatedRecord {
        record: usize,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Invalid type tag, length or value inside a record
    #[error("record {record} has a malformed field at offset {offset}: {reason}")]
    MalformedField {
        record: usize,
        offset: usize,
        reason: String,
    },
}

impl DecodeError {
    /// Create a payload size error
    #[inline]
    pub fn payload_too_large(size: usize, limit: usize) -> Self {
        Self::PayloadTooLarge { size, limit }
    }

    /// Create an unsupported encoding error
    #[inline]
    pub fn unsupported_encoding(encoding: impl Into<String>) -> Self {
        Self::UnsupportedEncoding(encoding.into())
    }

    /// Create a decompression failure
    #[inline]
    pub fn decompression(encoding: &'static str, message: impl fmt::Display) -> Self {
        Self::DecompressionFailure {
            encoding,
            message: message.to_string(),
        }
    }

    /// Create a truncated record error
    #[inline]
    pub fn truncated(record: usize, offset: usize, needed: usize, available: usize) -> Self {
        Self::TruncatedRecord {
            record,
            offset,
            needed,
            available,
        }
    }

    /// Create a malformed field error
    #[inline]
    pub fn malformed(record: usize, offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            record,
            offset,
            reason: reason.into(),
        }
    }

    /// Errors that discard the whole payload
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PayloadTooLarge { .. }
                | Self::UnsupportedEncoding(_)
                | Self::DecompressionFailure { .. }
        )
    }

    /// Errors that end the record stream but keep the records before them
    pub fn is_partial(&self) -> bool {
        !self.is_fatal()
    }

    /// Byte offset of a record-level fault, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedRecord { offset, .. } | Self::MalformedField { offset, .. } => {
                Some(*offset)
            }
            Self::PayloadTooLarge { .. }
            | Self::UnsupportedEncoding(_)
            | Self::DecompressionFailure { .. } => None,
        }
    }
}

/// Non-fatal issues absorbed during a decode pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// A record field had an unexpected shape and was skipped
    ShapeMismatch {
        /// Index of the record in the stream
        record: usize,
        /// Offending top-level field
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// Pretty-printing the combined output failed; compact form was used
    PrettyPrintFailure(String),
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                record,
                field,
                reason,
            } => write!(f, "record {record}: field '{field}' skipped: {reason}"),
            Self::PrettyPrintFailure(message) => {
                write!(f, "pretty-print failed, using compact output: {message}")
            }
        }
    }
}
