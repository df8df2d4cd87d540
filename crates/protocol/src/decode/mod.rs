//! Compact binary record decoding
//!
//! Turns an inflated request body into a sequence of [`Record`]s.
//!
//! # Module Structure
//!
//! - `cursor` - Bounds-checked primitive readers (varints, zigzag, floats)
//! - `reader` - Schema-directed `RecordReader` and its limits
//! - `record` - The decoded `Record` type
//!
//! # Usage
//!
//! ```ignore
//! use cslens_protocol::{decode_records, ReaderLimits, StopReason};
//!
//! let decoded = decode_records(&body, ReaderLimits::default());
//! for record in &decoded.records {
//!     println!("{}", record.name().unwrap_or("-"));
//! }
//! if let StopReason::Corrupt(e) = &decoded.stop {
//!     eprintln!("stopped early: {e}");
//! }
//! ```

mod cursor;
mod reader;
mod record;

pub use reader::{
    DEFAULT_MAX_CONTAINER_LENGTH, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STRING_LENGTH, ReaderLimits,
    RecordReader,
};
pub use record::Record;

use tracing::warn;

use crate::DecodeError;

// =============================================================================
// Decode Result
// =============================================================================

/// Why the record stream ended
#[derive(Debug)]
pub enum StopReason {
    /// The buffer ended exactly on a record boundary
    EndOfInput,
    /// A record was corrupt; everything before it was kept
    Corrupt(DecodeError),
}

impl StopReason {
    /// Check if the stream ended cleanly
    #[inline]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    /// Get the error that ended the stream, if any
    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            Self::EndOfInput => None,
            Self::Corrupt(e) => Some(e),
        }
    }
}

/// Records drained from one buffer
#[derive(Debug)]
pub struct DecodedRecords {
    /// Records in stream order
    pub records: Vec<Record>,
    /// How the stream ended
    pub stop: StopReason,
}

/// Drain every record from `buf`
///
/// A corrupt record ends the stream; records decoded before it are kept and
/// the fault is reported in `stop`.
pub fn decode_records(buf: &[u8], limits: ReaderLimits) -> DecodedRecords {
    let mut reader = RecordReader::with_limits(buf, limits);
    let mut records = Vec::new();

    let stop = loop {
        match reader.read_record() {
            Ok(Some(record)) => records.push(record),
            Ok(None) => break StopReason::EndOfInput,
            Err(e) => {
                warn!(
                    decoded = records.len(),
                    offset = e.offset().unwrap_or(reader.position()),
                    total = buf.len(),
                    error = %e,
                    "corrupt record, dropping rest of payload"
                );
                break StopReason::Corrupt(e);
            }
        }
    };

    DecodedRecords { records, stop }
}
