//! cslens Protocol - Common Schema payload decoding
//!
//! Turns collector request bodies (compact binary `CsProtocol` records,
//! optionally gzip/deflate compressed) into JSON documents:
//!
//! - `compression` - Content-Encoding handling
//! - `decode` - `RecordReader`, limits and clean-end vs. corruption
//! - `project` - Structural `WireValue` → JSON mapping
//! - `normalize` - `ext` collapsing and typed `data` properties
//! - `batch` - Per-record and combined JSON output
//! - `pipeline` - `PayloadDecoder`, the whole thing in one call
//!
//! # Design Principles
//!
//! - **Bounded**: every declared length is checked before allocation
//! - **Partial results**: a corrupt record keeps everything decoded before it
//! - **Immutable decoders**: share one `PayloadDecoder` across threads
//!
//! # Usage
//!
//! ```ignore
//! use cslens_protocol::{PayloadDecoder, RawInput};
//!
//! let decoder = PayloadDecoder::default();
//! let input = RawInput::new(body).with_content_encoding("gzip");
//! let output = decoder.decode(&input)?;
//! println!("{}", output.combined);
//! ```

mod batch;
mod compression;
mod decode;
mod error;
mod normalize;
mod pipeline;
mod project;
pub mod schema;
mod wire;

#[cfg(test)]
mod fixture;

pub use batch::{AssembleOptions, AssembledBatch, BatchAssembler, DEFAULT_INDENT, assemble};
pub use compression::{ContentEncoding, DEFAULT_MAX_DECOMPRESSED_SIZE, decompress};
pub use decode::{
    DEFAULT_MAX_CONTAINER_LENGTH, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STRING_LENGTH, DecodedRecords,
    ReaderLimits, Record, RecordReader, StopReason, decode_records,
};
pub use error::{DecodeError, DecodeWarning};
pub use normalize::{
    DEFAULT_EXTENSIONS, ExtensionMap, NormalizedTree, Normalizer, ShapeMismatch, TypedValue,
    normalize,
};
pub use pipeline::{
    CLIENT_ID_HEADER, DEFAULT_MAX_PAYLOAD_SIZE, DecodeOutput, DecoderOptions, PayloadDecoder,
    RawInput,
};
pub use project::{project, project_value};
pub use schema::ValueKind;
pub use wire::{WireType, WireValue};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Result type for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;

// Test modules - only compiled during testing
#[cfg(test)]
mod batch_test;
