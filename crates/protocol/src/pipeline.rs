//! Payload decoder
//!
//! Runs the full pipeline for one request body:
//!
//! ```text
//! body ──► decompress ──► decode_records ──► project ──► normalize ──► assemble
//! ```
//!
//! A `PayloadDecoder` holds only immutable configuration, so one instance
//! can be shared (`Arc`) across threads and each call owns its own buffer.

use bytes::Bytes;
use tracing::{debug, info_span};

use crate::batch::{AssembleOptions, BatchAssembler};
use crate::compression::{ContentEncoding, DEFAULT_MAX_DECOMPRESSED_SIZE};
use crate::decode::{DecodedRecords, ReaderLimits, StopReason, decode_records};
use crate::normalize::{ExtensionMap, Normalizer};
use crate::project::project;
use crate::{DecodeError, DecodeWarning, Result};

/// Default cap on the raw (possibly compressed) body (16MB)
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Header carrying the client identifier
pub const CLIENT_ID_HEADER: &str = "client-id";

/// Decoder configuration
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// Largest accepted request body, before decompression
    pub max_payload_size: usize,
    /// Largest accepted body after decompression
    pub max_decompressed_size: usize,
    /// Bounds for declared lengths inside records
    pub limits: ReaderLimits,
    /// Combined output rendering
    pub assemble: AssembleOptions,
    /// Extension field mapping
    pub extensions: ExtensionMap,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            limits: ReaderLimits::default(),
            assemble: AssembleOptions::default(),
            extensions: ExtensionMap::default(),
        }
    }
}

/// A request body with the headers the decoder cares about
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    pub content_type: String,
    pub content_encoding: String,
    pub client_id: Option<String>,
    pub body: Bytes,
}

impl RawInput {
    /// Create an uncompressed input
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Create an input from header name/value pairs
    ///
    /// Names match case-insensitively and the first value of a repeated
    /// header wins.
    pub fn from_headers<'a>(
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
        body: impl Into<Bytes>,
    ) -> Self {
        let (mut content_type, mut content_encoding, mut client_id) = (None, None, None);
        for (name, value) in headers {
            let slot = if name.eq_ignore_ascii_case("content-type") {
                &mut content_type
            } else if name.eq_ignore_ascii_case("content-encoding") {
                &mut content_encoding
            } else if name.eq_ignore_ascii_case(CLIENT_ID_HEADER) {
                &mut client_id
            } else {
                continue;
            };
            slot.get_or_insert(value);
        }

        Self {
            content_type: content_type.unwrap_or_default().to_string(),
            content_encoding: content_encoding.unwrap_or_default().to_string(),
            client_id: client_id.map(str::to_string),
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_content_encoding(mut self, content_encoding: impl Into<String>) -> Self {
        self.content_encoding = content_encoding.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

/// Result of decoding one payload
#[derive(Debug)]
pub struct DecodeOutput {
    /// Compact JSON per decoded record, in stream order
    pub records: Vec<String>,
    /// All records as one JSON array, newline terminated
    pub combined: String,
    /// How the record stream ended
    pub stop: StopReason,
    /// Non-fatal issues
    pub warnings: Vec<DecodeWarning>,
}

impl DecodeOutput {
    /// Check if every byte of the payload was decoded
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.stop.is_clean()
    }

    /// Line-per-record view, with an error line if the stream was corrupt
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = self.records.clone();
        if let StopReason::Corrupt(e) = &self.stop {
            lines.push(format!("decode error: {e}"));
        }
        lines
    }
}

/// Decodes request bodies into JSON documents
#[derive(Debug, Clone)]
pub struct PayloadDecoder {
    max_payload_size: usize,
    max_decompressed_size: usize,
    limits: ReaderLimits,
    normalizer: Normalizer,
    assembler: BatchAssembler,
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

impl PayloadDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            max_payload_size: options.max_payload_size,
            max_decompressed_size: options.max_decompressed_size,
            limits: options.limits,
            normalizer: Normalizer::new(options.extensions),
            assembler: BatchAssembler::new(options.assemble),
        }
    }

    /// Largest accepted request body
    #[inline]
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Decode one payload
    ///
    /// Fails only when nothing can be decoded: an oversized body, an unknown
    /// encoding or a broken compressed stream. A corrupt record is not an
    /// error; the records before it are returned and `stop` says why the
    /// stream ended.
    pub fn decode(&self, input: &RawInput) -> Result<DecodeOutput> {
        let span = info_span!(
            "decode",
            client_id = input.client_id.as_deref().unwrap_or("-"),
            content_type = %input.content_type,
            content_encoding = %input.content_encoding,
            size = input.body.len(),
        );
        let _guard = span.enter();

        if input.body.len() > self.max_payload_size {
            return Err(DecodeError::payload_too_large(
                input.body.len(),
                self.max_payload_size,
            ));
        }

        let encoding = ContentEncoding::parse(&input.content_encoding)?;
        let body = encoding.decompress(&input.body, self.max_decompressed_size)?;

        let DecodedRecords { records, stop } = decode_records(&body, self.limits);

        let mut warnings = Vec::new();
        let mut documents = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let normalized = self.normalizer.normalize_tree(project(record));
            warnings.extend(normalized.issues.into_iter().map(|issue| {
                DecodeWarning::ShapeMismatch {
                    record: index,
                    field: issue.field,
                    reason: issue.reason,
                }
            }));
            documents.push(normalized.document);
        }

        let batch = self.assembler.assemble(&documents);
        warnings.extend(batch.warnings);

        debug!(
            records = batch.records.len(),
            inflated = body.len(),
            complete = stop.is_clean(),
            warnings = warnings.len(),
            "payload decoded"
        );

        Ok(DecodeOutput {
            records: batch.records,
            combined: batch.combined,
            stop,
            warnings,
        })
    }
}
