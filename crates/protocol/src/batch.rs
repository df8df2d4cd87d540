//! Batch assembly
//!
//! Serializes normalized documents two ways:
//!
//! - one compact JSON string per record, for callers that stream results
//! - one combined top-level array of all records, newline terminated
//!
//! # Output Layout
//!
//! ```text
//! records:  ["{..rec0..}", "{..rec1..}"]
//! combined: "[{..rec0..},{..rec1..}]\n"        (compact)
//!           "[\n  {\n    ...\n  }\n]\n"        (pretty, 2-space indent)
//! ```

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::warn;

use crate::DecodeWarning;

/// Default pretty-print indent width
pub const DEFAULT_INDENT: usize = 2;

/// How the combined array is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Emit the combined array without whitespace
    pub compact: bool,
    /// Spaces per level when pretty-printing
    pub indent: usize,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            compact: false,
            indent: DEFAULT_INDENT,
        }
    }
}

impl AssembleOptions {
    pub fn compact() -> Self {
        Self {
            compact: true,
            ..Self::default()
        }
    }
}

/// Serialized output of one payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledBatch {
    /// Compact JSON per record, in stream order
    pub records: Vec<String>,
    /// All records as one array, ending in `\n`
    pub combined: String,
    /// Set when pretty-printing failed and compact output was used
    pub warnings: Vec<DecodeWarning>,
}

/// Turns documents into per-record and combined JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAssembler {
    options: AssembleOptions,
}

impl BatchAssembler {
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> AssembleOptions {
        self.options
    }

    pub fn assemble(&self, documents: &[Value]) -> AssembledBatch {
        let records: Vec<String> = documents.iter().map(Value::to_string).collect();

        let size: usize = records.iter().map(|r| r.len() + 1).sum();
        let mut combined = String::with_capacity(size + 2);
        combined.push('[');
        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                combined.push(',');
            }
            combined.push_str(record);
        }
        combined.push(']');

        let mut warnings = Vec::new();
        if !self.options.compact {
            combined = pretty_or_compact(combined, self.options.indent, &mut warnings);
        }
        combined.push('\n');

        AssembledBatch {
            records,
            combined,
            warnings,
        }
    }
}

/// Assemble with the default indent
pub fn assemble(documents: &[Value], compact: bool) -> AssembledBatch {
    BatchAssembler::new(AssembleOptions {
        compact,
        ..AssembleOptions::default()
    })
    .assemble(documents)
}

/// Pretty-print `compact`, or hand it back unchanged with a warning
pub(crate) fn pretty_or_compact(
    compact: String,
    indent: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> String {
    match pretty(&compact, indent) {
        Ok(rendered) => rendered,
        Err(message) => {
            warn!(error = %message, "pretty-print failed, using compact output");
            warnings.push(DecodeWarning::PrettyPrintFailure(message));
            compact
        }
    }
}

/// Re-parse compact JSON and render it with `indent` spaces per level
fn pretty(compact: &str, indent: usize) -> Result<String, String> {
    let value: Value = serde_json::from_str(compact).map_err(|e| e.to_string())?;

    let indent = vec![b' '; indent];
    let mut out = Vec::with_capacity(compact.len() * 2);
    let formatter = PrettyFormatter::with_indent(&indent);
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).map_err(|e| e.to_string())?;

    String::from_utf8(out).map_err(|e| e.to_string())
}
