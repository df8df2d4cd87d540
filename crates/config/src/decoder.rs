//! Decoder configuration
//!
//! Limits, output rendering and the extension mapping used by
//! `PayloadDecoder`.

use std::collections::BTreeMap;

use cslens_protocol::{
    AssembleOptions, DEFAULT_INDENT, DEFAULT_MAX_CONTAINER_LENGTH, DEFAULT_MAX_DECOMPRESSED_SIZE,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAYLOAD_SIZE, DEFAULT_MAX_STRING_LENGTH, DecoderOptions,
    ExtensionMap, ReaderLimits,
};
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Widest accepted pretty-print indent
pub const MAX_INDENT: usize = 16;

/// Decoder configuration
///
/// # Example
///
/// ```toml
/// [decoder]
/// compact = false
/// indent = 2
/// max_string_length = 1048576
///
/// [decoder.extensions]
/// extCustom = "custom"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DecoderConfig {
    /// Emit the combined array without whitespace
    /// Default: false
    pub compact: bool,

    /// Pretty-print indent width
    /// Default: 2
    pub indent: usize,

    /// Largest accepted body before decompression (bytes)
    /// Default: 16MB
    pub max_payload_size: usize,

    /// Largest accepted body after decompression (bytes)
    /// Default: 64MB
    pub max_decompressed_size: usize,

    /// Largest declared string length (bytes)
    /// Default: 16MB
    pub max_string_length: usize,

    /// Largest declared container element count
    /// Default: 1048576
    pub max_container_length: usize,

    /// Deepest struct/container nesting
    /// Default: 64
    pub max_depth: usize,

    /// Extra or overriding extension mappings (field → canonical name)
    pub extensions: BTreeMap<String, String>,

    /// Use only `extensions`, dropping the built-in mapping
    /// Default: false
    pub replace_extensions: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            compact: false,
            indent: DEFAULT_INDENT,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_container_length: DEFAULT_MAX_CONTAINER_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            extensions: BTreeMap::new(),
            replace_extensions: false,
        }
    }
}

impl DecoderConfig {
    /// Build the extension map this config describes
    pub fn extension_map(&self) -> ExtensionMap {
        let mut map = if self.replace_extensions {
            ExtensionMap::empty()
        } else {
            ExtensionMap::default()
        };
        map.extend(self.extensions.iter().map(|(f, c)| (f.as_str(), c.as_str())));
        map
    }

    /// Convert into decoder options
    pub fn to_options(&self) -> DecoderOptions {
        DecoderOptions {
            max_payload_size: self.max_payload_size,
            max_decompressed_size: self.max_decompressed_size,
            limits: ReaderLimits {
                max_string_length: self.max_string_length,
                max_container_length: self.max_container_length,
                max_depth: self.max_depth,
            },
            assemble: AssembleOptions {
                compact: self.compact,
                indent: self.indent,
            },
            extensions: self.extension_map(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("max_payload_size", self.max_payload_size),
            ("max_decompressed_size", self.max_decompressed_size),
            ("max_string_length", self.max_string_length),
            ("max_container_length", self.max_container_length),
            ("max_depth", self.max_depth),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid_value("decoder", field, "must be greater than 0"));
            }
        }

        if self.indent > MAX_INDENT {
            return Err(ConfigError::invalid_value(
                "decoder",
                "indent",
                format!("{} exceeds maximum of {MAX_INDENT}", self.indent),
            ));
        }

        if let Some((field, _)) = self
            .extensions
            .iter()
            .find(|(field, canonical)| field.is_empty() || canonical.is_empty())
        {
            return Err(ConfigError::invalid_value(
                "decoder",
                "extensions",
                format!("empty mapping for '{field}'"),
            ));
        }

        Ok(())
    }
}
