//! Content-Encoding handling
//!
//! Request bodies arrive either raw or compressed with gzip/deflate. The whole
//! body is inflated up front: record boundaries are only discovered by
//! parsing, so a partially inflated buffer is worthless and any failure here
//! discards the payload.
//!
//! `deflate` is ambiguous in the wild. HTTP says zlib-wrapped (RFC 1950),
//! while several client stacks send a raw RFC 1951 stream. The zlib header
//! check picks the right inflater.

use std::io::Read;

use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use flate2::{Decompress, FlushDecompress, Status};

use crate::{DecodeError, Result};

/// Default cap on inflated payload size (64MB)
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

/// Growth step for the inflate buffer
const INFLATE_CHUNK: usize = 32 * 1024;

/// Supported request body encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncoding {
    /// No compression
    Identity,
    /// gzip (RFC 1952), possibly multi-member
    Gzip,
    /// zlib (RFC 1950) or raw deflate (RFC 1951)
    Deflate,
}

impl ContentEncoding {
    /// Parse a Content-Encoding header value
    ///
    /// Empty and `identity` mean no compression. Anything other than
    /// gzip/deflate (and their `x-` aliases) is rejected.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("identity") {
            Ok(Self::Identity)
        } else if value.eq_ignore_ascii_case("gzip") || value.eq_ignore_ascii_case("x-gzip") {
            Ok(Self::Gzip)
        } else if value.eq_ignore_ascii_case("deflate") || value.eq_ignore_ascii_case("x-deflate")
        {
            Ok(Self::Deflate)
        } else {
            Err(DecodeError::unsupported_encoding(value))
        }
    }

    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    /// Inflate `body` according to this encoding
    ///
    /// Identity returns the body unchanged without copying.
    pub fn decompress(self, body: &Bytes, max_size: usize) -> Result<Bytes> {
        match self {
            Self::Identity => Ok(body.clone()),
            Self::Gzip => gunzip(body, max_size),
            Self::Deflate => inflate(body, is_zlib_header(body), max_size),
        }
    }
}

impl std::fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decompress a body given its raw Content-Encoding header value
pub fn decompress(encoding: &str, body: &Bytes, max_size: usize) -> Result<Bytes> {
    ContentEncoding::parse(encoding)?.decompress(body, max_size)
}

fn gunzip(body: &[u8], max_size: usize) -> Result<Bytes> {
    let encoding = ContentEncoding::Gzip.as_str();
    let mut decoded = Vec::new();

    // One byte past the limit tells "exactly at limit" from "over it"
    MultiGzDecoder::new(body)
        .take(max_size as u64 + 1)
        .read_to_end(&mut decoded)
        .map_err(|e| DecodeError::decompression(encoding, e))?;

    if decoded.len() > max_size {
        return Err(too_large(encoding, max_size));
    }
    Ok(Bytes::from(decoded))
}

/// Inflate a zlib or raw deflate stream
///
/// Driven through `Decompress` rather than a `Read` adaptor so a stream
/// that ends before its final block is reported instead of silently
/// yielding a prefix.
fn inflate(body: &[u8], zlib: bool, max_size: usize) -> Result<Bytes> {
    let encoding = ContentEncoding::Deflate.as_str();
    let mut inflater = Decompress::new(zlib);
    let mut decoded: Vec<u8> = Vec::with_capacity(body.len().saturating_mul(4).min(max_size));

    loop {
        // Room for one byte past the limit tells "exactly at limit" from "over it"
        if decoded.len() == decoded.capacity() {
            decoded.reserve(INFLATE_CHUNK.min(max_size.saturating_add(1) - decoded.len()));
        }

        let consumed = inflater.total_in() as usize;
        let status = inflater
            .decompress_vec(&body[consumed..], &mut decoded, FlushDecompress::Finish)
            .map_err(|e| DecodeError::decompression(encoding, e))?;

        if decoded.len() > max_size {
            return Err(too_large(encoding, max_size));
        }

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let input_drained = inflater.total_in() as usize >= body.len();
                let output_has_room = decoded.len() < decoded.capacity();
                if input_drained && output_has_room {
                    return Err(DecodeError::decompression(
                        encoding,
                        "unexpected end of compressed stream",
                    ));
                }
            }
        }
    }

    Ok(Bytes::from(decoded))
}

/// Check for a valid RFC 1950 header (CM=8, window <= 32K, FCHECK)
fn is_zlib_header(body: &[u8]) -> bool {
    match body {
        [cmf, flg, ..] => {
            cmf & 0x0F == 8 && cmf >> 4 <= 7 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0
        }
        _ => false,
    }
}

fn too_large(encoding: &'static str, max_size: usize) -> DecodeError {
    DecodeError::decompression(
        encoding,
        format!("inflated size exceeds limit of {max_size} bytes"),
    )
}
