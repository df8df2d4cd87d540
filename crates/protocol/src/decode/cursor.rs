//! Byte cursor with compact-binary primitive readers
//!
//! Every read is bounds checked. Running out of bytes is a
//! `TruncatedRecord`; bytes that cannot be what they claim to be (bad type
//! tags, overlong varints, bool bytes other than 0/1) are `MalformedField`.

use crate::wire::WireType;
use crate::{DecodeError, Result};

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Index of the record being read, for error reporting
    record: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            record: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    pub fn set_record(&mut self, record: usize) {
        self.record = record;
    }

    pub fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::truncated(self.record, self.pos, needed, self.remaining())
    }

    pub fn malformed_at(&self, offset: usize, reason: impl Into<String>) -> DecodeError {
        DecodeError::malformed(self.record, offset, reason)
    }

    /// Fail unless `needed` more bytes are available
    #[inline]
    pub fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            Err(self.truncated(needed))
        } else {
            Ok(())
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.buf.get(self.pos).ok_or_else(|| self.truncated(1))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// LEB128 varint no wider than `width` bits
    fn read_varint(&mut self, width: u32) -> Result<u64> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let raw = self.read_u8()?;
            // Only the lowest bit of a tenth byte fits in 64 bits
            if shift == 63 && raw & 0x7E != 0 {
                return Err(self.malformed_at(start, format!("varint exceeds {width} bits")));
            }
            value |= u64::from(raw & 0x7F) << shift;
            if raw & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift >= width {
                return Err(self.malformed_at(start, format!("varint exceeds {width} bits")));
            }
        }

        if width < 64 && value >> width != 0 {
            return Err(self.malformed_at(start, format!("varint exceeds {width} bits")));
        }
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        // Width checked in read_varint
        Ok(self.read_varint(16)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_varint(32)? as u32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_varint(64)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let raw = self.read_u16()?;
        Ok(((raw >> 1) as i16) ^ -((raw & 1) as i16))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let raw = self.read_u32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let raw = self.read_u64()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        let start = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.malformed_at(start, format!("invalid bool byte {other:#04x}"))),
        }
    }

    /// Field header: `(id_bits << 5) | type`, with 1- or 2-byte id escapes
    pub fn read_field_header(&mut self) -> Result<(WireType, u16)> {
        let start = self.pos;
        let raw = self.read_u8()?;
        let ty = WireType::from_u8(raw & 0x1F)
            .ok_or_else(|| self.malformed_at(start, format!("invalid type tag {}", raw & 0x1F)))?;

        let id = match raw >> 5 {
            small @ 0..=5 => u16::from(small),
            6 => u16::from(self.read_u8()?),
            _ => u16::from_le_bytes(self.read_array()?),
        };
        Ok((ty, id))
    }

    /// Container element/key/value type byte; the high 3 bits must be zero
    pub fn read_element_type(&mut self) -> Result<WireType> {
        let start = self.pos;
        let raw = self.read_u8()?;
        if raw >> 5 != 0 {
            return Err(self.malformed_at(start, format!("invalid container type byte {raw:#04x}")));
        }
        match WireType::from_u8(raw) {
            Some(ty) if ty.is_value() => Ok(ty),
            _ => Err(self.malformed_at(start, format!("invalid element type {raw}"))),
        }
    }
}
