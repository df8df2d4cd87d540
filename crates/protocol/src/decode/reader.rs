//! Streaming record reader
//!
//! Records are concatenated back to back with no framing, so the start of
//! record N+1 is only known once record N has been parsed to its `STOP`.

use tracing::{debug, trace};

use super::cursor::Cursor;
use super::record::Record;
use crate::schema::{RECORD, Shape, StructDef};
use crate::wire::{WireType, WireValue};
use crate::Result;

/// Default maximum string length in bytes (16MB)
pub const DEFAULT_MAX_STRING_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum elements in one container
pub const DEFAULT_MAX_CONTAINER_LENGTH: usize = 1024 * 1024;

/// Default maximum nesting of structs and containers
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Bounds applied to declared lengths before anything is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderLimits {
    /// Maximum string length in bytes (WSTRING counts 2 bytes per unit)
    pub max_string_length: usize,
    /// Maximum element count of a LIST, SET or MAP
    pub max_container_length: usize,
    /// Maximum nesting depth
    pub max_depth: usize,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_container_length: DEFAULT_MAX_CONTAINER_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Reads records one at a time from a fully materialized buffer
///
/// ```ignore
/// let mut reader = RecordReader::new(&body);
/// while let Some(record) = reader.read_record()? {
///     println!("{}", record.name().unwrap_or("-"));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RecordReader<'a> {
    cursor: Cursor<'a>,
    limits: ReaderLimits,
    records_read: usize,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    /// Create a reader with default limits
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limits(buf, ReaderLimits::default())
    }

    pub fn with_limits(buf: &'a [u8], limits: ReaderLimits) -> Self {
        Self {
            cursor: Cursor::new(buf),
            limits,
            records_read: 0,
            failed: false,
        }
    }

    /// Current byte offset into the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Number of records successfully read so far
    #[inline]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read the next record
    ///
    /// Returns `Ok(None)` when the buffer ends exactly on a record boundary.
    /// Any failure after the first byte of a record is an error, and nothing
    /// past it can be recovered.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let start = self.cursor.position();
        self.cursor.set_record(self.records_read);
        let fields = self.read_fields(Some(&RECORD), 0)?;
        let record = Record::new(fields);

        debug!(
            record = self.records_read,
            offset = start,
            size = self.cursor.position() - start,
            fields = record.len(),
            name = record.name().unwrap_or("-"),
            "decoded record"
        );
        self.records_read += 1;
        Ok(Some(record))
    }

    /// Read struct fields up to and including the terminating `STOP`
    ///
    /// With a layout, known ids get their schema name and unknown ids are
    /// skipped. Without one, fields are named by their numeric id.
    fn read_fields(
        &mut self,
        def: Option<&'static StructDef>,
        depth: usize,
    ) -> Result<Vec<(String, WireValue)>> {
        let mut fields = Vec::new();

        loop {
            let header_at = self.cursor.position();
            let (ty, id) = self.cursor.read_field_header()?;

            match ty {
                WireType::Stop => break,
                // Boundary between base and derived struct fields
                WireType::StopBase => continue,
                _ => {}
            }

            match def {
                Some(def) => match def.field(id) {
                    Some(field) => {
                        let value = self.read_value(ty, field.shape, depth)?;
                        fields.push((field.name.to_string(), value));
                    }
                    None => {
                        trace!(
                            layout = def.name,
                            id,
                            wire_type = %ty,
                            offset = header_at,
                            "skipping unknown field"
                        );
                        self.read_value(ty, Shape::Any, depth)?;
                    }
                },
                None => {
                    let value = self.read_value(ty, Shape::Any, depth)?;
                    fields.push((id.to_string(), value));
                }
            }
        }

        Ok(fields)
    }

    fn read_value(&mut self, ty: WireType, shape: Shape, depth: usize) -> Result<WireValue> {
        let value = match ty {
            WireType::Bool => WireValue::Bool(self.cursor.read_bool()?),
            WireType::UInt8 => WireValue::UInt64(u64::from(self.cursor.read_u8()?)),
            WireType::UInt16 => WireValue::UInt64(u64::from(self.cursor.read_u16()?)),
            WireType::UInt32 => WireValue::UInt64(u64::from(self.cursor.read_u32()?)),
            WireType::UInt64 => WireValue::UInt64(self.cursor.read_u64()?),
            WireType::Int8 => WireValue::Int64(i64::from(self.cursor.read_u8()? as i8)),
            WireType::Int16 => WireValue::Int64(i64::from(self.cursor.read_i16()?)),
            WireType::Int32 => WireValue::Int64(i64::from(self.cursor.read_i32()?)),
            WireType::Int64 => WireValue::Int64(self.cursor.read_i64()?),
            WireType::Float => WireValue::Double(f64::from(self.cursor.read_f32()?)),
            WireType::Double => WireValue::Double(self.cursor.read_f64()?),
            WireType::String => WireValue::String(self.read_string()?),
            WireType::WString => WireValue::String(self.read_wstring()?),
            WireType::Struct => {
                self.enter(depth)?;
                let def = match shape {
                    Shape::Struct(def) => Some(def),
                    _ => None,
                };
                WireValue::Struct(self.read_fields(def, depth + 1)?)
            }
            WireType::List | WireType::Set => self.read_list(shape, depth)?,
            WireType::Map => self.read_map(shape, depth)?,
            WireType::Stop | WireType::StopBase => {
                let at = self.cursor.position();
                return Err(self.cursor.malformed_at(at, format!("{ty} is not a value type")));
            }
        };
        Ok(value)
    }

    fn read_string(&mut self) -> Result<String> {
        let at = self.cursor.position();
        let len = self.cursor.read_u32()? as usize;
        if len > self.limits.max_string_length {
            return Err(self.cursor.malformed_at(
                at,
                format!(
                    "string length {len} exceeds limit of {}",
                    self.limits.max_string_length
                ),
            ));
        }
        let bytes = self.cursor.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// UTF-16LE string; the length prefix counts code units
    fn read_wstring(&mut self) -> Result<String> {
        let at = self.cursor.position();
        let units = self.cursor.read_u32()? as usize;
        let len = units.saturating_mul(2);
        if len > self.limits.max_string_length {
            return Err(self.cursor.malformed_at(
                at,
                format!(
                    "wstring length {len} exceeds limit of {}",
                    self.limits.max_string_length
                ),
            ));
        }
        let bytes = self.cursor.read_bytes(len)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }

    fn read_list(&mut self, shape: Shape, depth: usize) -> Result<WireValue> {
        self.enter(depth)?;
        let elem_ty = self.cursor.read_element_type()?;
        let count = self.read_count()?;

        if matches!(shape, Shape::Guid) && elem_ty == WireType::UInt8 && count == 16 {
            return Ok(WireValue::Guid(self.cursor.read_array()?));
        }

        let elem_shape = match shape {
            Shape::List(inner) => *inner,
            _ => Shape::Any,
        };
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_value(elem_ty, elem_shape, depth + 1)?);
        }
        Ok(WireValue::Array(items))
    }

    fn read_map(&mut self, shape: Shape, depth: usize) -> Result<WireValue> {
        self.enter(depth)?;
        let key_ty = self.cursor.read_element_type()?;
        let value_ty = self.cursor.read_element_type()?;
        let count = self.read_count()?;

        let value_shape = match shape {
            Shape::Map(inner) => *inner,
            _ => Shape::Any,
        };
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let key = self.read_value(key_ty, Shape::Any, depth + 1)?;
            let value = self.read_value(value_ty, value_shape, depth + 1)?;
            entries.push((key, value));
        }
        Ok(WireValue::Map(entries))
    }

    /// Container element count, bounded before allocation
    fn read_count(&mut self) -> Result<usize> {
        let at = self.cursor.position();
        let count = self.cursor.read_u32()? as usize;
        if count > self.limits.max_container_length {
            return Err(self.cursor.malformed_at(
                at,
                format!(
                    "container length {count} exceeds limit of {}",
                    self.limits.max_container_length
                ),
            ));
        }
        // Every element takes at least one byte
        self.cursor.ensure(count)?;
        Ok(count)
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth >= self.limits.max_depth {
            let at = self.cursor.position();
            return Err(self.cursor.malformed_at(
                at,
                format!("nesting exceeds limit of {}", self.limits.max_depth),
            ));
        }
        Ok(())
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for RecordReader<'_> {}
