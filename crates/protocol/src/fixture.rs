//! Compact binary payload writer for tests

#![allow(dead_code)]

use crate::schema::ValueKind;
use crate::wire::WireType;

/// Minimal compact binary v1 writer
#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn header(&mut self, ty: WireType, id: u16) -> &mut Self {
        let ty = ty.as_u8();
        if id <= 5 {
            self.buf.push(((id as u8) << 5) | ty);
        } else if id <= 0xFF {
            self.buf.push((6 << 5) | ty);
            self.buf.push(id as u8);
        } else {
            self.buf.push((7 << 5) | ty);
            self.buf.extend_from_slice(&id.to_le_bytes());
        }
        self
    }

    pub fn varint(&mut self, mut value: u64) -> &mut Self {
        while value >= 0x80 {
            self.buf.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
        self
    }

    pub fn zigzag(&mut self, value: i64) -> &mut Self {
        self.varint(((value << 1) ^ (value >> 63)) as u64)
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        self.varint(value.len() as u64);
        self.raw(value.as_bytes())
    }

    pub fn wstring(&mut self, value: &str) -> &mut Self {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.varint(units.len() as u64);
        for unit in units {
            self.buf.extend_from_slice(&unit.to_le_bytes());
        }
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.buf.push(WireType::Stop.as_u8());
        self
    }

    // Field helpers

    pub fn string_field(&mut self, id: u16, value: &str) -> &mut Self {
        self.header(WireType::String, id).string(value)
    }

    pub fn int64_field(&mut self, id: u16, value: i64) -> &mut Self {
        self.header(WireType::Int64, id).zigzag(value)
    }

    pub fn int32_field(&mut self, id: u16, value: i32) -> &mut Self {
        self.header(WireType::Int32, id).zigzag(i64::from(value))
    }

    pub fn uint64_field(&mut self, id: u16, value: u64) -> &mut Self {
        self.header(WireType::UInt64, id).varint(value)
    }

    pub fn double_field(&mut self, id: u16, value: f64) -> &mut Self {
        self.header(WireType::Double, id).raw(&value.to_le_bytes())
    }

    pub fn bool_field(&mut self, id: u16, value: bool) -> &mut Self {
        self.header(WireType::Bool, id).raw(&[u8::from(value)])
    }

    pub fn list_header(&mut self, id: u16, elem: WireType, count: usize) -> &mut Self {
        self.header(WireType::List, id)
            .raw(&[elem.as_u8()])
            .varint(count as u64)
    }

    pub fn map_header(&mut self, id: u16, key: WireType, value: WireType, count: usize) -> &mut Self {
        self.header(WireType::Map, id)
            .raw(&[key.as_u8(), value.as_u8()])
            .varint(count as u64)
    }

    /// A `vector<Struct>` field holding one element written by `body`
    pub fn single_struct_list(&mut self, id: u16, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.list_header(id, WireType::Struct, 1);
        body(self);
        self.stop()
    }

    /// A 16-byte GUID as `list<uint8>` (no field header)
    pub fn guid(&mut self, bytes: &[u8; 16]) -> &mut Self {
        self.raw(&[WireType::UInt8.as_u8()]).varint(16).raw(bytes)
    }
}

/// A typed property value for [`data_field`]
#[derive(Debug, Clone)]
pub(crate) enum Prop<'a> {
    Long(ValueKind, i64),
    Double(f64),
    Str(&'a str),
    /// `type` only, no payload
    Kind(ValueKind),
    Guid([u8; 16]),
    /// String with a PII attribute
    PiiStr(&'a str),
}

/// Write the `Value` struct body for a property (fields + STOP)
pub(crate) fn value_body(w: &mut Writer, prop: &Prop<'_>) {
    match prop {
        Prop::Long(kind, v) => {
            w.int32_field(1, i32::from(kind.as_u8())).int64_field(4, *v);
        }
        Prop::Double(v) => {
            w.int32_field(1, i32::from(ValueKind::Double.as_u8()))
                .double_field(5, *v);
        }
        // String is the default kind, so producers leave `type` off
        Prop::Str(s) => {
            w.string_field(3, s);
        }
        Prop::Kind(kind) => {
            w.int32_field(1, i32::from(kind.as_u8()));
        }
        Prop::Guid(bytes) => {
            w.int32_field(1, i32::from(ValueKind::Guid.as_u8()))
                .list_header(6, WireType::List, 1)
                .guid(bytes);
        }
        Prop::PiiStr(s) => {
            w.single_struct_list(2, |w| {
                w.single_struct_list(1, |w| {
                    w.int32_field(1, 1);
                });
            })
            .string_field(3, s);
        }
    }
    w.stop();
}

/// Write a `vector<Data>` field whose single element carries `props`
pub(crate) fn data_field(w: &mut Writer, id: u16, props: &[(&str, Prop<'_>)]) {
    w.single_struct_list(id, |w| {
        w.map_header(1, WireType::String, WireType::Struct, props.len());
        for (key, prop) in props {
            w.string(key);
            value_body(w, prop);
        }
    });
}

/// A representative record: core fields, two extensions and typed data
pub(crate) fn sample_record(name: &str) -> Vec<u8> {
    let mut w = Writer::new();
    write_sample_record(&mut w, name);
    w.into_bytes()
}

pub(crate) fn write_sample_record(w: &mut Writer, name: &str) {
    w.string_field(1, "4.0")
        .string_field(2, name)
        .int64_field(3, 1_700_000_000_000)
        .string_field(5, "o:0123456789abcdef")
        .single_struct_list(24, |w| {
            w.string_field(4, "Windows").string_field(5, "10.0.22631");
        })
        .single_struct_list(31, |w| {
            w.string_field(1, "Contoso").string_field(3, "wifi");
        });
    data_field(
        w,
        70,
        &[
            ("count", Prop::Long(ValueKind::Int64, 42)),
            ("label", Prop::Str("hello")),
        ],
    );
    w.stop();
}

/// Several sample records back to back
pub(crate) fn sample_payload(names: &[&str]) -> Vec<u8> {
    let mut w = Writer::new();
    for name in names {
        write_sample_record(&mut w, name);
    }
    w.into_bytes()
}
