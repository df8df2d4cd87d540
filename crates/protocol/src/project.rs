//! Generic JSON projection of decoded records
//!
//! A purely structural mapping with no knowledge of what the fields mean:
//! structs become objects (keys in wire order), lists and sets become
//! arrays. The only translations are the ones JSON forces:
//!
//! - `Map` becomes a flat alternating array `[k0, v0, k1, v1, ...]`
//! - `Guid` becomes its hyphenated string form
//! - Non-finite doubles become `null`

use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::decode::Record;
use crate::wire::WireValue;

/// Project a record into a JSON object
pub fn project(record: Record) -> Value {
    project_fields(record.into_fields())
}

/// Project a single wire value
pub fn project_value(value: WireValue) -> Value {
    match value {
        WireValue::Int64(v) => Value::from(v),
        WireValue::UInt64(v) => Value::from(v),
        WireValue::Double(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        WireValue::Bool(v) => Value::Bool(v),
        WireValue::String(v) => Value::String(v),
        WireValue::Guid(bytes) => Value::String(guid_string(bytes)),
        WireValue::Struct(fields) => project_fields(fields),
        WireValue::Array(items) => Value::Array(items.into_iter().map(project_value).collect()),
        WireValue::Map(entries) => {
            let mut flat = Vec::with_capacity(entries.len() * 2);
            for (key, value) in entries {
                flat.push(project_value(key));
                flat.push(project_value(value));
            }
            Value::Array(flat)
        }
    }
}

/// GUID bytes in the little-endian field layout used on the wire
pub fn guid_string(bytes: [u8; 16]) -> String {
    Uuid::from_bytes_le(bytes).hyphenated().to_string()
}

fn project_fields(fields: Vec<(String, WireValue)>) -> Value {
    let mut object = Map::with_capacity(fields.len());
    for (name, value) in fields {
        object.insert(name, project_value(value));
    }
    Value::Object(object)
}
