//! Typed property values
//!
//! A property in `data` arrives as a `Value` struct: a `type` discriminant
//! plus whichever payload field that kind uses. [`TypedValue`] resolves it
//! to what the JSON output should hold.

use serde_json::{Map, Number, Value};

use crate::schema::ValueKind;

/// A resolved property value
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// `Int64`, `Int32` and `DateTime` kinds
    Int(i64),
    /// `UInt64` and `UInt32` kinds (`longValue` reinterpreted)
    UInt(u64),
    Double(f64),
    Guid(String),
    Bool(bool),
    String(String),
    /// Anything kept as the original struct: attributed values, array
    /// kinds, unknown kinds and payloads of the wrong type
    Raw(Value),
}

impl TypedValue {
    /// Resolve a projected `Value` struct
    pub fn from_json(value: Value) -> Self {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Self::Raw(other),
        };

        // PII/customer-content tagging must survive
        if fields.contains_key("attributes") {
            return Self::Raw(Value::Object(fields));
        }

        // Producers omit `type` when it holds the default
        let kind = match fields.get("type") {
            None => Some(ValueKind::String),
            Some(raw) => raw.as_i64().and_then(ValueKind::from_i64),
        };
        let Some(kind) = kind else {
            return Self::Raw(Value::Object(fields));
        };

        let resolved = match kind {
            ValueKind::Int64 | ValueKind::Int32 | ValueKind::DateTime => {
                long_value(&fields).map(Self::Int)
            }
            ValueKind::UInt64 | ValueKind::UInt32 => {
                long_value(&fields).map(|v| Self::UInt(v as u64))
            }
            ValueKind::Double => match fields.get("doubleValue") {
                None => Some(Self::Double(0.0)),
                Some(v) => v.as_f64().map(Self::Double),
            },
            ValueKind::Guid => fields
                .get("guidValue")
                .and_then(Value::as_array)
                .and_then(|guids| guids.first())
                .and_then(Value::as_str)
                .map(|g| Self::Guid(g.to_string())),
            // Producers set a payload field only for `true`
            ValueKind::Bool => Some(Self::Bool(fields.len() != 1)),
            ValueKind::String => sole_string(&fields).map(Self::String),
            ValueKind::ArrayInt64
            | ValueKind::ArrayUInt64
            | ValueKind::ArrayInt32
            | ValueKind::ArrayUInt32
            | ValueKind::ArrayDouble
            | ValueKind::ArrayString
            | ValueKind::ArrayBool
            | ValueKind::ArrayDateTime
            | ValueKind::ArrayGuid => None,
        };

        resolved.unwrap_or_else(|| Self::Raw(Value::Object(fields)))
    }

    /// Convert into the JSON emitted under `data`
    pub fn into_json(self) -> Value {
        match self {
            Self::Int(v) => Value::from(v),
            Self::UInt(v) => Value::from(v),
            Self::Double(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
            Self::Guid(v) | Self::String(v) => Value::String(v),
            Self::Bool(v) => Value::Bool(v),
            Self::Raw(v) => v,
        }
    }

    /// Check if the value was kept as its original struct
    #[inline]
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// `longValue`, defaulting to 0 when absent
fn long_value(fields: &Map<String, Value>) -> Option<i64> {
    match fields.get("longValue") {
        None => Some(0),
        Some(v) => v.as_i64(),
    }
}

/// `stringValue` when it is the only payload field (`type` aside)
fn sole_string(fields: &Map<String, Value>) -> Option<String> {
    let mut payload = fields.iter().filter(|(name, _)| name.as_str() != "type");
    match (payload.next(), payload.next()) {
        (None, _) => Some(String::new()),
        (Some((name, Value::String(s))), None) if name == "stringValue" => Some(s.clone()),
        _ => None,
    }
}
