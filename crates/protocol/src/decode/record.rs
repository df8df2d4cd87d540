//! Decoded record type

use crate::wire::WireValue;

/// One decoded telemetry record
///
/// Holds the top-level fields that were present on the wire, in wire order.
/// Fields the producer omitted (default-valued) are simply absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, WireValue)>,
}

impl Record {
    pub(crate) fn new(fields: Vec<(String, WireValue)>) -> Self {
        Self { fields }
    }

    /// Top-level fields in wire order
    #[inline]
    pub fn fields(&self) -> &[(String, WireValue)] {
        &self.fields
    }

    /// Look up a top-level field by name
    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Event name (`name`), if present
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(WireValue::as_str)
    }

    /// Event time (`time`), if present
    pub fn time(&self) -> Option<i64> {
        self.get("time").and_then(WireValue::as_i64)
    }

    /// Instrumentation key (`iKey`), if present
    pub fn ikey(&self) -> Option<&str> {
        self.get("iKey").and_then(WireValue::as_str)
    }

    /// Number of top-level fields present
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Take the fields out as a struct value
    pub fn into_value(self) -> WireValue {
        WireValue::Struct(self.fields)
    }

    pub fn into_fields(self) -> Vec<(String, WireValue)> {
        self.fields
    }
}
