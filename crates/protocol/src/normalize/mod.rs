//! Extension normalization
//!
//! Reshapes a projected record into its canonical JSON form:
//!
//! - each mapped extension field (`extOs: [{..}]`) collapses into
//!   `ext.<canonical>` and the original field is removed
//! - the flat `data[0].properties` list becomes a `data` object of natively
//!   typed values
//!
//! The output always has an `ext` object, followed by `data` when present.
//! Unexpected shapes never abort a record. They are logged, reported in
//! [`NormalizedTree::issues`] and the offending field is skipped.

mod ext_map;
mod typed_value;

pub use ext_map::{DEFAULT_EXTENSIONS, ExtensionMap};
pub use typed_value::TypedValue;

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Canonical extension object
pub const EXT_FIELD: &str = "ext";

/// Where a record's own `ext` field is moved to
pub const EXT_DATA_FIELD: &str = "extData";

/// Typed event payload
pub const DATA_FIELD: &str = "data";

const PROPERTIES_FIELD: &str = "properties";

/// A field that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// Top-level field the issue was found in
    pub field: String,
    /// What was wrong with it
    pub reason: String,
}

impl ShapeMismatch {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Normalized document plus any issues found on the way
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTree {
    pub document: Value,
    pub issues: Vec<ShapeMismatch>,
}

/// Collapses extension fields and types `data` properties
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    extensions: ExtensionMap,
}

impl Normalizer {
    pub fn new(extensions: ExtensionMap) -> Self {
        Self { extensions }
    }

    pub fn extensions(&self) -> &ExtensionMap {
        &self.extensions
    }

    /// Normalize a tree, logging and discarding shape issues
    pub fn normalize(&self, tree: Value) -> Value {
        self.normalize_tree(tree).document
    }

    /// Normalize a tree, returning shape issues alongside the document
    pub fn normalize_tree(&self, tree: Value) -> NormalizedTree {
        let mut issues = Vec::new();

        let mut object = match tree {
            Value::Object(object) => object,
            other => {
                let issue =
                    ShapeMismatch::new("", format!("record is {}, not an object", kind(&other)));
                report(&issue);
                return NormalizedTree {
                    document: other,
                    issues: vec![issue],
                };
            }
        };

        let mut ext = take_ext(&mut object, &mut issues);
        self.collapse_extensions(&mut object, &mut ext, &mut issues);
        let data = object
            .shift_remove(DATA_FIELD)
            .map(|data| normalize_data(data, &mut issues));

        object.insert(EXT_FIELD.to_string(), Value::Object(ext));
        if let Some(data) = data {
            object.insert(DATA_FIELD.to_string(), data);
        }

        for issue in &issues {
            report(issue);
        }
        NormalizedTree {
            document: Value::Object(object),
            issues,
        }
    }

    fn collapse_extensions(
        &self,
        object: &mut Map<String, Value>,
        ext: &mut Map<String, Value>,
        issues: &mut Vec<ShapeMismatch>,
    ) {
        let mapped: Vec<(String, String)> = object
            .keys()
            .filter_map(|field| {
                self.extensions
                    .canonical(field)
                    .map(|canonical| (field.clone(), canonical.to_string()))
            })
            .collect();

        for (field, canonical) in mapped {
            // Removed unconditionally so internal names never leak
            let Some(value) = object.shift_remove(&field) else {
                continue;
            };

            let first = match value {
                Value::Array(items) => match items.into_iter().next() {
                    Some(first) => first,
                    None => continue,
                },
                other => {
                    issues.push(ShapeMismatch::new(
                        field,
                        format!("expected an array of structs, found {}", kind(&other)),
                    ));
                    continue;
                }
            };

            if !first.is_object() {
                issues.push(ShapeMismatch::new(
                    field,
                    format!("expected a struct element, found {}", kind(&first)),
                ));
                continue;
            }

            if ext.contains_key(&canonical) {
                debug!(field = %field, canonical = %canonical, "ext key already set, keeping first");
                continue;
            }
            ext.insert(canonical, first);
        }
    }
}

/// Normalize with the default extension map
pub fn normalize(tree: Value) -> Value {
    Normalizer::default().normalize(tree)
}

/// Pull out the starting `ext` object
///
/// An existing object (an already normalized tree) is kept. Anything else
/// is the record's own `ext` field, which moves to `extData`.
fn take_ext(object: &mut Map<String, Value>, issues: &mut Vec<ShapeMismatch>) -> Map<String, Value> {
    match object.shift_remove(EXT_FIELD) {
        None => Map::new(),
        Some(Value::Object(ext)) => ext,
        Some(own) => {
            if object.contains_key(EXT_DATA_FIELD) {
                issues.push(ShapeMismatch::new(
                    EXT_FIELD,
                    format!("{EXT_DATA_FIELD} already present, record ext dropped"),
                ));
            } else {
                object.insert(EXT_DATA_FIELD.to_string(), own);
            }
            Map::new()
        }
    }
}

/// Turn `[{ "properties": [k0, v0, ...] }]` into `{ k0: v0', ... }`
///
/// Anything else (including an already normalized object) is returned as is.
fn normalize_data(data: Value, issues: &mut Vec<ShapeMismatch>) -> Value {
    let mut elements = match data {
        Value::Array(elements) => elements,
        other => return other,
    };

    let has_properties = elements
        .first()
        .and_then(|first| first.get(PROPERTIES_FIELD))
        .is_some_and(Value::is_array);
    if !has_properties {
        if !elements.is_empty() {
            issues.push(ShapeMismatch::new(
                DATA_FIELD,
                "first element has no properties list",
            ));
        }
        return Value::Array(elements);
    }

    if elements.len() > 1 {
        issues.push(ShapeMismatch::new(
            DATA_FIELD,
            format!("{} extra data elements ignored", elements.len() - 1),
        ));
    }

    let properties = match elements.swap_remove(0) {
        Value::Object(mut first) => match first.shift_remove(PROPERTIES_FIELD) {
            Some(Value::Array(properties)) => properties,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut typed = Map::with_capacity(properties.len() / 2);
    let mut pairs = properties.into_iter();
    while let Some(key) = pairs.next() {
        let key = match key {
            Value::String(key) => key,
            other => {
                let key = other.to_string();
                issues.push(ShapeMismatch::new(
                    DATA_FIELD,
                    format!("non-string property key {key} stringified"),
                ));
                key
            }
        };
        let Some(value) = pairs.next() else {
            issues.push(ShapeMismatch::new(
                DATA_FIELD,
                format!("property {key:?} has no value, dropped"),
            ));
            break;
        };
        typed.insert(key, TypedValue::from_json(value).into_json());
    }

    Value::Object(typed)
}

fn report(issue: &ShapeMismatch) {
    warn!(field = %issue.field, reason = %issue.reason, "shape mismatch during normalization");
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod normalize_test;
