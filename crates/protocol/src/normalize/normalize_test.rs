//! Tests for extension normalization

use serde_json::{Value, json};

use super::*;
use crate::decode::RecordReader;
use crate::fixture::{self, Prop, Writer};
use crate::project::project;
use crate::schema::ValueKind;
use crate::wire::WireType;

fn project_bytes(bytes: &[u8]) -> Value {
    let record = RecordReader::new(bytes).read_record().unwrap().unwrap();
    project(record)
}

fn keys(value: &Value) -> Vec<&str> {
    value.as_object().unwrap().keys().map(String::as_str).collect()
}

fn typed(value: Value) -> Value {
    TypedValue::from_json(value).into_json()
}

// =============================================================================
// Extension collapsing
// =============================================================================

#[test]
fn test_sample_record_normalized() {
    let tree = project_bytes(&fixture::sample_record("App.Start"));
    let normalized = Normalizer::default().normalize_tree(tree);

    assert!(normalized.issues.is_empty());
    assert_eq!(
        normalized.document,
        json!({
            "ver": "4.0",
            "name": "App.Start",
            "time": 1_700_000_000_000i64,
            "iKey": "o:0123456789abcdef",
            "ext": {
                "os": { "name": "Windows", "ver": "10.0.22631" },
                "net": { "provider": "Contoso", "type": "wifi" },
            },
            "data": { "count": 42, "label": "hello" },
        })
    );
    assert_eq!(
        keys(&normalized.document),
        ["ver", "name", "time", "iKey", "ext", "data"]
    );
}

#[test]
fn test_ext_keys_match_non_empty_extensions() {
    let mut w = Writer::new();
    w.string_field(2, "evt")
        .single_struct_list(23, |w| {
            w.string_field(1, "d:123");
        })
        .single_struct_list(32, |w| {
            w.string_field(1, "1DS-Web-JS-3.2.0");
        })
        // Empty struct still counts
        .single_struct_list(25, |_| {})
        // Empty array does not
        .list_header(22, WireType::Struct, 0)
        .stop();

    let tree = project_bytes(&w.into_bytes());
    let document = normalize(tree);

    let ext = document["ext"].as_object().unwrap();
    let ext_keys: Vec<_> = ext.keys().map(String::as_str).collect();
    assert_eq!(ext_keys, ["device", "sdk", "app"]);
    assert_eq!(ext["app"], json!({}));

    for (field, _) in DEFAULT_EXTENSIONS {
        assert!(document.get(field).is_none(), "{field} leaked");
    }
}

#[test]
fn test_extension_collapse_follows_record_order() {
    let tree = json!({ "extSdk": [{ "ver": 1 }], "extOs": [{ "name": "x" }] });
    let document = normalize(tree);
    assert_eq!(keys(&document["ext"]), ["sdk", "os"]);
}

#[test]
fn test_only_first_element_taken() {
    let tree = json!({ "extUser": [{ "id": "a" }, { "id": "b" }] });
    assert_eq!(normalize(tree)["ext"]["user"], json!({ "id": "a" }));
}

#[test]
fn test_first_writer_wins() {
    let tree = json!({
        "ext": { "net": { "provider": "first" } },
        "extNet": [{ "provider": "second" }],
    });

    let document = normalize(tree);
    assert_eq!(document["ext"]["net"], json!({ "provider": "first" }));
    assert!(document.get("extNet").is_none());
}

#[test]
fn test_case_insensitive_field_match() {
    let tree = json!({ "EXTOS": [{ "name": "Linux" }], "extjavascript": [{ "libVer": "3" }] });

    let document = normalize(tree);
    assert_eq!(document["ext"]["os"], json!({ "name": "Linux" }));
    assert_eq!(document["ext"]["js"], json!({ "libVer": "3" }));
    assert_eq!(keys(&document), ["ext"]);
}

#[test]
fn test_shape_mismatch_reported_and_skipped() {
    let tree = json!({
        "extOs": "oops",
        "extApp": [42],
        "extNet": [{ "provider": "Contoso" }],
    });

    let normalized = Normalizer::default().normalize_tree(tree);
    assert_eq!(normalized.document, json!({ "ext": { "net": { "provider": "Contoso" } } }));

    let fields: Vec<_> = normalized.issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(fields, ["extOs", "extApp"]);
    assert!(normalized.issues[0].reason.contains("found string"));
    assert!(normalized.issues[1].reason.contains("found number"));
}

#[test]
fn test_record_ext_moves_to_ext_data() {
    let tree = json!({
        "name": "evt",
        "ext": [{ "properties": ["k", { "stringValue": "v" }] }],
        "extOs": [{ "name": "x" }],
    });

    let document = normalize(tree);
    assert_eq!(
        document,
        json!({
            "name": "evt",
            "extData": [{ "properties": ["k", { "stringValue": "v" }] }],
            "ext": { "os": { "name": "x" } },
        })
    );
}

#[test]
fn test_ext_always_present() {
    assert_eq!(normalize(json!({ "name": "bare" })), json!({ "name": "bare", "ext": {} }));
}

#[test]
fn test_custom_extension_map() {
    let map = ExtensionMap::empty().with("extCustom", "custom");
    let normalizer = Normalizer::new(map);

    let document = normalizer.normalize(json!({
        "extCustom": [{ "a": 1 }],
        "extOs": [{ "name": "kept" }],
    }));
    assert_eq!(document["ext"], json!({ "custom": { "a": 1 } }));
    assert_eq!(document["extOs"], json!([{ "name": "kept" }]));
}

#[test]
fn test_extension_map_override() {
    let map = ExtensionMap::default().with("EXTOS", "platform");
    assert_eq!(map.len(), DEFAULT_EXTENSIONS.len());
    assert_eq!(map.canonical("extOs"), Some("platform"));
    assert_eq!(map.canonical("extNet"), Some("net"));
    assert_eq!(map.canonical("extNope"), None);
}

#[test]
fn test_default_extension_map() {
    let map = ExtensionMap::default();
    assert_eq!(map.len(), 21);
    assert_eq!(map.canonical("extIngest"), Some("ingest"));
    assert_eq!(map.canonical("extM365a"), Some("M365a"));
    assert_eq!(map.canonical("extJavascript"), Some("js"));
    assert_eq!(map.iter().next(), Some(("extIngest", "ingest")));
}

// =============================================================================
// Idempotence and round trips
// =============================================================================

#[test]
fn test_normalize_is_idempotent() {
    let trees = [
        project_bytes(&fixture::sample_record("a")),
        json!({ "extOs": "oops", "data": [{ "nope": 1 }], "ext": [1, 2] }),
        json!({ "data": [{ "properties": ["k", { "type": 6 }, "dangling"] }] }),
        json!({ "name": "bare" }),
        json!([1, 2, 3]),
    ];

    for tree in trees {
        let once = normalize(tree);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
        // Key order is stable too
        if once.is_object() {
            assert_eq!(keys(&once), keys(&twice));
        }
    }
}

#[test]
fn test_non_object_tree_reported() {
    let normalized = Normalizer::default().normalize_tree(json!("scalar"));
    assert_eq!(normalized.document, json!("scalar"));
    assert_eq!(normalized.issues.len(), 1);
}

// =============================================================================
// Data properties
// =============================================================================

#[test]
fn test_data_properties_typed() {
    let guid = [
        0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE,
        0xFF,
    ];
    let mut w = Writer::new();
    fixture::data_field(
        &mut w,
        70,
        &[
            ("i64", Prop::Long(ValueKind::Int64, -42)),
            ("i32", Prop::Long(ValueKind::Int32, 7)),
            ("u64", Prop::Long(ValueKind::UInt64, -1)),
            ("when", Prop::Long(ValueKind::DateTime, 638_000_000_000_000_000)),
            ("ratio", Prop::Double(0.25)),
            ("id", Prop::Guid(guid)),
            ("yes", Prop::Long(ValueKind::Bool, 1)),
            ("no", Prop::Kind(ValueKind::Bool)),
            ("zero", Prop::Kind(ValueKind::Int64)),
            ("text", Prop::Str("hi")),
            ("secret", Prop::PiiStr("me@example.com")),
        ],
    );
    w.stop();

    let document = normalize(project_bytes(&w.into_bytes()));
    let data = &document["data"];
    assert_eq!(data["i64"], json!(-42));
    assert_eq!(data["i32"], json!(7));
    assert_eq!(data["u64"], json!(u64::MAX));
    assert_eq!(data["when"], json!(638_000_000_000_000_000i64));
    assert_eq!(data["ratio"], json!(0.25));
    assert_eq!(data["id"], json!("00112233-4455-6677-8899-aabbccddeeff"));
    assert_eq!(data["yes"], json!(true));
    assert_eq!(data["no"], json!(false));
    assert_eq!(data["zero"], json!(0));
    assert_eq!(data["text"], json!("hi"));
    assert_eq!(
        data["secret"],
        json!({ "attributes": [{ "pii": [{ "Kind": 1 }] }], "stringValue": "me@example.com" })
    );
    assert_eq!(
        keys(data),
        ["i64", "i32", "u64", "when", "ratio", "id", "yes", "no", "zero", "text", "secret"]
    );
}

#[test]
fn test_odd_properties_drop_dangling_key() {
    let tree = json!({ "data": [{ "properties": ["a", { "stringValue": "x" }, "b"] }] });

    let normalized = Normalizer::default().normalize_tree(tree);
    assert_eq!(normalized.document["data"], json!({ "a": "x" }));
    assert_eq!(normalized.issues.len(), 1);
    assert_eq!(normalized.issues[0].field, "data");
}

#[test]
fn test_non_string_key_stringified() {
    let tree = json!({ "data": [{ "properties": [7, { "type": 0, "longValue": 1 }] }] });

    let normalized = Normalizer::default().normalize_tree(tree);
    assert_eq!(normalized.document["data"], json!({ "7": 1 }));
    assert_eq!(normalized.issues.len(), 1);
}

#[test]
fn test_data_without_properties_untouched() {
    let tree = json!({ "data": [{ "other": 1 }] });

    let normalized = Normalizer::default().normalize_tree(tree);
    assert_eq!(normalized.document["data"], json!([{ "other": 1 }]));
    assert_eq!(normalized.issues.len(), 1);

    let already = json!({ "data": { "k": 1 } });
    let normalized = Normalizer::default().normalize_tree(already);
    assert_eq!(normalized.document["data"], json!({ "k": 1 }));
    assert!(normalized.issues.is_empty());
}

#[test]
fn test_data_is_last_after_ext() {
    let tree = json!({ "data": [{ "properties": [] }], "name": "n", "extOs": [{}] });
    assert_eq!(keys(&normalize(tree)), ["name", "ext", "data"]);
}

// =============================================================================
// Typed values
// =============================================================================

#[test]
fn test_typed_int64() {
    assert_eq!(typed(json!({ "type": 0, "longValue": 42 })), json!(42));
}

#[test]
fn test_typed_bool_field_count_rule() {
    assert_eq!(typed(json!({ "type": 6 })), json!(false));
    assert_eq!(typed(json!({ "type": 6, "longValue": 1 })), json!(true));
}

#[test]
fn test_typed_string_must_be_sole_field() {
    assert_eq!(typed(json!({ "stringValue": "x" })), json!("x"));
    assert_eq!(typed(json!({ "type": 5, "stringValue": "x" })), json!("x"));
    assert_eq!(typed(json!({ "type": 5 })), json!(""));

    let mixed = json!({ "stringValue": "x", "longValue": 3 });
    assert_eq!(typed(mixed.clone()), mixed);
}

#[test]
fn test_typed_arrays_stay_raw() {
    let value = json!({ "type": 14, "stringArray": [["a", "b"]] });
    assert_eq!(typed(value.clone()), value);
    assert!(TypedValue::from_json(value).is_raw());
}

#[test]
fn test_typed_unknown_kind_stays_raw() {
    let value = json!({ "type": 99, "longValue": 1 });
    assert_eq!(typed(value.clone()), value);
}

#[test]
fn test_typed_wrong_payload_stays_raw() {
    let value = json!({ "type": 0, "longValue": "nope" });
    assert_eq!(typed(value.clone()), value);

    let value = json!({ "type": 8 });
    assert_eq!(typed(value.clone()), value);
}

#[test]
fn test_typed_double_default() {
    assert_eq!(typed(json!({ "type": 4 })), json!(0.0));
}

#[test]
fn test_typed_uint32() {
    assert_eq!(typed(json!({ "type": 3, "longValue": 4_000_000_000u64 })), json!(4_000_000_000u64));
}

#[test]
fn test_typed_non_object() {
    assert_eq!(typed(json!("bare")), json!("bare"));
}
