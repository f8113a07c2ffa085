use std::collections::BTreeMap;

use immutable::{from, from_with_options, Object, Options, Value, DEFAULT_MAX_DEPTH};
use indexmap::IndexMap;
use serde_json::json;

fn nested_records(depth: usize) -> serde_json::Value {
    let mut value = json!("leaf");
    for _ in 0..depth {
        value = json!({ "child": value });
    }
    value
}

#[test]
fn scalars_freeze_to_themselves() {
    assert_eq!(from(3).unwrap(), Value::Number(3.0));
    assert_eq!(from("text").unwrap().as_str(), Some("text"));
    assert_eq!(from(()).unwrap(), Value::Null);
    assert_eq!(from(None::<bool>).unwrap(), Value::Null);
    assert_eq!(from(json!(true)).unwrap(), Value::Boolean(true));
}

#[test]
fn rust_collections() {
    let mut map = IndexMap::new();
    map.insert("z", vec![1.5, 2.5]);
    map.insert("a", vec![]);

    let frozen = from(map).unwrap();
    let keys: Vec<_> = frozen.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["z", "a"]);

    let mut sorted = BTreeMap::new();
    sorted.insert(String::from("b"), Some("x"));
    sorted.insert(String::from("a"), None);
    assert_eq!(from(sorted).unwrap().to_plain(), json!({"a": null, "b": "x"}));
}

#[test]
fn depth_limit_rejects_deep_input() {
    assert!(from(nested_records(DEFAULT_MAX_DEPTH)).is_ok());

    let error = from(nested_records(DEFAULT_MAX_DEPTH + 1)).unwrap_err();
    assert!(error.is_immutable_error());
    assert!(error.to_string().contains("deeply nested"));
}

#[test]
fn depth_limit_is_configurable() {
    let options = Options {
        max_depth: 2,
        ..Default::default()
    };

    assert!(from_with_options(json!({"a": {"b": 1}}), &options).is_ok());
    assert!(from_with_options(json!({"a": {"b": {}}}), &options).is_err());
}

#[test]
fn prototype_only_applies_to_the_top_level() {
    let prototype: Object = [(String::from("kind"), Value::from("user"))]
        .into_iter()
        .collect();
    let options = Options {
        prototype: Some(prototype),
        ..Default::default()
    };

    let frozen = from_with_options(json!({"name": "ada", "friend": {}}), &options).unwrap();
    assert_eq!(frozen.get("kind").as_str(), Some("user"));
    assert!(frozen.get_in(&immutable::path!["friend", "kind"]).is_undefined());

    // Own properties only, the prototype does not show up in plain copies
    assert_eq!(frozen.to_plain(), json!({"name": "ada", "friend": {}}));

    // Already immutable values are not touched
    let plain = from(json!({})).unwrap();
    let rewrapped = from_with_options(plain.clone(), &options).unwrap();
    assert!(Value::ptr_eq(&plain, &rewrapped));
    assert!(rewrapped.get("kind").is_undefined());
}

#[test]
fn serialize_errors_are_type_errors() {
    let mut map = BTreeMap::new();
    map.insert(vec![1], 2);

    let error = immutable::from_serialize(&map).unwrap_err();
    assert!(error.is_type_error());
}
