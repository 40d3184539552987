#![expect(missing_docs)]

use chunkwise::{Codec, Converter, JSON, Object, Value};

fn sample() -> Value {
    let object = Object::new();
    object.insert("a", Value::from(vec![Value::from(1), Value::from(2)]));
    object.insert("empty", Value::from(Vec::new()));
    object.insert("nested", Value::Object(Object::new()));
    object.insert("text", Value::from("line\nbreak \"quoted\""));
    object.insert("ratio", Value::from(0.5));
    Value::Object(object)
}

#[test]
fn snapshot_pretty_indents() {
    let value = sample();
    insta::assert_snapshot!(JSON.encode(&value).unwrap(), @r#"{"a":[1,2],"empty":[],"nested":{},"text":"line\nbreak \"quoted\"","ratio":0.5}"#);
    insta::assert_snapshot!(JSON.encoder().with_indent("  ").convert(&value).unwrap(), @r#"
    {
      "a": [
        1,
        2
      ],
      "empty": [],
      "nested": {},
      "text": "line\nbreak \"quoted\"",
      "ratio": 0.5
    }
    "#);
    insta::assert_snapshot!(JSON.encoder().with_indent("    ").convert(&Value::from(vec![Value::Null])).unwrap(), @"
    [
        null
    ]
    ");
}

#[test]
fn pretty_nested_array() {
    let value = JSON.decode(r#"{"a":[1,2]}"#).unwrap();
    let pretty = JSON.encoder().with_indent("  ").convert(&value).unwrap();
    assert_eq!(pretty, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
}
