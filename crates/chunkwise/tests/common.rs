#![allow(missing_docs)]
#![allow(dead_code)]

pub const ORIGINAL: &str = r#"{
  "moderation": {
    "decision": "allow",
    "reason": null
  },
  "request": {
    "filename": "café.rs",
    "language": "rust",
    "options": {
      "opt_level": 2,
      "features": [
        "serde",
        "tokio"
      ]
    }
  },
  "snippets": [
    "fn main() {}",
    "println!(\"hi 👋\")"
  ],
  "matrix": [
    [
      "a"
    ],
    [],
    {}
  ],
  "ratio": 0.25
}"#;

// The document above as UTF-8 bytes, cut so that chunk boundaries fall inside
// multi-byte characters and between `\r` and `\n`.
#[rustfmt::skip]
pub const STREAM: [&[u8]; 8] = [
    b"{\r\n  \"moderation\": {\"decision\": \"allow\", \"reason\": null},\r",
    b"\n  \"request\": {\"filename\": \"caf\xC3",
    b"\xA9.rs\", \"language\": \"rust\",\r\n",
    b"    \"options\": {\"opt_level\": 2, \"features\": [\"serde\", \"tokio\"]}},\r\n",
    b"  \"snippets\": [\"fn main() {}\", \"println!(\\\"hi \xF0\x9F",
    b"\x91",
    b"\x8B\\\")\"],\r\n  \"matrix\": [[\"a\"], [], {}],\r\n",
    b"  \"ratio\": 0.25\r\n}",
];

#[test]
fn stream_describes_the_original_document() {
    let streamed = STREAM.concat();
    let streamed: serde_json::Value = serde_json::from_slice(&streamed).unwrap();
    let original: serde_json::Value = serde_json::from_str(ORIGINAL).unwrap();
    assert_eq!(streamed, original);
}
