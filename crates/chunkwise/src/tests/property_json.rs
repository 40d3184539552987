use quickcheck::QuickCheck;

use crate::{Codec, Converter, JSON, JsonUtf8Encoder, Value, json::JsonDecoder};

fn tests() -> u64 {
    if is_ci::cached() { 2_000 } else { 300 }
}

/// Property: encoding a value and decoding the text gives an equal value.
#[test]
fn json_round_trip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> bool {
        let Ok(text) = JSON.encode(&value) else {
            return false;
        };
        JSON.decode(&text).is_ok_and(|decoded| decoded == value)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value) -> bool);
}

/// Property: pretty and compact output describe the same value, and the
/// byte encoder writes exactly the bytes of the text encoder.
#[test]
fn json_layouts_and_targets_agree_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value, buffer_size: u8) -> bool {
        let Ok(compact) = JSON.encode(&value) else {
            return false;
        };
        let Ok(pretty) = JSON.encoder().with_indent("  ").convert(&value) else {
            return false;
        };
        let Ok(bytes) = JsonUtf8Encoder::new()
            .with_buffer_size(usize::from(buffer_size))
            .convert(&value)
        else {
            return false;
        };
        let reparsed = JsonDecoder::new().convert(&pretty);
        bytes == compact.as_bytes() && reparsed.is_ok_and(|v| v == value)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value, u8) -> bool);
}
