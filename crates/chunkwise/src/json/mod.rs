//! The JSON codec.
//!
//! Encoding walks a [`Value`] with the stringifier in [`stringify`]. Decoding
//! hands the text to `serde_json` and converts the result, either eagerly
//! through a reviver or lazily (see [`crate::Object`]).
//!
//! # Examples
//!
//! ```rust
//! use chunkwise::{Codec, JSON, Value};
//!
//! let value = JSON.decode(r#"{"a":[1,2]}"#).unwrap();
//! assert_eq!(JSON.encode(&value).unwrap(), r#"{"a":[1,2]}"#);
//!
//! let pretty = JSON.encoder().with_indent("  ");
//! # use chunkwise::Converter;
//! assert_eq!(
//!     pretty.convert(&value).unwrap(),
//!     "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
//! );
//! ```
use alloc::rc::Rc;
use core::fmt;

use thiserror::Error;

use crate::{
    converter::{Codec, Converter, Fused},
    error::BoxError,
    utf8::{Utf8Codec, Utf8Decoder},
    value::Value,
};

mod decoder;
mod encoder;
pub mod stringify;
pub mod writer;

pub use decoder::{JsonDecoder, ReviverKey};
pub use encoder::{JsonEncoder, JsonUtf8Encoder};

/// Called for every member of a decoded document, innermost first, with the
/// member's key and value. The result replaces the value.
pub type Reviver = Rc<dyn Fn(Option<ReviverKey<'_>>, Value) -> Value>;

/// Called for values the stringifier cannot write directly. The result is
/// written instead.
pub type ToEncodable = Rc<dyn Fn(&Value) -> Result<Value, BoxError>>;

/// The JSON codec with default settings.
pub const JSON: JsonCodec = JsonCodec::new();

#[derive(Debug, Error)]
#[error("{0} has no JSON representation")]
struct NotEncodable(&'static str);

/// The hook used when none is configured: [`crate::Opaque`] values convert
/// themselves through [`crate::ToJson`], anything else is rejected.
#[must_use]
pub fn default_to_encodable() -> ToEncodable {
    Rc::new(|value: &Value| match value {
        Value::Opaque(opaque) => opaque.to_json(),
        Value::Number(_) => Err(NotEncodable("a non-finite number").into()),
        _ => Err(NotEncodable("this value").into()),
    })
}

/// Converts between [`Value`] and JSON text.
#[derive(Clone, Default)]
pub struct JsonCodec {
    reviver: Option<Reviver>,
    to_encodable: Option<ToEncodable>,
}

impl JsonCodec {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reviver: None,
            to_encodable: None,
        }
    }

    /// Decodes eagerly, passing every member through `reviver`.
    #[must_use]
    pub fn with_reviver(
        mut self,
        reviver: impl Fn(Option<ReviverKey<'_>>, Value) -> Value + 'static,
    ) -> Self {
        self.reviver = Some(Rc::new(reviver));
        self
    }

    /// Encodes values that are not JSON by passing them through
    /// `to_encodable` first.
    #[must_use]
    pub fn with_to_encodable(
        mut self,
        to_encodable: impl Fn(&Value) -> Result<Value, BoxError> + 'static,
    ) -> Self {
        self.to_encodable = Some(Rc::new(to_encodable));
        self
    }

    /// Chains UTF-8 after JSON. The encoder writes bytes directly instead of
    /// building the JSON text first.
    #[must_use]
    pub fn fuse_utf8(self, utf8: Utf8Codec) -> JsonUtf8Codec {
        JsonUtf8Codec { json: self, utf8 }
    }
}

impl fmt::Debug for JsonCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonCodec")
            .field("reviver", &self.reviver.is_some())
            .field("to_encodable", &self.to_encodable.is_some())
            .finish()
    }
}

impl Codec for JsonCodec {
    type Decoded = Value;
    type Encoded = str;
    type Encoder = JsonEncoder;
    type Decoder = JsonDecoder;

    fn encoder(&self) -> JsonEncoder {
        JsonEncoder::with_hook(None, self.to_encodable.clone())
    }

    fn decoder(&self) -> JsonDecoder {
        JsonDecoder::with_hook(self.reviver.clone())
    }
}

/// JSON followed by UTF-8; see [`JsonCodec::fuse_utf8`].
#[derive(Debug, Clone, Default)]
pub struct JsonUtf8Codec {
    json: JsonCodec,
    utf8: Utf8Codec,
}

impl Codec for JsonUtf8Codec {
    type Decoded = Value;
    type Encoded = [u8];
    type Encoder = JsonUtf8Encoder;
    type Decoder = Fused<Utf8Decoder, JsonDecoder>;

    fn encoder(&self) -> JsonUtf8Encoder {
        self.json.encoder().fuse_utf8(self.utf8.encoder())
    }

    fn decoder(&self) -> Self::Decoder {
        self.utf8.decoder().fuse(self.json.decoder())
    }
}

#[cfg(test)]
mod tests {
    use alloc::{borrow::ToOwned, boxed::Box, string::ToString, vec, vec::Vec};
    use core::cell::RefCell;

    use super::*;
    use crate::{
        ChunkedSink, CodecError, JsonError, Object, Opaque, ToJson, UTF8, Utf8DecoderOptions,
    };

    #[derive(Debug)]
    struct Point(i64, i64);

    impl ToJson for Point {
        fn to_json(&self) -> Result<Value, BoxError> {
            Ok(Value::from(vec![Value::from(self.0), Value::from(self.1)]))
        }
    }

    #[derive(Debug)]
    struct Secret;

    impl ToJson for Secret {
        fn to_json(&self) -> Result<Value, BoxError> {
            Err("secrets stay secret".into())
        }
    }

    #[test]
    fn opaque_values_use_to_json() {
        let value = Value::from(vec![Value::Opaque(Opaque::new(Point(1, 2)))]);
        assert_eq!(JSON.encode(&value).unwrap(), "[[1,2]]");
    }

    #[test]
    fn failing_to_json_is_reported_with_cause() {
        let value = Value::from(vec![Value::from("x"), Value::Opaque(Opaque::new(Secret))]);
        let err = JSON.encode(&value).unwrap_err();
        let CodecError::Json(JsonError::Unsupported {
            cause: Some(cause),
            partial_result,
            ..
        }) = &err
        else {
            panic!("expected unsupported with cause, got {err:?}");
        };
        assert_eq!(cause.to_string(), "secrets stay secret");
        assert_eq!(partial_result.as_deref(), Some(r#"["x","#));
        assert!(err.to_string().starts_with("Converting object to an encodable object failed"));
    }

    #[test]
    fn to_encodable_returning_non_json_is_unsupported_without_cause() {
        let codec = JsonCodec::new().with_to_encodable(|value| Ok(value.clone()));
        let err = codec
            .encode(&Value::Opaque(Opaque::new(Point(0, 0))))
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Json(JsonError::Unsupported { cause: None, .. })
        ));
    }

    #[test]
    fn to_encodable_can_replace_non_finite_numbers() {
        let codec = JsonCodec::new().with_to_encodable(|value| match value.as_f64() {
            Some(f) if f.is_nan() => Ok(Value::from("NaN")),
            _ => Ok(Value::Null),
        });
        let value = Value::from(vec![Value::from(f64::NAN), Value::from(f64::INFINITY)]);
        assert_eq!(codec.encode(&value).unwrap(), r#"["NaN",null]"#);
    }

    #[test]
    fn cycle_through_to_encodable_is_detected() {
        #[derive(Debug)]
        struct Loop(Rc<RefCell<Value>>);

        impl ToJson for Loop {
            fn to_json(&self) -> Result<Value, BoxError> {
                Ok(Value::from(vec![self.0.borrow().clone()]))
            }
        }

        let slot = Rc::new(RefCell::new(Value::Null));
        let value = Value::Opaque(Opaque::new(Loop(Rc::clone(&slot))));
        assert_eq!(JSON.encode(&value).unwrap(), "[null]");

        *slot.borrow_mut() = value.clone();
        let err = JSON.encode(&value).unwrap_err();
        assert!(matches!(err, CodecError::Json(JsonError::Cyclic { .. })));
        *slot.borrow_mut() = Value::Null;
    }

    #[test]
    fn reviver_sees_members_bottom_up() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&calls);
        let codec = JsonCodec::new().with_reviver(move |key, value| {
            let key = match key {
                None => "<root>".to_owned(),
                Some(ReviverKey::Index(i)) => i.to_string(),
                Some(ReviverKey::Name(name)) => name.to_owned(),
            };
            log.borrow_mut().push(key);
            match value.as_i64() {
                Some(n) => Value::from(n * 10),
                None => value,
            }
        });
        let value = codec.decode(r#"{"a":[1,{"b":2}],"c":3}"#).unwrap();
        assert_eq!(value.to_string(), r#"{"a":[10,{"b":20}],"c":30}"#);
        assert_eq!(*calls.borrow(), ["0", "b", "1", "a", "c", "<root>"]);
    }

    #[test]
    fn decoding_without_reviver_is_lazy() {
        let value = JSON.decode(r#"{"a":{"b":1}}"#).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.is_materialized());
        assert_eq!(object.get("a").unwrap().as_object().map(Object::len), Some(1));
    }

    #[test]
    fn malformed_text_is_a_syntax_error() {
        let err = JSON.decode("[1,]").unwrap_err();
        let CodecError::Json(JsonError::Syntax { line, column, .. }) = err else {
            panic!("expected syntax error, got {err:?}");
        };
        assert_eq!((line, column), (1, 4));
    }

    #[test]
    fn fused_utf8_codec_round_trips_bytes() {
        let codec = JSON.fuse_utf8(UTF8);
        let value = codec.decode("{\"é\":[true]}".as_bytes()).unwrap();
        assert_eq!(codec.encode(&value).unwrap(), "{\"é\":[true]}".as_bytes());
    }

    #[test]
    fn fused_utf8_decoder_streams_bytes() {
        let lossy = Utf8Codec::with_options(Utf8DecoderOptions {
            allow_malformed: true,
        });
        let codec = JSON.fuse_utf8(lossy);
        let mut values: Vec<Value> = Vec::new();
        {
            let mut sink = codec
                .decoder()
                .start_chunked_conversion(Box::new(&mut values))
                .unwrap();
            sink.add(&b"[\"\xC3"[..]).unwrap();
            sink.add(&b"\xA9\xFF\"]"[..]).unwrap();
            sink.close().unwrap();
        }
        assert_eq!(values, [Value::from(vec![Value::from("é\u{FFFD}")])]);
    }
}
