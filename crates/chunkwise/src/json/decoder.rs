use alloc::{boxed::Box, string::{String, ToString}};
use core::{fmt, mem};

use super::Reviver;
use crate::{
    converter::Converter,
    error::{CodecError, JsonError},
    sink::{BoxSink, ChunkedSink},
    value::Value,
};

/// The key a reviver is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviverKey<'k> {
    Index(usize),
    Name(&'k str),
}

/// Decodes JSON text into a [`Value`].
#[derive(Clone, Default)]
pub struct JsonDecoder {
    reviver: Option<Reviver>,
}

impl JsonDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self { reviver: None }
    }

    pub(crate) fn with_hook(reviver: Option<Reviver>) -> Self {
        Self { reviver }
    }
}

impl fmt::Debug for JsonDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonDecoder")
            .field("reviver", &self.reviver.is_some())
            .finish()
    }
}

impl Converter for JsonDecoder {
    type Input = str;
    type Output = Value;
    type Converted = Value;

    fn convert(&self, text: &str) -> Result<Value, CodecError> {
        parse(text, self.reviver.as_ref())
    }

    /// The returned sink collects all text and parses it on close, then adds
    /// the value to `sink` and closes it.
    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, Value>,
    ) -> Result<BoxSink<'a, str>, CodecError> {
        Ok(Box::new(JsonDecoderSink {
            decoder: self.clone(),
            sink,
            text: String::new(),
            closed: false,
        }))
    }
}

struct JsonDecoderSink<'a> {
    decoder: JsonDecoder,
    sink: BoxSink<'a, Value>,
    text: String,
    closed: bool,
}

impl ChunkedSink<str> for JsonDecoderSink<'_> {
    fn add(&mut self, chunk: &str) -> Result<(), CodecError> {
        if self.closed {
            return Err(CodecError::Protocol("add called on a closed sink"));
        }
        self.text.push_str(chunk);
        Ok(())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let text = mem::take(&mut self.text);
        let value = self.decoder.convert(&text)?;
        self.sink.add(&value)?;
        self.sink.close()
    }
}

fn parse(text: &str, reviver: Option<&Reviver>) -> Result<Value, CodecError> {
    let raw: serde_json::Value =
        serde_json::from_str(text).map_err(|err| JsonError::Syntax {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        })?;
    Ok(match reviver {
        Some(reviver) => revive(reviver, None, Value::from(raw)),
        None => Value::from_lazy(raw),
    })
}

/// Replaces every member of `value` with the reviver's result, children
/// before parents, then revives `value` itself.
fn revive(reviver: &Reviver, key: Option<ReviverKey<'_>>, value: Value) -> Value {
    match &value {
        Value::Array(array) => {
            for (index, item) in array.to_vec().into_iter().enumerate() {
                array.set(index, revive(reviver, Some(ReviverKey::Index(index)), item));
            }
        }
        Value::Object(object) => {
            for (name, member) in object.entries() {
                let revived = revive(reviver, Some(ReviverKey::Name(&name)), member);
                object.insert(name, revived);
            }
        }
        _ => {}
    }
    reviver(key, value)
}
