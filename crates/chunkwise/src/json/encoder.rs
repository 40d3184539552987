use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

use super::{
    ToEncodable, default_to_encodable,
    stringify::{stringify, stringify_bytes},
    writer::DEFAULT_BUFFER_SIZE,
};
use crate::{
    converter::Converter,
    error::CodecError,
    sink::{BoxSink, ChunkedSink},
    utf8::Utf8Encoder,
    value::Value,
};

/// Encodes a [`Value`] as JSON text.
#[derive(Clone, Default)]
pub struct JsonEncoder {
    indent: Option<String>,
    to_encodable: Option<ToEncodable>,
}

impl JsonEncoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            indent: None,
            to_encodable: None,
        }
    }

    pub(crate) fn with_hook(indent: Option<String>, to_encodable: Option<ToEncodable>) -> Self {
        Self {
            indent,
            to_encodable,
        }
    }

    /// Pretty prints with one `indent` per nesting level.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Writes UTF-8 bytes directly; the JSON text is never built as a
    /// string.
    #[must_use]
    pub fn fuse_utf8(self, _utf8: Utf8Encoder) -> JsonUtf8Encoder {
        JsonUtf8Encoder {
            indent: self.indent,
            to_encodable: self.to_encodable,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    fn hook(&self) -> ToEncodable {
        self.to_encodable.clone().unwrap_or_else(default_to_encodable)
    }
}

impl fmt::Debug for JsonEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonEncoder")
            .field("indent", &self.indent)
            .field("to_encodable", &self.to_encodable.is_some())
            .finish()
    }
}

impl Converter for JsonEncoder {
    type Input = Value;
    type Output = str;
    type Converted = String;

    fn convert(&self, value: &Value) -> Result<String, CodecError> {
        stringify(value, self.indent.as_deref(), &self.hook())
    }

    /// The returned sink takes exactly one value. It writes the whole
    /// document to `sink` in one piece and closes it.
    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, str>,
    ) -> Result<BoxSink<'a, Value>, CodecError> {
        Ok(Box::new(JsonEncoderSink {
            encoder: self.clone(),
            sink,
            done: false,
        }))
    }
}

struct JsonEncoderSink<'a> {
    encoder: JsonEncoder,
    sink: BoxSink<'a, str>,
    done: bool,
}

impl ChunkedSink<Value> for JsonEncoderSink<'_> {
    fn add(&mut self, value: &Value) -> Result<(), CodecError> {
        if self.done {
            return Err(CodecError::Protocol("only one call to add is allowed"));
        }
        self.done = true;
        let text = self.encoder.convert(value)?;
        self.sink.add(&text)?;
        self.sink.close()
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.done {
            return Ok(());
        }
        self.done = true;
        self.sink.close()
    }
}

/// Encodes a [`Value`] as UTF-8 JSON bytes, emitting them in chunks of
/// `buffer_size` bytes.
#[derive(Clone)]
pub struct JsonUtf8Encoder {
    indent: Option<String>,
    to_encodable: Option<ToEncodable>,
    buffer_size: usize,
}

impl Default for JsonUtf8Encoder {
    fn default() -> Self {
        JsonEncoder::new().fuse_utf8(Utf8Encoder)
    }
}

impl JsonUtf8Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Sets the chunk size. Values below one are treated as one.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    fn encode_into(
        &self,
        value: &Value,
        flush: impl FnMut(&[u8]) -> Result<(), CodecError>,
    ) -> Result<(), CodecError> {
        let hook = self.to_encodable.clone().unwrap_or_else(default_to_encodable);
        stringify_bytes(value, self.indent.as_deref(), &hook, self.buffer_size, flush)
    }
}

impl fmt::Debug for JsonUtf8Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonUtf8Encoder")
            .field("indent", &self.indent)
            .field("to_encodable", &self.to_encodable.is_some())
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl Converter for JsonUtf8Encoder {
    type Input = Value;
    type Output = [u8];
    type Converted = Vec<u8>;

    fn convert(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        self.encode_into(value, |chunk| {
            bytes.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(bytes)
    }

    /// Like [`JsonEncoder`]'s sink, but `sink` receives the document in
    /// chunks as the buffer fills.
    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, [u8]>,
    ) -> Result<BoxSink<'a, Value>, CodecError> {
        Ok(Box::new(JsonUtf8EncoderSink {
            encoder: self.clone(),
            sink,
            done: false,
        }))
    }
}

struct JsonUtf8EncoderSink<'a> {
    encoder: JsonUtf8Encoder,
    sink: BoxSink<'a, [u8]>,
    done: bool,
}

impl ChunkedSink<Value> for JsonUtf8EncoderSink<'_> {
    fn add(&mut self, value: &Value) -> Result<(), CodecError> {
        if self.done {
            return Err(CodecError::Protocol("only one call to add is allowed"));
        }
        self.done = true;
        let sink = &mut self.sink;
        self.encoder.encode_into(value, |chunk| sink.add(chunk))?;
        self.sink.close()
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.done {
            return Ok(());
        }
        self.done = true;
        self.sink.close()
    }
}
