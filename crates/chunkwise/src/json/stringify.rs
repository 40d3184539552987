//! The JSON stringifier.
//!
//! One algorithm serves every output format. It is generic over a
//! [`JsonWriter`], which decides where text goes, and a [`Layout`], which
//! decides the whitespace between tokens.
//!
//! Values are dispatched in a fixed order: finite numbers, booleans, null,
//! strings, arrays, objects. Anything else, including non-finite numbers, is
//! passed to the `to_encodable` hook and its result is dispatched again. A
//! result that is still not JSON is an error.
use alloc::{
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};

use super::{
    ToEncodable,
    writer::{ByteWriter, JsonWriter, StringWriter},
};
use crate::{
    error::{CodecError, JsonError},
    value::{Array, Object, Value},
};

/// Whitespace placement between tokens.
pub trait Layout {
    /// Writes the opening bracket of a non-empty container.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    fn open(&mut self, out: &mut impl JsonWriter, bracket: char) -> Result<(), CodecError>;

    /// Writes the separator between two elements.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    fn separator(&mut self, out: &mut impl JsonWriter) -> Result<(), CodecError>;

    /// Writes the separator between a key and its value.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    fn colon(&mut self, out: &mut impl JsonWriter) -> Result<(), CodecError>;

    /// Writes the closing bracket of a non-empty container.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    fn close(&mut self, out: &mut impl JsonWriter, bracket: char) -> Result<(), CodecError>;
}

/// No whitespace at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compact;

impl Layout for Compact {
    fn open(&mut self, out: &mut impl JsonWriter, bracket: char) -> Result<(), CodecError> {
        out.write_char(bracket)
    }

    fn separator(&mut self, out: &mut impl JsonWriter) -> Result<(), CodecError> {
        out.write_char(',')
    }

    fn colon(&mut self, out: &mut impl JsonWriter) -> Result<(), CodecError> {
        out.write_char(':')
    }

    fn close(&mut self, out: &mut impl JsonWriter, bracket: char) -> Result<(), CodecError> {
        out.write_char(bracket)
    }
}

/// One element per line, each nesting level indented by `indent`.
#[derive(Debug, Clone)]
pub struct Pretty<'i> {
    indent: &'i str,
    depth: usize,
}

impl<'i> Pretty<'i> {
    #[must_use]
    pub fn new(indent: &'i str) -> Self {
        Self { indent, depth: 0 }
    }

    fn newline(&self, out: &mut impl JsonWriter) -> Result<(), CodecError> {
        out.write_char('\n')?;
        for _ in 0..self.depth {
            out.write_str(self.indent)?;
        }
        Ok(())
    }
}

impl Layout for Pretty<'_> {
    fn open(&mut self, out: &mut impl JsonWriter, bracket: char) -> Result<(), CodecError> {
        out.write_char(bracket)?;
        self.depth += 1;
        self.newline(out)
    }

    fn separator(&mut self, out: &mut impl JsonWriter) -> Result<(), CodecError> {
        out.write_char(',')?;
        self.newline(out)
    }

    fn colon(&mut self, out: &mut impl JsonWriter) -> Result<(), CodecError> {
        out.write_str(": ")
    }

    fn close(&mut self, out: &mut impl JsonWriter, bracket: char) -> Result<(), CodecError> {
        self.depth -= 1;
        self.newline(out)?;
        out.write_char(bracket)
    }
}

/// Walks a [`Value`] and writes it as JSON.
pub struct Stringifier<'h, W, L> {
    out: W,
    layout: L,
    to_encodable: &'h ToEncodable,
    /// Identities of the containers and opaque values being written, outermost
    /// first.
    seen: Vec<usize>,
}

impl<'h, W: JsonWriter, L: Layout> Stringifier<'h, W, L> {
    pub fn new(out: W, layout: L, to_encodable: &'h ToEncodable) -> Self {
        Self {
            out,
            layout,
            to_encodable,
            seen: Vec::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    /// Writes `value`, going through `to_encodable` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError::Cyclic`] if `value` contains itself,
    /// [`JsonError::Unsupported`] if part of it cannot be made encodable, and
    /// any writer error.
    pub fn write_object(&mut self, value: &Value) -> Result<(), CodecError> {
        if self.write_json_value(value)? {
            return Ok(());
        }
        let identity = value.identity();
        if let Some(identity) = identity {
            self.enter(identity, value)?;
        }
        let encodable = match (self.to_encodable)(value) {
            Ok(encodable) => encodable,
            Err(cause) => {
                return Err(JsonError::Unsupported {
                    value: value.clone(),
                    cause: Some(Rc::from(cause)),
                    partial_result: self.out.partial_result(),
                }
                .into());
            }
        };
        if !self.write_json_value(&encodable)? {
            return Err(JsonError::Unsupported {
                value: value.clone(),
                cause: None,
                partial_result: self.out.partial_result(),
            }
            .into());
        }
        if identity.is_some() {
            self.seen.pop();
        }
        Ok(())
    }

    /// Writes `value` if it is plain JSON and returns whether it was.
    fn write_json_value(&mut self, value: &Value) -> Result<bool, CodecError> {
        match value {
            Value::Number(n) if n.is_finite() => self.out.write_str(&n.to_string())?,
            Value::Boolean(true) => self.out.write_str("true")?,
            Value::Boolean(false) => self.out.write_str("false")?,
            Value::Null => self.out.write_str("null")?,
            Value::String(s) => self.write_string(s)?,
            Value::Array(array) => {
                self.enter(array.identity(), value)?;
                self.write_array(array)?;
                self.seen.pop();
            }
            Value::Object(object) => {
                self.enter(object.identity(), value)?;
                self.write_map(object)?;
                self.seen.pop();
            }
            Value::Number(_) | Value::Opaque(_) => return Ok(false),
        }
        Ok(true)
    }

    fn enter(&mut self, identity: usize, value: &Value) -> Result<(), CodecError> {
        if self.seen.contains(&identity) {
            return Err(JsonError::Cyclic {
                value: value.clone(),
            }
            .into());
        }
        self.seen.push(identity);
        Ok(())
    }

    fn write_array(&mut self, array: &Array) -> Result<(), CodecError> {
        let items = array.to_vec();
        let Some((first, rest)) = items.split_first() else {
            return self.out.write_str("[]");
        };
        self.layout.open(&mut self.out, '[')?;
        self.write_object(first)?;
        for item in rest {
            self.layout.separator(&mut self.out)?;
            self.write_object(item)?;
        }
        self.layout.close(&mut self.out, ']')
    }

    fn write_map(&mut self, object: &Object) -> Result<(), CodecError> {
        let entries = object.entries();
        if entries.is_empty() {
            return self.out.write_str("{}");
        }
        self.layout.open(&mut self.out, '{')?;
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                self.layout.separator(&mut self.out)?;
            }
            self.write_string(key)?;
            self.layout.colon(&mut self.out)?;
            self.write_object(value)?;
        }
        self.layout.close(&mut self.out, '}')
    }

    fn write_string(&mut self, s: &str) -> Result<(), CodecError> {
        self.out.write_char('"')?;
        write_escaped(&mut self.out, s)?;
        self.out.write_char('"')
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Writes the body of a JSON string literal. Unescaped runs are written as
/// one slice.
fn write_escaped(out: &mut impl JsonWriter, s: &str) -> Result<(), CodecError> {
    let mut run_start = 0;
    for (i, byte) in s.bytes().enumerate() {
        if byte >= 0x20 && byte != b'"' && byte != b'\\' {
            continue;
        }
        // `byte` is ASCII, so `i` is a char boundary.
        if run_start < i {
            out.write_str(&s[run_start..i])?;
        }
        run_start = i + 1;
        match byte {
            0x08 => out.write_str("\\b")?,
            b'\t' => out.write_str("\\t")?,
            b'\n' => out.write_str("\\n")?,
            0x0C => out.write_str("\\f")?,
            b'\r' => out.write_str("\\r")?,
            b'"' => out.write_str("\\\"")?,
            b'\\' => out.write_str("\\\\")?,
            _ => {
                out.write_str("\\u00")?;
                out.write_char(char::from(HEX_DIGITS[usize::from(byte >> 4)]))?;
                out.write_char(char::from(HEX_DIGITS[usize::from(byte & 0xF)]))?;
            }
        }
    }
    if run_start < s.len() {
        out.write_str(&s[run_start..])?;
    }
    Ok(())
}

/// Stringifies `value` into a `String`, pretty printed if `indent` is set.
pub(crate) fn stringify(
    value: &Value,
    indent: Option<&str>,
    to_encodable: &ToEncodable,
) -> Result<String, CodecError> {
    let out = StringWriter::default();
    let out = match indent {
        None => {
            let mut stringifier = Stringifier::new(out, Compact, to_encodable);
            stringifier.write_object(value)?;
            stringifier.into_writer()
        }
        Some(indent) => {
            let mut stringifier = Stringifier::new(out, Pretty::new(indent), to_encodable);
            stringifier.write_object(value)?;
            stringifier.into_writer()
        }
    };
    Ok(out.into_string())
}

/// Stringifies `value` as UTF-8, handing chunks of at most `buffer_size`
/// bytes to `flush`.
pub(crate) fn stringify_bytes<F>(
    value: &Value,
    indent: Option<&str>,
    to_encodable: &ToEncodable,
    buffer_size: usize,
    flush: F,
) -> Result<(), CodecError>
where
    F: FnMut(&[u8]) -> Result<(), CodecError>,
{
    let out = ByteWriter::new(buffer_size, flush);
    let out = match indent {
        None => {
            let mut stringifier = Stringifier::new(out, Compact, to_encodable);
            stringifier.write_object(value)?;
            stringifier.into_writer()
        }
        Some(indent) => {
            let mut stringifier = Stringifier::new(out, Pretty::new(indent), to_encodable);
            stringifier.write_object(value)?;
            stringifier.into_writer()
        }
    };
    out.finish()
}
