use alloc::{boxed::Box, format, rc::Rc, string::String};
use core::{error::Error as StdError, fmt};

use thiserror::Error;

use crate::value::Value;

/// A boxed error returned by user callbacks such as `to_encodable`.
pub type BoxError = Box<dyn StdError + 'static>;

/// Any error produced while converting data through a codec or a sink chain.
#[derive(Error, Debug, Clone)]
pub enum CodecError {
    #[error("utf-8 error: {0}")]
    Utf8(#[from] Utf8Error),
    #[error("invalid {codec} byte 0x{byte:02x} at offset {offset}")]
    InvalidByte {
        codec: &'static str,
        byte: u8,
        offset: usize,
    },
    #[error("character {ch:?} at index {index} is not representable in {codec}")]
    OutOfRange {
        codec: &'static str,
        ch: char,
        index: usize,
    },
    #[error(transparent)]
    Json(#[from] JsonError),
    /// A sink was used against its contract, e.g. a second value added to a
    /// single-value sink.
    #[error("protocol misuse: {0}")]
    Protocol(&'static str),
    /// The converter cannot run as a chunked conversion.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

/// Malformed UTF-8 input. `offset` counts bytes from the start of the
/// stream, across chunks, and points at the first byte of the bad sequence.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct Utf8Error {
    pub kind: Utf8ErrorKind,
    pub offset: usize,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8ErrorKind {
    #[error("invalid utf-8 byte 0x{0:02x}")]
    InvalidByte(u8),
    #[error("missing continuation byte, found 0x{0:02x}")]
    MissingContinuation(u8),
    #[error("overlong encoding of U+{0:04X}")]
    Overlong(u32),
    #[error("character 0x{0:x} outside the unicode range")]
    OutOfRange(u32),
    #[error("encoded surrogate U+{0:04X}")]
    EncodedSurrogate(u32),
    #[error("unfinished utf-8 octet sequence")]
    UnfinishedSequence,
}

#[derive(Error, Debug, Clone)]
pub enum JsonError {
    /// The value graph contains itself.
    #[error("cyclic error in JSON stringify")]
    Cyclic { value: Value },
    /// The value could not be converted into something JSON can represent.
    #[error("{}", describe_unsupported(.value, .cause.as_deref()))]
    Unsupported {
        value: Value,
        cause: Option<Rc<dyn StdError + 'static>>,
        partial_result: Option<String>,
    },
    /// Malformed JSON text. The message already names the position.
    #[error("{message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
}

fn describe_unsupported(value: &Value, cause: Option<&(dyn StdError + 'static)>) -> String {
    match cause {
        Some(cause) => format!(
            "Converting object to an encodable object failed: {} ({cause})",
            Described(value)
        ),
        None => format!(
            "Converting object did not return an encodable object: {}",
            Described(value)
        ),
    }
}

/// Short description of a value that never recurses into containers.
struct Described<'a>(&'a Value);

impl fmt::Display for Described<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(a) => write!(f, "array of {} elements", a.len()),
            Value::Object(o) => write!(f, "object with {} entries", o.len()),
            Value::Opaque(o) => write!(f, "{o:?}"),
        }
    }
}
