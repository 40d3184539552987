//! Composable codecs that run in one shot or over chunked input.
//!
//! A [`Converter`] turns one representation into another; a [`Codec`] pairs
//! an encoder with the matching decoder. Every converter here can also run
//! incrementally: [`Converter::start_chunked_conversion`] wraps a downstream
//! [`ChunkedSink`] in a sink that accepts input piece by piece and produces
//! the same result as a one-shot conversion of the concatenated input.
//!
//! Provided codecs and converters:
//!
//! - [`UTF8`]: UTF-8, with a resumable decoder and a UTF-16 code unit
//!   encoder.
//! - [`ASCII`] and [`LATIN1`].
//! - [`JSON`]: [`Value`] to and from JSON text, with pretty printing, a
//!   direct-to-bytes encoder and lazy decoding.
//! - [`HtmlEscape`] and [`LineSplitter`].
//!
//! ```rust
//! use chunkwise::{ChunkedSink, Converter, LineSplitter, Utf8Decoder};
//!
//! let mut lines: Vec<String> = Vec::new();
//! let mut sink = Utf8Decoder::new()
//!     .fuse(LineSplitter)
//!     .start_chunked_conversion(Box::new(&mut lines))
//!     .unwrap();
//! sink.add(&b"caf\xC3"[..]).unwrap();
//! sink.add(&b"\xA9\r"[..]).unwrap();
//! sink.add(&b"\nbar"[..]).unwrap();
//! sink.close().unwrap();
//! drop(sink);
//! assert_eq!(lines, ["café", "bar"]);
//! ```
//!
//! The crate is `no_std` and needs only `alloc`; the `std` feature (on by
//! default) enables `std` support in the dependencies.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod ascii;
pub mod chunk_utils;
mod converter;
mod error;
mod html_escape;
pub mod json;
mod latin1;
mod line_splitter;
mod options;
mod sink;
mod subset;
mod utf8;
mod value;

#[cfg(test)]
mod tests;

pub use ascii::{ASCII, Ascii, AsciiCodec, AsciiDecoder, AsciiEncoder};
pub use converter::{Codec, Converter, Fused, FusedCodec, Inverted};
pub use error::{BoxError, CodecError, JsonError, Utf8Error, Utf8ErrorKind};
pub use html_escape::{HtmlEscape, HtmlEscapeMode};
pub use json::{
    JSON, JsonCodec, JsonDecoder, JsonEncoder, JsonUtf8Codec, JsonUtf8Encoder, Reviver,
    ReviverKey, ToEncodable,
};
pub use latin1::{LATIN1, Latin1, Latin1Codec, Latin1Decoder, Latin1Encoder};
pub use line_splitter::{LineSplitter, Lines};
pub use options::{SubsetDecoderOptions, Utf8DecoderOptions};
pub use sink::{BoxSink, ByteSinkExt, CallbackSink, ChunkedSink, StringSinkExt};
pub use subset::{SubsetCodec, SubsetDecoder, SubsetEncoder, UnicodeSubset};
pub use utf8::{
    CodeUnitEncoder, UNICODE_REPLACEMENT_CHARACTER, UTF8, UTF8_DECODER, Utf8Codec, Utf8Decoder,
    Utf8DecoderSink, Utf8Encoder, Utf8EncoderSink,
};
pub use value::{Array, Number, Object, Opaque, ToJson, Value};
