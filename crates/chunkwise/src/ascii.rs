//! The ASCII codec: code points U+0000 to U+007F, one byte each.
//!
//! ```rust
//! use chunkwise::{ASCII, AsciiCodec, Codec, SubsetDecoderOptions};
//!
//! assert_eq!(ASCII.encode("hi").unwrap(), b"hi");
//! assert!(ASCII.decode(&[0x68, 0x80][..]).is_err());
//!
//! let lossy = AsciiCodec::with_options(SubsetDecoderOptions { allow_invalid: true });
//! assert_eq!(lossy.decode(&[0x68, 0x80, 0x69][..]).unwrap(), "h\u{FFFD}i");
//! ```
use crate::subset::{SubsetCodec, SubsetDecoder, SubsetEncoder, UnicodeSubset};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ascii;

impl UnicodeSubset for Ascii {
    const NAME: &'static str = "ascii";
    const MASK: u32 = 0x7F;
}

pub type AsciiCodec = SubsetCodec<Ascii>;
pub type AsciiEncoder = SubsetEncoder<Ascii>;
/// Decodes ASCII bytes. Every chunk is forwarded as soon as it is decoded;
/// a chunk-final `\r` is plain data here and only [`crate::LineSplitter`]
/// holds it back to pair it with a following `\n`.
pub type AsciiDecoder = SubsetDecoder<Ascii>;

/// The ASCII codec in strict mode.
pub const ASCII: AsciiCodec = AsciiCodec::new();
