//! The Latin-1 (ISO-8859-1) codec: code points U+0000 to U+00FF.
//!
//! Every byte is valid Latin-1, so decoding never fails and the
//! `allow_invalid` option has no effect.
use crate::subset::{SubsetCodec, SubsetDecoder, SubsetEncoder, UnicodeSubset};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latin1;

impl UnicodeSubset for Latin1 {
    const NAME: &'static str = "latin-1";
    const MASK: u32 = 0xFF;
}

pub type Latin1Codec = SubsetCodec<Latin1>;
pub type Latin1Encoder = SubsetEncoder<Latin1>;
pub type Latin1Decoder = SubsetDecoder<Latin1>;

/// The Latin-1 codec.
pub const LATIN1: Latin1Codec = Latin1Codec::new();

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::{Codec, CodecError, UTF8};

    #[test]
    fn every_byte_decodes_to_same_code_point() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = LATIN1.decode(&bytes).unwrap();
        assert!(text.chars().map(u32::from).eq(0..=255));
        assert_eq!(LATIN1.encode(&text).unwrap(), bytes);
    }

    #[test]
    fn encode_rejects_above_ff() {
        let err = LATIN1.encode("\u{FF}\u{100}").unwrap_err();
        assert!(matches!(err, CodecError::OutOfRange { ch: '\u{100}', .. }));
    }

    #[test]
    fn latin1_to_utf8_transcodes() {
        let text = LATIN1.decode(&[0x63, 0x61, 0x66, 0xE9][..]).unwrap();
        assert_eq!(UTF8.encode(&text).unwrap(), "café".as_bytes());
    }
}
