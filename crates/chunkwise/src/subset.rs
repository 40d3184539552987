//! Codecs for encodings that are a prefix of Unicode.
//!
//! ASCII and Latin-1 map each byte to the code point of the same value, so
//! the only difference between them is which values are in range. A
//! [`UnicodeSubset`] marker carries that range as a bit mask and the generic
//! types here do the work for both.
use alloc::{boxed::Box, string::String, vec::Vec};
use core::{fmt, marker::PhantomData};

use crate::{
    converter::{Codec, Converter},
    error::CodecError,
    options::SubsetDecoderOptions,
    sink::BoxSink,
    utf8::{UNICODE_REPLACEMENT_CHARACTER, push_ascii},
};

/// A contiguous range of code points starting at zero.
pub trait UnicodeSubset: Copy + Default + fmt::Debug + 'static {
    /// Name used in error messages.
    const NAME: &'static str;
    /// All bits a code point in the subset may have set.
    const MASK: u32;

    /// Whether `code_point` lies in the subset.
    #[must_use]
    fn contains(code_point: u32) -> bool {
        code_point & !Self::MASK == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetCodec<S> {
    options: SubsetDecoderOptions,
    subset: PhantomData<S>,
}

impl<S: UnicodeSubset> SubsetCodec<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_options(SubsetDecoderOptions {
            allow_invalid: false,
        })
    }

    #[must_use]
    pub const fn with_options(options: SubsetDecoderOptions) -> Self {
        Self {
            options,
            subset: PhantomData,
        }
    }
}

impl<S: UnicodeSubset> Codec for SubsetCodec<S> {
    type Decoded = str;
    type Encoded = [u8];
    type Encoder = SubsetEncoder<S>;
    type Decoder = SubsetDecoder<S>;

    fn encoder(&self) -> SubsetEncoder<S> {
        SubsetEncoder::new()
    }

    fn decoder(&self) -> SubsetDecoder<S> {
        SubsetDecoder::with_options(self.options)
    }
}

// ------------------------------------------------------------------------------------------------
// Encoding
// ------------------------------------------------------------------------------------------------

/// Encodes text whose characters all lie in `S`, one byte per character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetEncoder<S> {
    subset: PhantomData<S>,
}

impl<S: UnicodeSubset> SubsetEncoder<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subset: PhantomData,
        }
    }

    fn encode_into(text: &str, out: &mut Vec<u8>, base: usize) -> Result<(), CodecError> {
        out.reserve(text.len());
        for (index, ch) in text.char_indices() {
            match u8::try_from(ch) {
                Ok(byte) if S::contains(u32::from(byte)) => out.push(byte),
                _ => {
                    return Err(CodecError::OutOfRange {
                        codec: S::NAME,
                        ch,
                        index: base + index,
                    });
                }
            }
        }
        Ok(())
    }
}

impl<S: UnicodeSubset> Converter for SubsetEncoder<S> {
    type Input = str;
    type Output = [u8];
    type Converted = Vec<u8>;

    fn convert(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        Self::encode_into(text, &mut bytes, 0)?;
        Ok(bytes)
    }

    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, [u8]>,
    ) -> Result<BoxSink<'a, str>, CodecError> {
        Ok(Box::new(SubsetEncoderSink::<S> {
            sink,
            buffer: Vec::new(),
            position: 0,
            closed: false,
            subset: PhantomData,
        }))
    }
}

struct SubsetEncoderSink<'a, S> {
    sink: BoxSink<'a, [u8]>,
    buffer: Vec<u8>,
    position: usize,
    closed: bool,
    subset: PhantomData<S>,
}

impl<S: UnicodeSubset> crate::ChunkedSink<str> for SubsetEncoderSink<'_, S> {
    fn add(&mut self, chunk: &str) -> Result<(), CodecError> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.buffer.clear();
        SubsetEncoder::<S>::encode_into(chunk, &mut self.buffer, self.position)?;
        self.position += chunk.len();
        self.sink.add(&self.buffer)
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close()
    }
}

// ------------------------------------------------------------------------------------------------
// Decoding
// ------------------------------------------------------------------------------------------------

/// Decodes bytes in `S` to text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetDecoder<S> {
    options: SubsetDecoderOptions,
    subset: PhantomData<S>,
}

impl<S: UnicodeSubset> SubsetDecoder<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_options(SubsetDecoderOptions {
            allow_invalid: false,
        })
    }

    #[must_use]
    pub const fn with_options(options: SubsetDecoderOptions) -> Self {
        Self {
            options,
            subset: PhantomData,
        }
    }

    /// Decodes `bytes` onto `out`.
    ///
    /// In strict mode the bytes before the first invalid one are still
    /// appended when the error is returned.
    fn decode_into(
        &self,
        bytes: &[u8],
        out: &mut String,
        base: usize,
    ) -> Result<(), CodecError> {
        out.reserve(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            let run = bytes[i..]
                .iter()
                .take_while(|&&b| S::contains(u32::from(b)))
                .count();
            let mut rest = &bytes[i..i + run];
            while !rest.is_empty() {
                let ascii = rest.iter().take_while(|b| b.is_ascii()).count();
                push_ascii(out, &rest[..ascii]);
                let high = rest[ascii..].iter().take_while(|b| !b.is_ascii()).count();
                out.extend(rest[ascii..ascii + high].iter().map(|&b| char::from(b)));
                rest = &rest[ascii + high..];
            }
            i += run;
            if i == bytes.len() {
                break;
            }
            if !self.options.allow_invalid {
                return Err(CodecError::InvalidByte {
                    codec: S::NAME,
                    byte: bytes[i],
                    offset: base + i,
                });
            }
            log::trace!(
                "replacing invalid {} byte 0x{:02x} at offset {}",
                S::NAME,
                bytes[i],
                base + i
            );
            out.push(UNICODE_REPLACEMENT_CHARACTER);
            i += 1;
        }
        Ok(())
    }
}

impl<S: UnicodeSubset> Converter for SubsetDecoder<S> {
    type Input = [u8];
    type Output = str;
    type Converted = String;

    fn convert(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let mut text = String::new();
        self.decode_into(bytes, &mut text, 0)?;
        Ok(text)
    }

    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, str>,
    ) -> Result<BoxSink<'a, [u8]>, CodecError> {
        Ok(Box::new(SubsetDecoderSink {
            decoder: *self,
            sink,
            buffer: String::new(),
            position: 0,
            closed: false,
        }))
    }
}

struct SubsetDecoderSink<'a, S> {
    decoder: SubsetDecoder<S>,
    sink: BoxSink<'a, str>,
    buffer: String,
    position: usize,
    closed: bool,
}

impl<S: UnicodeSubset> crate::ChunkedSink<[u8]> for SubsetDecoderSink<'_, S> {
    fn add(&mut self, chunk: &[u8]) -> Result<(), CodecError> {
        self.buffer.clear();
        let decoded = self
            .decoder
            .decode_into(chunk, &mut self.buffer, self.position);
        self.position += chunk.len();
        if !self.buffer.is_empty() {
            self.sink.add(&self.buffer)?;
        }
        decoded
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close()
    }
}
