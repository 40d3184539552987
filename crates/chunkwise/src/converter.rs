//! The `Converter` and `Codec` abstractions and their composition.
//!
//! A [`Converter`] turns one representation into another, either in one shot
//! with [`Converter::convert`] or incrementally through the sink returned by
//! [`Converter::start_chunked_conversion`]. A [`Codec`] pairs an encoder with
//! the decoder going the other way.
//!
//! Converters compose with [`Converter::fuse`]; the fused chunked sink is the
//! first converter's sink wrapped around the second converter's sink, so
//! chunks are pipelined through both without collecting intermediate output.
//!
//! ```rust
//! use chunkwise::{Codec, JSON, UTF8, Value};
//!
//! let json_utf8 = JSON.fuse(UTF8);
//! let bytes = json_utf8.encode(&Value::from(vec![Value::from("ä")])).unwrap();
//! assert_eq!(bytes, "[\"ä\"]".as_bytes());
//! ```
use core::borrow::Borrow;

use crate::{error::CodecError, sink::BoxSink};

/// A one-directional conversion that may also run over chunked input.
pub trait Converter {
    /// The type of a complete input, and of each chunk fed to the chunked
    /// sink.
    type Input: ?Sized;
    /// The type of each chunk emitted to the downstream sink.
    type Output: ?Sized;
    /// The result of a one-shot conversion.
    type Converted;

    /// Converts a complete input in one call.
    ///
    /// # Errors
    ///
    /// Returns the first data error in `input`.
    fn convert(&self, input: &Self::Input) -> Result<Self::Converted, CodecError>;

    /// Starts a chunked conversion writing into `sink`.
    ///
    /// The default implementation reports that the converter cannot stream.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unsupported`] when the converter does not
    /// support chunked conversion.
    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, Self::Output>,
    ) -> Result<BoxSink<'a, Self::Input>, CodecError> {
        drop(sink);
        log::debug!(
            "chunked conversion requested from {}",
            core::any::type_name::<Self>()
        );
        Err(CodecError::Unsupported(
            "converter does not support chunked conversion",
        ))
    }

    /// Composes `self` with a converter consuming its output.
    fn fuse<B>(self, other: B) -> Fused<Self, B>
    where
        Self: Sized,
        B: Converter<Input = Self::Output>,
    {
        Fused {
            first: self,
            second: other,
        }
    }
}

/// Two converters run back to back; see [`Converter::fuse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Fused<A, B> {
    first: A,
    second: B,
}

impl<A, B> Fused<A, B> {
    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A, B> Converter for Fused<A, B>
where
    A: Converter,
    B: Converter<Input = A::Output>,
    A::Converted: Borrow<A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;
    type Converted = B::Converted;

    fn convert(&self, input: &Self::Input) -> Result<Self::Converted, CodecError> {
        let intermediate = self.first.convert(input)?;
        self.second.convert(intermediate.borrow())
    }

    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, Self::Output>,
    ) -> Result<BoxSink<'a, Self::Input>, CodecError> {
        let inner = self.second.start_chunked_conversion(sink)?;
        self.first.start_chunked_conversion(inner)
    }
}

/// A matching encoder and decoder between `Decoded` and `Encoded` data.
pub trait Codec {
    type Decoded: ?Sized;
    type Encoded: ?Sized;
    type Encoder: Converter<Input = Self::Decoded, Output = Self::Encoded>;
    type Decoder: Converter<Input = Self::Encoded, Output = Self::Decoded>;

    fn encoder(&self) -> Self::Encoder;

    fn decoder(&self) -> Self::Decoder;

    /// Encodes `input` with [`Codec::encoder`].
    ///
    /// # Errors
    ///
    /// Returns the encoder's error for `input`.
    fn encode(
        &self,
        input: &Self::Decoded,
    ) -> Result<<Self::Encoder as Converter>::Converted, CodecError> {
        self.encoder().convert(input)
    }

    /// Decodes `input` with [`Codec::decoder`].
    ///
    /// # Errors
    ///
    /// Returns the decoder's error for `input`.
    fn decode(
        &self,
        input: &Self::Encoded,
    ) -> Result<<Self::Decoder as Converter>::Converted, CodecError> {
        self.decoder().convert(input)
    }

    /// Chains `other` after `self`: encoding runs `self` then `other`,
    /// decoding runs them in reverse.
    fn fuse<C>(self, other: C) -> FusedCodec<Self, C>
    where
        Self: Sized,
        C: Codec<Decoded = Self::Encoded>,
    {
        FusedCodec {
            first: self,
            second: other,
        }
    }

    /// Swaps the roles of encoder and decoder.
    fn inverted(self) -> Inverted<Self>
    where
        Self: Sized,
    {
        Inverted(self)
    }
}

/// Two codecs chained; see [`Codec::fuse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FusedCodec<A, B> {
    first: A,
    second: B,
}

impl<A, B> Codec for FusedCodec<A, B>
where
    A: Codec,
    B: Codec<Decoded = A::Encoded>,
    <A::Encoder as Converter>::Converted: Borrow<A::Encoded>,
    <B::Decoder as Converter>::Converted: Borrow<A::Encoded>,
{
    type Decoded = A::Decoded;
    type Encoded = B::Encoded;
    type Encoder = Fused<A::Encoder, B::Encoder>;
    type Decoder = Fused<B::Decoder, A::Decoder>;

    fn encoder(&self) -> Self::Encoder {
        self.first.encoder().fuse(self.second.encoder())
    }

    fn decoder(&self) -> Self::Decoder {
        self.second.decoder().fuse(self.first.decoder())
    }
}

/// A codec with encoder and decoder swapped; see [`Codec::inverted`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Inverted<C>(C);

impl<C: Codec> Codec for Inverted<C> {
    type Decoded = C::Encoded;
    type Encoded = C::Decoded;
    type Encoder = C::Decoder;
    type Decoder = C::Encoder;

    fn encoder(&self) -> Self::Encoder {
        self.0.decoder()
    }

    fn decoder(&self) -> Self::Decoder {
        self.0.encoder()
    }
}
