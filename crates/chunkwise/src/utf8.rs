//! UTF-8 encoding and incremental decoding.
//!
//! Decoding is a resumable state machine: a multi-byte sequence may be split
//! across any number of chunks, and decoding a byte stream in one call or in
//! arbitrarily split chunks yields the same text.
//!
//! # Decoder state
//!
//! While a sequence is open the decoder remembers the bits collected so far
//! (`pending_value`), how many continuation bytes are still missing, and how
//! many the sequence needed in total. The total selects the overlong floor a
//! finished code point is checked against.
//!
//! Text in Rust is always valid UTF-8, so encoding a `str` is a copy. The
//! [`CodeUnitEncoder`] accepts UTF-16 code units instead and pairs surrogates,
//! including pairs that are split across chunks.
use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    converter::{Codec, Converter},
    error::{CodecError, Utf8Error, Utf8ErrorKind},
    options::Utf8DecoderOptions,
    sink::BoxSink,
};

/// U+FFFD, substituted for malformed input in lossy modes.
pub const UNICODE_REPLACEMENT_CHARACTER: char = '\u{FFFD}';

const UNICODE_BOM: u32 = 0xFEFF;
const MAX_UNICODE: u32 = 0x10_FFFF;

/// Largest value that is overlong for a sequence with 1, 2 or 3
/// continuation bytes.
const OVERLONG_FLOORS: [u32; 3] = [0x7F, 0x7FF, 0xFFFF];

/// Appends a run of bytes below 0x80 in one copy.
pub(crate) fn push_ascii(out: &mut String, run: &[u8]) {
    match core::str::from_utf8(run) {
        Ok(run) => out.push_str(run),
        Err(_) => unreachable!("ascii run holds a byte above 0x7f"),
    }
}

/// The UTF-8 codec in strict mode.
pub const UTF8: Utf8Codec = Utf8Codec::new();

/// A strict UTF-8 decoder.
pub const UTF8_DECODER: Utf8Decoder = Utf8Decoder::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8Codec {
    options: Utf8DecoderOptions,
}

impl Utf8Codec {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: Utf8DecoderOptions {
                allow_malformed: false,
            },
        }
    }

    #[must_use]
    pub const fn with_options(options: Utf8DecoderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> Utf8DecoderOptions {
        self.options
    }
}

impl Codec for Utf8Codec {
    type Decoded = str;
    type Encoded = [u8];
    type Encoder = Utf8Encoder;
    type Decoder = Utf8Decoder;

    fn encoder(&self) -> Utf8Encoder {
        Utf8Encoder
    }

    fn decoder(&self) -> Utf8Decoder {
        Utf8Decoder::with_options(self.options)
    }
}

// ------------------------------------------------------------------------------------------------
// Encoding
// ------------------------------------------------------------------------------------------------

/// Encodes text as UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8Encoder;

impl Utf8Encoder {
    /// The same encoder, taking UTF-16 code units as input.
    #[must_use]
    pub fn code_units(self) -> CodeUnitEncoder {
        CodeUnitEncoder
    }
}

impl Converter for Utf8Encoder {
    type Input = str;
    type Output = [u8];
    type Converted = Vec<u8>;

    fn convert(&self, input: &str) -> Result<Vec<u8>, CodecError> {
        Ok(input.as_bytes().to_vec())
    }

    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, [u8]>,
    ) -> Result<BoxSink<'a, str>, CodecError> {
        Ok(Box::new(Utf8EncoderSink::new(sink)))
    }
}

/// A string sink that forwards the UTF-8 bytes of every chunk.
pub struct Utf8EncoderSink<'a> {
    sink: BoxSink<'a, [u8]>,
    closed: bool,
}

impl<'a> Utf8EncoderSink<'a> {
    pub fn new(sink: BoxSink<'a, [u8]>) -> Self {
        Self {
            sink,
            closed: false,
        }
    }
}

impl crate::ChunkedSink<str> for Utf8EncoderSink<'_> {
    fn add(&mut self, chunk: &str) -> Result<(), CodecError> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.sink.add(chunk.as_bytes())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close()
    }
}

/// Encodes UTF-16 code units as UTF-8.
///
/// Surrogate pairs become four-byte sequences. An unpaired surrogate is
/// encoded on its own as a three-byte sequence, the way WTF-8 does.
///
/// ```rust
/// use chunkwise::{Converter, Utf8Encoder};
///
/// let units: Vec<u16> = "a😀".encode_utf16().collect();
/// let bytes = Utf8Encoder.code_units().convert(&units).unwrap();
/// assert_eq!(bytes, "a😀".as_bytes());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeUnitEncoder;

impl Converter for CodeUnitEncoder {
    type Input = [u16];
    type Output = [u8];
    type Converted = Vec<u8>;

    fn convert(&self, units: &[u16]) -> Result<Vec<u8>, CodecError> {
        // Three bytes per unit covers every case: a pair takes four bytes for
        // two units.
        let mut buffer = Vec::with_capacity(units.len() * 3);
        let consumed = fill_buffer(&mut buffer, units);
        if consumed != units.len() {
            write_surrogate(&mut buffer, units[units.len() - 1], 0);
        }
        Ok(buffer)
    }

    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, [u8]>,
    ) -> Result<BoxSink<'a, [u16]>, CodecError> {
        Ok(Box::new(CodeUnitEncoderSink {
            sink,
            carry: None,
            buffer: Vec::new(),
            closed: false,
        }))
    }
}

struct CodeUnitEncoderSink<'a> {
    sink: BoxSink<'a, [u8]>,
    /// Lead surrogate that ended the previous chunk.
    carry: Option<u16>,
    buffer: Vec<u8>,
    closed: bool,
}

impl crate::ChunkedSink<[u16]> for CodeUnitEncoderSink<'_> {
    fn add(&mut self, units: &[u16]) -> Result<(), CodecError> {
        if units.is_empty() {
            return Ok(());
        }
        self.buffer.clear();
        let mut start = 0;
        if let Some(lead) = self.carry.take() {
            if write_surrogate(&mut self.buffer, lead, units[0]) {
                start = 1;
            }
        }
        let consumed = start + fill_buffer(&mut self.buffer, &units[start..]);
        if consumed < units.len() {
            self.carry = Some(units[consumed]);
        }
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.sink.add(&self.buffer)
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(lead) = self.carry.take() {
            self.buffer.clear();
            write_surrogate(&mut self.buffer, lead, 0);
            self.sink.add(&self.buffer)?;
        }
        self.sink.close()
    }
}

fn is_lead_surrogate(unit: u16) -> bool {
    unit & 0xFC00 == 0xD800
}

fn is_tail_surrogate(unit: u16) -> bool {
    unit & 0xFC00 == 0xDC00
}

/// Appends the UTF-8 form of `code_point`. Surrogates are written like any
/// other value below 0x10000.
#[expect(clippy::cast_possible_truncation)]
pub(crate) fn write_code_point(buffer: &mut Vec<u8>, code_point: u32) {
    match code_point {
        0..=0x7F => buffer.push(code_point as u8),
        0x80..=0x7FF => buffer.extend_from_slice(&[
            0xC0 | (code_point >> 6) as u8,
            0x80 | (code_point & 0x3F) as u8,
        ]),
        0x800..=0xFFFF => buffer.extend_from_slice(&[
            0xE0 | (code_point >> 12) as u8,
            0x80 | ((code_point >> 6) & 0x3F) as u8,
            0x80 | (code_point & 0x3F) as u8,
        ]),
        _ => buffer.extend_from_slice(&[
            0xF0 | (code_point >> 18) as u8,
            0x80 | ((code_point >> 12) & 0x3F) as u8,
            0x80 | ((code_point >> 6) & 0x3F) as u8,
            0x80 | (code_point & 0x3F) as u8,
        ]),
    }
}

/// Writes `lead` combined with `next` if `next` is a tail surrogate and
/// returns `true`. Otherwise writes `lead` alone and returns `false`.
fn write_surrogate(buffer: &mut Vec<u8>, lead: u16, next: u16) -> bool {
    if is_tail_surrogate(next) {
        let code_point =
            0x1_0000 + (((u32::from(lead) & 0x3FF) << 10) | (u32::from(next) & 0x3FF));
        write_code_point(buffer, code_point);
        true
    } else {
        write_code_point(buffer, u32::from(lead));
        false
    }
}

/// Encodes `units` and returns how many were consumed. A lead surrogate in
/// the last position is left for the caller, since its partner may follow.
fn fill_buffer(buffer: &mut Vec<u8>, units: &[u16]) -> usize {
    let mut end = units.len();
    if end > 0 && is_lead_surrogate(units[end - 1]) {
        end -= 1;
    }
    let mut index = 0;
    while index < end {
        let unit = units[index];
        index += 1;
        if unit < 0x80 {
            #[expect(clippy::cast_possible_truncation)]
            buffer.push(unit as u8);
        } else if is_lead_surrogate(unit) {
            // `end` excludes a trailing lead, so a partner slot exists.
            if write_surrogate(buffer, unit, units[index]) {
                index += 1;
            }
        } else {
            write_code_point(buffer, u32::from(unit));
        }
    }
    end
}

// ------------------------------------------------------------------------------------------------
// Decoding
// ------------------------------------------------------------------------------------------------

/// Decodes UTF-8 bytes into text.
///
/// A byte order mark at the very start of the input is dropped.
///
/// # Examples
///
/// ```rust
/// use chunkwise::{Converter, Utf8Decoder, Utf8DecoderOptions};
///
/// let strict = Utf8Decoder::new();
/// assert!(strict.convert(&[0x61, 0xC0, 0x80][..]).is_err());
///
/// let lossy = Utf8Decoder::with_options(Utf8DecoderOptions { allow_malformed: true });
/// assert_eq!(lossy.convert(&[0x61, 0xC0, 0x80][..]).unwrap(), "a\u{FFFD}");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8Decoder {
    options: Utf8DecoderOptions,
}

impl Utf8Decoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: Utf8DecoderOptions {
                allow_malformed: false,
            },
        }
    }

    #[must_use]
    pub const fn with_options(options: Utf8DecoderOptions) -> Self {
        Self { options }
    }
}

impl Converter for Utf8Decoder {
    type Input = [u8];
    type Output = str;
    type Converted = String;

    fn convert(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let mut state = Utf8DecodeState::new(self.options);
        let mut text = String::with_capacity(bytes.len());
        state.decode(bytes, &mut text)?;
        state.flush(&mut text)?;
        Ok(text)
    }

    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, str>,
    ) -> Result<BoxSink<'a, [u8]>, CodecError> {
        Ok(Box::new(Utf8DecoderSink::new(sink, self.options)))
    }
}

/// A byte sink that decodes UTF-8 into a string sink.
///
/// Each `add` forwards at most one string: the text completed by that chunk.
pub struct Utf8DecoderSink<'a> {
    sink: BoxSink<'a, str>,
    state: Utf8DecodeState,
    buffer: String,
    closed: bool,
}

impl<'a> Utf8DecoderSink<'a> {
    pub fn new(sink: BoxSink<'a, str>, options: Utf8DecoderOptions) -> Self {
        Self {
            sink,
            state: Utf8DecodeState::new(options),
            buffer: String::new(),
            closed: false,
        }
    }

    /// Whether the last chunk ended inside a multi-byte sequence.
    #[must_use]
    pub fn has_partial_input(&self) -> bool {
        self.state.expected_continuation_bytes > 0
    }
}

impl crate::ChunkedSink<[u8]> for Utf8DecoderSink<'_> {
    fn add(&mut self, chunk: &[u8]) -> Result<(), CodecError> {
        self.buffer.clear();
        self.state.decode(chunk, &mut self.buffer)?;
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.sink.add(&self.buffer)
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.buffer.clear();
        self.state.flush(&mut self.buffer)?;
        if !self.buffer.is_empty() {
            self.sink.add(&self.buffer)?;
        }
        self.sink.close()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Utf8DecodeState {
    allow_malformed: bool,
    pending_value: u32,
    expected_continuation_bytes: u8,
    original_sequence_length: u8,
    is_first_character: bool,
    /// Bytes consumed by earlier calls; error offsets are stream offsets.
    position: usize,
}

impl Utf8DecodeState {
    pub(crate) fn new(options: Utf8DecoderOptions) -> Self {
        Self {
            allow_malformed: options.allow_malformed,
            pending_value: 0,
            expected_continuation_bytes: 0,
            original_sequence_length: 0,
            is_first_character: true,
            position: 0,
        }
    }

    /// Returns the replacement character in lossy mode, the error otherwise.
    fn malformed(&self, kind: Utf8ErrorKind, offset: usize) -> Result<char, Utf8Error> {
        if self.allow_malformed {
            log::trace!("replacing malformed utf-8 at offset {offset}: {kind}");
            Ok(UNICODE_REPLACEMENT_CHARACTER)
        } else {
            Err(Utf8Error { kind, offset })
        }
    }

    /// Validates a completed sequence of `1 + extra` bytes.
    fn finish_sequence(&self, value: u32, extra: u8, offset: usize) -> Result<char, Utf8Error> {
        if value <= OVERLONG_FLOORS[usize::from(extra) - 1] {
            return self.malformed(Utf8ErrorKind::Overlong(value), offset);
        }
        if value > MAX_UNICODE {
            return self.malformed(Utf8ErrorKind::OutOfRange(value), offset);
        }
        match char::from_u32(value) {
            Some(ch) => Ok(ch),
            None => self.malformed(Utf8ErrorKind::EncodedSurrogate(value), offset),
        }
    }

    pub(crate) fn decode(&mut self, bytes: &[u8], out: &mut String) -> Result<(), Utf8Error> {
        let base = self.position;
        self.position += bytes.len();

        let mut value = self.pending_value;
        let mut expected = self.expected_continuation_bytes;
        let mut extra = self.original_sequence_length;
        self.pending_value = 0;
        self.expected_continuation_bytes = 0;
        self.original_sequence_length = 0;

        let len = bytes.len();
        let mut i = 0;
        'decode: loop {
            'multibyte: {
                if expected == 0 {
                    break 'multibyte;
                }
                while expected > 0 {
                    if i == len {
                        break 'decode;
                    }
                    let unit = bytes[i];
                    if unit & 0xC0 != 0x80 {
                        // Rescan `unit` as the start of something new.
                        expected = 0;
                        let replacement =
                            self.malformed(Utf8ErrorKind::MissingContinuation(unit), base + i)?;
                        self.is_first_character = false;
                        out.push(replacement);
                        break 'multibyte;
                    }
                    value = (value << 6) | u32::from(unit & 0x3F);
                    expected -= 1;
                    i += 1;
                }
                let start = (base + i).saturating_sub(usize::from(extra) + 1);
                let ch = self.finish_sequence(value, extra, start)?;
                if !self.is_first_character || u32::from(ch) != UNICODE_BOM {
                    out.push(ch);
                }
                self.is_first_character = false;
            }

            while i < len {
                let ascii = bytes[i..].iter().take_while(|&&b| b < 0x80).count();
                if ascii > 0 {
                    self.is_first_character = false;
                    push_ascii(out, &bytes[i..i + ascii]);
                    i += ascii;
                    if i == len {
                        break;
                    }
                }
                let unit = bytes[i];
                i += 1;
                if unit & 0xE0 == 0xC0 {
                    value = u32::from(unit & 0x1F);
                    expected = 1;
                    extra = 1;
                    continue 'decode;
                }
                if unit & 0xF0 == 0xE0 {
                    value = u32::from(unit & 0x0F);
                    expected = 2;
                    extra = 2;
                    continue 'decode;
                }
                // 0xF5..=0xFF never start a valid sequence.
                if unit & 0xF8 == 0xF0 && unit < 0xF5 {
                    value = u32::from(unit & 0x07);
                    expected = 3;
                    extra = 3;
                    continue 'decode;
                }
                let replacement =
                    self.malformed(Utf8ErrorKind::InvalidByte(unit), base + i - 1)?;
                self.is_first_character = false;
                out.push(replacement);
            }
            break;
        }

        if expected > 0 {
            self.pending_value = value;
            self.expected_continuation_bytes = expected;
            self.original_sequence_length = extra;
        }
        Ok(())
    }

    /// Ends the stream; an open sequence is an error or one replacement.
    pub(crate) fn flush(&mut self, out: &mut String) -> Result<(), Utf8Error> {
        if self.expected_continuation_bytes == 0 {
            return Ok(());
        }
        let missing = usize::from(self.expected_continuation_bytes);
        let seen = usize::from(self.original_sequence_length) + 1 - missing;
        let start = self.position.saturating_sub(seen);
        self.pending_value = 0;
        self.expected_continuation_bytes = 0;
        self.original_sequence_length = 0;
        let replacement = self.malformed(Utf8ErrorKind::UnfinishedSequence, start)?;
        out.push(replacement);
        Ok(())
    }
}
