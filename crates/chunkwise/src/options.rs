/// Configuration for decoding UTF-8 input.
///
/// # Examples
///
/// ```rust
/// use chunkwise::{Utf8Decoder, Utf8DecoderOptions};
///
/// let decoder = Utf8Decoder::with_options(Utf8DecoderOptions {
///     allow_malformed: true,
/// });
/// ```
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8DecoderOptions {
    /// Whether malformed input is replaced instead of rejected.
    ///
    /// When `true`, invalid bytes, overlong encodings, code points outside
    /// the Unicode range, encoded surrogates, and a multi-byte sequence left
    /// unfinished at the end of the stream each produce one U+FFFD
    /// replacement character and decoding continues. When `false`, the first
    /// such problem is returned as a [`crate::Utf8Error`].
    ///
    /// # Default
    ///
    /// `false`
    pub allow_malformed: bool,
}

/// Configuration for decoding ASCII and Latin-1 input.
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetDecoderOptions {
    /// Whether bytes outside the codec's range are replaced with U+FFFD.
    ///
    /// Encoding has no counterpart: characters outside the range are always
    /// rejected.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_invalid: bool,
}
