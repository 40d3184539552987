//! Escaping of text for inclusion in HTML.
//!
//! Which characters are escaped depends on where the text goes; see
//! [`HtmlEscapeMode`]. `&` is escaped in every mode.
//!
//! ```rust
//! use chunkwise::{HtmlEscape, HtmlEscapeMode};
//!
//! let escape = HtmlEscape::new(HtmlEscapeMode::ELEMENT);
//! assert_eq!(escape.escape(r#"<a href="x">"#), r#"&lt;a href="x"&gt;"#);
//! ```
use alloc::{borrow::Cow, boxed::Box, string::String};

use crate::{
    converter::Converter,
    error::CodecError,
    sink::{BoxSink, ChunkedSink},
};

/// The set of characters an [`HtmlEscape`] replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlEscapeMode {
    pub name: &'static str,
    /// `<` and `>`.
    pub escape_lt_gt: bool,
    /// `"`.
    pub escape_quot: bool,
    /// `'`.
    pub escape_apos: bool,
    /// `/`.
    pub escape_slash: bool,
    /// Space, as `&nbsp;`.
    pub escape_space: bool,
}

impl HtmlEscapeMode {
    /// Safe in any context: element content and both kinds of quoted
    /// attribute value.
    pub const UNKNOWN: Self = Self::new("unknown")
        .with_lt_gt(true)
        .with_quot(true)
        .with_apos(true)
        .with_slash(true);

    /// Attribute values in double quotes.
    pub const ATTRIBUTE: Self = Self::new("attribute").with_lt_gt(true).with_quot(true);

    /// Attribute values in single quotes.
    pub const SQ_ATTRIBUTE: Self = Self::new("attribute").with_lt_gt(true).with_apos(true);

    /// Element content.
    pub const ELEMENT: Self = Self::new("element").with_lt_gt(true);

    /// A mode escaping only `&`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            escape_lt_gt: false,
            escape_quot: false,
            escape_apos: false,
            escape_slash: false,
            escape_space: false,
        }
    }

    #[must_use]
    pub const fn with_lt_gt(mut self, on: bool) -> Self {
        self.escape_lt_gt = on;
        self
    }

    #[must_use]
    pub const fn with_quot(mut self, on: bool) -> Self {
        self.escape_quot = on;
        self
    }

    #[must_use]
    pub const fn with_apos(mut self, on: bool) -> Self {
        self.escape_apos = on;
        self
    }

    #[must_use]
    pub const fn with_slash(mut self, on: bool) -> Self {
        self.escape_slash = on;
        self
    }

    #[must_use]
    pub const fn with_space(mut self, on: bool) -> Self {
        self.escape_space = on;
        self
    }

    fn replacement(&self, ch: char) -> Option<&'static str> {
        match ch {
            '&' => Some("&amp;"),
            '"' if self.escape_quot => Some("&quot;"),
            '\'' if self.escape_apos => Some("&#39;"),
            '<' if self.escape_lt_gt => Some("&lt;"),
            '>' if self.escape_lt_gt => Some("&gt;"),
            '/' if self.escape_slash => Some("&#47;"),
            ' ' if self.escape_space => Some("&nbsp;"),
            _ => None,
        }
    }
}

impl Default for HtmlEscapeMode {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Escapes text per an [`HtmlEscapeMode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlEscape {
    mode: HtmlEscapeMode,
}

impl HtmlEscape {
    #[must_use]
    pub const fn new(mode: HtmlEscapeMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub fn mode(&self) -> HtmlEscapeMode {
        self.mode
    }

    /// Escapes `text`, borrowing it when nothing needs replacing.
    #[must_use]
    pub fn escape<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let mut escaped = String::new();
        let mut run_start = 0;
        for (i, ch) in text.char_indices() {
            let Some(replacement) = self.mode.replacement(ch) else {
                continue;
            };
            if escaped.is_empty() {
                escaped.reserve(text.len() + 16);
            }
            escaped.push_str(&text[run_start..i]);
            escaped.push_str(replacement);
            run_start = i + ch.len_utf8();
        }
        if run_start == 0 {
            return Cow::Borrowed(text);
        }
        escaped.push_str(&text[run_start..]);
        Cow::Owned(escaped)
    }
}

impl Converter for HtmlEscape {
    type Input = str;
    type Output = str;
    type Converted = String;

    fn convert(&self, text: &str) -> Result<String, CodecError> {
        Ok(self.escape(text).into_owned())
    }

    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, str>,
    ) -> Result<BoxSink<'a, str>, CodecError> {
        Ok(Box::new(HtmlEscapeSink {
            escape: *self,
            sink,
            closed: false,
        }))
    }
}

/// Escapes each chunk on its own. Chunks with nothing to escape are passed
/// through as given.
struct HtmlEscapeSink<'a> {
    escape: HtmlEscape,
    sink: BoxSink<'a, str>,
    closed: bool,
}

impl ChunkedSink<str> for HtmlEscapeSink<'_> {
    fn add(&mut self, chunk: &str) -> Result<(), CodecError> {
        match self.escape.escape(chunk) {
            Cow::Borrowed(chunk) => self.sink.add(chunk),
            Cow::Owned(escaped) => self.sink.add(&escaped),
        }
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close()
    }
}
