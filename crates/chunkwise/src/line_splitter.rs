//! Splitting text into lines.
//!
//! A line ends at `\n`, `\r` or `\r\n`. The terminators are not part of the
//! lines, and text after the last terminator is a final line of its own.
use alloc::{borrow::ToOwned, boxed::Box, string::String, vec::Vec};

use crate::{
    converter::Converter,
    error::CodecError,
    sink::{BoxSink, ChunkedSink},
};

/// Splits text into lines.
///
/// ```rust
/// use chunkwise::LineSplitter;
///
/// let lines: Vec<&str> = LineSplitter::split("a\r\nb\rc\n\nd").collect();
/// assert_eq!(lines, ["a", "b", "c", "", "d"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSplitter;

impl LineSplitter {
    /// Iterates over the lines of `text` without copying them.
    #[must_use]
    pub fn split(text: &str) -> Lines<'_> {
        Lines { text, position: 0 }
    }
}

/// Iterator returned by [`LineSplitter::split`].
#[derive(Debug, Clone)]
pub struct Lines<'t> {
    text: &'t str,
    position: usize,
}

impl<'t> Iterator for Lines<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        let rest = &self.text[self.position..];
        if rest.is_empty() {
            return None;
        }
        let Some(end) = rest.find(['\n', '\r']) else {
            self.position = self.text.len();
            return Some(rest);
        };
        self.position += end + 1;
        if rest.as_bytes()[end] == b'\r' && rest.as_bytes().get(end + 1) == Some(&b'\n') {
            self.position += 1;
        }
        Some(&rest[..end])
    }
}

impl Converter for LineSplitter {
    type Input = str;
    type Output = str;
    type Converted = Vec<String>;

    fn convert(&self, text: &str) -> Result<Vec<String>, CodecError> {
        Ok(Self::split(text).map(str::to_owned).collect())
    }

    /// The returned sink adds one string per line to `sink`.
    fn start_chunked_conversion<'a>(
        &self,
        sink: BoxSink<'a, str>,
    ) -> Result<BoxSink<'a, str>, CodecError> {
        Ok(Box::new(LineSplitterSink {
            sink,
            carry: None,
            pending_cr: false,
            closed: false,
        }))
    }
}

struct LineSplitterSink<'a> {
    sink: BoxSink<'a, str>,
    /// Start of a line that the previous chunks did not finish.
    carry: Option<String>,
    /// The previous chunk ended in `\r`. `carry` holds the line it ended,
    /// which is emitted once the next chunk shows whether a `\n` belongs to
    /// the same terminator.
    pending_cr: bool,
    closed: bool,
}

impl LineSplitterSink<'_> {
    fn emit(&mut self, tail: &str) -> Result<(), CodecError> {
        match self.carry.take() {
            Some(mut line) => {
                line.push_str(tail);
                self.sink.add(&line)
            }
            None => self.sink.add(tail),
        }
    }
}

impl ChunkedSink<str> for LineSplitterSink<'_> {
    fn add(&mut self, chunk: &str) -> Result<(), CodecError> {
        if chunk.is_empty() {
            return Ok(());
        }
        let bytes = chunk.as_bytes();
        let mut line_start = 0;
        if self.pending_cr {
            self.pending_cr = false;
            self.emit("")?;
            if bytes[0] == b'\n' {
                line_start = 1;
            }
        }
        let mut i = line_start;
        while i < bytes.len() {
            let byte = bytes[i];
            if byte != b'\n' && byte != b'\r' {
                i += 1;
                continue;
            }
            if byte == b'\r' && i + 1 == bytes.len() {
                let line = &chunk[line_start..i];
                self.carry.get_or_insert_with(String::new).push_str(line);
                self.pending_cr = true;
                return Ok(());
            }
            self.emit(&chunk[line_start..i])?;
            if byte == b'\r' && bytes[i + 1] == b'\n' {
                i += 1;
            }
            i += 1;
            line_start = i;
        }
        if line_start < bytes.len() {
            self.carry
                .get_or_insert_with(String::new)
                .push_str(&chunk[line_start..]);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.pending_cr || self.carry.is_some() {
            self.pending_cr = false;
            self.emit("")?;
        }
        self.sink.close()
    }
}
