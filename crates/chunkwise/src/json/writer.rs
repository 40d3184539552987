//! Output targets for the stringifier.
use alloc::{string::String, vec::Vec};

use crate::error::CodecError;

/// Where the stringifier writes JSON text.
pub trait JsonWriter {
    /// # Errors
    ///
    /// Returns an error when a downstream sink rejects flushed output.
    fn write_str(&mut self, text: &str) -> Result<(), CodecError>;

    /// # Errors
    ///
    /// See [`JsonWriter::write_str`].
    fn write_char(&mut self, ch: char) -> Result<(), CodecError> {
        self.write_str(ch.encode_utf8(&mut [0; 4]))
    }

    /// The text written so far, if the writer keeps it.
    fn partial_result(&self) -> Option<String> {
        None
    }
}

/// Writes into a `String`.
#[derive(Debug, Default)]
pub struct StringWriter {
    out: String,
}

impl StringWriter {
    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }
}

impl JsonWriter for StringWriter {
    fn write_str(&mut self, text: &str) -> Result<(), CodecError> {
        self.out.push_str(text);
        Ok(())
    }

    fn write_char(&mut self, ch: char) -> Result<(), CodecError> {
        self.out.push(ch);
        Ok(())
    }

    fn partial_result(&self) -> Option<String> {
        Some(self.out.clone())
    }
}

/// Default size of the chunks a [`ByteWriter`] hands to its callback.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Writes UTF-8 bytes into a fixed-size buffer and passes each full buffer
/// to `flush`. Chunk boundaries may fall inside a multi-byte character.
pub struct ByteWriter<F> {
    buffer: Vec<u8>,
    capacity: usize,
    flush: F,
}

impl<F> ByteWriter<F>
where
    F: FnMut(&[u8]) -> Result<(), CodecError>,
{
    pub fn new(capacity: usize, flush: F) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            flush,
        }
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<(), CodecError> {
        while !bytes.is_empty() {
            let room = self.capacity - self.buffer.len();
            let (now, rest) = bytes.split_at(room.min(bytes.len()));
            self.buffer.extend_from_slice(now);
            bytes = rest;
            if self.buffer.len() == self.capacity {
                self.flush_buffer()?;
            }
        }
        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<(), CodecError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        log::trace!("flushing {} bytes of json output", self.buffer.len());
        (self.flush)(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }

    /// Flushes whatever is left in the buffer.
    ///
    /// # Errors
    ///
    /// Propagates the error of the flush callback.
    pub fn finish(mut self) -> Result<(), CodecError> {
        self.flush_buffer()
    }
}

impl<F> JsonWriter for ByteWriter<F>
where
    F: FnMut(&[u8]) -> Result<(), CodecError>,
{
    fn write_str(&mut self, text: &str) -> Result<(), CodecError> {
        self.write_bytes(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn byte_writer_emits_full_chunks_then_remainder() {
        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut writer = ByteWriter::new(4, |chunk: &[u8]| {
            chunks.push(chunk.to_vec());
            Ok(())
        });
        writer.write_str("abc").unwrap();
        writer.write_str("défg").unwrap();
        writer.write_char('h').unwrap();
        writer.finish().unwrap();
        assert_eq!(
            chunks,
            [b"abcd".to_vec(), vec![0xC3, 0xA9, b'f', b'g'], b"h".to_vec()]
        );
    }

    #[test]
    fn string_writer_reports_partial_result() {
        let mut writer = StringWriter::default();
        writer.write_str("[1,").unwrap();
        assert_eq!(writer.partial_result().as_deref(), Some("[1,"));
    }
}
