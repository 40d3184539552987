//! Push-based sinks that chunked conversions write into.
//!
//! A producer calls [`ChunkedSink::add`] zero or more times and then
//! [`ChunkedSink::close`] once. Converters hand out sinks that wrap the sink
//! they were given, so a chain of converters forms a chain of sinks and each
//! chunk flows through all of them before the next one is added.
//!
//! Plain collections act as terminal sinks:
//!
//! ```rust
//! use chunkwise::{ChunkedSink, Converter, UTF8_DECODER};
//!
//! let mut text = String::new();
//! let mut sink = UTF8_DECODER
//!     .start_chunked_conversion(Box::new(&mut text))
//!     .unwrap();
//! sink.add(&[0xE2, 0x82][..]).unwrap();
//! sink.add(&[0xAC][..]).unwrap();
//! sink.close().unwrap();
//! drop(sink);
//! assert_eq!(text, "€");
//! ```
use alloc::{borrow::ToOwned, boxed::Box, string::String, vec::Vec};
use core::mem;

use crate::{
    error::CodecError,
    options::Utf8DecoderOptions,
    utf8::{Utf8DecoderSink, Utf8EncoderSink},
    value::Value,
};

/// Receives the chunks of a chunked conversion.
pub trait ChunkedSink<T: ?Sized> {
    /// Adds one chunk.
    ///
    /// # Errors
    ///
    /// Returns the first data error found in the chunk, or a protocol error if
    /// the sink does not accept another chunk.
    fn add(&mut self, chunk: &T) -> Result<(), CodecError>;

    /// Signals the end of the input. Closing an already closed sink does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error when buffered input turns out to be incomplete.
    fn close(&mut self) -> Result<(), CodecError>;
}

/// An owned, type-erased sink.
pub type BoxSink<'a, T> = Box<dyn ChunkedSink<T> + 'a>;

impl<T: ?Sized, S: ChunkedSink<T> + ?Sized> ChunkedSink<T> for Box<S> {
    fn add(&mut self, chunk: &T) -> Result<(), CodecError> {
        (**self).add(chunk)
    }

    fn close(&mut self) -> Result<(), CodecError> {
        (**self).close()
    }
}

impl<T: ?Sized, S: ChunkedSink<T> + ?Sized> ChunkedSink<T> for &mut S {
    fn add(&mut self, chunk: &T) -> Result<(), CodecError> {
        (**self).add(chunk)
    }

    fn close(&mut self) -> Result<(), CodecError> {
        (**self).close()
    }
}

impl ChunkedSink<str> for String {
    fn add(&mut self, chunk: &str) -> Result<(), CodecError> {
        self.push_str(chunk);
        Ok(())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Collects each added string as a separate element, e.g. one per line.
impl ChunkedSink<str> for Vec<String> {
    fn add(&mut self, chunk: &str) -> Result<(), CodecError> {
        self.push(chunk.to_owned());
        Ok(())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl ChunkedSink<[u8]> for Vec<u8> {
    fn add(&mut self, chunk: &[u8]) -> Result<(), CodecError> {
        self.extend_from_slice(chunk);
        Ok(())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Keeps chunk boundaries: every added byte chunk becomes one element.
impl ChunkedSink<[u8]> for Vec<Vec<u8>> {
    fn add(&mut self, chunk: &[u8]) -> Result<(), CodecError> {
        self.push(chunk.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
}

impl ChunkedSink<Value> for Vec<Value> {
    fn add(&mut self, chunk: &Value) -> Result<(), CodecError> {
        self.push(chunk.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Accumulates chunks into `A` and hands the result to a callback on close.
///
/// ```rust
/// use std::{cell::RefCell, rc::Rc};
///
/// use chunkwise::{CallbackSink, ChunkedSink};
///
/// let seen = Rc::new(RefCell::new(None));
/// let out = Rc::clone(&seen);
/// let mut sink =
///     CallbackSink::<Vec<u8>, _>::new(move |bytes: Vec<u8>| *out.borrow_mut() = Some(bytes));
/// sink.add(&b"ab"[..]).unwrap();
/// sink.add(&b"c"[..]).unwrap();
/// ChunkedSink::<[u8]>::close(&mut sink).unwrap();
/// assert_eq!(seen.borrow().as_deref(), Some(&b"abc"[..]));
/// ```
pub struct CallbackSink<A, F> {
    accumulated: A,
    callback: Option<F>,
}

impl<A: Default, F> CallbackSink<A, F> {
    pub fn new(callback: F) -> Self {
        Self {
            accumulated: A::default(),
            callback: Some(callback),
        }
    }
}

impl<T, A, F> ChunkedSink<T> for CallbackSink<A, F>
where
    T: ?Sized,
    A: ChunkedSink<T> + Default,
    F: FnOnce(A),
{
    fn add(&mut self, chunk: &T) -> Result<(), CodecError> {
        if self.callback.is_none() {
            return Err(CodecError::Protocol("add called on a closed sink"));
        }
        self.accumulated.add(chunk)
    }

    fn close(&mut self) -> Result<(), CodecError> {
        if let Some(callback) = self.callback.take() {
            self.accumulated.close()?;
            callback(mem::take(&mut self.accumulated));
        }
        Ok(())
    }
}

/// Byte sink helpers.
pub trait ByteSinkExt: ChunkedSink<[u8]> {
    /// Adds `chunk[start..end]` and closes the sink if `is_last`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ChunkedSink::add`] and
    /// [`ChunkedSink::close`].
    ///
    /// # Panics
    ///
    /// Panics if `start..end` is not a valid range of `chunk`.
    fn add_slice(
        &mut self,
        chunk: &[u8],
        start: usize,
        end: usize,
        is_last: bool,
    ) -> Result<(), CodecError> {
        if start < end {
            self.add(&chunk[start..end])?;
        }
        if is_last {
            self.close()?;
        }
        Ok(())
    }

    /// Turns this byte sink into a string sink that UTF-8 encodes every
    /// added string into it.
    fn as_string_sink<'a>(self) -> Utf8EncoderSink<'a>
    where
        Self: Sized + 'a,
    {
        Utf8EncoderSink::new(Box::new(self))
    }
}

impl<S: ChunkedSink<[u8]> + ?Sized> ByteSinkExt for S {}

/// String sink helpers.
pub trait StringSinkExt: ChunkedSink<str> {
    /// Adds `chunk[start..end]` and closes the sink if `is_last`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ChunkedSink::add`] and
    /// [`ChunkedSink::close`].
    ///
    /// # Panics
    ///
    /// Panics if `start..end` is not a valid range of `chunk` or does not lie
    /// on character boundaries.
    fn add_slice(
        &mut self,
        chunk: &str,
        start: usize,
        end: usize,
        is_last: bool,
    ) -> Result<(), CodecError> {
        if start < end {
            self.add(&chunk[start..end])?;
        }
        if is_last {
            self.close()?;
        }
        Ok(())
    }

    /// Turns this string sink into a byte sink that UTF-8 decodes the added
    /// bytes into it.
    fn as_utf8_sink<'a>(self, allow_malformed: bool) -> Utf8DecoderSink<'a>
    where
        Self: Sized + 'a,
    {
        Utf8DecoderSink::new(Box::new(self), Utf8DecoderOptions { allow_malformed })
    }
}

impl<S: ChunkedSink<str> + ?Sized> StringSinkExt for S {}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::*;

    #[test]
    fn add_slice_forwards_range_and_closes() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let out = Rc::clone(&lines);
        let mut sink =
            CallbackSink::<Vec<String>, _>::new(move |got: Vec<String>| out.borrow_mut().extend(got));
        sink.add_slice("hello world", 6, 11, false).unwrap();
        assert!(lines.borrow().is_empty());
        sink.add_slice("ignored", 3, 3, true).unwrap();
        assert_eq!(*lines.borrow(), ["world"]);
    }

    #[test]
    fn callback_sink_rejects_add_after_close() {
        let mut sink = CallbackSink::<String, _>::new(|_: String| {});
        ChunkedSink::<str>::close(&mut sink).unwrap();
        ChunkedSink::<str>::close(&mut sink).unwrap();
        assert!(matches!(sink.add("x"), Err(CodecError::Protocol(_))));
    }

    #[test]
    fn string_sink_as_utf8_sink_decodes_split_sequences() {
        let mut text = String::new();
        {
            let mut bytes = (&mut text).as_utf8_sink(false);
            bytes.add(&[0xF0, 0x9F][..]).unwrap();
            bytes.add(&[0x98, 0x80, b'!'][..]).unwrap();
            bytes.close().unwrap();
        }
        assert_eq!(text, "😀!");
    }

    #[test]
    fn byte_sink_as_string_sink_encodes() {
        let mut bytes: Vec<u8> = Vec::new();
        {
            let mut text = (&mut bytes).as_string_sink();
            text.add("é").unwrap();
            text.add_slice("xyz", 1, 2, true).unwrap();
        }
        assert_eq!(bytes, [0xC3, 0xA9, b'y']);
    }
}
