use alloc::{boxed::Box, string::String, vec::Vec};

use quickcheck::{Arbitrary, Gen, QuickCheck};

use crate::{ChunkedSink, Converter, LineSplitter, chunk_utils::split_by_sizes};

/// Text drawn from a small alphabet so that line terminators are common.
#[derive(Debug, Clone)]
struct LineText(String);

impl Arbitrary for LineText {
    fn arbitrary(g: &mut Gen) -> Self {
        let alphabet = ['a', 'é', '\r', '\n', ' '];
        let len = usize::arbitrary(g) % 32;
        Self((0..len).map(|_| *g.choose(&alphabet).unwrap_or(&'a')).collect())
    }
}

/// Property: splitting lines in chunks gives the same lines as splitting the
/// whole text, wherever the chunk boundaries fall.
#[test]
fn line_splitter_chunk_invariance_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: LineText, sizes: Vec<usize>) -> bool {
        let Ok(expected) = LineSplitter.convert(&text.0) else {
            return false;
        };
        let chars: Vec<char> = text.0.chars().collect();
        let mut lines: Vec<String> = Vec::new();
        {
            let Ok(mut sink) = LineSplitter.start_chunked_conversion(Box::new(&mut lines)) else {
                return false;
            };
            for chunk in split_by_sizes(&chars, &sizes) {
                let chunk: String = chunk.iter().collect();
                if sink.add(&chunk).is_err() {
                    return false;
                }
            }
            if sink.close().is_err() {
                return false;
            }
        }
        lines == expected
    }

    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(LineText, Vec<usize>) -> bool);
}
