#![no_main]

use arbitrary::Arbitrary;
use chunkwise::{
    BoxSink, ChunkedSink, Codec, CodecError, Converter, JSON, LineSplitter, UTF8,
    Utf8Decoder, Utf8DecoderOptions, chunk_utils::split_by_sizes,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    lossy: bool,
    sizes: Vec<u8>,
    bytes: &'a [u8],
}

fn feed<'a>(mut sink: BoxSink<'a, [u8]>, chunks: &[&[u8]]) -> Result<(), CodecError> {
    for chunk in chunks {
        sink.add(chunk)?;
    }
    sink.close()
}

fuzz_target!(|input: Input<'_>| {
    let sizes: Vec<usize> = input.sizes.iter().map(|&s| usize::from(s)).collect();
    let chunks = split_by_sizes(input.bytes, &sizes);
    let decoder = Utf8Decoder::with_options(Utf8DecoderOptions {
        allow_malformed: input.lossy,
    });

    // Chunked decoding agrees with one-shot decoding, including on errors.
    let one_shot = decoder.convert(input.bytes);
    let mut chunked = String::new();
    let streamed = decoder
        .start_chunked_conversion(Box::new(&mut chunked))
        .and_then(|sink| feed(sink, &chunks));
    match (&one_shot, streamed) {
        (Ok(text), Ok(())) => assert_eq!(text, &chunked),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!("one-shot {a:?} but chunked {b:?}"),
    }
    let Ok(text) = one_shot else {
        return;
    };

    if !input.lossy {
        assert_eq!(UTF8.encode(&text).expect("text encodes"), input.bytes);
    }

    // Line splitting is independent of chunking as well.
    let mut lines: Vec<String> = Vec::new();
    decoder
        .fuse(LineSplitter)
        .start_chunked_conversion(Box::new(&mut lines))
        .and_then(|sink| feed(sink, &chunks))
        .expect("lines split");
    assert_eq!(lines, LineSplitter.convert(&text).expect("lines split"));

    // Whatever parses as JSON survives an encode/decode cycle.
    if let Ok(value) = JSON.decode(&text) {
        let encoded = JSON.encode(&value).expect("decoded values encode");
        let decoded = JSON.decode(&encoded).expect("encoded JSON decodes");
        assert_eq!(decoded, value);
    }
});
