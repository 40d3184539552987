#![allow(missing_docs)]

use chunkwise::{
    ASCII, AsciiDecoder, ChunkedSink, Codec, CodecError, Converter, LATIN1, SubsetDecoderOptions,
    UTF8, UTF8_DECODER, Utf8Decoder, Utf8DecoderOptions, Utf8Error, Utf8ErrorKind,
};

const LOSSY: SubsetDecoderOptions = SubsetDecoderOptions {
    allow_invalid: true,
};

#[test]
fn ascii_rejects_high_bytes() {
    let err = ASCII.decode(&[b'o', b'k', 0x80][..]).unwrap_err();
    assert!(matches!(
        err,
        CodecError::InvalidByte {
            codec: "ascii",
            byte: 0x80,
            offset: 2
        }
    ));
    assert_eq!(err.to_string(), "invalid ascii byte 0x80 at offset 2");
}

#[test]
fn lossy_ascii_replaces_high_bytes() {
    let decoder = AsciiDecoder::with_options(LOSSY);
    assert_eq!(decoder.convert(&[0x80, b'a', 0xFF][..]).unwrap(), "\u{FFFD}a\u{FFFD}");
}

#[test]
fn strict_ascii_sink_forwards_the_valid_prefix() {
    let mut text = String::new();
    let err = {
        let mut sink = ASCII
            .decoder()
            .start_chunked_conversion(Box::new(&mut text))
            .unwrap();
        sink.add(&b"abc"[..]).unwrap();
        sink.add(&b"de\x80f"[..]).unwrap_err()
    };
    assert!(matches!(err, CodecError::InvalidByte { offset: 5, .. }));
    assert_eq!(text, "abcde");
}

#[test]
fn latin1_covers_every_byte() {
    let bytes: Vec<u8> = (0..=255).collect();
    let text = LATIN1.decode(&bytes).unwrap();
    assert_eq!(text.chars().count(), 256);
    assert_eq!(LATIN1.encode(&text).unwrap(), bytes);
    assert!(LATIN1.encode("€").is_err());
}

#[test]
fn utf8_round_trip_of_mixed_scripts() {
    let text = "ascii, café, Ελληνικά, 日本語, 🦀";
    let bytes = UTF8.encode(text).unwrap();
    assert_eq!(bytes, text.as_bytes());
    assert_eq!(UTF8.decode(&bytes).unwrap(), text);
}

#[test]
fn utf8_strict_and_lossy_disagree_on_truncated_input() {
    let truncated = &"€".as_bytes()[..2];
    let err = UTF8_DECODER.convert(truncated).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Utf8(Utf8Error {
            kind: Utf8ErrorKind::UnfinishedSequence,
            ..
        })
    ));

    let lossy = Utf8Decoder::with_options(Utf8DecoderOptions {
        allow_malformed: true,
    });
    assert_eq!(lossy.convert(truncated).unwrap(), "\u{FFFD}");
}

#[test]
fn utf8_chunked_decode_reports_stream_offsets() {
    let mut text = String::new();
    let err = {
        let mut sink = UTF8_DECODER
            .start_chunked_conversion(Box::new(&mut text))
            .unwrap();
        sink.add(&b"ab"[..]).unwrap();
        sink.add(&b"c\xFF"[..]).unwrap_err()
    };
    let CodecError::Utf8(err) = err else {
        panic!("expected a utf-8 error, got {err:?}");
    };
    assert_eq!(err.offset, 3);
    assert_eq!(err.kind, Utf8ErrorKind::InvalidByte(0xFF));
    // Nothing from the failing chunk reaches the sink.
    assert_eq!(text, "ab");
}

#[test]
fn code_unit_encoder_joins_surrogates_across_chunks() {
    let mut bytes: Vec<u8> = Vec::new();
    {
        let mut sink = UTF8
            .encoder()
            .code_units()
            .start_chunked_conversion(Box::new(&mut bytes))
            .unwrap();
        sink.add(&[0x0061, 0xD83E][..]).unwrap();
        sink.add(&[0xDD80][..]).unwrap();
        ChunkedSink::<[u16]>::close(&mut sink).unwrap();
    }
    assert_eq!(bytes, "a🦀".as_bytes());
}
