#![allow(missing_docs)]

mod common;

use std::{cell::RefCell, rc::Rc};

use chunkwise::{
    ASCII, BoxSink, ByteSinkExt, CallbackSink, ChunkedSink, Codec, CodecError, Converter,
    HtmlEscape, HtmlEscapeMode, JSON, LATIN1, LineSplitter, StringSinkExt, UTF8, Utf8Decoder,
    Value, chunk_utils::produce_chunks,
};

use crate::common::{ORIGINAL, STREAM};

fn drive<'a>(sink: &mut BoxSink<'a, [u8]>, chunks: &[&[u8]]) -> Result<(), CodecError> {
    for chunk in chunks {
        sink.add(chunk)?;
    }
    sink.close()
}

#[test]
fn bytes_to_json_value_through_fused_decoders() {
    let decoder = Utf8Decoder::new().fuse(JSON.decoder());
    let mut values: Vec<Value> = Vec::new();
    {
        let mut sink = decoder
            .start_chunked_conversion(Box::new(&mut values))
            .unwrap();
        drive(&mut sink, &STREAM).unwrap();
    }
    assert_eq!(values.len(), 1);
    assert_eq!(values[0], JSON.decode(ORIGINAL).unwrap());

    let request = values[0].as_object().unwrap().get("request").unwrap();
    let filename = request.as_object().unwrap().get("filename").unwrap();
    assert_eq!(filename.as_str(), Some("café.rs"));
}

#[test]
fn bytes_to_lines_keeps_crlf_split_across_chunks() {
    let mut lines: Vec<String> = Vec::new();
    {
        let mut sink = Utf8Decoder::new()
            .fuse(LineSplitter)
            .start_chunked_conversion(Box::new(&mut lines))
            .unwrap();
        drive(&mut sink, &STREAM).unwrap();
    }
    let text = String::from_utf8(STREAM.concat()).unwrap();
    let expected: Vec<&str> = LineSplitter::split(&text).collect();
    assert_eq!(lines, expected);
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[1], r#"  "moderation": {"decision": "allow", "reason": null},"#);
}

#[test]
fn json_encoder_to_bytes_matches_text_encoder_for_every_chunking() {
    let value = JSON.decode(ORIGINAL).unwrap();
    let text = JSON.encoder().with_indent("  ").convert(&value).unwrap();
    assert_eq!(text, ORIGINAL);

    let bytes = JSON.fuse_utf8(UTF8).encode(&value).unwrap();
    assert_eq!(bytes, JSON.encode(&value).unwrap().as_bytes());

    for parts in [1, 2, 7, bytes.len()] {
        let chunks = produce_chunks(&bytes, parts);
        let mut values: Vec<Value> = Vec::new();
        {
            let mut sink = JSON
                .fuse_utf8(UTF8)
                .decoder()
                .start_chunked_conversion(Box::new(&mut values))
                .unwrap();
            drive(&mut sink, &chunks).unwrap();
        }
        assert_eq!(values, [value.clone()], "{parts} parts");
    }
}

#[test]
fn html_escaped_lines() {
    let converter = HtmlEscape::new(HtmlEscapeMode::ELEMENT).fuse(LineSplitter);
    assert_eq!(
        converter.convert("<b>\r\nTom & Jerry</b>").unwrap(),
        ["&lt;b&gt;", "Tom &amp; Jerry&lt;/b&gt;"]
    );

    let mut escaped: Vec<String> = Vec::new();
    {
        let mut sink = converter
            .start_chunked_conversion(Box::new(&mut escaped))
            .unwrap();
        sink.add("<a href=\"x\">\r").unwrap();
        sink.add("\nTom & Jerry</a>").unwrap();
        sink.close().unwrap();
    }
    assert_eq!(escaped, [r#"&lt;a href="x"&gt;"#, "Tom &amp; Jerry&lt;/a&gt;"]);
}

#[test]
fn latin1_bytes_reencoded_as_ascii_fail_at_first_non_ascii() {
    let text = LATIN1.decode(b"na\xEFve").unwrap();
    assert_eq!(text, "naïve");
    let err = ASCII.encode(&text).unwrap_err();
    assert_eq!(
        err.to_string(),
        "character 'ï' at index 2 is not representable in ascii"
    );
}

#[test]
fn callback_sink_receives_the_decoded_document() {
    let received = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&received);
    let string_sink =
        CallbackSink::<String, _>::new(move |text: String| *slot.borrow_mut() = Some(text));
    let mut bytes = string_sink.as_utf8_sink(false);
    for chunk in STREAM {
        bytes.add_slice(chunk, 0, chunk.len(), false).unwrap();
    }
    bytes.close().unwrap();
    let text = received.borrow_mut().take().unwrap();
    assert_eq!(text.as_bytes(), STREAM.concat());
}

#[test]
fn string_sink_to_bytes_and_back() {
    let mut out: Vec<u8> = Vec::new();
    {
        let mut text = (&mut out).as_string_sink();
        text.add("h\u{e9}").unwrap();
        text.add_slice("llo wörld", 0, 3, true).unwrap();
    }
    assert_eq!(UTF8.decode(&out).unwrap(), "héllo");
}
