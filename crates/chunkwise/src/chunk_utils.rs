//! Helpers for feeding input to a chunked conversion in pieces.
use alloc::vec::Vec;

/// Split `payload` into `parts` chunks of approximately equal size. The last
/// chunk may be shorter, and fewer chunks are returned if `payload` is
/// shorter than `parts`.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks<T>(payload: &[T], parts: usize) -> Vec<&[T]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Like [`produce_chunks`], but for text: chunk ends are moved forward to
/// the next character boundary.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_str_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = (start + chunk_size).min(len);
        while end < len && !payload.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks
}

/// Split `payload` into non-empty chunks whose sizes are derived from
/// `sizes`, e.g. as generated by quickcheck. Each size is reduced modulo the
/// remaining length; whatever is left at the end forms a final chunk.
#[must_use]
pub fn split_by_sizes<'p, T>(payload: &'p [T], sizes: &[usize]) -> Vec<&'p [T]> {
    let mut chunks = Vec::with_capacity(sizes.len() + 1);
    let mut rest = payload;
    for size in sizes {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(1 + size % rest.len());
        chunks.push(chunk);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produce_chunks_example() {
        let payload = b"[\"foo\",\"bar\"]";
        let chunks = produce_chunks(&payload[..], 5);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], b"[\"f");
        assert_eq!(chunks.concat(), payload);
    }

    #[test]
    fn produce_str_chunks_respects_char_boundaries() {
        let payload = "[\"f😊o\",\"b🚀r\"]";
        let chunks = produce_str_chunks(payload, 5);
        let mut idx = 0;
        for chunk in &chunks {
            idx += chunk.len();
            assert!(payload.is_char_boundary(idx));
        }
        assert_eq!(chunks.concat(), payload);
    }

    #[test]
    fn split_by_sizes_covers_the_payload() {
        let payload = [1, 2, 3, 4, 5, 6, 7];
        let chunks = split_by_sizes(&payload, &[1, 3, 0]);
        assert_eq!(chunks, [&[1, 2][..], &[3, 4, 5, 6], &[7]]);
        assert!(split_by_sizes::<u8>(&[], &[3]).is_empty());
    }
}
