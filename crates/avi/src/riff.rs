//! Generic RIFF chunk header parsing.
//!
//! Unlike the ISO-BMFF boxes this sibling workspace's `mp4` crate walks,
//! RIFF chunk sizes are always a plain 32-bit little-endian byte count (no
//! 64-bit `largesize` escape, no "extends to end of buffer" zero-size
//! case), and a chunk with an odd size is followed by one pad byte to keep
//! the next chunk word-aligned.

use crate::error::{AviError, Result};

/// One chunk's header plus a view of its body within the parent buffer.
#[derive(Debug, Clone, Copy)]
pub struct ChunkView<'a> {
    /// The four-character chunk ID, e.g. `b"strh"`.
    pub id: [u8; 4],
    /// Offset of this chunk's header within the buffer it was read from.
    pub offset: usize,
    /// The chunk's payload, excluding its own id/size header and any
    /// trailing pad byte.
    pub body: &'a [u8],
}

impl<'a> ChunkView<'a> {
    /// Returns `true` if this chunk's id matches `tag` (e.g. `b"strh"`).
    pub fn is(&self, tag: &[u8; 4]) -> bool {
        &self.id == tag
    }
}

/// Reads one chunk header starting at `data[offset]`, returning the chunk
/// view and the offset immediately following it (body plus any pad byte).
/// Returns `Ok(None)` once `offset` lands exactly on the end of `data` — a
/// clean end of the container, not truncation.
pub fn read_chunk(data: &[u8], offset: usize) -> Result<Option<(ChunkView<'_>, usize)>> {
    if offset == data.len() {
        return Ok(None);
    }
    if offset + 8 > data.len() {
        return Err(AviError::TruncatedChunk(offset));
    }

    let id: [u8; 4] = data[offset..offset + 4].try_into().unwrap();
    let size = u32::from_le_bytes(data[offset + 4..offset + 8].try_into().unwrap());

    let body_start = offset + 8;
    let body_end = body_start.saturating_add(size as usize);
    if body_end > data.len() {
        return Err(AviError::ChunkTooLarge { offset, size, available: data.len() - body_start });
    }

    let padded_end = body_end + (size as usize % 2);
    let next = padded_end.min(data.len());

    Ok(Some((ChunkView { id, offset, body: &data[body_start..body_end] }, next)))
}

/// Iterates sibling chunks within `data`. Stops (without erroring further)
/// at the first truncated or malformed chunk.
pub fn iter_chunks(data: &[u8]) -> ChunkIter<'_> {
    ChunkIter { data, offset: 0, done: false }
}

/// Iterator over sibling chunks produced by [`iter_chunks`].
pub struct ChunkIter<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = ChunkView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_chunk(self.data, self.offset) {
            Ok(Some((view, next_offset))) => {
                self.offset = next_offset;
                Some(view)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                tracing::debug!(%err, offset = self.offset, "stopping chunk walk");
                self.done = true;
                None
            }
        }
    }
}

/// Finds the first top-level chunk of id `tag` in `data`.
pub fn find_chunk<'a>(data: &'a [u8], tag: &[u8; 4]) -> Option<ChunkView<'a>> {
    iter_chunks(data).find(|c| c.is(tag))
}

/// Reads a `LIST` chunk's 4-byte list type and returns it alongside the
/// view of the bytes following it (the list's own sub-chunks). Returns
/// `None` if `chunk` is not a `LIST` chunk or is too short to carry a list
/// type.
pub fn list_type_and_body<'a>(chunk: &ChunkView<'a>) -> Option<([u8; 4], &'a [u8])> {
    if !chunk.is(b"LIST") || chunk.body.len() < 4 {
        return None;
    }
    let list_type: [u8; 4] = chunk.body[0..4].try_into().unwrap();
    Some((list_type, &chunk.body[4..]))
}

/// Finds the first top-level `LIST` chunk whose list type is `tag`, and
/// returns its sub-chunk body.
pub fn find_list<'a>(data: &'a [u8], tag: &[u8; 4]) -> Option<&'a [u8]> {
    iter_chunks(data).find_map(|chunk| {
        let (list_type, body) = list_type_and_body(&chunk)?;
        (&list_type == tag).then_some(body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut data = id.to_vec();
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(body);
        if body.len() % 2 == 1 {
            data.push(0);
        }
        data
    }

    fn make_list(list_type: &[u8; 4], sub_chunks: &[u8]) -> Vec<u8> {
        let mut body = list_type.to_vec();
        body.extend_from_slice(sub_chunks);
        make_chunk(b"LIST", &body)
    }

    #[test]
    fn reads_a_plain_chunk() {
        let data = make_chunk(b"strh", &[1, 2, 3]);
        let (view, next) = read_chunk(&data, 0).unwrap().unwrap();
        assert_eq!(&view.id, b"strh");
        assert_eq!(view.body, &[1, 2, 3]);
        assert_eq!(next, data.len());
    }

    #[test]
    fn odd_sized_body_is_padded_to_word_alignment() {
        let data = make_chunk(b"strn", &[1, 2, 3]);
        assert_eq!(data.len(), 8 + 3 + 1);
        let (_, next) = read_chunk(&data, 0).unwrap().unwrap();
        assert_eq!(next, data.len());
    }

    #[test]
    fn iterates_siblings_across_pad_bytes() {
        let mut data = make_chunk(b"strh", &[1, 2, 3]);
        data.extend_from_slice(&make_chunk(b"strf", &[9, 9]));
        let ids: Vec<_> = iter_chunks(&data).map(|c| c.id).collect();
        assert_eq!(ids, vec![*b"strh", *b"strf"]);
    }

    #[test]
    fn stops_at_chunk_declaring_more_than_available() {
        let mut data = make_chunk(b"strh", &[1, 2, 3]);
        data.extend_from_slice(b"strf");
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[0; 4]);
        let ids: Vec<_> = iter_chunks(&data).map(|c| c.id).collect();
        assert_eq!(ids, vec![*b"strh"]);
    }

    #[test]
    fn finds_list_by_type() {
        let strl = make_list(b"strl", &make_chunk(b"strh", &[7]));
        let hdrl = make_list(b"hdrl", &strl);
        let body = find_list(&hdrl, b"hdrl").unwrap();
        let inner = find_list(body, b"strl").unwrap();
        let (view, _) = read_chunk(inner, 0).unwrap().unwrap();
        assert!(view.is(b"strh"));
    }
}
