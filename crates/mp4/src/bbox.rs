//! Generic ISO base media box ("atom") header parsing.
//!
//! Boxes are walked directly over borrowed byte slices rather than through
//! a `Read + Seek`: callers hand this crate one in-memory buffer (the
//! sampled head of the file, or the whole thing for small inputs) and get
//! back views into it.

use crate::error::{Mp4Error, Result};

/// One box's header plus a view of its body within the parent buffer.
#[derive(Debug, Clone, Copy)]
pub struct BoxView<'a> {
    /// The four-character box type, e.g. `b"trak"`.
    pub box_type: [u8; 4],
    /// Offset of this box's header within the buffer it was read from.
    pub offset: usize,
    /// The box's payload, excluding its own size/type header.
    pub body: &'a [u8],
}

impl<'a> BoxView<'a> {
    /// Returns `true` if this box's type matches `tag` (e.g. `b"tkhd"`).
    pub fn is(&self, tag: &[u8; 4]) -> bool {
        &self.box_type == tag
    }
}

/// Reads one box header starting at `data[offset]`, returning the box view
/// and the offset immediately following it. Returns `Ok(None)` once `offset`
/// lands exactly on the end of `data` — a clean end of the container, not
/// truncation.
pub fn read_box(data: &[u8], offset: usize) -> Result<Option<(BoxView<'_>, usize)>> {
    if offset == data.len() {
        return Ok(None);
    }
    if offset + 8 > data.len() {
        return Err(Mp4Error::TruncatedBox(offset));
    }

    let size32 = u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap()) as u64;
    let box_type: [u8; 4] = data[offset + 4..offset + 8].try_into().unwrap();

    let (header_len, declared_size) = if size32 == 1 {
        if offset + 16 > data.len() {
            return Err(Mp4Error::TruncatedBox(offset));
        }
        let largesize = u64::from_be_bytes(data[offset + 8..offset + 16].try_into().unwrap());
        (16usize, largesize)
    } else if size32 == 0 {
        (8usize, (data.len() - offset) as u64)
    } else {
        (8usize, size32)
    };

    if declared_size < header_len as u64 {
        return Err(Mp4Error::BoxTooSmall { offset, size: declared_size });
    }

    let body_start = offset + header_len;
    let declared_end = offset as u64 + declared_size;
    let body_end = declared_end.min(data.len() as u64) as usize;
    if body_start > body_end {
        return Err(Mp4Error::TruncatedBox(offset));
    }

    let view = BoxView {
        box_type,
        offset,
        body: &data[body_start..body_end],
    };
    Ok(Some((view, declared_end as usize)))
}

/// Iterates sibling boxes within `data`. Stops (without erroring further)
/// at the first truncated or malformed box, per the "a truncated box ends
/// the walk" failure mode.
pub fn iter_boxes(data: &[u8]) -> BoxIter<'_> {
    BoxIter { data, offset: 0, done: false }
}

/// Iterator over sibling boxes produced by [`iter_boxes`].
pub struct BoxIter<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Iterator for BoxIter<'a> {
    type Item = BoxView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_box(self.data, self.offset) {
            Ok(Some((view, next_offset))) => {
                self.offset = next_offset;
                Some(view)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                tracing::debug!(%err, offset = self.offset, "stopping box walk");
                self.done = true;
                None
            }
        }
    }
}

/// Finds the first top-level box of type `tag` in `data`.
pub fn find_box<'a>(data: &'a [u8], tag: &[u8; 4]) -> Option<BoxView<'a>> {
    iter_boxes(data).find(|b| b.is(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_box(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut data = ((8 + body.len()) as u32).to_be_bytes().to_vec();
        data.extend_from_slice(tag);
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn reads_a_plain_box() {
        let data = make_box(b"free", &[1, 2, 3]);
        let (view, next) = read_box(&data, 0).unwrap().unwrap();
        assert_eq!(&view.box_type, b"free");
        assert_eq!(view.body, &[1, 2, 3]);
        assert_eq!(next, data.len());
    }

    #[test]
    fn size_zero_extends_to_end_of_buffer() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&[9, 9, 9]);
        let (view, next) = read_box(&data, 0).unwrap().unwrap();
        assert_eq!(view.body, &[9, 9, 9]);
        assert_eq!(next, data.len());
    }

    #[test]
    fn size_one_reads_64_bit_largesize() {
        let mut data = 1u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&(24u64).to_be_bytes());
        data.extend_from_slice(&[0; 8]);
        let (view, next) = read_box(&data, 0).unwrap().unwrap();
        assert_eq!(view.body.len(), 8);
        assert_eq!(next, 24);
    }

    #[test]
    fn iterates_siblings_and_stops_cleanly_at_end() {
        let mut data = make_box(b"ftyp", &[1]);
        data.extend_from_slice(&make_box(b"free", &[]));
        let types: Vec<_> = iter_boxes(&data).map(|b| b.box_type).collect();
        assert_eq!(types, vec![*b"ftyp", *b"free"]);
    }

    #[test]
    fn stops_at_truncated_trailing_box() {
        let mut data = make_box(b"ftyp", &[1]);
        data.extend_from_slice(&[0, 0, 0, 20]); // declares 20 bytes, only 4 present
        data.extend_from_slice(b"tr");
        let types: Vec<_> = iter_boxes(&data).map(|b| b.box_type).collect();
        assert_eq!(types, vec![*b"ftyp"]);
    }
}
