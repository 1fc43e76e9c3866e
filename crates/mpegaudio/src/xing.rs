//! Xing/Info VBR header and the nested LAME encoder sub-tag.

use crate::frame::FrameHeader;

/// Flag bits in the Xing/Info header indicating which optional fields
/// follow.
mod flags {
    pub const FRAMES: u32 = 0x0001;
    pub const BYTES: u32 = 0x0002;
    pub const TOC: u32 = 0x0004;
    pub const QUALITY: u32 = 0x0008;
}

/// A parsed Xing/Info tag.
///
/// `Xing` marks a true VBR stream; `Info` is written by encoders that
/// produce CBR but still want the frame/byte counts advertised up front.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct XingTag {
    /// Whether the tag identifier was `Xing` (VBR) rather than `Info` (CBR).
    pub is_vbr: bool,
    /// Total number of frames in the stream, if present.
    pub frame_count: Option<u32>,
    /// Total number of bytes in the stream, if present.
    pub byte_count: Option<u32>,
    /// Encoder delay and padding in samples, from the LAME sub-tag.
    pub lame_encoder: Option<String>,
}

/// Scans for and parses a Xing/Info tag immediately after the side
/// information of the first frame. `frame` is the first frame's header;
/// `frame_body` is the frame's payload, header and side info already
/// stripped.
pub fn parse(frame: &FrameHeader, frame_body: &[u8]) -> Option<XingTag> {
    let offset = frame.side_info_size();
    let data = frame_body.get(offset..)?;

    if data.len() < 8 {
        return None;
    }

    let is_vbr = match &data[0..4] {
        b"Xing" => true,
        b"Info" => false,
        _ => return None,
    };

    let tag_flags = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    let mut cursor = 8usize;

    let frame_count = if tag_flags & flags::FRAMES != 0 {
        let value = read_u32(data, cursor)?;
        cursor += 4;
        Some(value)
    } else {
        None
    };

    let byte_count = if tag_flags & flags::BYTES != 0 {
        let value = read_u32(data, cursor)?;
        cursor += 4;
        Some(value)
    } else {
        None
    };

    if tag_flags & flags::TOC != 0 {
        cursor += 100;
    }

    if tag_flags & flags::QUALITY != 0 {
        cursor += 4;
    }

    let lame_encoder = data
        .get(cursor..cursor + 9)
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .map(|s| s.trim_end().to_string())
        .filter(|s| !s.is_empty());

    Some(XingTag {
        is_vbr,
        frame_count,
        byte_count,
        lame_encoder,
    })
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
