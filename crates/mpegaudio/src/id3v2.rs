//! ID3v2.3/2.4 tag header and frame parsing.

use std::collections::BTreeMap;

/// A parsed ID3v2 tag: header-declared size plus the text frames that were
/// successfully decoded, keyed by their 4-character frame ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Id3v2Tag {
    /// Major version (3 or 4).
    pub major_version: u8,
    /// Total tag size in bytes, header excluded (synchsafe-decoded).
    pub tag_size: u32,
    /// Decoded text-frame values, multi-value frames joined with `" / "`.
    pub text_frames: BTreeMap<String, String>,
    /// Whether an `APIC` (attached picture) frame was present.
    pub has_cover_art: bool,
}

const TEXT_FRAME_IDS: &[&str] = &[
    "TIT2", "TALB", "TPE1", "TPE2", "TENC", "TRCK", "TYER", "TDRC", "TCON", "TPUB", "TPOS",
    "TDAT", "TSSE",
];

/// Parses an ID3v2 tag starting at the beginning of `data` (the `ID3`
/// identifier included). Returns `None` if the identifier or version byte
/// don't match a supported tag.
pub fn parse(data: &[u8]) -> Option<Id3v2Tag> {
    if data.len() < 10 || &data[0..3] != b"ID3" {
        return None;
    }

    let major_version = data[3];
    if !(2..=4).contains(&major_version) {
        return None;
    }
    let flags = data[5];
    let tag_size = decode_synchsafe(&data[6..10])?;

    let mut offset = 10usize;
    // An extended header, when present, is itself synchsafe-sized in v2.4
    // and a plain 32-bit size in v2.3; skip it either way using its own
    // declared length.
    if flags & 0x40 != 0 {
        let ext_size = if major_version >= 4 {
            decode_synchsafe(data.get(offset..offset + 4)?)?
        } else {
            u32::from_be_bytes(data.get(offset..offset + 4)?.try_into().ok()?)
        };
        offset += 4 + ext_size as usize;
    }

    let body_end = (10 + tag_size as usize).min(data.len());
    let mut text_frames: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut has_cover_art = false;

    while offset + 10 <= body_end {
        let frame_id_bytes = &data[offset..offset + 4];
        if frame_id_bytes == [0, 0, 0, 0] {
            break; // padding
        }
        let frame_id = match std::str::from_utf8(frame_id_bytes) {
            Ok(id) => id.to_string(),
            Err(_) => break,
        };

        let frame_size = if major_version >= 4 {
            decode_synchsafe(&data[offset + 4..offset + 8])?
        } else {
            u32::from_be_bytes(data[offset + 4..offset + 8].try_into().ok()?)
        } as usize;
        // byte 8..10 is frame flags, not interpreted here.
        let frame_body_start = offset + 10;
        let frame_body_end = (frame_body_start + frame_size).min(data.len());
        if frame_body_start > data.len() {
            break;
        }
        let frame_body = &data[frame_body_start..frame_body_end];

        if frame_id == "APIC" {
            has_cover_art = true;
        } else if TEXT_FRAME_IDS.contains(&frame_id.as_str()) {
            if let Some(values) = decode_text_frame(frame_body) {
                text_frames.entry(frame_id).or_default().extend(values);
            }
        }

        offset = frame_body_end;
        if frame_size == 0 {
            break; // avoid spinning on a malformed zero-size frame
        }
    }

    let text_frames = text_frames
        .into_iter()
        .map(|(id, values)| (id, values.join(" / ")))
        .collect();

    Some(Id3v2Tag {
        major_version,
        tag_size,
        text_frames,
        has_cover_art,
    })
}

fn decode_synchsafe(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < 4 {
        return None;
    }
    Some(
        ((bytes[0] as u32) << 21)
            | ((bytes[1] as u32) << 14)
            | ((bytes[2] as u32) << 7)
            | (bytes[3] as u32),
    )
}

/// Decodes a text-information frame body: one encoding byte followed by
/// one or more NUL-separated strings.
fn decode_text_frame(body: &[u8]) -> Option<Vec<String>> {
    let (&encoding_byte, rest) = body.split_first()?;
    let text = decode_encoded_string(encoding_byte, rest)?;
    let values: Vec<String> = text
        .split('\0')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn decode_encoded_string(encoding_byte: u8, bytes: &[u8]) -> Option<String> {
    match encoding_byte {
        0 => Some(
            bytes
                .iter()
                .map(|&b| b as char)
                .collect::<String>(),
        ),
        1 => decode_utf16(bytes, None),
        2 => decode_utf16(bytes, Some(false)),
        3 => std::str::from_utf8(bytes).ok().map(str::to_string),
        _ => None,
    }
}

/// Decodes UTF-16 text. `big_endian` is `None` when a byte-order mark is
/// expected to prefix the text (encoding 1), `Some(false)` when the stream
/// is always big-endian with no BOM (encoding 2).
fn decode_utf16(bytes: &[u8], big_endian: Option<bool>) -> Option<String> {
    let (is_be, bytes) = match big_endian {
        Some(be) => (be, bytes),
        None => {
            if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
                (false, &bytes[2..])
            } else if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                (true, &bytes[2..])
            } else {
                (true, bytes)
            }
        }
    };

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| {
            if is_be {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_text_frame(id: &[u8; 4], text: &str) -> Vec<u8> {
        let mut body = vec![3u8]; // UTF-8
        body.extend_from_slice(text.as_bytes());
        let mut frame = Vec::new();
        frame.extend_from_slice(id);
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&[0, 0]); // flags
        frame.extend_from_slice(&body);
        frame
    }

    fn build_tag(frames: &[Vec<u8>], major_version: u8) -> Vec<u8> {
        let body: Vec<u8> = frames.iter().flatten().copied().collect();
        let mut tag = Vec::new();
        tag.extend_from_slice(b"ID3");
        tag.push(major_version);
        tag.push(0); // revision
        tag.push(0); // flags
        let size = body.len() as u32;
        tag.push(((size >> 21) & 0x7F) as u8);
        tag.push(((size >> 14) & 0x7F) as u8);
        tag.push(((size >> 7) & 0x7F) as u8);
        tag.push((size & 0x7F) as u8);
        tag.extend_from_slice(&body);
        tag
    }

    #[test]
    fn parses_title_and_artist() {
        let frames = vec![
            build_text_frame(b"TIT2", "Song Title"),
            build_text_frame(b"TPE1", "Artist Name"),
        ];
        let tag_bytes = build_tag(&frames, 4);
        let tag = parse(&tag_bytes).unwrap();
        assert_eq!(tag.major_version, 4);
        assert_eq!(tag.text_frames.get("TIT2").unwrap(), "Song Title");
        assert_eq!(tag.text_frames.get("TPE1").unwrap(), "Artist Name");
        assert!(!tag.has_cover_art);
    }

    #[test]
    fn detects_apic_frame() {
        let mut apic_frame = Vec::new();
        apic_frame.extend_from_slice(b"APIC");
        apic_frame.extend_from_slice(&4u32.to_be_bytes());
        apic_frame.extend_from_slice(&[0, 0]);
        apic_frame.extend_from_slice(&[0, 0, 0, 0]);

        let tag_bytes = build_tag(&[apic_frame], 3);
        let tag = parse(&tag_bytes).unwrap();
        assert!(tag.has_cover_art);
    }

    #[test]
    fn rejects_missing_identifier() {
        assert!(parse(b"XXX\x04\x00\x00\x00\x00\x00\x00").is_none());
    }

    #[test]
    fn joins_multiple_values_with_separator() {
        let mut body = vec![3u8];
        body.extend_from_slice(b"Genre One\0Genre Two");
        let mut frame = Vec::new();
        frame.extend_from_slice(b"TCON");
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(&body);

        let tag_bytes = build_tag(&[frame], 4);
        let tag = parse(&tag_bytes).unwrap();
        assert_eq!(tag.text_frames.get("TCON").unwrap(), "Genre One / Genre Two");
    }
}
