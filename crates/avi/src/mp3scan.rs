//! MP3 codec-specific scan over a stream's concatenated `wb` payload:
//! locates the first valid frame, reads its Xing/Info tag if present, and
//! resolves the channel mode/mode-extension bits MediaInfo-style tools
//! report.
//!
//! Encoders that write a Xing/Info VBR header encode that header frame
//! itself with placeholder channel/mode-extension bits rather than the
//! stream's real encoding choice, so when a tag is present this module
//! reports the *second* frame's bits instead, falling back to the first
//! frame when no second frame is found in the scan window.

use mpegaudio::{xing, ChannelMode, FrameHeader};

/// Result of scanning a stream's leading MP3 payload.
#[derive(Debug, Clone)]
pub struct Mp3ScanResult {
    /// Channel mode to report (see module docs for which frame this comes
    /// from).
    pub channel_mode: ChannelMode,
    /// Mode-extension bits, meaningful only when `channel_mode` is
    /// `JointStereo`.
    pub mode_extension: u8,
    /// Encoder library/version string from an embedded `LAME` tag.
    pub lame_encoder: Option<String>,
    /// Duration/bitrate-mode summary derived from the first frame and any
    /// Xing/Info tag.
    pub summary: mpegaudio::StreamSummary,
}

fn find_first_frame(data: &[u8]) -> Option<(usize, FrameHeader)> {
    for offset in 0..data.len() {
        if let Some(header) = FrameHeader::parse(&data[offset..]) {
            return Some((offset, header));
        }
    }
    None
}

/// Scans `payload` (a stream's concatenated audio chunk bytes, already
/// capped at the caller's scan window) for MP3 frames, and `stream_bytes`
/// (the stream's total byte count across the whole file, from `idx1` or a
/// full `movi` traversal) for the duration/bitrate summary.
pub fn scan(payload: &[u8], stream_bytes: u64) -> Option<Mp3ScanResult> {
    let (first_offset, first) = find_first_frame(payload)?;
    let first_body = payload.get(first_offset + 4..)?;
    let tag = xing::parse(&first, first_body);

    let (channel_mode, mode_extension) = match &tag {
        Some(_) => {
            let second_offset = first_offset + first.frame_size as usize;
            match payload.get(second_offset..).and_then(FrameHeader::parse) {
                Some(second) => (second.channel_mode, second.mode_extension),
                None => (first.channel_mode, first.mode_extension),
            }
        }
        None => (first.channel_mode, first.mode_extension),
    };

    let lame_encoder = tag.as_ref().and_then(|t| t.lame_encoder.clone());
    let summary = mpegaudio::summarize(&first, tag.as_ref(), stream_bytes);

    Some(Mp3ScanResult { channel_mode, mode_extension, lame_encoder, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(channel_mode_bits: u8, mode_extension_bits: u8) -> Vec<u8> {
        // MPEG1 Layer III, 128 kbps, 44100 Hz, no CRC, no padding.
        let mut header = vec![0xFF, 0xFB, 0x90, 0x00];
        header[3] = (channel_mode_bits << 6) | (mode_extension_bits << 4);
        let frame_size = 144 * 128_000 / 44_100;
        let mut frame = header;
        frame.resize(frame_size as usize, 0);
        frame
    }

    #[test]
    fn falls_back_to_first_frame_without_a_tag() {
        let data = frame_bytes(0b01, 0b10); // joint stereo, mode ext 2
        let result = scan(&data, data.len() as u64).unwrap();
        assert_eq!(result.channel_mode, ChannelMode::JointStereo);
        assert_eq!(result.mode_extension, 0b10);
        assert_eq!(result.summary.bitrate_kbps, 128);
    }

    #[test]
    fn reads_second_frame_bits_when_a_xing_tag_is_present() {
        let mut first = frame_bytes(0b00, 0b00); // stereo, placeholder bits
        // Side info for V1 stereo is 32 bytes; write "Xing" immediately after
        // the 4-byte header + side info.
        let tag_offset = 4 + 32;
        first[tag_offset..tag_offset + 4].copy_from_slice(b"Xing");
        first[tag_offset + 4..tag_offset + 8].copy_from_slice(&0u32.to_be_bytes());

        let mut second = frame_bytes(0b01, 0b11); // joint stereo, mode ext 3
        let mut data = first;
        data.append(&mut second);

        let result = scan(&data, data.len() as u64).unwrap();
        assert_eq!(result.channel_mode, ChannelMode::JointStereo);
        assert_eq!(result.mode_extension, 0b11);
    }

    #[test]
    fn empty_payload_yields_none() {
        assert!(scan(&[], 0).is_none());
    }
}
