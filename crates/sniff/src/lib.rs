//! Container/codec format sniffing from a small leading sample of a file.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![deny(missing_docs)]
#![deny(unsafe_code)]

/// The detected container/leaf format. Rules are evaluated in declaration
/// order of [`detect`]; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Matroska / WebM (EBML).
    Matroska,
    /// MP4 / QuickTime (`ftyp` box); `is_quicktime` distinguishes `qt `
    /// brands from ISO-family brands.
    Mp4 {
        /// Whether the `major_brand` was `qt  ` (QuickTime) rather than an
        /// ISO base media brand.
        is_quicktime: bool,
    },
    /// AVI (RIFF/AVI).
    Avi,
    /// RIFF/WAVE.
    Wave,
    /// FLAC.
    Flac,
    /// Ogg.
    Ogg,
    /// MP3 (ID3v2 tag or a valid sync frame within the sample).
    Mp3,
    /// MPEG transport stream.
    MpegTs,
    /// MPEG program stream.
    MpegPs,
    /// DVD-Video, recognized only by filename.
    DvdVideo,
    /// No rule matched.
    Unknown,
}

const TS_PACKET_LEN: usize = 188;

/// Detects the format of `data` (the leading sample of a file — at least a
/// few KiB is recommended) and `file_name` (used only for the DVD-Video
/// filename rule). Rules are evaluated in the order given by spec, first
/// match wins; returns [`Format::Unknown`] if nothing matches.
pub fn detect(data: &[u8], file_name: &str) -> Format {
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Format::Matroska;
    }

    if data.len() >= 8 && &data[4..8] == b"ftyp" {
        let major_brand = data.get(8..12).unwrap_or(&[]);
        return Format::Mp4 {
            is_quicktime: major_brand == b"qt  ",
        };
    }

    if data.len() >= 12 && &data[0..4] == b"RIFF" {
        match &data[8..12] {
            b"AVI " => return Format::Avi,
            b"WAVE" => return Format::Wave,
            _ => {}
        }
    }

    if data.starts_with(b"fLaC") {
        return Format::Flac;
    }

    if data.starts_with(b"OggS") {
        return Format::Ogg;
    }

    if data.starts_with(b"ID3") || has_mp3_sync_frame(&data[..data.len().min(4096)]) {
        return Format::Mp3;
    }

    if has_ts_sync_pattern(data) {
        return Format::MpegTs;
    }

    if data.starts_with(&[0x00, 0x00, 0x01, 0xBA]) {
        return Format::MpegPs;
    }

    if file_name
        .rsplit(['/', '\\'])
        .next()
        .is_some_and(|name| name.eq_ignore_ascii_case("VIDEO_TS.IFO"))
    {
        return Format::DvdVideo;
    }

    Format::Unknown
}

fn has_mp3_sync_frame(sample: &[u8]) -> bool {
    for offset in 0..sample.len() {
        if mpegaudio::FrameHeader::parse(&sample[offset..]).is_some() {
            return true;
        }
    }
    false
}

/// Requires sync byte `0x47` at three consecutive 188-byte offsets from the
/// start of the sample.
fn has_ts_sync_pattern(data: &[u8]) -> bool {
    if data.len() < TS_PACKET_LEN * 3 {
        return false;
    }
    (0..3).all(|i| data[i * TS_PACKET_LEN] == 0x47)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_matroska() {
        let data = [0x1A, 0x45, 0xDF, 0xA3, 0, 0, 0, 0];
        assert_eq!(detect(&data, "a.mkv"), Format::Matroska);
    }

    #[test]
    fn detects_mp4_and_quicktime_brand() {
        let mut data = vec![0, 0, 0, 0x18];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"isom");
        assert_eq!(detect(&data, "a.mp4"), Format::Mp4 { is_quicktime: false });

        let mut qt_data = vec![0, 0, 0, 0x18];
        qt_data.extend_from_slice(b"ftyp");
        qt_data.extend_from_slice(b"qt  ");
        assert_eq!(detect(&qt_data, "a.mov"), Format::Mp4 { is_quicktime: true });
    }

    #[test]
    fn detects_avi_and_wave() {
        let mut avi = b"RIFF".to_vec();
        avi.extend_from_slice(&[0, 0, 0, 0]);
        avi.extend_from_slice(b"AVI ");
        assert_eq!(detect(&avi, "a.avi"), Format::Avi);

        let mut wave = b"RIFF".to_vec();
        wave.extend_from_slice(&[0, 0, 0, 0]);
        wave.extend_from_slice(b"WAVE");
        assert_eq!(detect(&wave, "a.wav"), Format::Wave);
    }

    #[test]
    fn detects_flac_and_ogg() {
        assert_eq!(detect(b"fLaC....", "a.flac"), Format::Flac);
        assert_eq!(detect(b"OggS....", "a.ogg"), Format::Ogg);
    }

    #[test]
    fn detects_mp3_by_id3_tag() {
        let mut data = b"ID3".to_vec();
        data.extend_from_slice(&[0x04, 0x00, 0x00, 0, 0, 0, 0]);
        assert_eq!(detect(&data, "a.mp3"), Format::Mp3);
    }

    #[test]
    fn detects_mp3_by_sync_frame() {
        let data = [0xFF, 0xFB, 0x90, 0x00, 0, 0, 0, 0];
        assert_eq!(detect(&data, "a.mp3"), Format::Mp3);
    }

    #[test]
    fn detects_mpeg_ts_by_triple_sync() {
        let mut data = vec![0u8; TS_PACKET_LEN * 3];
        data[0] = 0x47;
        data[TS_PACKET_LEN] = 0x47;
        data[TS_PACKET_LEN * 2] = 0x47;
        assert_eq!(detect(&data, "a.ts"), Format::MpegTs);
    }

    #[test]
    fn rejects_ts_without_three_consecutive_sync_bytes() {
        let mut data = vec![0u8; TS_PACKET_LEN * 3];
        data[0] = 0x47;
        data[TS_PACKET_LEN] = 0x47;
        // third sync byte missing
        assert_eq!(detect(&data, "a.ts"), Format::Unknown);
    }

    #[test]
    fn detects_mpeg_ps_by_pack_start_code() {
        let data = [0x00, 0x00, 0x01, 0xBA, 0, 0, 0, 0];
        assert_eq!(detect(&data, "a.vob"), Format::MpegPs);
    }

    #[test]
    fn detects_dvd_video_by_filename_only() {
        let data = [0u8; 16];
        assert_eq!(detect(&data, "/media/VIDEO_TS.IFO"), Format::DvdVideo);
        assert_eq!(detect(&data, "video_ts.ifo"), Format::DvdVideo);
        assert_eq!(detect(&data, "/media/other.ifo"), Format::Unknown);
    }

    #[test]
    fn matroska_rule_wins_over_later_rules() {
        let mut data = vec![0x1A, 0x45, 0xDF, 0xA3];
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xBA]);
        assert_eq!(detect(&data, "a.mkv"), Format::Matroska);
    }
}
