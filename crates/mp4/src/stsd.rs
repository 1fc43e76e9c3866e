//! `stsd` (Sample Description Box) parsing: the video/audio sample entry
//! layouts and the codec-specific child boxes inside them (`avcC`, `esds`,
//! `btrt`).

use std::io;

use bytes::Bytes;
use h264::AVCDecoderConfigurationRecord;

use crate::bbox::iter_boxes;
use crate::esds::{self, DecoderConfig};
use crate::fields::{u16_at, u32_at};

/// Maps a sample entry's four-character type to a coarse codec format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// `avc1`/`avc3`.
    Avc,
    /// `hvc1`/`hev1`.
    Hevc,
    /// `mp4v`.
    Mpeg4Visual,
    /// `mp4a`.
    Aac,
    /// `ac-3`.
    Ac3,
    /// `ec-3`.
    Eac3,
    /// `alac`.
    Alac,
    /// `fLaC`.
    Flac,
    /// `Opus`.
    Opus,
    /// `tx3g`.
    Text,
    /// `wvtt`.
    WebVtt,
    /// Anything else.
    Unknown([u8; 4]),
}

impl SampleFormat {
    fn from_fourcc(fourcc: &[u8; 4]) -> Self {
        match fourcc {
            b"avc1" | b"avc3" => Self::Avc,
            b"hvc1" | b"hev1" => Self::Hevc,
            b"mp4v" => Self::Mpeg4Visual,
            b"mp4a" => Self::Aac,
            b"ac-3" => Self::Ac3,
            b"ec-3" => Self::Eac3,
            b"alac" => Self::Alac,
            b"fLaC" => Self::Flac,
            b"Opus" => Self::Opus,
            b"tx3g" => Self::Text,
            b"wvtt" => Self::WebVtt,
            other => Self::Unknown(*other),
        }
    }

    fn is_video(self) -> bool {
        matches!(self, Self::Avc | Self::Hevc | Self::Mpeg4Visual)
    }

    fn is_audio(self) -> bool {
        matches!(self, Self::Aac | Self::Ac3 | Self::Eac3 | Self::Alac | Self::Flac | Self::Opus)
    }
}

/// `btrt` (Bit Rate Box) fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSizeBitrate {
    /// Decoder buffer size, bytes.
    pub buffer_size: u32,
    /// Peak bitrate, bits per second.
    pub max_bitrate: u32,
    /// Average bitrate, bits per second.
    pub avg_bitrate: u32,
}

fn parse_btrt(body: &[u8]) -> Option<BufferSizeBitrate> {
    Some(BufferSizeBitrate {
        buffer_size: u32_at(body, 0)?,
        max_bitrate: u32_at(body, 4)?,
        avg_bitrate: u32_at(body, 8)?,
    })
}

/// A parsed sample entry. Only the first entry of `stsd` is surfaced — a
/// track is expected to carry one codec throughout, matching the uniform
/// stream record's one-codec-per-stream model.
#[derive(Debug, Clone)]
pub enum SampleEntry {
    /// A visual sample entry (`avc1`, `hvc1`, `mp4v`, ...).
    Video {
        /// Codec format.
        format: SampleFormat,
        /// Pixel width.
        width: u16,
        /// Pixel height.
        height: u16,
        /// Parsed `avcC`, for AVC tracks.
        avc_config: Option<AVCDecoderConfigurationRecord>,
        /// Parsed `btrt`, if present.
        bitrate: Option<BufferSizeBitrate>,
    },
    /// An audio sample entry (`mp4a`, `ac-3`, ...).
    Audio {
        /// Codec format.
        format: SampleFormat,
        /// Channel count.
        channels: u16,
        /// Sample rate in Hz, decoded from the 16.16 fixed-point field.
        sample_rate: f64,
        /// Parsed `esds` decoder config, for `mp4a` tracks.
        decoder_config: Option<DecoderConfig>,
        /// Raw AAC `AudioSpecificConfig`, when `esds` carried one.
        audio_specific_config: Option<aac::PartialAudioSpecificConfig>,
        /// Parsed `btrt`, if present.
        bitrate: Option<BufferSizeBitrate>,
    },
    /// A text/subtitle or otherwise-unhandled sample entry.
    Other {
        /// Codec format.
        format: SampleFormat,
    },
}

/// Parses an `stsd` box body (after the 8-byte box header) and returns its
/// first sample entry.
pub fn parse(body: &[u8]) -> Option<SampleEntry> {
    let entry_count = u32_at(body, 4)?;
    if entry_count == 0 {
        return None;
    }
    let entry = body.get(8..)?;
    let entry_size = u32_at(entry, 0)? as usize;
    let fourcc: [u8; 4] = entry.get(4..8)?.try_into().ok()?;
    let format = SampleFormat::from_fourcc(&fourcc);
    let entry_body = entry.get(..entry_size.min(entry.len()))?;

    if format.is_video() {
        // VisualSampleEntry: 8-byte common header, pre_defined/reserved(16),
        // then width/height at 32/34.
        let width = u16_at(entry_body, 32)?;
        let height = u16_at(entry_body, 34)?;
        let children = entry_body.get(86..).unwrap_or(&[]);
        let mut avc_config = None;
        let mut bitrate = None;
        for child in iter_boxes(children) {
            if child.is(b"avcC") {
                let bytes = Bytes::copy_from_slice(child.body);
                avc_config = AVCDecoderConfigurationRecord::parse(&mut io::Cursor::new(bytes)).ok();
            } else if child.is(b"btrt") {
                bitrate = parse_btrt(child.body);
            }
        }
        Some(SampleEntry::Video {
            format,
            width,
            height,
            avc_config,
            bitrate,
        })
    } else if format.is_audio() {
        // AudioSampleEntry: 8-byte common header, version/revision/vendor(8),
        // channelcount at 24, samplerate at 32.
        let channels = u16_at(entry_body, 24)?;
        let sample_rate = u32_at(entry_body, 32)? as f64 / 65536.0;
        let children = entry_body.get(36..).unwrap_or(&[]);
        let mut decoder_config = None;
        let mut audio_specific_config = None;
        let mut bitrate = None;
        for child in iter_boxes(children) {
            if child.is(b"esds") {
                if let Some((config, audio)) = esds::parse(child.body) {
                    decoder_config = Some(config);
                    audio_specific_config = audio;
                }
            } else if child.is(b"btrt") {
                bitrate = parse_btrt(child.body);
            }
        }
        Some(SampleEntry::Audio {
            format,
            channels,
            sample_rate,
            decoder_config,
            audio_specific_config,
            bitrate,
        })
    } else {
        Some(SampleEntry::Other { format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visual_entry(width: u16, height: u16, children: &[u8]) -> Vec<u8> {
        let mut e = vec![0u8; 86];
        let size = (86 + children.len()) as u32;
        e[0..4].copy_from_slice(&size.to_be_bytes());
        e[4..8].copy_from_slice(b"avc1");
        e[32..34].copy_from_slice(&width.to_be_bytes());
        e[34..36].copy_from_slice(&height.to_be_bytes());
        e.extend_from_slice(children);
        e
    }

    fn audio_entry(channels: u16, sample_rate_hz: u32, children: &[u8]) -> Vec<u8> {
        let mut e = vec![0u8; 36];
        let size = (36 + children.len()) as u32;
        e[0..4].copy_from_slice(&size.to_be_bytes());
        e[4..8].copy_from_slice(b"mp4a");
        e[24..26].copy_from_slice(&channels.to_be_bytes());
        e[32..36].copy_from_slice(&((sample_rate_hz as u32) << 16).to_be_bytes());
        e.extend_from_slice(children);
        e
    }

    fn stsd_body(entry: &[u8]) -> Vec<u8> {
        let mut b = vec![0u8; 4];
        b.extend_from_slice(&1u32.to_be_bytes());
        b.extend_from_slice(entry);
        b
    }

    #[test]
    fn parses_video_entry_dimensions() {
        let entry = visual_entry(1920, 1080, &[]);
        let body = stsd_body(&entry);
        match parse(&body).unwrap() {
            SampleEntry::Video { format, width, height, .. } => {
                assert_eq!(format, SampleFormat::Avc);
                assert_eq!(width, 1920);
                assert_eq!(height, 1080);
            }
            other => panic!("expected video entry, got {other:?}"),
        }
    }

    #[test]
    fn parses_audio_entry_channels_and_rate() {
        let entry = audio_entry(2, 48_000, &[]);
        let body = stsd_body(&entry);
        match parse(&body).unwrap() {
            SampleEntry::Audio {
                format,
                channels,
                sample_rate,
                ..
            } => {
                assert_eq!(format, SampleFormat::Aac);
                assert_eq!(channels, 2);
                assert_eq!(sample_rate, 48_000.0);
            }
            other => panic!("expected audio entry, got {other:?}"),
        }
    }

    #[test]
    fn parses_btrt_child_box() {
        let mut btrt = vec![0u8; 8]; // size + type filled below
        btrt[0..4].copy_from_slice(&20u32.to_be_bytes());
        btrt[4..8].copy_from_slice(b"btrt");
        btrt.extend_from_slice(&1024u32.to_be_bytes());
        btrt.extend_from_slice(&256_000u32.to_be_bytes());
        btrt.extend_from_slice(&192_000u32.to_be_bytes());

        let entry = visual_entry(640, 480, &btrt);
        let body = stsd_body(&entry);
        match parse(&body).unwrap() {
            SampleEntry::Video { bitrate: Some(b), .. } => {
                assert_eq!(b.buffer_size, 1024);
                assert_eq!(b.max_bitrate, 256_000);
                assert_eq!(b.avg_bitrate, 192_000);
            }
            other => panic!("expected bitrate, got {other:?}"),
        }
    }
}
