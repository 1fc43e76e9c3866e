//! MPEG-1/2/2.5 Layer I/II/III frame header parsing.

/// MPEG audio version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG Version 2.5 (unofficial extension for very low sample rates).
    V2_5,
    /// MPEG Version 2 (ISO/IEC 13818-3).
    V2,
    /// MPEG Version 1 (ISO/IEC 11172-3).
    V1,
}

/// MPEG audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Layer I.
    Layer1,
    /// Layer II.
    Layer2,
    /// Layer III (MP3).
    Layer3,
}

/// Channel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Stereo.
    Stereo,
    /// Joint stereo (intensity and/or MS stereo, layer/mode-extension
    /// dependent).
    JointStereo,
    /// Dual channel (two independent mono channels).
    DualChannel,
    /// Single channel.
    Mono,
}

impl ChannelMode {
    /// Number of audio channels (2 for anything but mono).
    pub const fn channel_count(&self) -> u8 {
        match self {
            Self::Mono => 1,
            _ => 2,
        }
    }
}

/// A decoded MPEG audio frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FrameHeader {
    /// MPEG version.
    pub version: MpegVersion,
    /// Layer.
    pub layer: Layer,
    /// Whether a 16-bit CRC follows the header.
    pub has_crc: bool,
    /// Bitrate in kbit/s (0 means "free format", not supported here).
    pub bitrate_kbps: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Whether the padding slot is present (changes frame size by one slot).
    pub padding: bool,
    /// Channel mode.
    pub channel_mode: ChannelMode,
    /// Mode-extension bits (only meaningful for joint stereo).
    pub mode_extension: u8,
    /// Total frame size in bytes, header included.
    pub frame_size: u32,
    /// PCM samples carried per frame.
    pub samples_per_frame: u32,
}

const BITRATE_V1: [[u16; 15]; 3] = [
    // Layer I
    [
        0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448,
    ],
    // Layer II
    [
        0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384,
    ],
    // Layer III
    [
        0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
    ],
];

const BITRATE_V2: [[u16; 15]; 3] = [
    // Layer I
    [
        0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256,
    ],
    // Layer II
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
    // Layer III
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
];

const SAMPLE_RATE_V1: [u32; 3] = [44_100, 48_000, 32_000];
const SAMPLE_RATE_V2: [u32; 3] = [22_050, 24_000, 16_000];
const SAMPLE_RATE_V2_5: [u32; 3] = [11_025, 12_000, 8_000];

impl FrameHeader {
    fn layer_index(layer: Layer) -> usize {
        match layer {
            Layer::Layer1 => 0,
            Layer::Layer2 => 1,
            Layer::Layer3 => 2,
        }
    }

    /// Attempts to parse a 4-byte MPEG audio frame header at the start of
    /// `data`. Returns `None` on a short read, a missing sync pattern, or a
    /// reserved field value (`FormatViolation`-style failures are not
    /// propagated as errors — callers resynchronize by scanning forward).
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // 11-bit sync: 0xFFE.. (top byte all ones, top 3 bits of second byte).
        if data[0] != 0xFF || (data[1] & 0xE0) != 0xE0 {
            return None;
        }

        let version = match (data[1] >> 3) & 0x03 {
            0b00 => MpegVersion::V2_5,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => return None, // reserved
        };

        let layer = match (data[1] >> 1) & 0x03 {
            0b01 => Layer::Layer3,
            0b10 => Layer::Layer2,
            0b11 => Layer::Layer1,
            _ => return None, // reserved
        };

        let has_crc = (data[1] & 0x01) == 0;

        let bitrate_index = (data[2] >> 4) & 0x0F;
        if bitrate_index == 0x0F {
            return None; // "bad" index
        }

        let table = if matches!(version, MpegVersion::V1) {
            &BITRATE_V1
        } else {
            &BITRATE_V2
        };
        let bitrate_kbps = table[Self::layer_index(layer)][bitrate_index as usize];
        if bitrate_kbps == 0 {
            return None; // free format, unsupported
        }

        let sample_rate_index = (data[2] >> 2) & 0x03;
        if sample_rate_index == 0x03 {
            return None; // reserved
        }
        let sample_rate = match version {
            MpegVersion::V1 => SAMPLE_RATE_V1[sample_rate_index as usize],
            MpegVersion::V2 => SAMPLE_RATE_V2[sample_rate_index as usize],
            MpegVersion::V2_5 => SAMPLE_RATE_V2_5[sample_rate_index as usize],
        };

        let padding = ((data[2] >> 1) & 0x01) != 0;

        let channel_mode = match (data[3] >> 6) & 0x03 {
            0b00 => ChannelMode::Stereo,
            0b01 => ChannelMode::JointStereo,
            0b10 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        };
        let mode_extension = (data[3] >> 4) & 0x03;

        let samples_per_frame: u32 = match (version, layer) {
            (_, Layer::Layer1) => 384,
            (MpegVersion::V1, _) => 1152,
            (_, Layer::Layer2) => 1152,
            (_, Layer::Layer3) => 576,
        };

        let bitrate_bps = bitrate_kbps as u32 * 1000;
        let frame_size = match layer {
            Layer::Layer1 => (12 * bitrate_bps / sample_rate + padding as u32) * 4,
            _ => {
                let coefficient = if matches!(version, MpegVersion::V1) {
                    144
                } else {
                    72
                };
                coefficient * bitrate_bps / sample_rate + padding as u32
            }
        };

        Some(Self {
            version,
            layer,
            has_crc,
            bitrate_kbps,
            sample_rate,
            padding,
            channel_mode,
            mode_extension,
            frame_size,
            samples_per_frame,
        })
    }

    /// Byte offset from the start of the header to where a Xing/Info tag
    /// would begin, per the side-information size for this version/mode.
    pub const fn side_info_size(&self) -> usize {
        match (self.version, matches!(self.channel_mode, ChannelMode::Mono)) {
            (MpegVersion::V1, false) => 32,
            (MpegVersion::V1, true) => 17,
            (_, false) => 17,
            (_, true) => 9,
        }
    }
}
