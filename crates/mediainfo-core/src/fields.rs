//! Canonical field-order builders. Every per-container module fills in
//! one of these input structs with whatever it managed to compute, and
//! `into_stream` lays the fields out in the fixed order a renderer
//! expects, silently skipping anything left `None`.

use crate::report::{Stream, StreamKind};

fn fmt_f64(value: f64) -> String {
    format!("{value}")
}

/// Inputs to a video elementary stream's field list, in the order they
/// are emitted.
#[derive(Debug, Clone, Default)]
pub struct VideoFieldInputs {
    /// Stream identifier (PID, track id, stream index).
    pub id: Option<String>,
    /// Codec family name (`"AVC"`, `"MPEG Video"`, `"MPEG-4 Visual"`).
    pub format: Option<String>,
    /// Profile/level or similar codec-specific qualifier.
    pub format_profile: Option<String>,
    /// Duration in seconds.
    pub duration_secs: Option<f64>,
    /// Bitrate in bits/second.
    pub bitrate_bps: Option<f64>,
    /// Frame width in pixels.
    pub width: Option<u32>,
    /// Frame height in pixels.
    pub height: Option<u32>,
    /// Display (not pixel) aspect ratio, width over height.
    pub display_aspect_ratio: Option<f64>,
    /// Frame rate in frames/second.
    pub frame_rate: Option<f64>,
    /// Colorimetry description (e.g. `"YUV"`).
    pub color_space: Option<String>,
    /// Chroma subsampling (e.g. `"4:2:0"`).
    pub chroma_subsampling: Option<String>,
    /// Bits per sample/component.
    pub bit_depth: Option<u8>,
    /// `"Progressive"` or `"Interlaced"`.
    pub scan_type: Option<String>,
    /// `"Lossy"`/`"Lossless"`, when known.
    pub compression_mode: Option<String>,
    /// Inferred GOP structure (N, M), when a long enough prefix of
    /// picture kinds yielded a stable modal spacing.
    pub gop: Option<(u32, u32)>,
    /// `IntraDCPrecision`, as surfaced by the MPEG-2 analyzer (modal value
    /// across picture-coding extensions, or the container's own last-value
    /// convention).
    pub intra_dc_precision: Option<u8>,
    /// Whether every GOP observed in the parsed prefix was closed
    /// (MPEG-2 only; `false` once any open GOP is seen).
    pub gop_closed: Option<bool>,
    /// Fixed presentation delay in seconds, when computable from a
    /// PTS/DTS offset.
    pub delay_secs: Option<f64>,
    /// Total payload bytes attributed to this stream.
    pub stream_size_bytes: Option<u64>,
    /// Encoder/muxer library string, when embedded.
    pub writing_library: Option<String>,
}

impl VideoFieldInputs {
    /// Lays the inputs out as a `Video` [`Stream`] in canonical field
    /// order: ID, Format, Format profile, Duration, Bit rate, Width,
    /// Height, Display aspect ratio, Frame rate, Color space, Chroma
    /// subsampling, Bit depth, Scan type, Compression mode, Format
    /// settings (GOP, IntraDCPrecision, GOP Closed), Delay, Stream size,
    /// Writing library.
    pub fn into_stream(self) -> Stream {
        let mut stream = Stream::new(StreamKind::Video);
        stream.push("ID", self.id.unwrap_or_default());
        stream.push("Format", self.format.unwrap_or_default());
        stream.push("Format profile", self.format_profile.unwrap_or_default());
        stream.push("Duration", self.duration_secs.map(fmt_f64).unwrap_or_default());
        stream.push("Bit rate", self.bitrate_bps.map(fmt_f64).unwrap_or_default());
        stream.push("Width", self.width.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Height", self.height.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Display aspect ratio", self.display_aspect_ratio.map(fmt_f64).unwrap_or_default());
        stream.push("Frame rate", self.frame_rate.map(fmt_f64).unwrap_or_default());
        stream.push("Color space", self.color_space.unwrap_or_default());
        stream.push("Chroma subsampling", self.chroma_subsampling.unwrap_or_default());
        stream.push("Bit depth", self.bit_depth.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Scan type", self.scan_type.unwrap_or_default());
        stream.push("Compression mode", self.compression_mode.unwrap_or_default());
        stream.push("Format settings, GOP", self.gop.map(|(n, m)| format!("M={m}, N={n}")).unwrap_or_default());
        stream.push("Format settings, IntraDCPrecision", self.intra_dc_precision.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Format settings, GOP, Closed", self.gop_closed.map(|v| if v { "Yes" } else { "No" }.to_string()).unwrap_or_default());
        stream.push("Delay", self.delay_secs.map(fmt_f64).unwrap_or_default());
        stream.push("Stream size", self.stream_size_bytes.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Writing library", self.writing_library.unwrap_or_default());
        stream
    }
}

/// Inputs to an audio elementary stream's field list, in the order they
/// are emitted.
#[derive(Debug, Clone, Default)]
pub struct AudioFieldInputs {
    /// Stream identifier (PID, track id, stream index).
    pub id: Option<String>,
    /// Codec family name (`"AAC"`, `"AC-3"`, `"MPEG Audio"`).
    pub format: Option<String>,
    /// Numeric/fourcc codec identifier as carried by the container.
    pub codec_id: Option<String>,
    /// Channel count.
    pub channels: Option<u16>,
    /// Sampling rate in Hz.
    pub sampling_rate_hz: Option<u32>,
    /// Bits per sample.
    pub bit_depth: Option<u8>,
    /// Constant/variable, when a Xing/Info-style tag or equivalent makes
    /// it known.
    pub bitrate_mode: Option<crate::report::BitrateMode>,
    /// Bitrate in bits/second.
    pub bitrate_bps: Option<f64>,
    /// Duration in seconds.
    pub duration_secs: Option<f64>,
    /// Total payload bytes attributed to this stream.
    pub stream_size_bytes: Option<u64>,
    /// Encoder library string, when embedded (e.g. a `LAME` tag).
    pub encoded_library: Option<String>,
}

impl AudioFieldInputs {
    /// Lays the inputs out as an `Audio` [`Stream`] in canonical field
    /// order: ID, Format, Codec ID, Channel(s), Sampling rate, Bit depth,
    /// Bit rate mode, Bit rate, Duration, Stream size, Writing library.
    pub fn into_stream(self) -> Stream {
        let mut stream = Stream::new(StreamKind::Audio);
        stream.push("ID", self.id.unwrap_or_default());
        stream.push("Format", self.format.unwrap_or_default());
        stream.push("Codec ID", self.codec_id.unwrap_or_default());
        stream.push("Channel(s)", self.channels.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Sampling rate", self.sampling_rate_hz.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Bit depth", self.bit_depth.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Bit rate mode", self.bitrate_mode.map(|v| format!("{v:?}")).unwrap_or_default());
        stream.push("Bit rate", self.bitrate_bps.map(fmt_f64).unwrap_or_default());
        stream.push("Duration", self.duration_secs.map(fmt_f64).unwrap_or_default());
        stream.push("Stream size", self.stream_size_bytes.map(|v| v.to_string()).unwrap_or_default());
        stream.push("Writing library", self.encoded_library.unwrap_or_default());
        stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_fields_preserve_canonical_relative_order() {
        let inputs = VideoFieldInputs {
            id: Some("0".into()),
            format: Some("AVC".into()),
            width: Some(1920),
            height: Some(1080),
            frame_rate: Some(29.97),
            stream_size_bytes: Some(12345),
            ..Default::default()
        };
        let stream = inputs.into_stream();
        let names: Vec<&str> = stream.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ID", "Format", "Width", "Height", "Frame rate", "Stream size"]);
    }

    #[test]
    fn audio_fields_preserve_canonical_relative_order() {
        let inputs = AudioFieldInputs {
            format: Some("AAC".into()),
            channels: Some(2),
            sampling_rate_hz: Some(48_000),
            duration_secs: Some(10.5),
            ..Default::default()
        };
        let stream = inputs.into_stream();
        let names: Vec<&str> = stream.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Format", "Channel(s)", "Sampling rate", "Duration"]);
    }
}
