//! AVI container adapter: parses the whole file through [`avi::parse`]
//! and flattens its per-`strl` streams into the uniform report model.

use std::path::Path;

use avi::mp3scan::Mp3ScanResult;
use avi::mpeg4visual::Scanner as Mpeg4VisualScanner;
use avi::strh::StreamKind as AviStreamKind;
use avi::Stream as AviStream;
use mpegaudio::BitrateMode as MpegAudioBitrateMode;

use crate::error::{MediaInfoError, Result};
use crate::fields::{AudioFieldInputs, VideoFieldInputs};
use crate::options::ParseOptions;
use crate::report::{BitrateMode, Report, Stream, StreamKind};
use crate::sampling;

const MPEG4_VISUAL_FOURCCS: [[u8; 4]; 4] = [*b"FMP4", *b"MP4V", *b"DIVX", *b"XVID"];

fn fourcc_name(fourcc: [u8; 4]) -> String {
    let text = String::from_utf8_lossy(&fourcc).trim().to_string();
    if text.is_empty() {
        "Unknown".to_string()
    } else {
        text
    }
}

fn build_video_stream(
    stream: &AviStream,
    mpeg4_visual: Option<&Mpeg4VisualScanner>,
    is_mpeg4_visual: bool,
) -> Stream {
    let mut inputs = VideoFieldInputs {
        id: Some(stream.index.to_string()),
        format: Some(fourcc_name(stream.codec_fourcc())),
        duration_secs: stream.header.duration_seconds(),
        bitrate_bps: stream.bitrate_bps(),
        stream_size_bytes: stream.byte_count,
        frame_rate: stream.header.rate_per_second(),
        ..Default::default()
    };

    if let Some(format) = &stream.video_format {
        inputs.width = Some(format.width);
        inputs.height = Some(format.height);
        inputs.bit_depth = Some(format.bit_depth as u8);
        inputs.scan_type = Some(if format.top_down { "Top-to-bottom" } else { "Bottom-to-top" }.to_string());
    }

    if is_mpeg4_visual {
        if let Some(scanner) = mpeg4_visual {
            if let Some(vol) = &scanner.vol {
                if let (Some(width), Some(height)) = (vol.width, vol.height) {
                    inputs.width = Some(width as u32);
                    inputs.height = Some(height as u32);
                }
                inputs.scan_type = Some(if vol.interlaced { "Interlaced" } else { "Progressive" }.to_string());
            }
            if scanner.has_b_vop {
                inputs.format_profile = Some("Advanced Simple".to_string());
            }
        }
    }

    inputs.into_stream()
}

fn build_audio_stream(stream: &AviStream, mp3: Option<&Mp3ScanResult>, is_mp3: bool) -> Stream {
    let mut inputs = AudioFieldInputs {
        id: Some(stream.index.to_string()),
        format: Some(fourcc_name(stream.codec_fourcc())),
        duration_secs: stream.header.duration_seconds(),
        bitrate_bps: stream.bitrate_bps(),
        stream_size_bytes: stream.byte_count,
        ..Default::default()
    };

    if let Some(format) = &stream.audio_format {
        inputs.channels = Some(format.channels);
        inputs.sampling_rate_hz = Some(format.sample_rate);
        inputs.bit_depth = Some(format.bits_per_sample as u8);
    }

    if is_mp3 {
        inputs.format = Some("MPEG Audio".to_string());
        if let Some(mp3) = mp3 {
            inputs.channels = Some(mp3.channel_mode.channel_count() as u16);
            inputs.duration_secs = Some(mp3.summary.duration_secs);
            inputs.bitrate_bps = Some(mp3.summary.bitrate_kbps as f64 * 1000.0);
            inputs.bitrate_mode = Some(match mp3.summary.bitrate_mode {
                MpegAudioBitrateMode::Variable => BitrateMode::Variable,
                MpegAudioBitrateMode::Constant => BitrateMode::Constant,
            });
            if let Some(encoder) = &mp3.lame_encoder {
                inputs.encoded_library = Some(encoder.clone());
            }
        }
    }

    inputs.into_stream()
}

fn build_stream(stream: &AviStream, mpeg4_visual_index: Option<u32>, mpeg4_visual: Option<&Mpeg4VisualScanner>, mp3_index: Option<u32>, mp3: Option<&Mp3ScanResult>) -> Stream {
    match stream.header.kind {
        AviStreamKind::Video => build_video_stream(stream, mpeg4_visual, Some(stream.index) == mpeg4_visual_index),
        AviStreamKind::Audio => build_audio_stream(stream, mp3, Some(stream.index) == mp3_index),
        AviStreamKind::Text | AviStreamKind::Other(_) => {
            let kind = if stream.header.kind == AviStreamKind::Text { StreamKind::Text } else { StreamKind::Other };
            let mut s = Stream::new(kind);
            s.push("ID", stream.index.to_string());
            s.push("Format", fourcc_name(stream.codec_fourcc()));
            s.push("Duration", stream.header.duration_seconds().map(|v| v.to_string()).unwrap_or_default());
            s
        }
    }
}

/// Builds a report from a file sniffed as AVI (RIFF/`AVI `).
pub fn build_report(path: &Path, options: &ParseOptions) -> Result<Report> {
    let data = sampling::read_whole(path)?;
    let movie = avi::parse(&data, options.parse_speed).map_err(|err| MediaInfoError::FormatViolation(err.to_string()))?;

    let mpeg4_visual_index = movie
        .streams
        .iter()
        .find(|s| s.header.kind == AviStreamKind::Video && MPEG4_VISUAL_FOURCCS.contains(&s.codec_fourcc()))
        .map(|s| s.index);
    let mp3_index = movie
        .streams
        .iter()
        .find(|s| matches!(&s.audio_format, Some(f) if f.format_tag == avi::strf::WAVE_FORMAT_MP3))
        .map(|s| s.index);

    let streams: Vec<Stream> = movie
        .streams
        .iter()
        .map(|stream| build_stream(stream, mpeg4_visual_index, movie.mpeg4_visual.as_ref(), mp3_index, movie.mp3.as_ref()))
        .collect();

    if streams.is_empty() {
        return Err(MediaInfoError::NoStreamDiscovered);
    }

    let mut general = Stream::new(StreamKind::General);
    general.push("Format", "AVI");
    general.push("File size", data.len().to_string());

    let mut container = crate::report::ContainerInfo::default();
    if let Some(header) = &movie.main_header {
        if let Some(duration) = header.duration_seconds() {
            general.push("Duration", duration.to_string());
            container.duration_seconds = Some(duration);
            let overall_bitrate = data.len() as f64 * 8.0 / duration;
            general.push("Overall bit rate", overall_bitrate.to_string());
        }
        general.push("Width", header.width.to_string());
        general.push("Height", header.height.to_string());
    }

    if let Some(interleave) = &movie.interleave {
        general.push("Interleaved", if interleave.interleaved { "Yes" } else { "No" });
    }

    Ok(Report { general, container, streams })
}
