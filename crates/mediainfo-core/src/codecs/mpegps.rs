//! MPEG Program Stream container adapter: feeds sampled (or whole-file)
//! windows through [`mpegps::Demuxer`], including a DVD-style middle
//! window when requested, and flattens its finalized streams into the
//! uniform report model.

use std::path::Path;

use mpegps::{CodecRecord, FinalizedStream, PsStreamState, StreamKind as PsStreamKind};

use crate::error::{MediaInfoError, Result};
use crate::fields::{AudioFieldInputs, VideoFieldInputs};
use crate::options::ParseOptions;
use crate::report::{Report, Stream, StreamKind};
use crate::sampling;

fn chroma_name(chroma_format_idc: u8) -> Option<&'static str> {
    match chroma_format_idc {
        0 => Some("4:0:0"),
        1 => Some("4:2:0"),
        2 => Some("4:2:2"),
        3 => Some("4:4:4"),
        _ => None,
    }
}

fn build_h264_stream(fs: &FinalizedStream, state: &PsStreamState, sps: Option<&h264::Sps>, picture_kinds: &[h264::PictureKind]) -> Stream {
    let mut inputs = VideoFieldInputs {
        id: Some(format!("{}", fs.key.stream_id)),
        format: Some("AVC".to_string()),
        duration_secs: fs.duration_secs,
        bitrate_bps: fs.bitrate_bps,
        stream_size_bytes: Some(state.bytes),
        gop: h264::infer_gop(picture_kinds).map(|gop| (gop.n, gop.m)),
        ..Default::default()
    };
    if let Some(sps) = sps {
        inputs.format_profile = Some(format!("{}@L{:.1}", sps.profile_idc, sps.level_idc as f64 / 10.0));
        inputs.width = Some(sps.width() as u32);
        inputs.height = Some(sps.height() as u32);
        inputs.frame_rate = sps.frame_rate();
        if let Some(ext) = &sps.ext {
            inputs.chroma_subsampling = chroma_name(ext.chroma_format_idc).map(str::to_string);
            inputs.bit_depth = Some(8 + ext.bit_depth_luma_minus8);
        }
    }
    inputs.into_stream()
}

fn build_mpeg2_stream(fs: &FinalizedStream, state: &PsStreamState, analyzer: &mpeg2video::Analyzer) -> Stream {
    let gop = match (analyzer.n_distance(), analyzer.m_distance()) {
        (mpeg2video::Distance::Fixed(n), mpeg2video::Distance::Fixed(m)) => Some((n, m)),
        _ => None,
    };
    let mut inputs = VideoFieldInputs {
        id: Some(format!("{}", fs.key.stream_id)),
        format: Some("MPEG Video".to_string()),
        duration_secs: fs.duration_secs,
        bitrate_bps: fs.bitrate_bps,
        stream_size_bytes: Some(state.bytes),
        gop,
        intra_dc_precision: analyzer.intra_dc_precision_mode(),
        gop_closed: analyzer.first_gop_closed.map(|first| first && !analyzer.any_open_gop),
        ..Default::default()
    };
    if let Some(seq) = &analyzer.sequence_header {
        inputs.width = Some(seq.width as u32);
        inputs.height = Some(seq.height as u32);
        inputs.frame_rate = seq.frame_rate.map(|(num, den)| num as f64 / den as f64);
        inputs.bitrate_bps = inputs.bitrate_bps.or(Some(seq.bit_rate_value as f64 * 400.0));
    }
    if let Some(ext) = &analyzer.sequence_extension {
        inputs.format_profile = Some(ext.profile_and_level_indication.to_string());
        inputs.chroma_subsampling = ext.chroma_format.map(|c| format!("{c:?}"));
        inputs.scan_type = Some(if ext.progressive_sequence { "Progressive" } else { "Interlaced" }.to_string());
    }
    inputs.into_stream()
}

fn build_audio_stream(fs: &FinalizedStream, state: &PsStreamState, format: &str, channels: Option<u16>, sample_rate: Option<u32>) -> Stream {
    let inputs = AudioFieldInputs {
        id: Some(format!("{}", fs.key.stream_id)),
        format: Some(format.to_string()),
        duration_secs: fs.duration_secs,
        bitrate_bps: fs.bitrate_bps,
        stream_size_bytes: Some(state.bytes),
        channels,
        sampling_rate_hz: sample_rate,
        ..Default::default()
    };
    inputs.into_stream()
}

fn build_caption_stream(fs: &FinalizedStream) -> Option<Stream> {
    let captions = fs.captions?;
    let mut stream = Stream::new(StreamKind::Text);
    stream.push("ID", format!("{}", fs.key.stream_id));
    stream.push("Format", "EIA-608");
    stream.push("Language", captions.service_name);
    if let Some(pts) = captions.first_pts {
        stream.push("Delay", (pts as f64 / 90_000.0).to_string());
    }
    Some(stream)
}

fn build_stream(fs: &FinalizedStream, state: &PsStreamState) -> Stream {
    match &state.codec {
        CodecRecord::H264 { sps, picture_kinds } => build_h264_stream(fs, state, sps.as_ref(), picture_kinds),
        CodecRecord::Mpeg2Video { analyzer, .. } => build_mpeg2_stream(fs, state, analyzer),
        CodecRecord::MpegAudio { first_frame, .. } => {
            let channels = first_frame.as_ref().map(|f| f.channel_mode.channel_count() as u16);
            let sample_rate = first_frame.as_ref().map(|f| f.sample_rate);
            build_audio_stream(fs, state, "MPEG Audio", channels, sample_rate)
        }
        CodecRecord::Ac3(header) => {
            let channels = header.as_ref().map(|h| h.total_channels() as u16);
            let sample_rate = header.as_ref().map(|h| h.sample_rate);
            build_audio_stream(fs, state, "AC-3", channels, sample_rate)
        }
        CodecRecord::None => {
            let kind = match fs.kind {
                PsStreamKind::Video => StreamKind::Video,
                PsStreamKind::Audio => StreamKind::Audio,
                PsStreamKind::Subpicture => StreamKind::Text,
                PsStreamKind::Other => StreamKind::Other,
            };
            let mut stream = Stream::new(kind);
            stream.push("ID", format!("{}", fs.key.stream_id));
            stream.push("Duration", fs.duration_secs.map(|v| v.to_string()).unwrap_or_default());
            stream.push("Stream size", state.bytes.to_string());
            stream
        }
    }
}

/// Builds a report from a file sniffed as MPEG-PS (or DVD-Video, when
/// `dvd_parsing` requests the DVD-specific middle sample window).
pub fn build_report(path: &Path, options: &ParseOptions) -> Result<Report> {
    let windows = sampling::read_sampled(path, options.parse_speed, options.dvd_parsing, mpegps::SAMPLE_WINDOW_BYTES)?;
    let mut demuxer = mpegps::Demuxer::new();
    for window in &windows.windows {
        demuxer.observe(window);
    }
    let finalized = demuxer.finalize();

    let mut streams = Vec::new();
    for fs in &finalized {
        let Some(state) = demuxer.stream(fs.key) else { continue };
        streams.push(build_stream(fs, state));
        if let Some(caption_stream) = build_caption_stream(fs) {
            streams.push(caption_stream);
        }
    }

    if streams.is_empty() {
        return Err(MediaInfoError::NoStreamDiscovered);
    }

    let duration = finalized.iter().filter_map(|s| s.duration_secs).fold(0.0_f64, f64::max);
    let mut general = Stream::new(StreamKind::General);
    general.push("Format", "MPEG-PS");
    general.push("File size", windows.file_size.to_string());
    if duration > 0.0 {
        general.push("Duration", duration.to_string());
    }

    let mut container = crate::report::ContainerInfo::default();
    if duration > 0.0 {
        container.duration_seconds = Some(duration);
    }

    Ok(Report { general, container, streams })
}
