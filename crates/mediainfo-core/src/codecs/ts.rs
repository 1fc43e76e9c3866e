//! MPEG-TS container adapter: feeds sampled (or whole-file) windows
//! through [`ts::Demuxer`] and flattens its finalized streams into the
//! uniform report model.

use std::path::Path;

use ts::{CodecRecord, FinalizedStream, StreamKind as TsStreamKind, TsStreamState};

use crate::error::{MediaInfoError, Result};
use crate::fields::{AudioFieldInputs, VideoFieldInputs};
use crate::options::ParseOptions;
use crate::report::{Report, Stream, StreamKind};
use crate::sampling;

fn looks_like_bdav(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.eq_ignore_ascii_case("m2ts") || ext.eq_ignore_ascii_case("mts")).unwrap_or(false)
}

fn format_name(stream_type: ts::pmt::StreamType) -> String {
    use ts::pmt::StreamType::*;
    match stream_type {
        Mpeg1Video | Mpeg2Video => "MPEG Video".to_string(),
        H264 | H264Additional | H264AdditionalView => "AVC".to_string(),
        H265 | H265Temporal | H265Enhancement | H265TemporalEnhancement | H265Tile => "HEVC".to_string(),
        Mpeg4Visual | Mpeg4VisualPlain => "MPEG-4 Visual".to_string(),
        AdtsAac | LatmAac | Mpeg4Audio => "AAC".to_string(),
        Mpeg1Audio | Mpeg2Audio => "MPEG Audio".to_string(),
        Ac3 => "AC-3".to_string(),
        EAc3 => "E-AC-3".to_string(),
        other => format!("{other:?}"),
    }
}

fn chroma_name(chroma_format_idc: u8) -> Option<&'static str> {
    match chroma_format_idc {
        0 => Some("4:0:0"),
        1 => Some("4:2:0"),
        2 => Some("4:2:2"),
        3 => Some("4:4:4"),
        _ => None,
    }
}

fn build_h264_stream(fs: &FinalizedStream, state: &TsStreamState, sps: Option<&h264::Sps>, picture_kinds: &[h264::PictureKind]) -> Stream {
    let mut inputs = VideoFieldInputs {
        id: Some(fs.pid.to_string()),
        format: Some(format_name(fs.stream_type)),
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

fn build_mpeg2_stream(fs: &FinalizedStream, state: &TsStreamState, analyzer: &mpeg2video::Analyzer) -> Stream {
    let gop = match (analyzer.n_distance(), analyzer.m_distance()) {
        (mpeg2video::Distance::Fixed(n), mpeg2video::Distance::Fixed(m)) => Some((n, m)),
        _ => None,
    };
    let mut inputs = VideoFieldInputs {
        id: Some(fs.pid.to_string()),
        format: Some(format_name(fs.stream_type)),
        duration_secs: fs.duration_secs,
        bitrate_bps: fs.bitrate_bps,
        stream_size_bytes: Some(state.bytes),
        gop,
        intra_dc_precision: analyzer.intra_dc_precision_last(),
        gop_closed: analyzer.first_gop_closed.map(|first| first && !analyzer.any_open_gop),
        ..Default::default()
    };
    if let Some(seq) = &analyzer.sequence_header {
        inputs.width = Some(seq.width as u32);
        inputs.height = Some(seq.height as u32);
        inputs.frame_rate = seq.frame_rate.map(|(num, den)| num as f64 / den as f64);
        inputs.bitrate_bps = inputs.bitrate_bps.or(Some((seq.bit_rate_value as f64) * 400.0));
    }
    if let Some(ext) = &analyzer.sequence_extension {
        inputs.format_profile = Some(ext.profile_and_level_indication.to_string());
        inputs.chroma_subsampling = ext.chroma_format.map(|c| format!("{c:?}"));
        inputs.scan_type = Some(if ext.progressive_sequence { "Progressive" } else { "Interlaced" }.to_string());
    }
    inputs.into_stream()
}

fn build_aac_stream(fs: &FinalizedStream, state: &TsStreamState, last_adts: Option<&aac::AdtsHeader>) -> Stream {
    let mut inputs = AudioFieldInputs {
        id: Some(fs.pid.to_string()),
        format: Some(format_name(fs.stream_type)),
        duration_secs: fs.duration_secs,
        bitrate_bps: fs.bitrate_bps,
        stream_size_bytes: Some(state.bytes),
        ..Default::default()
    };
    if let Some(adts) = last_adts {
        inputs.channels = Some(adts.channel_configuration as u16);
        inputs.sampling_rate_hz = Some(adts.sampling_frequency);
    }
    inputs.into_stream()
}

fn build_ac3_stream(fs: &FinalizedStream, state: &TsStreamState, header: Option<&ac3::SyncFrameHeader>) -> Stream {
    let mut inputs = AudioFieldInputs {
        id: Some(fs.pid.to_string()),
        format: Some(format_name(fs.stream_type)),
        duration_secs: fs.duration_secs,
        bitrate_bps: fs.bitrate_bps,
        stream_size_bytes: Some(state.bytes),
        ..Default::default()
    };
    if let Some(header) = header {
        inputs.channels = Some(header.total_channels() as u16);
        inputs.sampling_rate_hz = Some(header.sample_rate);
        inputs.bitrate_bps = inputs.bitrate_bps.or(Some(header.bitrate_kbps as f64 * 1000.0));
    }
    inputs.into_stream()
}

fn build_mpegaudio_stream(fs: &FinalizedStream, state: &TsStreamState, first_frame: Option<&mpegaudio::FrameHeader>) -> Stream {
    let mut inputs = AudioFieldInputs {
        id: Some(fs.pid.to_string()),
        format: Some(format_name(fs.stream_type)),
        duration_secs: fs.duration_secs,
        bitrate_bps: fs.bitrate_bps,
        stream_size_bytes: Some(state.bytes),
        ..Default::default()
    };
    if let Some(frame) = first_frame {
        inputs.channels = Some(frame.channel_mode.channel_count() as u16);
        inputs.sampling_rate_hz = Some(frame.sample_rate);
    }
    inputs.into_stream()
}

fn build_generic_stream(fs: &FinalizedStream, state: &TsStreamState, kind: StreamKind) -> Stream {
    let mut stream = Stream::new(kind);
    stream.push("ID", fs.pid.to_string());
    stream.push("Format", format_name(fs.stream_type));
    stream.push("Duration", fs.duration_secs.map(|v| v.to_string()).unwrap_or_default());
    stream.push("Stream size", state.bytes.to_string());
    stream
}

fn build_stream(fs: &FinalizedStream, state: &TsStreamState) -> Stream {
    let kind = match fs.kind {
        TsStreamKind::Video => StreamKind::Video,
        TsStreamKind::Audio => StreamKind::Audio,
        TsStreamKind::Other => StreamKind::Other,
    };
    let mut stream = match &state.codec {
        CodecRecord::H264 { sps, picture_kinds } => build_h264_stream(fs, state, sps.as_ref(), picture_kinds),
        CodecRecord::Mpeg2Video(analyzer) => build_mpeg2_stream(fs, state, analyzer),
        CodecRecord::Aac { last_adts, .. } => build_aac_stream(fs, state, last_adts.as_ref()),
        CodecRecord::Ac3(header) => build_ac3_stream(fs, state, header.as_ref()),
        CodecRecord::MpegAudio { first_frame, .. } => build_mpegaudio_stream(fs, state, first_frame.as_ref()),
        CodecRecord::None => build_generic_stream(fs, state, kind),
    };
    if let Some(language) = &fs.language {
        stream.push("Language", language.clone());
    }
    stream
}

/// Builds a report from a file sniffed as MPEG-TS.
pub fn build_report(path: &Path, options: &ParseOptions) -> Result<Report> {
    let windows = sampling::read_sampled(path, options.parse_speed, options.dvd_parsing, ts::demux::SAMPLE_WINDOW_BYTES)?;
    let mut demuxer = ts::Demuxer::new(looks_like_bdav(path));
    for window in &windows.windows {
        demuxer.observe(window);
    }
    let finalized = demuxer.finalize();

    let mut streams = Vec::new();
    for fs in &finalized {
        if let Some(state) = demuxer.stream(fs.pid) {
            streams.push(build_stream(fs, state));
        }
    }

    if streams.is_empty() {
        return Err(MediaInfoError::NoStreamDiscovered);
    }

    let duration = finalized.iter().filter_map(|s| s.duration_secs).fold(0.0_f64, f64::max);
    let mut general = Stream::new(StreamKind::General);
    general.push("Format", "MPEG-TS");
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
