//! MP4/QuickTime container adapter: parses the whole file through
//! [`mp4::parse`] (the box tree can put `moov` anywhere, so sampled I/O
//! does not apply here) and flattens its tracks into the uniform report
//! model.

use std::io::Cursor;
use std::path::Path;

use mp4::hdlr::TrackKind;
use mp4::stsd::{SampleEntry, SampleFormat};
use mp4::Track;

use crate::error::{MediaInfoError, Result};
use crate::fields::{AudioFieldInputs, VideoFieldInputs};
use crate::report::{Report, Stream, StreamKind};
use crate::sampling;

fn format_name(format: SampleFormat) -> String {
    match format {
        SampleFormat::Avc => "AVC".to_string(),
        SampleFormat::Hevc => "HEVC".to_string(),
        SampleFormat::Mpeg4Visual => "MPEG-4 Visual".to_string(),
        SampleFormat::Aac => "AAC".to_string(),
        SampleFormat::Ac3 => "AC-3".to_string(),
        SampleFormat::Eac3 => "E-AC-3".to_string(),
        SampleFormat::Alac => "ALAC".to_string(),
        SampleFormat::Flac => "FLAC".to_string(),
        SampleFormat::Opus => "Opus".to_string(),
        SampleFormat::Text => "Timed Text".to_string(),
        SampleFormat::WebVtt => "WebVTT".to_string(),
        SampleFormat::Unknown(fourcc) => String::from_utf8_lossy(&fourcc).trim().to_string(),
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

fn track_duration_secs(track: &Track) -> Option<f64> {
    let units = track.duration_media_units()?;
    let timescale = track.media_header.timescale;
    if timescale == 0 {
        return None;
    }
    Some(units as f64 / timescale as f64)
}

fn build_video_stream(track: &Track, width: u16, height: u16, format: SampleFormat, avc_config: Option<&h264::AVCDecoderConfigurationRecord>, bitrate: Option<&mp4::stsd::BufferSizeBitrate>) -> Stream {
    let mut inputs = VideoFieldInputs {
        id: Some(track.header.track_id.to_string()),
        format: Some(format_name(format)),
        duration_secs: track_duration_secs(track),
        bitrate_bps: bitrate.map(|b| b.avg_bitrate as f64).or_else(|| track.bitrate_bps()),
        width: Some(width as u32),
        height: Some(height as u32),
        ..Default::default()
    };

    if let Some(avc_config) = avc_config {
        if let Some(sps_bytes) = avc_config.sps.first() {
            if let Ok(sps) = h264::Sps::parse_with_emulation_prevention(Cursor::new(sps_bytes.as_ref())) {
                inputs.format_profile = Some(format!("{}@L{:.1}", sps.profile_idc, sps.level_idc as f64 / 10.0));
                inputs.frame_rate = sps.frame_rate();
                if let Some(ext) = &sps.ext {
                    inputs.chroma_subsampling = chroma_name(ext.chroma_format_idc).map(str::to_string);
                    inputs.bit_depth = Some(8 + ext.bit_depth_luma_minus8);
                }
            }
        }
    }

    inputs.into_stream()
}

fn build_audio_stream(
    track: &Track,
    channels: u16,
    sample_rate: f64,
    format: SampleFormat,
    decoder_config: Option<&mp4::esds::DecoderConfig>,
    audio_specific_config: Option<&aac::PartialAudioSpecificConfig>,
    bitrate: Option<&mp4::stsd::BufferSizeBitrate>,
) -> Stream {
    let mut inputs = AudioFieldInputs {
        id: Some(track.header.track_id.to_string()),
        format: Some(format_name(format)),
        duration_secs: track_duration_secs(track),
        channels: Some(channels),
        sampling_rate_hz: Some(sample_rate.round() as u32),
        ..Default::default()
    };

    inputs.bitrate_bps = bitrate
        .map(|b| b.avg_bitrate as f64)
        .or_else(|| decoder_config.map(|d| d.avg_bitrate as f64))
        .or_else(|| track.bitrate_bps());

    if let Some(config) = audio_specific_config {
        inputs.sampling_rate_hz = Some(config.sampling_frequency);
        inputs.channels = Some(config.channel_configuration as u16);
    }

    inputs.into_stream()
}

fn build_stream(track: &Track) -> Option<Stream> {
    let mut stream = match track.sample_entry.as_ref()? {
        SampleEntry::Video { format, width, height, avc_config, bitrate } => {
            build_video_stream(track, *width, *height, *format, avc_config.as_ref(), bitrate.as_ref())
        }
        SampleEntry::Audio { format, channels, sample_rate, decoder_config, audio_specific_config, bitrate } => {
            build_audio_stream(track, *channels, *sample_rate, *format, decoder_config.as_ref(), audio_specific_config.as_ref(), bitrate.as_ref())
        }
        SampleEntry::Other { format } => {
            let kind = match track.kind {
                TrackKind::Video => StreamKind::Video,
                TrackKind::Audio => StreamKind::Audio,
                TrackKind::Text => StreamKind::Text,
                TrackKind::Other => StreamKind::Other,
            };
            let mut stream = Stream::new(kind);
            stream.push("ID", track.header.track_id.to_string());
            stream.push("Format", format_name(*format));
            stream.push("Duration", track_duration_secs(track).map(|v| v.to_string()).unwrap_or_default());
            stream
        }
    };

    if let Some(language) = track.media_header.language {
        stream.push("Language", String::from_utf8_lossy(&language).to_string());
    }
    if !track.header.enabled {
        stream.push("Enabled", "No");
    }

    Some(stream)
}

/// Builds a report from a file sniffed as MP4/QuickTime.
pub fn build_report(path: &Path, is_quicktime: bool) -> Result<Report> {
    let data = sampling::read_whole(path)?;
    let movie = mp4::parse(&data).map_err(|err| MediaInfoError::FormatViolation(err.to_string()))?;

    let streams: Vec<Stream> = movie.tracks.iter().filter_map(build_stream).collect();
    if streams.is_empty() && movie.header.is_none() {
        return Err(MediaInfoError::NoStreamDiscovered);
    }

    let mut general = Stream::new(StreamKind::General);
    general.push("Format", if is_quicktime { "QuickTime" } else { "MPEG-4" });
    general.push("File size", data.len().to_string());
    if let Some(duration) = movie.duration_seconds() {
        general.push("Duration", duration.to_string());
    }
    let overall_bitrate = movie.duration_seconds().filter(|d| *d > 0.0).map(|d| data.len() as f64 * 8.0 / d);
    if let Some(bitrate) = overall_bitrate {
        general.push("Overall bit rate", bitrate.to_string());
    }

    let mut container = crate::report::ContainerInfo::default();
    container.duration_seconds = movie.duration_seconds();

    Ok(Report { general, container, streams })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp4::edts::EditListSummary;
    use mp4::mdhd::MediaHeader;
    use mp4::stsz::SampleSizes;
    use mp4::tkhd::TrackHeader;

    fn bare_header(track_id: u32, enabled: bool) -> TrackHeader {
        TrackHeader { track_id, enabled, alternate_group: 0, creation_time: 0, modification_time: 0 }
    }

    fn video_track() -> Track {
        Track {
            header: bare_header(1, true),
            kind: TrackKind::Video,
            media_header: MediaHeader { timescale: 90_000, duration: Some(900_000), language: None },
            edit_list: None,
            sample_entry: Some(SampleEntry::Video {
                format: SampleFormat::Avc,
                width: 1920,
                height: 1080,
                avc_config: None,
                bitrate: None,
            }),
            time_to_sample: None,
            sample_sizes: Some(SampleSizes { count: 250, total_bytes: 2_500_000, first_sizes: vec![], last_sizes: vec![] }),
            first_chunk_offset: None,
        }
    }

    #[test]
    fn video_track_maps_to_video_stream() {
        let track = video_track();
        let stream = build_stream(&track).unwrap();
        assert_eq!(stream.kind, StreamKind::Video);
        assert_eq!(stream.raw.get("ID").map(String::as_str), Some("1"));
        assert_eq!(stream.raw.get("Format").map(String::as_str), Some("AVC"));
        assert_eq!(stream.raw.get("Width").map(String::as_str), Some("1920"));
        assert_eq!(stream.raw.get("Height").map(String::as_str), Some("1080"));
        assert_eq!(stream.raw.get("Duration").map(String::as_str), Some("10"));
    }

    #[test]
    fn disabled_track_gets_enabled_field() {
        let mut track = video_track();
        track.header = bare_header(2, false);
        let stream = build_stream(&track).unwrap();
        assert_eq!(stream.raw.get("Enabled").map(String::as_str), Some("No"));
    }

    #[test]
    fn edit_list_duration_wins_over_mdhd_duration() {
        let mut track = video_track();
        track.edit_list = Some(EditListSummary { total_duration_movie_units: 45_000, first_media_time: Some(0) });
        let stream = build_stream(&track).unwrap();
        assert_eq!(stream.raw.get("Duration").map(String::as_str), Some("0.5"));
    }

    #[test]
    fn audio_track_maps_to_audio_stream() {
        let track = Track {
            header: bare_header(2, true),
            kind: TrackKind::Audio,
            media_header: MediaHeader { timescale: 48_000, duration: Some(480_000), language: Some(*b"eng") },
            edit_list: None,
            sample_entry: Some(SampleEntry::Audio {
                format: SampleFormat::Aac,
                channels: 2,
                sample_rate: 48_000.0,
                decoder_config: None,
                audio_specific_config: None,
                bitrate: None,
            }),
            time_to_sample: None,
            sample_sizes: None,
            first_chunk_offset: None,
        };
        let stream = build_stream(&track).unwrap();
        assert_eq!(stream.kind, StreamKind::Audio);
        assert_eq!(stream.raw.get("Channel(s)").map(String::as_str), Some("2"));
        assert_eq!(stream.raw.get("Sampling rate").map(String::as_str), Some("48000"));
        assert_eq!(stream.raw.get("Language").map(String::as_str), Some("eng"));
    }

    #[test]
    fn track_with_no_sample_entry_yields_no_stream() {
        let mut track = video_track();
        track.sample_entry = None;
        assert!(build_stream(&track).is_none());
    }
}
