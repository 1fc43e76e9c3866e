//! Standalone leaf-format adapters: containers thin enough that this
//! crate reads the one chunk/header it needs directly rather than
//! reaching for a dedicated demux crate.

use std::path::Path;

use avi::riff::find_chunk;
use avi::strf;
use mpegaudio::{id3v2, xing, FrameHeader};

use crate::error::{MediaInfoError, Result};
use crate::fields::AudioFieldInputs;
use crate::report::{BitrateMode as ReportBitrateMode, ContainerInfo, Report, Stream, StreamKind};
use crate::sampling;

/// Builds a report from a file sniffed as RIFF/WAVE, by locating the
/// `fmt ` chunk and parsing it as a `WAVEFORMATEX` (byte-identical to the
/// `strf` audio chunk AVI carries for PCM/ACM streams).
pub fn build_wave_report(path: &Path) -> Result<Report> {
    build_wave_report_from_bytes(&sampling::read_whole(path)?)
}

fn build_wave_report_from_bytes(data: &[u8]) -> Result<Report> {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(MediaInfoError::FormatViolation("not a RIFF/WAVE file".to_string()));
    }
    let body = &data[12..];
    let fmt_chunk = find_chunk(body, b"fmt ").ok_or(MediaInfoError::NoStreamDiscovered)?;
    let format = strf::parse_audio(fmt_chunk.body).ok_or(MediaInfoError::NoStreamDiscovered)?;
    let data_chunk = find_chunk(body, b"data");
    let payload_bytes = data_chunk.map(|c| c.body.len() as u64);

    let mut inputs = AudioFieldInputs {
        id: Some("0".to_string()),
        format: Some(if format.format_tag == strf::WAVE_FORMAT_MP3 { "MPEG Audio".to_string() } else { "PCM".to_string() }),
        channels: Some(format.channels),
        sampling_rate_hz: Some(format.sample_rate),
        bit_depth: Some(format.bits_per_sample as u8),
        stream_size_bytes: payload_bytes,
        ..Default::default()
    };

    let duration_secs = payload_bytes.and_then(|bytes| {
        let bytes_per_second = format.sample_rate as u64 * format.channels as u64 * (format.bits_per_sample as u64 / 8);
        if bytes_per_second == 0 {
            None
        } else {
            Some(bytes as f64 / bytes_per_second as f64)
        }
    });
    inputs.duration_secs = duration_secs;
    inputs.bitrate_bps = duration_secs.filter(|d| *d > 0.0).zip(payload_bytes).map(|(d, bytes)| bytes as f64 * 8.0 / d);

    let mut general = Stream::new(StreamKind::General);
    general.push("Format", "Wave");
    general.push("File size", data.len().to_string());
    if let Some(duration) = duration_secs {
        general.push("Duration", duration.to_string());
    }

    let container = ContainerInfo { duration_seconds: duration_secs, ..Default::default() };
    Ok(Report { general, container, streams: vec![inputs.into_stream()] })
}

/// Decoded fields of a FLAC `STREAMINFO` metadata block (RFC 9639 §8.2).
struct StreamInfo {
    min_block_size: u16,
    max_block_size: u16,
    sample_rate: u32,
    channels: u8,
    bits_per_sample: u8,
    total_samples: u64,
}

fn parse_streaminfo(block: &[u8]) -> Option<StreamInfo> {
    if block.len() < 18 {
        return None;
    }
    let min_block_size = u16::from_be_bytes([block[0], block[1]]);
    let max_block_size = u16::from_be_bytes([block[2], block[3]]);
    // Bytes 8..18: sample_rate(20) channels(3) bits_per_sample(5) total_samples(36).
    let packed = u64::from_be_bytes(block[8..16].try_into().ok()?);
    let sample_rate = (packed >> 44) as u32;
    let channels = ((packed >> 41) & 0b111) as u8 + 1;
    let bits_per_sample = ((packed >> 36) & 0b1_1111) as u8 + 1;
    let total_samples = packed & 0xF_FFFF_FFFF;
    Some(StreamInfo { min_block_size, max_block_size, sample_rate, channels, bits_per_sample, total_samples })
}

/// Builds a report from a file sniffed as native FLAC, by reading the
/// mandatory leading `STREAMINFO` metadata block.
pub fn build_flac_report(path: &Path) -> Result<Report> {
    build_flac_report_from_bytes(&sampling::read_whole(path)?)
}

fn build_flac_report_from_bytes(data: &[u8]) -> Result<Report> {
    if !data.starts_with(b"fLaC") {
        return Err(MediaInfoError::FormatViolation("not a FLAC stream".to_string()));
    }
    let header = data.get(4..8).ok_or(MediaInfoError::NoStreamDiscovered)?;
    let block_len = u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize;
    let block = data.get(8..8 + block_len).ok_or(MediaInfoError::NoStreamDiscovered)?;
    let info = parse_streaminfo(block).ok_or(MediaInfoError::NoStreamDiscovered)?;

    let duration_secs = if info.sample_rate > 0 { Some(info.total_samples as f64 / info.sample_rate as f64) } else { None };
    let stream_size = data.len() as u64;
    let inputs = AudioFieldInputs {
        id: Some("0".to_string()),
        format: Some("FLAC".to_string()),
        channels: Some(info.channels as u16),
        sampling_rate_hz: Some(info.sample_rate),
        bit_depth: Some(info.bits_per_sample),
        duration_secs,
        bitrate_bps: duration_secs.filter(|d| *d > 0.0).map(|d| stream_size as f64 * 8.0 / d),
        stream_size_bytes: Some(stream_size),
        ..Default::default()
    };
    let _ = (info.min_block_size, info.max_block_size);

    let mut general = Stream::new(StreamKind::General);
    general.push("Format", "FLAC");
    general.push("File size", stream_size.to_string());
    if let Some(duration) = duration_secs {
        general.push("Duration", duration.to_string());
    }

    let container = ContainerInfo { duration_seconds: duration_secs, ..Default::default() };
    Ok(Report { general, container, streams: vec![inputs.into_stream()] })
}

/// Builds a report from a file sniffed as Ogg, by reading the first
/// page's identification packet for a Vorbis or Opus stream.
pub fn build_ogg_report(path: &Path) -> Result<Report> {
    build_ogg_report_from_bytes(&sampling::read_whole(path)?)
}

fn build_ogg_report_from_bytes(data: &[u8]) -> Result<Report> {
    if !data.starts_with(b"OggS") {
        return Err(MediaInfoError::FormatViolation("not an Ogg stream".to_string()));
    }
    // Fixed Ogg page header: capture_pattern(4) version(1) header_type(1)
    // granule_position(8) serial(4) sequence(4) checksum(4) segment_count(1),
    // followed by segment_count length bytes then the segment data itself.
    let segment_count = *data.get(26).ok_or(MediaInfoError::NoStreamDiscovered)? as usize;
    let segment_table_end = 27 + segment_count;
    let segment_lengths = data.get(27..segment_table_end).ok_or(MediaInfoError::NoStreamDiscovered)?;
    // Ogg lacing: the first packet's length is the sum of consecutive
    // 255-valued segment lengths up to and including the first one below 255.
    let mut first_packet_len = 0usize;
    for &len in segment_lengths {
        first_packet_len += len as usize;
        if len != 255 {
            break;
        }
    }
    let packet = data.get(segment_table_end..segment_table_end + first_packet_len).ok_or(MediaInfoError::NoStreamDiscovered)?;

    let mut inputs = AudioFieldInputs { id: Some("0".to_string()), stream_size_bytes: Some(data.len() as u64), ..Default::default() };

    if packet.len() >= 7 && &packet[1..7] == b"vorbis" {
        inputs.format = Some("Vorbis".to_string());
        if packet.len() >= 30 {
            inputs.channels = Some(packet[11] as u16);
            inputs.sampling_rate_hz = Some(u32::from_le_bytes(packet[12..16].try_into().unwrap()));
            let bitrate_nominal = i32::from_le_bytes(packet[20..24].try_into().unwrap());
            if bitrate_nominal > 0 {
                inputs.bitrate_bps = Some(bitrate_nominal as f64);
            }
        }
    } else if packet.len() >= 8 && &packet[0..8] == b"OpusHead" {
        inputs.format = Some("Opus".to_string());
        if packet.len() >= 12 {
            inputs.channels = Some(packet[9] as u16);
            inputs.sampling_rate_hz = Some(u32::from_le_bytes(packet[12..16].try_into().unwrap_or([0; 4])));
        }
    } else {
        return Err(MediaInfoError::NoStreamDiscovered);
    }

    let mut general = Stream::new(StreamKind::General);
    general.push("Format", "Ogg");
    general.push("File size", data.len().to_string());

    let container = ContainerInfo::default();
    Ok(Report { general, container, streams: vec![inputs.into_stream()] })
}

/// Builds a report from a file sniffed as a top-level MP3 stream: an
/// optional leading `ID3v2` tag, the first sync frame, and that frame's
/// Xing/Info tag if present.
pub fn build_mp3_report(path: &Path) -> Result<Report> {
    build_mp3_report_from_bytes(&sampling::read_whole(path)?)
}

fn build_mp3_report_from_bytes(data: &[u8]) -> Result<Report> {
    let id3 = id3v2::parse(data);
    let tag_len = id3.as_ref().map(|tag| 10 + tag.tag_size as usize).unwrap_or(0);
    let audio_data = data.get(tag_len..).unwrap_or(&[]);

    let first_frame_offset = (0..audio_data.len()).find(|&offset| FrameHeader::parse(&audio_data[offset..]).is_some());
    let Some(offset) = first_frame_offset else {
        return Err(MediaInfoError::NoStreamDiscovered);
    };
    let first_frame = FrameHeader::parse(&audio_data[offset..]).expect("checked above");
    let frame_body = audio_data.get(offset + 4..).unwrap_or(&[]);
    let xing_tag = xing::parse(&first_frame, frame_body);

    let data_size_bytes = (audio_data.len() - offset) as u64;
    let summary = mpegaudio::summarize(&first_frame, xing_tag.as_ref(), data_size_bytes);

    let inputs = AudioFieldInputs {
        id: Some("0".to_string()),
        format: Some("MPEG Audio".to_string()),
        channels: Some(first_frame.channel_mode.channel_count() as u16),
        sampling_rate_hz: Some(first_frame.sample_rate),
        duration_secs: Some(summary.duration_secs),
        bitrate_bps: Some(summary.bitrate_kbps as f64 * 1000.0),
        bitrate_mode: Some(match summary.bitrate_mode {
            mpegaudio::BitrateMode::Variable => ReportBitrateMode::Variable,
            mpegaudio::BitrateMode::Constant => ReportBitrateMode::Constant,
        }),
        stream_size_bytes: Some(data_size_bytes),
        encoded_library: xing_tag.and_then(|tag| tag.lame_encoder),
        ..Default::default()
    };

    let mut general = Stream::new(StreamKind::General);
    general.push("Format", "MPEG Audio");
    general.push("File size", data.len().to_string());
    general.push("Duration", summary.duration_secs.to_string());
    if let Some(tag) = &id3 {
        if let Some(title) = tag.text_frames.get("TIT2") {
            general.push("Title", title.clone());
        }
        if let Some(album) = tag.text_frames.get("TALB") {
            general.push("Album", album.clone());
        }
        if let Some(artist) = tag.text_frames.get("TPE1") {
            general.push("Performer", artist.clone());
        }
    }

    let container = ContainerInfo { duration_seconds: Some(summary.duration_secs), bitrate_mode: inputs.bitrate_mode, ..Default::default() };
    Ok(Report { general, container, streams: vec![inputs.into_stream()] })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_u32(v: u32) -> [u8; 4] {
        v.to_le_bytes()
    }

    fn wave_bytes(sample_rate: u32, channels: u16, bits_per_sample: u16, sample_count: u32) -> Vec<u8> {
        let block_align = channels * (bits_per_sample / 8);
        let byte_rate = sample_rate * block_align as u32;
        let data_len = sample_count * block_align as u32;

        let mut fmt_body = vec![0u8; 16];
        fmt_body[0..2].copy_from_slice(&1u16.to_le_bytes()); // PCM
        fmt_body[2..4].copy_from_slice(&channels.to_le_bytes());
        fmt_body[4..8].copy_from_slice(&le_u32(sample_rate));
        fmt_body[8..12].copy_from_slice(&le_u32(byte_rate));
        fmt_body[12..14].copy_from_slice(&block_align.to_le_bytes());
        fmt_body[14..16].copy_from_slice(&bits_per_sample.to_le_bytes());

        let mut fmt_chunk = b"fmt ".to_vec();
        fmt_chunk.extend_from_slice(&le_u32(fmt_body.len() as u32));
        fmt_chunk.extend_from_slice(&fmt_body);

        let mut data_chunk = b"data".to_vec();
        data_chunk.extend_from_slice(&le_u32(data_len));
        data_chunk.extend(std::iter::repeat(0u8).take(data_len as usize));

        let mut riff_body = b"WAVE".to_vec();
        riff_body.extend_from_slice(&fmt_chunk);
        riff_body.extend_from_slice(&data_chunk);

        let mut file = b"RIFF".to_vec();
        file.extend_from_slice(&le_u32(riff_body.len() as u32));
        file.extend_from_slice(&riff_body);
        file
    }

    #[test]
    fn wave_report_reads_fmt_and_computes_duration() {
        let data = wave_bytes(44_100, 2, 16, 44_100);
        let report = build_wave_report_from_bytes(&data).unwrap();
        assert_eq!(report.general.raw.get("Format").map(String::as_str), Some("Wave"));
        let stream = &report.streams[0];
        assert_eq!(stream.raw.get("Channel(s)").map(String::as_str), Some("2"));
        assert_eq!(stream.raw.get("Sampling rate").map(String::as_str), Some("44100"));
        assert_eq!(report.container.duration_seconds, Some(1.0));
    }

    #[test]
    fn wave_report_rejects_non_riff_input() {
        assert!(build_wave_report_from_bytes(b"not a wave file").is_err());
    }

    fn flac_bytes(sample_rate: u32, channels: u8, bits_per_sample: u8, total_samples: u64) -> Vec<u8> {
        let mut block = vec![0u8; 18];
        block[0..2].copy_from_slice(&0u16.to_be_bytes()); // min_block_size
        block[2..4].copy_from_slice(&0u16.to_be_bytes()); // max_block_size
        let packed: u64 = ((sample_rate as u64) << 44)
            | (((channels - 1) as u64) << 41)
            | (((bits_per_sample - 1) as u64) << 36)
            | (total_samples & 0xF_FFFF_FFFF);
        block[8..16].copy_from_slice(&packed.to_be_bytes());

        let mut file = b"fLaC".to_vec();
        file.push(0x80); // last-metadata-block flag set, type 0 (STREAMINFO)
        let block_len = block.len() as u32;
        file.extend_from_slice(&block_len.to_be_bytes()[1..]); // 24-bit length
        file.extend_from_slice(&block);
        file
    }

    #[test]
    fn flac_report_decodes_streaminfo() {
        let data = flac_bytes(48_000, 2, 16, 48_000);
        let report = build_flac_report_from_bytes(&data).unwrap();
        let stream = &report.streams[0];
        assert_eq!(stream.raw.get("Format").map(String::as_str), Some("FLAC"));
        assert_eq!(stream.raw.get("Channel(s)").map(String::as_str), Some("2"));
        assert_eq!(stream.raw.get("Sampling rate").map(String::as_str), Some("48000"));
        assert_eq!(stream.raw.get("Bit depth").map(String::as_str), Some("16"));
        assert_eq!(report.container.duration_seconds, Some(1.0));
    }

    #[test]
    fn flac_report_rejects_missing_magic() {
        assert!(build_flac_report_from_bytes(b"not flac").is_err());
    }

    fn ogg_vorbis_identification_page() -> Vec<u8> {
        let mut packet = vec![0x01];
        packet.extend_from_slice(b"vorbis");
        packet.extend_from_slice(&0u32.to_le_bytes()); // vorbis_version
        packet.push(2); // channels
        packet.extend_from_slice(&48_000u32.to_le_bytes()); // sample_rate
        packet.extend_from_slice(&0i32.to_le_bytes()); // bitrate_maximum
        packet.extend_from_slice(&128_000i32.to_le_bytes()); // bitrate_nominal
        packet.extend_from_slice(&0i32.to_le_bytes()); // bitrate_minimum
        packet.push(0); // blocksizes
        packet.push(1); // framing bit

        let mut page = b"OggS".to_vec();
        page.push(0); // version
        page.push(0x02); // header_type: beginning of stream
        page.extend_from_slice(&0u64.to_le_bytes()); // granule_position
        page.extend_from_slice(&1u32.to_le_bytes()); // serial number
        page.extend_from_slice(&0u32.to_le_bytes()); // page sequence
        page.extend_from_slice(&0u32.to_le_bytes()); // checksum
        page.push(1); // segment count
        page.push(packet.len() as u8);
        page.extend_from_slice(&packet);
        page
    }

    #[test]
    fn ogg_report_identifies_vorbis_stream() {
        let data = ogg_vorbis_identification_page();
        let report = build_ogg_report_from_bytes(&data).unwrap();
        let stream = &report.streams[0];
        assert_eq!(stream.raw.get("Format").map(String::as_str), Some("Vorbis"));
        assert_eq!(stream.raw.get("Channel(s)").map(String::as_str), Some("2"));
        assert_eq!(stream.raw.get("Sampling rate").map(String::as_str), Some("48000"));
    }

    #[test]
    fn ogg_report_rejects_missing_capture_pattern() {
        assert!(build_ogg_report_from_bytes(b"not ogg at all").is_err());
    }

    fn mp3_frame() -> [u8; 4] {
        // MPEG1 Layer III, 128 kbps, 44100 Hz, stereo, no CRC, no padding.
        [0xFF, 0xFB, 0x90, 0x00]
    }

    #[test]
    fn mp3_report_reads_first_frame() {
        let header = mp3_frame();
        let frame_size = 144 * 128_000 / 44_100;
        let mut data = header.to_vec();
        data.extend(std::iter::repeat(0u8).take(frame_size - header.len()));
        data.extend_from_slice(&header);
        data.extend(std::iter::repeat(0u8).take(frame_size - header.len()));

        let report = build_mp3_report_from_bytes(&data).unwrap();
        let stream = &report.streams[0];
        assert_eq!(stream.raw.get("Format").map(String::as_str), Some("MPEG Audio"));
        assert_eq!(stream.raw.get("Channel(s)").map(String::as_str), Some("2"));
        assert_eq!(stream.raw.get("Sampling rate").map(String::as_str), Some("44100"));
    }

    #[test]
    fn mp3_report_rejects_stream_with_no_sync_frame() {
        assert!(build_mp3_report_from_bytes(&[0u8; 32]).is_err());
    }
}
