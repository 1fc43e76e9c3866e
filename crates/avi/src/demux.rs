//! Top-level AVI parsing: verifies the `RIFF`/`AVI ` header, walks
//! `hdrl`/`strl` to assemble per-stream metadata, and — depending on
//! `parse_speed` and whether an `idx1` index is present — either fully
//! traverses `movi` or relies on the index for byte counts while only
//! scanning a short `movi` prefix for codec-specific fields.

use std::collections::HashMap;

use crate::avih::{self, MainHeader};
use crate::error::{AviError, Result};
use crate::idx1::{self, InterleaveStats};
use crate::mp3scan::{self, Mp3ScanResult};
use crate::mpeg4visual;
use crate::movi::{self, ScanTargets};
use crate::riff::{find_chunk, find_list, iter_chunks, list_type_and_body};
use crate::strf::{self, AudioFormat, VideoFormat, WAVE_FORMAT_MP3};
use crate::strh::{self, StreamHeader, StreamKind};

const MPEG4_VISUAL_FOURCCS: [[u8; 4]; 4] = [*b"FMP4", *b"MP4V", *b"DIVX", *b"XVID"];

/// One `strl`'s worth of stream metadata.
#[derive(Debug, Clone)]
pub struct Stream {
    /// Index within the file, as used by `movi` chunk ids and `idx1`.
    pub index: u32,
    /// `strh` fields.
    pub header: StreamHeader,
    /// `strf` fields, if this is a video stream.
    pub video_format: Option<VideoFormat>,
    /// `strf` fields, if this is an audio stream.
    pub audio_format: Option<AudioFormat>,
    /// Total payload bytes across `movi`, from a full traversal or
    /// `idx1`.
    pub byte_count: Option<u64>,
}

impl Stream {
    /// The stream's codec four-cc: the video `strf`'s `biCompression`
    /// when it's set, otherwise `strh`'s `fccHandler`.
    pub fn codec_fourcc(&self) -> [u8; 4] {
        match &self.video_format {
            Some(format) if format.compression != [0; 4] => format.compression,
            _ => self.header.fcc_handler,
        }
    }

    /// Average bitrate in bits/sec, from this stream's byte count and
    /// duration, or `None` if either is unavailable.
    pub fn bitrate_bps(&self) -> Option<f64> {
        let bytes = self.byte_count?;
        let seconds = self.header.duration_seconds()?;
        if seconds <= 0.0 {
            return None;
        }
        Some(bytes as f64 * 8.0 / seconds)
    }
}

/// Everything this crate extracts from one AVI file.
#[derive(Debug)]
pub struct Movie {
    /// `avih` fields.
    pub main_header: Option<MainHeader>,
    /// One entry per `strl`.
    pub streams: Vec<Stream>,
    /// Interleave statistics derived from `idx1`, if present.
    pub interleave: Option<InterleaveStats>,
    /// MPEG-4 Visual VOL/VOP observations, if a stream's codec matched
    /// `FMP4`/`MP4V`/`DIVX`/`XVID`.
    pub mpeg4_visual: Option<mpeg4visual::Scanner>,
    /// MP3 codec-specific scan result, if a stream's `strf` format tag
    /// was `0x55`.
    pub mp3: Option<Mp3ScanResult>,
}

fn parse_streams(hdrl_body: &[u8]) -> Vec<Stream> {
    iter_chunks(hdrl_body)
        .filter_map(|chunk| list_type_and_body(&chunk))
        .filter(|(list_type, _)| list_type == b"strl")
        .enumerate()
        .filter_map(|(index, (_, strl_body))| {
            let header = find_chunk(strl_body, b"strh").and_then(|c| strh::parse(c.body))?;
            let strf_body = find_chunk(strl_body, b"strf").map(|c| c.body);
            let (video_format, audio_format) = match (header.kind, strf_body) {
                (StreamKind::Video, Some(body)) => (strf::parse_video(body), None),
                (StreamKind::Audio, Some(body)) => (None, strf::parse_audio(body)),
                _ => (None, None),
            };
            Some(Stream { index: index as u32, header, video_format, audio_format, byte_count: None })
        })
        .collect()
}

fn find_mpeg4_visual_stream(streams: &[Stream]) -> Option<u32> {
    streams
        .iter()
        .find(|s| s.header.kind == StreamKind::Video && MPEG4_VISUAL_FOURCCS.contains(&s.codec_fourcc()))
        .map(|s| s.index)
}

fn find_mp3_stream(streams: &[Stream]) -> Option<u32> {
    streams
        .iter()
        .find(|s| matches!(&s.audio_format, Some(format) if format.format_tag == WAVE_FORMAT_MP3))
        .map(|s| s.index)
}

/// Parses an in-memory AVI buffer. `parse_speed` gates how much of
/// `movi` gets traversed: `>= 1.0` always fully traverses it; below that,
/// an `idx1` index (when present) is used for byte counts instead, and
/// only [`movi::PARTIAL_SCAN_WINDOW`] bytes of `movi` are scanned for
/// codec-specific fields.
pub fn parse(data: &[u8], parse_speed: f32) -> Result<Movie> {
    let (riff, _) = crate::riff::read_chunk(data, 0)?.ok_or(AviError::NotRiffAvi)?;
    if !riff.is(b"RIFF") || riff.body.get(0..4) != Some(b"AVI ".as_slice()) {
        return Err(AviError::NotRiffAvi);
    }
    let body = &riff.body[4..];

    let main_header = find_list(body, b"hdrl").and_then(|hdrl| find_chunk(hdrl, b"avih")).and_then(|c| avih::parse(c.body));
    if main_header.is_none() {
        tracing::warn!("hdrl has no usable avih");
    }

    let mut streams = find_list(body, b"hdrl").map(parse_streams).unwrap_or_default();
    tracing::debug!(stream_count = streams.len(), "parsed hdrl");

    let index_entries = find_chunk(body, b"idx1").map(|c| idx1::parse(c.body));
    let interleave = index_entries.as_deref().map(idx1::interleave_stats);

    let mpeg4_visual_stream = find_mpeg4_visual_stream(&streams);
    let mp3_stream = find_mp3_stream(&streams);
    let targets = ScanTargets { mpeg4_visual_stream, mp3_stream };

    let movi_body = find_list(body, b"movi");
    let full_traverse = parse_speed >= 1.0 || index_entries.is_none();

    let (byte_counts, scan_result) = match (movi_body, full_traverse) {
        (Some(movi_body), true) => {
            let result = movi::scan(movi_body, targets);
            (result.byte_counts.clone(), Some(result))
        }
        (Some(movi_body), false) => {
            let window = &movi_body[..movi_body.len().min(movi::PARTIAL_SCAN_WINDOW)];
            let result = movi::scan(window, targets);
            let byte_counts = index_byte_counts(index_entries.as_deref().unwrap_or_default());
            (byte_counts, Some(result))
        }
        (None, _) => {
            tracing::warn!("no movi list found");
            (HashMap::new(), None)
        }
    };

    for stream in &mut streams {
        stream.byte_count = byte_counts.get(&stream.index).copied();
    }

    let mpeg4_visual = scan_result.as_ref().and_then(|r| {
        (mpeg4_visual_stream.is_some() && (r.mpeg4_visual.vol.is_some() || r.mpeg4_visual.vop_count() > 0))
            .then(|| &r.mpeg4_visual)
            .cloned()
    });

    let mp3 = scan_result.as_ref().and_then(|r| {
        let stream_bytes = mp3_stream.and_then(|index| byte_counts.get(&index).copied()).unwrap_or(r.mp3_payload.len() as u64);
        mp3scan::scan(&r.mp3_payload, stream_bytes)
    });

    Ok(Movie { main_header, streams, interleave, mpeg4_visual, mp3 })
}

fn index_byte_counts(entries: &[idx1::IndexEntry]) -> HashMap<u32, u64> {
    let mut counts = HashMap::new();
    for entry in entries {
        *counts.entry(entry.stream_index).or_insert(0u64) += entry.size as u64;
    }
    counts
}
