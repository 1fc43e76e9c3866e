//! Demultiplexer: walks a Program Stream byte buffer start-code by
//! start-code, reassembling PES payloads and routing them to per-stream
//! codec accumulators.

use std::collections::HashMap;

use eia608::FirstCommandKind;

use crate::pack;
use crate::stream::{CodecRecord, PsStreamState, StreamKey, StreamKind};
use crate::substream::{self, PrivateKind, AC3_SUBSTREAM_HEADER_LEN};

/// Target size of the head/tail sampling window used by callers reading
/// with `parse_speed < 1.0`; the demultiplexer itself just consumes
/// whatever bytes it is given.
pub const SAMPLE_WINDOW_BYTES: usize = 8 * 1024 * 1024;

/// Any byte at or above this value following a `00 00 01` prefix is a
/// recognized top-level Program Stream code (`MPEG_program_end_code`
/// through `program_stream_directory`). Bytes below it are MPEG-2 video's
/// own internal start codes (picture, slice, sequence, GOP, extension,
/// user_data) and must never be mistaken for a stream boundary when
/// resuming the scan after an unbounded-length PES.
const FIRST_SYSTEM_STREAM_ID: u8 = 0xB9;

fn is_known_stream_id(byte: u8) -> bool {
    byte >= FIRST_SYSTEM_STREAM_ID
}

/// Demultiplexes a Program Stream buffer in one pass.
#[derive(Debug, Default)]
pub struct Demuxer {
    streams: HashMap<StreamKey, PsStreamState>,
    discovery_order: Vec<StreamKey>,
}

/// Closed-caption summary surfaced alongside a video stream, per the "at
/// most one captions Text stream per video" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionSummary {
    /// `CC1` or `CC3`, matching the selected field.
    pub service_name: &'static str,
    /// Frame index of the first caption byte pair.
    pub first_frame: i64,
    /// Frame index of the last caption byte pair.
    pub last_frame: i64,
    /// PTS of the first caption byte pair, if the owning PES carried one.
    pub first_pts: Option<u64>,
    /// Whether the first control code looked like pop-on captioning.
    pub is_pop_on: bool,
}

/// Finalized per-stream summary produced by `Demuxer::finalize`.
#[derive(Debug, Clone)]
pub struct FinalizedStream {
    /// Stream identity (`stream_id`, and sub-stream ID for private streams).
    pub key: StreamKey,
    /// Coarse kind used for stream ordering.
    pub kind: StreamKind,
    /// Duration in seconds, from the PTS/DTS tracker (video gets two extra
    /// frame periods to approximate the last frame's length, when a frame
    /// rate was recovered from an MPEG-2 sequence header).
    pub duration_secs: Option<f64>,
    /// Average bitrate in bits per second.
    pub bitrate_bps: Option<f64>,
    /// Caption summary, for a video stream whose payload carried
    /// `user_data` closed captions.
    pub captions: Option<CaptionSummary>,
}

impl Demuxer {
    /// Creates an empty demultiplexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `data` start-code by start-code, feeding every PES payload it
    /// finds to the matching stream's codec accumulator. Each call is
    /// self-contained: an unbounded-length PES whose frontier isn't found
    /// before the end of `data` is flushed with whatever bytes remain,
    /// rather than carried over to a later call. This matches the
    /// sampled-window model (one or two large in-memory chunks), not a
    /// continuous streaming reader.
    pub fn observe(&mut self, data: &[u8]) {
        let mut offset = 0;
        while offset + 4 <= data.len() {
            if !(data[offset] == 0 && data[offset + 1] == 0 && data[offset + 2] == 1) {
                offset += 1;
                continue;
            }
            let code = data[offset + 3];
            if !is_known_stream_id(code) {
                offset += 1;
                continue;
            }

            match code {
                0xB9 => offset += 4,
                0xBA => match pack::parse_pack_header(&data[offset + 4..]) {
                    Ok((_, consumed)) => offset += 4 + consumed,
                    Err(err) => {
                        tracing::debug!(%err, offset, "stopping scan at malformed pack header");
                        break;
                    }
                },
                0xBB => match pack::skip_system_header(&data[offset + 4..]) {
                    Ok(consumed) => offset += 4 + consumed,
                    Err(err) => {
                        tracing::debug!(%err, offset, "stopping scan at malformed system header");
                        break;
                    }
                },
                _ => match self.consume_pes(data, offset, code) {
                    Some(advance) => offset += advance,
                    None => {
                        tracing::debug!(offset, code, "stopping scan at truncated PES");
                        break;
                    }
                },
            }
        }
    }

    /// Parses one PES-shaped packet (stream_id + 16-bit length + optional
    /// header) at `offset` and routes its payload. Returns the number of
    /// bytes to advance `offset` by, or `None` if the packet is truncated
    /// and the caller should stop for this window.
    fn consume_pes(&mut self, data: &[u8], offset: usize, code: u8) -> Option<usize> {
        let packet = &data[offset..];
        let header = ts::pes::parse(packet)?;

        if header.packet_length != 0 {
            let body_len = (header.packet_length as usize).checked_sub(header.header_len - 6)?;
            let total = header.header_len + body_len;
            if packet.len() < total {
                return None;
            }
            let body = &packet[header.header_len..total];
            self.dispatch(code, body, header.pts, header.dts);
            return Some(total);
        }

        // Unbounded length: find the next known top-level start code,
        // checking the candidate's stream_id byte so we don't split on an
        // embedded MPEG-2/H.264 start code inside the video payload.
        let body_start = offset + header.header_len;
        let frontier = find_next_known_start(data, body_start).unwrap_or(data.len());
        let body = &data[body_start..frontier];
        self.dispatch(code, body, header.pts, header.dts);
        Some(frontier - offset)
    }

    fn dispatch(&mut self, stream_id: u8, body: &[u8], pts: Option<u64>, dts: Option<u64>) {
        let (key, payload, skip_offset) = if stream_id == 0xBD {
            let Some(&sub_id) = body.first() else { return };
            let mut skip = 1;
            if matches!(substream::classify(sub_id), PrivateKind::Ac3) {
                skip += AC3_SUBSTREAM_HEADER_LEN;
            }
            (StreamKey { stream_id, sub_id: Some(sub_id) }, body, skip)
        } else if matches!(stream_id, 0xC0..=0xDF | 0xE0..=0xEF) {
            (StreamKey { stream_id, sub_id: None }, body, 0)
        } else {
            // Padding, private_stream_2, program_stream_map, and reserved
            // system streams carry no useful payload.
            return;
        };

        if payload.len() < skip_offset {
            return;
        }
        let payload = &payload[skip_offset..];

        let state = self.streams.entry(key).or_insert_with(|| {
            let discovery_order = self.discovery_order.len();
            self.discovery_order.push(key);
            tracing::debug!(stream_id = key.stream_id, sub_id = ?key.sub_id, "discovered elementary stream");
            PsStreamState::new(key, discovery_order)
        });
        state.packet_count += 1;
        state.bytes += payload.len() as u64;
        if let Some(pts) = pts {
            state.pts.add(pts);
        }
        if let Some(dts) = dts {
            state.dts.add(dts);
        }
        state.codec.observe(payload, pts);
    }

    /// Returns the accumulated state for one stream, for callers that need
    /// codec-specific detail (SPS, sequence header, ADTS frame) beyond what
    /// [`FinalizedStream`] summarizes.
    pub fn stream(&self, key: StreamKey) -> Option<&PsStreamState> {
        self.streams.get(&key)
    }

    /// Returns one finalized summary per stream, in discovery order.
    pub fn finalize(&self) -> Vec<FinalizedStream> {
        self.discovery_order
            .iter()
            .filter_map(|key| {
                let state = self.streams.get(key)?;
                let is_video = state.kind() == StreamKind::Video;
                let duration_secs = Self::stream_duration(state, is_video);
                let bitrate_bps = duration_secs.filter(|d| *d > 0.0).map(|d| state.bytes as f64 * 8.0 / d);
                let captions = Self::caption_summary(state);
                Some(FinalizedStream {
                    key: *key,
                    kind: state.kind(),
                    duration_secs,
                    bitrate_bps,
                    captions,
                })
            })
            .collect()
    }

    fn stream_duration(state: &PsStreamState, is_video: bool) -> Option<f64> {
        let mut duration = state.pts.duration().or_else(|| state.dts.duration())?;
        if is_video {
            if let CodecRecord::Mpeg2Video { analyzer, .. } = &state.codec {
                if let Some((num, den)) = analyzer.sequence_header.as_ref().and_then(|h| h.frame_rate) {
                    duration += 2.0 * (den as f64 / num as f64);
                }
            }
        }
        Some(duration)
    }

    fn caption_summary(state: &PsStreamState) -> Option<CaptionSummary> {
        let CodecRecord::Mpeg2Video { captions, .. } = &state.codec else {
            return None;
        };
        let (name, track) = captions.selected()?;
        // `selected()`'s `&str` borrows from `&self`, not `'static`; this
        // summary outlives that borrow, so re-anchor to a fresh literal.
        let service_name: &'static str = if name == "CC3" { "CC3" } else { "CC1" };
        Some(CaptionSummary {
            service_name,
            first_frame: track.first_frame,
            last_frame: track.last_frame,
            first_pts: track.first_pts,
            is_pop_on: track.first_type == Some(FirstCommandKind::PopOn),
        })
    }
}

fn find_next_known_start(data: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 4 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 && is_known_stream_id(data[i + 3]) {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pes_packet(stream_id: u8, payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x01, stream_id];
        let len = (3 + payload.len()) as u16; // flags + header_data_length + payload, no PTS
        data.extend_from_slice(&len.to_be_bytes());
        data.push(0x80); // '10' marker bits, no scrambling/priority/copyright/original
        data.push(0x00); // no PTS/DTS flags set
        data.push(0x00); // PES_header_data_length = 0
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn skips_pack_and_system_headers_then_reads_audio_pes() {
        let mut data = vec![0x44, 0x00, 0x04, 0x00, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00];
        let mut packet = vec![0x00, 0x00, 0x01, 0xBA];
        packet.append(&mut data);
        packet.extend_from_slice(&pes_packet(0xC0, &[0xFF, 0xFB, 0x90, 0x00]));

        let mut demux = Demuxer::new();
        demux.observe(&packet);

        let finalized = demux.finalize();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].key.stream_id, 0xC0);
        assert_eq!(finalized[0].kind, StreamKind::Audio);
    }

    #[test]
    fn private_ac3_stream_strips_substream_header() {
        let mut payload = vec![0x80, 0x01, 0x00, 0x00]; // sub_id + 3-byte header
        payload.extend_from_slice(&[0x0B, 0x77, 0x00, 0x00]); // fake AC-3 sync
        let packet = pes_packet(0xBD, &payload);

        let mut demux = Demuxer::new();
        demux.observe(&packet);

        let finalized = demux.finalize();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].key.sub_id, Some(0x80));
        assert_eq!(finalized[0].kind, StreamKind::Audio);
    }

    #[test]
    fn unbounded_video_pes_stops_at_next_known_stream_id_not_embedded_start_code() {
        // PES with packet_length = 0 (unbounded), video payload contains an
        // embedded MPEG-2 picture start code (0x00) that must not be
        // mistaken for a top-level stream boundary.
        let mut packet = vec![0x00, 0x00, 0x01, 0xE0, 0x00, 0x00, 0x80, 0x00, 0x00];
        packet.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0xAA, 0xBB]); // embedded picture start code
        packet.extend_from_slice(&[0x00, 0x00, 0x01, 0xB9]); // MPEG_program_end_code: real boundary

        let mut demux = Demuxer::new();
        demux.observe(&packet);

        let finalized = demux.finalize();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].key.stream_id, 0xE0);
    }

    #[test]
    fn private_subpicture_and_padding_streams_are_not_surfaced() {
        let mut packet = pes_packet(0xBE, &[0, 0, 0, 0]); // padding_stream
        packet.extend_from_slice(&pes_packet(0xBD, &[0x21, 0xAA, 0xBB])); // subpicture

        let mut demux = Demuxer::new();
        demux.observe(&packet);

        let finalized = demux.finalize();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].kind, StreamKind::Subpicture);
    }
}
