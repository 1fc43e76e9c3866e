//! Demultiplexer: stitches PAT/PMT table tracking, continuity checking, PES
//! reassembly, and per-PID codec accumulation into one pass over a packet
//! stream.

use std::collections::{HashMap, HashSet};

use crate::descriptor;
use crate::packet::{PID_PAT, TsPacket};
use crate::pat::Pat;
use crate::pes;
use crate::pmt::{Pmt, StreamType};
use crate::stream::{CodecRecord, StreamKind, TsStreamState};

/// Target size of the head/tail sampling window used by callers reading
/// with `parse_speed < 1.0`; the demultiplexer itself is agnostic to how
/// its input was sampled, it just consumes whatever bytes it is given.
pub const SAMPLE_WINDOW_BYTES: usize = 8 * 1024 * 1024;

/// Demultiplexes a Transport Stream packet-by-packet.
#[derive(Debug)]
pub struct Demuxer {
    pat: Option<Pat>,
    pat_version: Option<u8>,
    pmt_versions: HashMap<u16, u8>,
    streams: HashMap<u16, TsStreamState>,
    discovery_order: Vec<u16>,
    packet_index: u64,
    is_bdav: bool,
}

/// Finalized per-stream summary produced by `Demuxer::finalize`.
#[derive(Debug, Clone)]
pub struct FinalizedStream {
    /// Elementary PID.
    pub pid: u16,
    /// Declared stream type.
    pub stream_type: StreamType,
    /// ISO 639 language code, if known.
    pub language: Option<String>,
    /// Coarse kind used for stream ordering.
    pub kind: StreamKind,
    /// Duration in seconds, from the PTS/DTS tracker (video gets two
    /// extra frame periods to approximate the last frame's length).
    pub duration_secs: Option<f64>,
    /// Average bitrate in bits per second.
    pub bitrate_bps: Option<f64>,
}

impl Demuxer {
    /// Creates an empty demultiplexer. `is_bdav` selects the BDAV ordering
    /// rule at `finalize()` time instead of the plain-TS canonical rule.
    pub fn new(is_bdav: bool) -> Self {
        Self {
            pat: None,
            pat_version: None,
            pmt_versions: HashMap::new(),
            streams: HashMap::new(),
            discovery_order: Vec::new(),
            packet_index: 0,
            is_bdav,
        }
    }

    /// Resynchronizes on `0x47` and feeds every complete 188-byte packet in
    /// `data` through the demultiplexer. Truncated packets at the end of
    /// `data` are silently skipped.
    pub fn observe(&mut self, data: &[u8]) {
        let mut offset = 0;
        while offset + 188 <= data.len() {
            if data[offset] != 0x47 {
                match memchr::memchr(0x47, &data[offset + 1..]) {
                    Some(next) => {
                        offset += 1 + next;
                        continue;
                    }
                    None => break,
                }
            }
            if let Ok(packet) = TsPacket::parse(&data[offset..offset + 188]) {
                self.observe_packet(&packet);
            }
            offset += 188;
        }
    }

    fn observe_packet(&mut self, packet: &TsPacket) {
        self.packet_index += 1;

        if packet.pid == PID_PAT {
            self.observe_pat(packet);
            return;
        }
        if self.is_pmt_pid(packet.pid) {
            self.observe_pmt(packet);
            return;
        }
        self.observe_elementary(packet);
    }

    fn is_pmt_pid(&self, pid: u16) -> bool {
        self.pat
            .as_ref()
            .map(|pat| pat.programs.iter().any(|p| p.program_number != 0 && p.pmt_pid == pid))
            .unwrap_or(false)
    }

    fn observe_pat(&mut self, packet: &TsPacket) {
        let Some(payload) = packet.get_psi_payload() else {
            return;
        };
        let pat = match Pat::parse(&payload) {
            Ok(pat) => pat,
            Err(err) => {
                tracing::debug!(%err, "discarding malformed PAT section");
                return;
            }
        };
        if self.pat_version == Some(pat.version_number) {
            return;
        }
        self.pat_version = Some(pat.version_number);
        self.pat = Some(pat);
    }

    fn observe_pmt(&mut self, packet: &TsPacket) {
        let Some(payload) = packet.get_psi_payload() else {
            return;
        };
        let pmt = match Pmt::parse(&payload) {
            Ok(pmt) => pmt,
            Err(err) => {
                tracing::debug!(%err, pid = packet.pid, "discarding malformed PMT section");
                return;
            }
        };
        if self.pmt_versions.get(&packet.pid) == Some(&pmt.version_number) {
            return;
        }
        self.pmt_versions.insert(packet.pid, pmt.version_number);

        for pmt_stream in &pmt.streams {
            let language = descriptor::find_language(&pmt_stream.es_info);
            self.merge_stream(pmt_stream.elementary_pid, pmt_stream.stream_type, pmt.program_number, language);
        }
    }

    /// Creates or updates a stream's PMT-derived identity, preserving an
    /// already-known language when the new mapping's language is blank.
    fn merge_stream(&mut self, pid: u16, stream_type: StreamType, program_number: u16, language: Option<String>) {
        if let Some(existing) = self.streams.get_mut(&pid) {
            existing.merge_pmt(stream_type, program_number, language);
            return;
        }
        let discovery_order = self.discovery_order.len();
        self.discovery_order.push(pid);
        tracing::debug!(pid, ?stream_type, program_number, "discovered elementary stream");
        let mut state = TsStreamState::new(pid, stream_type, program_number, discovery_order, self.packet_index);
        state.language = language;
        self.streams.insert(pid, state);
    }

    fn observe_elementary(&mut self, packet: &TsPacket) {
        let Some(state) = self.streams.get_mut(&packet.pid) else {
            return;
        };
        state.packet_count += 1;

        if let Some(pcr) = packet.pcr() {
            state.last_pcr = Some(pcr);
        }

        let Some(payload) = &packet.payload else {
            return;
        };

        if packet.has_payload() {
            let cc = packet.continuity_counter;
            if let Some(last_cc) = state.last_continuity_counter {
                if cc == last_cc {
                    return; // duplicate packet, ignore
                }
                if cc != (last_cc + 1) % 16 {
                    tracing::debug!(pid = packet.pid, last_cc, cc, "continuity discontinuity, dropping pending PES");
                    state.pending.clear();
                    state.pending_needed = None;
                }
            }
            state.last_continuity_counter = Some(cc);
        }

        if packet.payload_unit_start_indicator {
            Self::flush_pending(state);
            if let Some(header) = pes::parse(payload) {
                if let Some(pts) = header.pts {
                    state.pts.add(pts);
                }
                if let Some(dts) = header.dts {
                    state.dts.add(dts);
                }
                let body = &payload[header.header_len.min(payload.len())..];
                state.bytes += body.len() as u64;
                state.pending.extend_from_slice(body);
                state.pending_needed = if header.packet_length == 0 {
                    None
                } else {
                    Some((header.packet_length as usize).saturating_sub(header.header_len - 6))
                };
                Self::drain_if_complete(state);
            }
        } else {
            state.bytes += payload.len() as u64;
            state.pending.extend_from_slice(payload);
            Self::drain_if_complete(state);
        }
    }

    fn flush_pending(state: &mut TsStreamState) {
        if !state.pending.is_empty() {
            let payload = std::mem::take(&mut state.pending);
            state.codec.observe(&payload);
        }
        state.pending_needed = None;
    }

    fn drain_if_complete(state: &mut TsStreamState) {
        if let Some(needed) = state.pending_needed {
            if state.pending.len() >= needed {
                let payload = std::mem::take(&mut state.pending);
                state.codec.observe(&payload);
                state.pending_needed = None;
            }
        }
    }

    /// Direct access to a stream's accumulated state, for codec-level
    /// detail that outlives the summary `finalize()` produces.
    pub fn stream(&self, pid: u16) -> Option<&TsStreamState> {
        self.streams.get(&pid)
    }

    /// Flushes any still-pending PES payloads and returns one finalized
    /// summary per stream, ordered per the canonical or BDAV rule.
    pub fn finalize(&mut self) -> Vec<FinalizedStream> {
        let pids: Vec<u16> = self.streams.keys().copied().collect();
        for pid in pids {
            if let Some(state) = self.streams.get_mut(&pid) {
                Self::flush_pending(state);
            }
        }

        let order = if self.is_bdav { self.bdav_order() } else { self.canonical_order() };

        order
            .into_iter()
            .filter_map(|pid| {
                let state = self.streams.get(&pid)?;
                let is_video = state.kind() == StreamKind::Video;
                let duration_secs = Self::stream_duration(state, is_video);
                let bitrate_bps = duration_secs.filter(|d| *d > 0.0).map(|d| state.bytes as f64 * 8.0 / d);
                Some(FinalizedStream {
                    pid,
                    stream_type: state.stream_type,
                    language: state.language.clone(),
                    kind: state.kind(),
                    duration_secs,
                    bitrate_bps,
                })
            })
            .collect()
    }

    fn stream_duration(state: &TsStreamState, is_video: bool) -> Option<f64> {
        let mut duration = state.pts.duration().or_else(|| state.dts.duration())?;
        if is_video {
            if let Some((num, den)) = Self::video_frame_period(state) {
                duration += 2.0 * (den as f64 / num as f64);
            }
        }
        Some(duration)
    }

    fn video_frame_period(state: &TsStreamState) -> Option<(u32, u32)> {
        match &state.codec {
            CodecRecord::Mpeg2Video(analyzer) => analyzer.sequence_header.as_ref()?.frame_rate,
            _ => None,
        }
    }

    /// Video, then audio, then everything else; first-seen order within
    /// each group, duplicates removed.
    fn canonical_order(&self) -> Vec<u16> {
        let mut seen = HashSet::new();
        let mut video = Vec::new();
        let mut audio = Vec::new();
        let mut other = Vec::new();
        for &pid in &self.discovery_order {
            if !seen.insert(pid) {
                continue;
            }
            let Some(state) = self.streams.get(&pid) else {
                continue;
            };
            match state.kind() {
                StreamKind::Video => video.push(pid),
                StreamKind::Audio => audio.push(pid),
                StreamKind::Other => other.push(pid),
            }
        }
        video.into_iter().chain(audio).chain(other).collect()
    }

    /// BDAV (Blu-ray) streams are physically authored with each text/PG
    /// stream's PID immediately preceding its paired audio PID, so
    /// preserving discovery order (deduplicated) reproduces that pairing
    /// without needing a separate association rule.
    fn bdav_order(&self) -> Vec<u16> {
        let mut seen = HashSet::new();
        self.discovery_order.iter().copied().filter(|pid| seen.insert(*pid)).collect()
    }
}
