//! Per-PID stream state accumulated while demultiplexing.

use crate::pts::PtsTracker;
use crate::pmt::StreamType;

/// The codec-specific accumulator for one elementary stream. Only the
/// variant matching the stream's `stream_type` is ever populated; this is
/// a closed tagged union rather than a trait object so each variant's
/// fields stay concrete and inspectable.
#[derive(Debug, Default)]
pub enum CodecRecord {
    /// No codec-specific parsing applies (unknown/unsupported stream type).
    #[default]
    None,
    /// ADTS or LATM/LOAS AAC audio.
    Aac {
        /// Most recently parsed ADTS frame header, if any ADTS frames were
        /// found (LATM/LOAS streams leave this `None`).
        last_adts: Option<aac::AdtsHeader>,
        /// Most recently parsed `AudioMuxElement`, for LATM/LOAS streams.
        last_latm: Option<aac::AudioMuxElement>,
        /// Length of the current back-to-back run of matching ADTS frames.
        confirmed_run: usize,
    },
    /// AC-3 audio.
    Ac3(Option<ac3::SyncFrameHeader>),
    /// MPEG-1/2 Layer I/II/III audio.
    MpegAudio {
        /// Header of the first frame found.
        first_frame: Option<mpegaudio::FrameHeader>,
        /// Xing/Info VBR tag, if the first frame carried one.
        xing: Option<mpegaudio::XingTag>,
        /// Total elementary-stream bytes observed, for CBR duration math.
        bytes_seen: u64,
    },
    /// MPEG-2 (H.262) video.
    Mpeg2Video(mpeg2video::Analyzer),
    /// H.264/AVC video.
    H264 {
        /// The first SPS observed, if any.
        sps: Option<h264::Sps>,
        /// Coding kind of every slice observed, in order, for GOP inference.
        picture_kinds: Vec<h264::PictureKind>,
    },
}

impl CodecRecord {
    /// Creates the appropriate empty accumulator for a stream type.
    pub fn for_stream_type(stream_type: StreamType) -> Self {
        match stream_type {
            StreamType::AdtsAac | StreamType::LatmAac | StreamType::Mpeg4Audio => Self::Aac {
                last_adts: None,
                last_latm: None,
                confirmed_run: 0,
            },
            StreamType::Ac3 | StreamType::EAc3 => Self::Ac3(None),
            StreamType::Mpeg1Audio | StreamType::Mpeg2Audio => Self::MpegAudio {
                first_frame: None,
                xing: None,
                bytes_seen: 0,
            },
            StreamType::Mpeg1Video | StreamType::Mpeg2Video => {
                Self::Mpeg2Video(mpeg2video::Analyzer::new())
            }
            StreamType::H264 | StreamType::H264Additional | StreamType::H264AdditionalView => {
                Self::H264 {
                    sps: None,
                    picture_kinds: Vec::new(),
                }
            }
            _ => Self::None,
        }
    }

    /// Folds one PES payload (an access unit or a fragment of one) into the
    /// accumulator.
    pub fn observe(&mut self, payload: &[u8]) {
        match self {
            Self::Aac {
                last_adts,
                last_latm,
                confirmed_run,
            } => {
                if let Some(header) = aac::adts::parse(payload) {
                    *confirmed_run = aac::adts::confirm_run(payload);
                    *last_adts = Some(header);
                } else if let Some((element, _)) = aac::latm::parse_loas_frame(payload) {
                    *last_latm = Some(element);
                }
            }
            Self::Ac3(header) => {
                if header.is_none() {
                    *header = ac3::SyncFrameHeader::parse(payload);
                }
            }
            Self::MpegAudio {
                first_frame,
                xing,
                bytes_seen,
            } => {
                *bytes_seen += payload.len() as u64;
                if first_frame.is_none() {
                    if let Some(header) = mpegaudio::frame::FrameHeader::parse(payload) {
                        *xing = mpegaudio::xing::parse(&header, payload);
                        *first_frame = Some(header);
                    }
                }
            }
            Self::Mpeg2Video(analyzer) => analyzer.observe(payload),
            Self::H264 { sps, picture_kinds } => observe_h264(sps, picture_kinds, payload),
            Self::None => {}
        }
    }
}

/// Feeds one H.264 Annex-B access unit into an SPS/picture-kind
/// accumulator. Exposed so other Annex-B-framed containers (MPEG-PS) can
/// reuse the same NAL dispatch without re-deriving it.
pub fn observe_h264(sps: &mut Option<h264::Sps>, picture_kinds: &mut Vec<h264::PictureKind>, payload: &[u8]) {
    for nalu in split_annex_b(payload) {
        if nalu.is_empty() {
            continue;
        }
        let nal_unit_type = nalu[0] & 0x1F;
        match nal_unit_type {
            7 if sps.is_none() => {
                if let Ok(parsed) = h264::Sps::parse_with_emulation_prevention(std::io::Cursor::new(nalu)) {
                    *sps = Some(parsed);
                }
            }
            1 | 5 => {
                let frame_mbs_only = sps
                    .as_ref()
                    .map(|s| s.mb_adaptive_frame_field_flag.is_none())
                    .unwrap_or(true);
                let Ok(nal_type) = h264::NALUnitType::try_from(nal_unit_type) else {
                    continue;
                };
                let mut reader = bytes_util::BitReader::new_from_slice(&nalu[1..]);
                if let Ok(header) = h264::SliceHeader::parse(&mut reader, nal_type, frame_mbs_only) {
                    let kind = if nal_unit_type == 5 {
                        h264::PictureKind::Idr
                    } else if header.slice_type.is_intra() {
                        h264::PictureKind::I
                    } else {
                        match header.slice_type {
                            h264::SliceType::P | h264::SliceType::Sp => h264::PictureKind::P,
                            _ => h264::PictureKind::B,
                        }
                    };
                    picture_kinds.push(kind);
                }
            }
            _ => {}
        }
    }
}

fn split_annex_b(data: &[u8]) -> Vec<&[u8]> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            starts.push(i + 3);
            i += 3;
        } else {
            i += 1;
        }
    }
    starts
        .iter()
        .enumerate()
        .map(|(idx, &start)| {
            let end = starts.get(idx + 1).map(|&s| s - 3).unwrap_or(data.len());
            &data[start..end]
        })
        .collect()
}

/// Demultiplexer state for a single elementary stream, keyed by its PID.
#[derive(Debug)]
pub struct TsStreamState {
    /// 13-bit packet identifier.
    pub pid: u16,
    /// Stream type as declared by the PMT.
    pub stream_type: StreamType,
    /// Program number this stream belongs to.
    pub program_number: u16,
    /// ISO 639 language code, if an `ISO_639_language_descriptor` was seen.
    pub language: Option<String>,
    /// Order in which this PID was first discovered.
    pub discovery_order: usize,
    /// Total elementary-stream bytes (payload only) observed.
    pub bytes: u64,
    /// Number of TS packets carrying this PID.
    pub packet_count: u64,
    /// Packet index (head-or-tail scan order) at first discovery.
    pub first_packet_order: u64,
    /// Last seen continuity counter, for duplicate/discontinuity detection.
    pub last_continuity_counter: Option<u8>,
    /// Pending PES payload awaiting the next frontier (next PUSI or
    /// `PES_packet_length` bytes seen).
    pub pending: Vec<u8>,
    /// Declared length of the PES packet currently being collected.
    pub pending_needed: Option<usize>,
    /// Most recently seen PCR, 27 MHz units.
    pub last_pcr: Option<u64>,
    /// Presentation timestamp tracker.
    pub pts: PtsTracker,
    /// Decode timestamp tracker.
    pub dts: PtsTracker,
    /// Codec-specific accumulator.
    pub codec: CodecRecord,
}

impl TsStreamState {
    /// Creates a new, empty stream state.
    pub fn new(pid: u16, stream_type: StreamType, program_number: u16, discovery_order: usize, first_packet_order: u64) -> Self {
        Self {
            pid,
            codec: CodecRecord::for_stream_type(stream_type),
            stream_type,
            program_number,
            language: None,
            discovery_order,
            bytes: 0,
            packet_count: 0,
            first_packet_order,
            last_continuity_counter: None,
            pending: Vec::new(),
            pending_needed: None,
            last_pcr: None,
            pts: PtsTracker::new(),
            dts: PtsTracker::new(),
        }
    }

    /// Merges an updated PMT mapping for this PID: stream type and program
    /// number are replaced, but a blank incoming language never clears an
    /// already-known one.
    pub fn merge_pmt(&mut self, stream_type: StreamType, program_number: u16, language: Option<String>) {
        self.stream_type = stream_type;
        self.program_number = program_number;
        if let Some(language) = language {
            self.language = Some(language);
        }
    }

    /// Resolves this stream's kind for container-level stream ordering.
    pub fn kind(&self) -> StreamKind {
        if self.stream_type.is_video() {
            StreamKind::Video
        } else if self.stream_type.is_audio() {
            StreamKind::Audio
        } else {
            StreamKind::Other
        }
    }
}

/// Coarse classification used only for stream ordering, not the full
/// `Stream` kind enum of the uniform record model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Video elementary stream.
    Video,
    /// Audio elementary stream.
    Audio,
    /// Anything else (subtitle/private/unrecognized).
    Other,
}
