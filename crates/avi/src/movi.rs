//! Walks the `movi` chunk stream: accumulates per-stream byte counts and
//! feeds codec-specific bitstream scanners (MPEG-4 Visual, MP3) within
//! their respective size caps.
//!
//! Callers choose how much of `movi` to pass in: the full body for a
//! `parse_speed >= 1` traversal, or just its first 256 KiB when an
//! `idx1` index already supplies byte counts and only the codec-specific
//! fields still need filling in.

use std::collections::HashMap;

use crate::idx1::decode_stream_index;
use crate::mpeg4visual;
use crate::riff::iter_chunks;

/// Cap on concatenated video payload fed to the MPEG-4 Visual codec-field
/// (VOL) parse.
pub const VISUAL_SCAN_CAP: usize = 1024 * 1024;
/// Cap on concatenated video payload fed to the B-VOP presence scan.
pub const VOP_SCAN_CAP: u64 = 32 * 1024 * 1024;
/// Cap on concatenated audio payload fed to the MP3 scan.
pub const MP3_SCAN_CAP: usize = 64 * 1024;
/// Width of the `movi` prefix scanned when relying on an `idx1` index for
/// byte counts instead of a full traversal.
pub const PARTIAL_SCAN_WINDOW: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkKind {
    Video,
    Audio,
    Other,
}

fn classify(chunk_type: &[u8; 2]) -> ChunkKind {
    match chunk_type {
        b"dc" | b"db" => ChunkKind::Video,
        b"wb" => ChunkKind::Audio,
        _ => ChunkKind::Other,
    }
}

/// Which stream indices should have their payload fed to a
/// codec-specific bitstream scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanTargets {
    /// Stream carrying MPEG-4 Visual video (`FMP4`/`MP4V`/`DIVX`/`XVID`).
    pub mpeg4_visual_stream: Option<u32>,
    /// Stream carrying MP3 audio (`wFormatTag == 0x55`).
    pub mp3_stream: Option<u32>,
}

/// Accumulated results of a `movi` scan.
#[derive(Debug, Default)]
pub struct MoviScanResult {
    /// Total payload bytes seen per stream index.
    pub byte_counts: HashMap<u32, u64>,
    /// MPEG-4 Visual VOL/VOP observations, if `mpeg4_visual_stream` was
    /// set.
    pub mpeg4_visual: mpeg4visual::Scanner,
    /// Concatenated MP3 audio payload, up to [`MP3_SCAN_CAP`], if
    /// `mp3_stream` was set.
    pub mp3_payload: Vec<u8>,
}

/// Walks every chunk in `movi_body`, counting payload bytes per stream
/// and feeding codec-specific scanners per `targets`, honoring
/// [`VISUAL_SCAN_CAP`]/[`VOP_SCAN_CAP`]/[`MP3_SCAN_CAP`].
pub fn scan(movi_body: &[u8], targets: ScanTargets) -> MoviScanResult {
    let mut result = MoviScanResult::default();
    let mut vol_bytes_fed = 0usize;
    let mut video_bytes_fed = 0u64;

    for chunk in iter_chunks(movi_body) {
        let Some(stream_index) = decode_stream_index(&chunk.id) else { continue };
        *result.byte_counts.entry(stream_index).or_insert(0) += chunk.body.len() as u64;

        let chunk_type = [chunk.id[2], chunk.id[3]];
        match classify(&chunk_type) {
            ChunkKind::Video if targets.mpeg4_visual_stream == Some(stream_index) => {
                if video_bytes_fed >= VOP_SCAN_CAP {
                    continue;
                }
                let remaining_vop = (VOP_SCAN_CAP - video_bytes_fed) as usize;
                let slice = &chunk.body[..chunk.body.len().min(remaining_vop)];

                if vol_bytes_fed < VISUAL_SCAN_CAP {
                    let vol_take = slice.len().min(VISUAL_SCAN_CAP - vol_bytes_fed);
                    result.mpeg4_visual.observe(&slice[..vol_take]);
                    if vol_take < slice.len() {
                        result.mpeg4_visual.observe_vop_only(&slice[vol_take..]);
                    }
                    vol_bytes_fed += vol_take;
                } else {
                    result.mpeg4_visual.observe_vop_only(slice);
                }
                video_bytes_fed += slice.len() as u64;
            }
            ChunkKind::Audio if targets.mp3_stream == Some(stream_index) => {
                if result.mp3_payload.len() < MP3_SCAN_CAP {
                    let remaining = MP3_SCAN_CAP - result.mp3_payload.len();
                    let take = chunk.body.len().min(remaining);
                    result.mp3_payload.extend_from_slice(&chunk.body[..take]);
                }
            }
            _ => {}
        }
    }

    result
}
