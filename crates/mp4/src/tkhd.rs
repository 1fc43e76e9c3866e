//! `tkhd` (Track Header Box) parsing.

use crate::fields::{u32_at, u64_at};

/// Fields extracted from a `tkhd` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackHeader {
    /// Track identifier, referenced by `tref`/`elst` of other tracks.
    pub track_id: u32,
    /// `flags & 0x1`: whether the track is enabled and should play by
    /// default.
    pub enabled: bool,
    /// Group of mutually exclusive alternate tracks this track belongs to
    /// (`0` means none).
    pub alternate_group: u16,
    /// Creation time, seconds since 1904-01-01 UTC.
    pub creation_time: u64,
    /// Modification time, seconds since 1904-01-01 UTC.
    pub modification_time: u64,
}

/// Parses a `tkhd` box body (after the 8-byte box header).
pub fn parse(body: &[u8]) -> Option<TrackHeader> {
    let version = *body.first()?;
    let flags = u32_at(body, 0)? & 0x00FF_FFFF;
    let enabled = flags & 0x1 != 0;

    // `rest_offset` is the offset of the `duration` field itself (i.e. right
    // after the 4-byte reserved word that follows `track_id`).
    let (creation_time, modification_time, track_id, rest_offset) = if version == 1 {
        let creation_time = u64_at(body, 4)?;
        let modification_time = u64_at(body, 12)?;
        let track_id = u32_at(body, 20)?;
        (creation_time, modification_time, track_id, 28usize)
    } else {
        let creation_time = u32_at(body, 4)? as u64;
        let modification_time = u32_at(body, 8)? as u64;
        let track_id = u32_at(body, 12)?;
        (creation_time, modification_time, track_id, 20usize)
    };

    // duration(4 or 8) + reserved(8) + layer(2) then alternate_group(2).
    let duration_width = if version == 1 { 8 } else { 4 };
    let alternate_group_offset = rest_offset + duration_width + 8 + 2;
    let alternate_group = crate::fields::u16_at(body, alternate_group_offset)?;

    Some(TrackHeader {
        track_id,
        enabled,
        alternate_group,
        creation_time,
        modification_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v0_body(track_id: u32, flags: u32, alternate_group: u16) -> Vec<u8> {
        let mut b = vec![0u8; 84];
        b[0..4].copy_from_slice(&flags.to_be_bytes());
        b[12..16].copy_from_slice(&track_id.to_be_bytes());
        // reserved(4) @16 + duration(4) @20 + reserved(8) @24 + layer(2) @32
        b[34..36].copy_from_slice(&alternate_group.to_be_bytes());
        b
    }

    #[test]
    fn parses_version_0_header() {
        let body = v0_body(7, 0x00_00_01, 2);
        let header = parse(&body).unwrap();
        assert_eq!(header.track_id, 7);
        assert!(header.enabled);
        assert_eq!(header.alternate_group, 2);
    }

    #[test]
    fn disabled_track_has_flag_bit_clear() {
        let body = v0_body(1, 0, 0);
        let header = parse(&body).unwrap();
        assert!(!header.enabled);
    }

    #[test]
    fn parses_version_1_wide_timestamps() {
        let mut body = vec![0u8; 96];
        body[0] = 1; // version
        body[4..12].copy_from_slice(&100u64.to_be_bytes());
        body[12..20].copy_from_slice(&200u64.to_be_bytes());
        body[20..24].copy_from_slice(&9u32.to_be_bytes());
        let header = parse(&body).unwrap();
        assert_eq!(header.creation_time, 100);
        assert_eq!(header.modification_time, 200);
        assert_eq!(header.track_id, 9);
    }
}
