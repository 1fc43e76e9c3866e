//! Recursive descent over a `trak` box, assembling a [`Track`] from its
//! `tkhd`/`mdia` (`mdhd`/`hdlr`/`minf`/`stbl`) and `edts` children.

use crate::bbox::{find_box, iter_boxes};
use crate::edts::{self, EditListSummary};
use crate::hdlr::{self, TrackKind};
use crate::mdhd::{self, MediaHeader};
use crate::stco::{parse_co64, parse_stco};
use crate::stsd::{self, SampleEntry};
use crate::stsz::{self, SampleSizes};
use crate::stts::{self, TimeToSample};
use crate::tkhd::{self, TrackHeader};

/// Everything this crate extracts from one `trak`.
#[derive(Debug, Clone)]
pub struct Track {
    /// `tkhd` fields.
    pub header: TrackHeader,
    /// Coarse handler kind (`hdlr`).
    pub kind: TrackKind,
    /// `mdhd` fields.
    pub media_header: MediaHeader,
    /// `elst`, if an `edts` box is present.
    pub edit_list: Option<EditListSummary>,
    /// First sample entry from `stsd`.
    pub sample_entry: Option<SampleEntry>,
    /// `stts` summary.
    pub time_to_sample: Option<TimeToSample>,
    /// `stsz` summary.
    pub sample_sizes: Option<SampleSizes>,
    /// First chunk offset from `stco`/`co64`.
    pub first_chunk_offset: Option<u64>,
}

impl Track {
    /// Track duration in its own `mdhd` timescale: the edit list's total
    /// duration (it's expressed in movie-timescale units upstream, but when
    /// present it's the authoritative presentation length) if present and
    /// non-zero, else the raw `mdhd` duration.
    pub fn duration_media_units(&self) -> Option<u64> {
        match &self.edit_list {
            Some(e) if e.total_duration_movie_units > 0 => Some(e.total_duration_movie_units),
            _ => self.media_header.duration,
        }
    }

    /// Average bitrate in bits per second, derived from total sample bytes
    /// and duration in seconds. `None` if either is unavailable or zero.
    pub fn bitrate_bps(&self) -> Option<f64> {
        let bytes = self.sample_sizes.as_ref()?.total_bytes;
        let duration = self.duration_media_units()?;
        if duration == 0 || self.media_header.timescale == 0 {
            return None;
        }
        let seconds = duration as f64 / self.media_header.timescale as f64;
        if seconds <= 0.0 {
            return None;
        }
        Some(bytes as f64 * 8.0 / seconds)
    }
}

/// Parses a `trak` box's body into a [`Track`]. Returns `None` if any of the
/// mandatory `tkhd`/`mdia`/`mdhd`/`hdlr` boxes are missing or malformed — a
/// track this broken isn't usable.
pub fn parse_trak(body: &[u8]) -> Option<Track> {
    let header = find_box(body, b"tkhd").and_then(|b| tkhd::parse(b.body))?;

    let edit_list = find_box(body, b"edts").and_then(|edts| find_box(edts.body, b"elst")).and_then(|b| edts::parse(b.body));

    let mdia = find_box(body, b"mdia")?;
    let media_header = find_box(mdia.body, b"mdhd").and_then(|b| mdhd::parse(b.body))?;
    let kind = find_box(mdia.body, b"hdlr").and_then(|b| hdlr::parse(b.body))?;

    let minf = find_box(mdia.body, b"minf");
    let stbl = minf.and_then(|m| find_box(m.body, b"stbl"));

    let (sample_entry, time_to_sample, sample_sizes, first_chunk_offset) = match stbl {
        Some(stbl) => (
            find_box(stbl.body, b"stsd").and_then(|b| stsd::parse(b.body)),
            find_box(stbl.body, b"stts").and_then(|b| stts::parse(b.body)),
            find_box(stbl.body, b"stsz").and_then(|b| stsz::parse(b.body)),
            find_box(stbl.body, b"stco")
                .and_then(|b| parse_stco(b.body))
                .or_else(|| find_box(stbl.body, b"co64").and_then(|b| parse_co64(b.body))),
        ),
        None => (None, None, None, None),
    };

    Some(Track {
        header,
        kind,
        media_header,
        edit_list,
        sample_entry,
        time_to_sample,
        sample_sizes,
        first_chunk_offset,
    })
}

/// Walks every top-level `trak` box under `moov`'s body.
pub fn parse_traks(moov_body: &[u8]) -> Vec<Track> {
    iter_boxes(moov_body)
        .filter(|b| b.is(b"trak"))
        .filter_map(|b| parse_trak(b.body))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_box(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut data = ((8 + body.len()) as u32).to_be_bytes().to_vec();
        data.extend_from_slice(tag);
        data.extend_from_slice(body);
        data
    }

    fn tkhd_body(track_id: u32) -> Vec<u8> {
        let mut b = vec![0u8; 84];
        b[0..4].copy_from_slice(&0x01u32.to_be_bytes());
        b[12..16].copy_from_slice(&track_id.to_be_bytes());
        b
    }

    fn mdhd_body(timescale: u32, duration: u32) -> Vec<u8> {
        let mut b = vec![0u8; 24];
        b[12..16].copy_from_slice(&timescale.to_be_bytes());
        b[16..20].copy_from_slice(&duration.to_be_bytes());
        b
    }

    fn hdlr_body(tag: &[u8; 4]) -> Vec<u8> {
        let mut b = vec![0u8; 12];
        b[8..12].copy_from_slice(tag);
        b
    }

    #[test]
    fn assembles_minimal_video_track() {
        let tkhd = make_box(b"tkhd", &tkhd_body(1));
        let mdhd = make_box(b"mdhd", &mdhd_body(90_000, 900_000));
        let hdlr = make_box(b"hdlr", &hdlr_body(b"vide"));
        let mut mdia_body = mdhd;
        mdia_body.extend_from_slice(&hdlr);
        let mdia = make_box(b"mdia", &mdia_body);

        let mut trak_body = tkhd;
        trak_body.extend_from_slice(&mdia);

        let track = parse_trak(&trak_body).unwrap();
        assert_eq!(track.header.track_id, 1);
        assert!(matches!(track.kind, TrackKind::Video));
        assert_eq!(track.media_header.timescale, 90_000);
        assert_eq!(track.duration_media_units(), Some(900_000));
    }

    #[test]
    fn missing_mdia_yields_none() {
        let tkhd = make_box(b"tkhd", &tkhd_body(1));
        assert!(parse_trak(&tkhd).is_none());
    }

    #[test]
    fn edit_list_duration_overrides_mdhd_duration() {
        let tkhd = make_box(b"tkhd", &tkhd_body(1));
        let mdhd = make_box(b"mdhd", &mdhd_body(90_000, 900_000));
        let hdlr = make_box(b"hdlr", &hdlr_body(b"vide"));
        let mut mdia_body = mdhd;
        mdia_body.extend_from_slice(&hdlr);
        let mdia = make_box(b"mdia", &mdia_body);

        let mut elst_body = vec![0u8; 8];
        elst_body[4..8].copy_from_slice(&1u32.to_be_bytes());
        elst_body.extend_from_slice(&500_000u32.to_be_bytes());
        elst_body.extend_from_slice(&0i32.to_be_bytes());
        let elst = make_box(b"elst", &elst_body);
        let edts = make_box(b"edts", &elst);

        let mut trak_body = tkhd;
        trak_body.extend_from_slice(&edts);
        trak_body.extend_from_slice(&mdia);

        let track = parse_trak(&trak_body).unwrap();
        assert_eq!(track.duration_media_units(), Some(500_000));
    }
}
