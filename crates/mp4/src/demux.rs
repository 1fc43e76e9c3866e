//! Top-level MP4/QuickTime parsing: locates `ftyp`/`moov`, reads `mvhd`, and
//! assembles every `trak` into a [`Movie`].

use crate::bbox::find_box;
use crate::error::{Mp4Error, Result};
use crate::fields::{u32_at, u64_at};
use crate::track::{parse_traks, Track};

/// `moov` payloads larger than this are rejected outright rather than
/// buffered in full — a pathological or adversarial file shouldn't force an
/// unbounded allocation.
pub const MOOV_SIZE_CAP: u64 = 16 * 1024 * 1024;

/// `mvhd` (Movie Header Box) fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieHeader {
    /// Ticks per second of `duration`.
    pub timescale: u32,
    /// Movie duration, in `timescale` units.
    pub duration: u64,
}

fn parse_mvhd(body: &[u8]) -> Option<MovieHeader> {
    let version = *body.first()?;
    if version == 1 {
        Some(MovieHeader {
            timescale: u32_at(body, 20)?,
            duration: u64_at(body, 24)?,
        })
    } else {
        Some(MovieHeader {
            timescale: u32_at(body, 12)?,
            duration: u32_at(body, 16)? as u64,
        })
    }
}

/// The four-character brand of an `ftyp` box's `major_brand` field.
pub fn major_brand(data: &[u8]) -> Option<[u8; 4]> {
    find_box(data, b"ftyp")?.body.get(0..4)?.try_into().ok()
}

/// A fully assembled movie: `mvhd` plus every track found under `moov`.
#[derive(Debug, Clone)]
pub struct Movie {
    /// `mvhd` fields, if the box parsed.
    pub header: Option<MovieHeader>,
    /// Every `trak` that parsed successfully.
    pub tracks: Vec<Track>,
}

impl Movie {
    /// Movie duration in seconds, from `mvhd`.
    pub fn duration_seconds(&self) -> Option<f64> {
        let header = self.header?;
        if header.timescale == 0 {
            return None;
        }
        Some(header.duration as f64 / header.timescale as f64)
    }
}

/// Locates `moov` within `data`, enforces [`MOOV_SIZE_CAP`], and parses its
/// `mvhd` and `trak` children.
pub fn parse(data: &[u8]) -> Result<Movie> {
    let moov = find_box(data, b"moov").ok_or(Mp4Error::TruncatedBox(0))?;
    let size = moov.body.len() as u64;
    if size > MOOV_SIZE_CAP {
        return Err(Mp4Error::MoovTooLarge { size, cap: MOOV_SIZE_CAP });
    }

    let header = find_box(moov.body, b"mvhd").and_then(|b| parse_mvhd(b.body));
    if header.is_none() {
        tracing::warn!("moov has no usable mvhd");
    }
    let tracks = parse_traks(moov.body);
    tracing::debug!(track_count = tracks.len(), "parsed moov");

    Ok(Movie { header, tracks })
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

    fn mvhd_body(timescale: u32, duration: u32) -> Vec<u8> {
        let mut b = vec![0u8; 20];
        b[12..16].copy_from_slice(&timescale.to_be_bytes());
        b[16..20].copy_from_slice(&duration.to_be_bytes());
        b
    }

    #[test]
    fn finds_major_brand() {
        let ftyp = make_box(b"ftyp", b"isom\x00\x00\x02\x00isomiso2avc1mp41");
        assert_eq!(major_brand(&ftyp), Some(*b"isom"));
    }

    #[test]
    fn parses_moov_with_mvhd_and_no_tracks() {
        let mvhd = make_box(b"mvhd", &mvhd_body(1000, 5000));
        let moov = make_box(b"moov", &mvhd);

        let movie = parse(&moov).unwrap();
        assert_eq!(movie.header.unwrap().timescale, 1000);
        assert_eq!(movie.duration_seconds(), Some(5.0));
        assert!(movie.tracks.is_empty());
    }

    #[test]
    fn missing_moov_is_an_error() {
        let ftyp = make_box(b"ftyp", b"isom");
        assert!(parse(&ftyp).is_err());
    }

    #[test]
    fn oversized_moov_is_rejected() {
        let huge_body = vec![0u8; (MOOV_SIZE_CAP as usize) + 1];
        let moov = make_box(b"moov", &huge_body);
        match parse(&moov) {
            Err(Mp4Error::MoovTooLarge { .. }) => {}
            other => panic!("expected MoovTooLarge, got {other:?}"),
        }
    }
}
