//! A parser for MPEG-2 (ISO/IEC 13818-2) video sequence/GOP/picture
//! headers, analyzed from a prefix of the elementary stream.
//!
//! This crate only decodes headers needed to derive container-level
//! metadata (resolution, frame rate, GOP structure) — it does not decode
//! pixel data.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod extension;
pub mod group;
pub mod picture;
pub mod sequence;
pub mod start_code;

pub use extension::{ChromaFormat, Extension, PictureCodingExtension, SequenceDisplayExtension, SequenceExtension};
pub use group::{GopHeader, TimeCode};
pub use picture::{PictureCodingType, PictureHeader};
pub use sequence::{MatrixKind, SequenceHeader};

use std::collections::HashMap;

/// A spacing is accepted as the modal value only when it recurs at least
/// this many times and accounts for at least half of the observed
/// spacings; otherwise the distance is reported as variable.
const MIN_OCCURRENCES: usize = 2;

/// Whether a distance (GOP `N` or `M`) setting is fixed or varies across
/// the observed prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// A single value dominates the observed spacings.
    Fixed(u32),
    /// No single value dominates.
    Variable,
}

/// Accumulates sequence/GOP/picture header observations from a stream
/// prefix and derives container-level summary fields.
#[derive(Debug, Default)]
#[must_use]
pub struct Analyzer {
    /// The first sequence header seen, if any.
    pub sequence_header: Option<SequenceHeader>,
    /// The first sequence extension seen, if any.
    pub sequence_extension: Option<SequenceExtension>,
    /// The first sequence display extension seen, if any.
    pub sequence_display_extension: Option<SequenceDisplayExtension>,
    /// Whether the first GOP header observed was closed.
    pub first_gop_closed: Option<bool>,
    /// Whether any observed GOP was open (closed_gop == false).
    pub any_open_gop: bool,
    intra_dc_precisions: Vec<u8>,
    last_intra_dc_precision: Option<u8>,
    pictures_since_refresh: Vec<usize>,
    pictures_since_anchor: Vec<usize>,
    picture_count: usize,
    last_refresh_index: Option<usize>,
    last_anchor_index: Option<usize>,
    last_was_picture_header: bool,
}

impl Analyzer {
    /// Creates an empty analyzer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `data` for start codes and folds every header found into the
    /// running summary. `data` need not align to start-code boundaries
    /// across calls are not supported in this reduced model — callers pass
    /// one contiguous prefix.
    pub fn observe(&mut self, data: &[u8]) {
        let codes = start_code::scan(data);
        for (index, code) in codes.iter().enumerate() {
            let body = start_code::payload(data, &codes, index);
            match code.code {
                start_code::SEQUENCE_HEADER => {
                    if let Some(header) = sequence::parse(body) {
                        self.sequence_header.get_or_insert(header);
                    }
                    self.last_was_picture_header = false;
                }
                start_code::EXTENSION => {
                    if let Some(extension) = extension::parse(body) {
                        match extension {
                            Extension::Sequence(seq) => {
                                self.sequence_extension.get_or_insert(seq);
                            }
                            Extension::SequenceDisplay(display) => {
                                self.sequence_display_extension.get_or_insert(display);
                            }
                            Extension::PictureCoding(pce) if self.last_was_picture_header => {
                                self.intra_dc_precisions.push(pce.intra_dc_precision);
                                self.last_intra_dc_precision = Some(pce.intra_dc_precision);
                            }
                            _ => {}
                        }
                    }
                }
                start_code::GROUP_OF_PICTURES => {
                    if let Some(gop) = group::parse(body) {
                        self.first_gop_closed.get_or_insert(gop.closed_gop);
                        if !gop.closed_gop {
                            self.any_open_gop = true;
                        }
                    }
                    self.last_was_picture_header = false;
                }
                start_code::PICTURE => {
                    if let Some(picture) = picture::parse(body) {
                        self.observe_picture(picture.picture_coding_type);
                    }
                    self.last_was_picture_header = true;
                }
                _ => {
                    self.last_was_picture_header = false;
                }
            }
        }
    }

    fn observe_picture(&mut self, coding_type: PictureCodingType) {
        let index = self.picture_count;
        self.picture_count += 1;

        let is_refresh = matches!(coding_type, PictureCodingType::I);
        if is_refresh {
            if let Some(last) = self.last_refresh_index {
                self.pictures_since_refresh.push(index - last);
            }
            self.last_refresh_index = Some(index);
        }

        if coding_type.is_anchor() {
            if let Some(last) = self.last_anchor_index {
                self.pictures_since_anchor.push(index - last);
            }
            self.last_anchor_index = Some(index);
        }
    }

    /// Resolves the GOP `N` distance (spacing between refresh/I pictures).
    pub fn n_distance(&self) -> Distance {
        modal_distance(&self.pictures_since_refresh)
    }

    /// Resolves the GOP `M` distance (spacing between anchor pictures).
    pub fn m_distance(&self) -> Distance {
        modal_distance(&self.pictures_since_anchor)
    }

    /// Resolves `IntraDCPrecision`: the modal value across all observed
    /// picture-coding extensions for containers in general, falling back
    /// to the last observed value as a tiebreak (matching the MPEG-TS
    /// finalization rule that always surfaces the last value).
    pub fn intra_dc_precision_mode(&self) -> Option<u8> {
        if self.intra_dc_precisions.is_empty() {
            return None;
        }
        let mut counts: HashMap<u8, usize> = HashMap::new();
        for &value in &self.intra_dc_precisions {
            *counts.entry(value).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by_key(|(value, count)| (*count, std::cmp::Reverse(*value)))
            .map(|(value, _)| value)
    }

    /// The last observed `intra_dc_precision`, as surfaced for MPEG-TS
    /// streams per the finalization rule.
    pub fn intra_dc_precision_last(&self) -> Option<u8> {
        self.last_intra_dc_precision
    }
}

fn modal_distance(spacings: &[usize]) -> Distance {
    if spacings.is_empty() {
        return Distance::Variable;
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &spacing in spacings {
        *counts.entry(spacing).or_insert(0) += 1;
    }

    let Some((&modal_value, &modal_count)) = counts.iter().max_by_key(|(_, count)| **count) else {
        return Distance::Variable;
    };

    if modal_count >= MIN_OCCURRENCES && modal_count * 2 >= spacings.len() {
        Distance::Fixed(modal_value as u32)
    } else {
        Distance::Variable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_util::BitWriter;

    fn encode_picture(coding_type: u8) -> Vec<u8> {
        let mut writer = BitWriter::default();
        writer.write_bits(0, 10).unwrap();
        writer.write_bits(coding_type as u64, 3).unwrap();
        writer.write_bits(0xFFFF, 16).unwrap();
        let body: Vec<u8> = writer.finish().unwrap();
        let mut data = vec![0x00, 0x00, 0x01, start_code::PICTURE];
        data.extend_from_slice(&body);
        data
    }

    #[test]
    fn derives_fixed_gop_distances() {
        let mut analyzer = Analyzer::new();
        // I B B P B B P B B P B B, repeated.
        let pattern = [1u8, 3, 3, 2, 3, 3, 2, 3, 3, 2, 3, 3];
        let mut stream = Vec::new();
        for _ in 0..4 {
            for &coding_type in &pattern {
                stream.extend_from_slice(&encode_picture(coding_type));
            }
        }
        analyzer.observe(&stream);

        assert_eq!(analyzer.n_distance(), Distance::Fixed(12));
        assert_eq!(analyzer.m_distance(), Distance::Fixed(3));
    }

    #[test]
    fn reports_variable_when_no_spacing_dominates() {
        let mut analyzer = Analyzer::new();
        let mut stream = Vec::new();
        for &coding_type in &[1u8, 2, 2, 2, 1, 2, 1] {
            stream.extend_from_slice(&encode_picture(coding_type));
        }
        analyzer.observe(&stream);
        assert_eq!(analyzer.n_distance(), Distance::Variable);
    }

    #[test]
    fn tracks_first_gop_closed_and_any_open_gop() {
        let mut writer = BitWriter::default();
        writer.write_bit(false).unwrap();
        writer.write_bits(0, 5).unwrap();
        writer.write_bits(0, 6).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_bits(0, 6).unwrap();
        writer.write_bits(0, 6).unwrap();
        writer.write_bit(true).unwrap(); // closed_gop
        writer.write_bit(false).unwrap();
        let closed_body: Vec<u8> = writer.finish().unwrap();
        let mut closed_gop = vec![0x00, 0x00, 0x01, start_code::GROUP_OF_PICTURES];
        closed_gop.extend_from_slice(&closed_body);

        let mut writer = BitWriter::default();
        writer.write_bit(false).unwrap();
        writer.write_bits(0, 5).unwrap();
        writer.write_bits(0, 6).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_bits(0, 6).unwrap();
        writer.write_bits(0, 6).unwrap();
        writer.write_bit(false).unwrap(); // closed_gop = false (open)
        writer.write_bit(false).unwrap();
        let open_body: Vec<u8> = writer.finish().unwrap();
        let mut open_gop = vec![0x00, 0x00, 0x01, start_code::GROUP_OF_PICTURES];
        open_gop.extend_from_slice(&open_body);

        let mut analyzer = Analyzer::new();
        let mut stream = closed_gop;
        stream.extend_from_slice(&open_gop);
        analyzer.observe(&stream);

        assert_eq!(analyzer.first_gop_closed, Some(true));
        assert!(analyzer.any_open_gop);
    }
}
