//! CEA-608 closed-caption extraction from MPEG-2 `user_data` payloads.
//!
//! This crate does not decode caption text; it classifies EIA-608 byte
//! pairs (control/command vs. displayable) and accumulates the small bits
//! of per-field state a container demultiplexer needs to surface a
//! captions stream: first/last frame seen, first/last PTS, and whether the
//! track looks like "pop-on" captioning.
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

/// A single decoded `(cc_type, cc_data_1, cc_data_2)` triple from either the
/// ATSC (`GA94`) or DVD (`CC<01><F8>`) user_data encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCcPair {
    /// `0` = field 1 (CC1/CC2), `1` = field 2 (CC3/CC4).
    pub field: u8,
    /// Whether the encoder marked this pair valid.
    pub valid: bool,
    /// First data byte, masked to 7 bits.
    pub cc_data_1: u8,
    /// Second data byte, masked to 7 bits.
    pub cc_data_2: u8,
}

/// Whether a byte pair is a displayable character pair or an EIA-608
/// control/command code, and if a control code, whether it is the
/// End-of-Caption (display) command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteKind {
    /// `cc_data_1` is one of the control-code prefixes and `cc_data_2` is in
    /// `0x20..=0x2F`.
    Control {
        /// `true` when `cc_data_2 == 0x2F` (End-of-Caption / display command).
        is_display: bool,
    },
    /// Anything else: displayable text.
    Text,
}

/// Control-code prefix bytes recognized as `cc_data_1` for a command pair.
pub const CONTROL_PREFIXES: [u8; 4] = [0x14, 0x15, 0x1C, 0x1D];

/// Classifies an EIA-608 byte pair.
///
/// `cc_data_1 ∈ {0x14, 0x15, 0x1C, 0x1D}` with `cc_data_2 ∈ 0x20..=0x2F` is a
/// control/command pair; `cc_data_2 == 0x2F` within that range is the
/// End-of-Caption (display) command.
pub fn classify(cc_data_1: u8, cc_data_2: u8) -> ByteKind {
    let cc_data_1 = cc_data_1 & 0x7F;
    let cc_data_2 = cc_data_2 & 0x7F;

    if CONTROL_PREFIXES.contains(&cc_data_1) && (0x20..=0x2F).contains(&cc_data_2) {
        ByteKind::Control {
            is_display: cc_data_2 == 0x2F,
        }
    } else {
        ByteKind::Text
    }
}

/// How the first control code observed on a track looked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstCommandKind {
    /// The first control code was an End-of-Caption (display) command,
    /// characteristic of pop-on captioning.
    PopOn,
    /// Some other control code came first.
    Other,
}

/// Per-field (CC1/CC3) caption accumulator.
///
/// `first_frame`/`last_frame` use `-1` as the "unset" sentinel, matching
/// the source's convention for an as-yet-unobserved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Whether any byte pair was observed on this field.
    pub found: bool,
    /// Frame index of the first observed pair, or `-1` if unset.
    pub first_frame: i64,
    /// Frame index of the last observed pair, or `-1` if unset.
    pub last_frame: i64,
    /// PTS of the first observed pair.
    pub first_pts: Option<u64>,
    /// PTS of the last observed pair.
    pub last_pts: Option<u64>,
    /// PTS of the first control/command pair.
    pub first_command_pts: Option<u64>,
    /// PTS of the first End-of-Caption (display) command.
    pub first_display_pts: Option<u64>,
    /// Whether the first control code looked like pop-on captioning.
    pub first_type: Option<FirstCommandKind>,
}

impl CaptionTrack {
    /// A field with no captions observed yet.
    pub const fn unset() -> Self {
        Self {
            found: false,
            first_frame: -1,
            last_frame: -1,
            first_pts: None,
            last_pts: None,
            first_command_pts: None,
            first_display_pts: None,
            first_type: None,
        }
    }

    /// Feeds one classified byte pair into the track, updating first/last
    /// bookkeeping.
    pub fn observe(&mut self, frame_index: i64, pts: Option<u64>, cc_data_1: u8, cc_data_2: u8) {
        let kind = classify(cc_data_1, cc_data_2);

        if !self.found {
            self.found = true;
            self.first_frame = frame_index;
            self.first_pts = pts;
        }
        self.last_frame = frame_index;
        self.last_pts = pts;

        if let ByteKind::Control { is_display } = kind {
            if self.first_command_pts.is_none() {
                self.first_command_pts = pts;
                self.first_type = Some(if is_display {
                    FirstCommandKind::PopOn
                } else {
                    FirstCommandKind::Other
                });
            }
            if is_display && self.first_display_pts.is_none() {
                self.first_display_pts = pts;
            }
        }
    }
}

impl Default for CaptionTrack {
    fn default() -> Self {
        Self::unset()
    }
}

/// Two-field (CC1 = field 0, CC3 = field 1) accumulator plus the service
/// name MediaInfo-style reports surface for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionAccumulator {
    /// Field 0 (CC1) state.
    pub field0: CaptionTrack,
    /// Field 1 (CC3) state.
    pub field1: CaptionTrack,
}

impl Default for CaptionAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionAccumulator {
    /// A fresh accumulator with both fields unset.
    pub const fn new() -> Self {
        Self {
            field0: CaptionTrack::unset(),
            field1: CaptionTrack::unset(),
        }
    }

    /// Feeds a decoded pair into the appropriate field's track.
    pub fn observe(&mut self, frame_index: i64, pts: Option<u64>, pair: RawCcPair) {
        if !pair.valid {
            return;
        }
        let track = if pair.field == 1 {
            &mut self.field1
        } else {
            &mut self.field0
        };
        track.observe(frame_index, pts, pair.cc_data_1, pair.cc_data_2);
    }

    /// Selects the field to surface as a Text stream: field 1 (CC3) when
    /// present, else field 0 (CC1), matching the "at most one captions Text
    /// stream per video" rule.
    pub fn selected(&self) -> Option<(&str, &CaptionTrack)> {
        if self.field1.found {
            Some(("CC3", &self.field1))
        } else if self.field0.found {
            Some(("CC1", &self.field0))
        } else {
            None
        }
    }
}

/// Parses an ATSC/DTV `GA94` user_data payload (the bytes following the
/// `00 00 01 B2` start code) into raw caption pairs.
///
/// Layout: `47 41 39 34 03 <flags> (<cc_data_1> <cc_data_2> <cc_type|valid>)*`
/// where `flags`'s low 5 bits give the pair count. Returns `None` if the
/// header doesn't match or the payload is too short for the declared count.
pub fn parse_ga94(data: &[u8]) -> Option<Vec<RawCcPair>> {
    if data.len() < 6 || &data[0..4] != b"GA94" || data[4] != 0x03 {
        return None;
    }

    let flags = data[5];
    let count = (flags & 0x1F) as usize;
    let body = &data[6..];

    if body.len() < count * 3 {
        return None;
    }

    let mut pairs = Vec::with_capacity(count);
    for chunk in body.chunks_exact(3).take(count) {
        let marker = chunk[0];
        pairs.push(RawCcPair {
            field: marker & 0x03,
            valid: (marker & 0x04) != 0,
            cc_data_1: chunk[1] & 0x7F,
            cc_data_2: chunk[2] & 0x7F,
        });
    }
    Some(pairs)
}

/// Parses a DVD-style `CC 01 F8` user_data payload into raw caption pairs.
///
/// Layout: `CC 01 F8 <count_byte> (<field_marker> <raw1> <raw2>)*` where the
/// block count is the low 5 bits of `count_byte`, and a valid
/// `field_marker` satisfies `field_marker & 0xFE == 0xFE`; its low bit
/// selects the odd (`1`) or even (`0`) field.
pub fn parse_dvd(data: &[u8]) -> Option<Vec<RawCcPair>> {
    if data.len() < 4 || data[0] != 0xCC || data[1] != 0x01 || data[2] != 0xF8 {
        return None;
    }

    let count = (data[3] & 0x1F) as usize;
    let body = &data[4..];
    if body.len() < count * 3 {
        return None;
    }

    let mut pairs = Vec::with_capacity(count);
    for chunk in body.chunks_exact(3).take(count) {
        let field_marker = chunk[0];
        if field_marker & 0xFE != 0xFE {
            continue;
        }
        pairs.push(RawCcPair {
            field: field_marker & 0x01,
            valid: true,
            cc_data_1: chunk[1] & 0x7F,
            cc_data_2: chunk[2] & 0x7F,
        });
    }
    Some(pairs)
}
