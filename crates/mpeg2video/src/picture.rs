//! Picture header (`0x00`) parsing.

use bytes_util::BitReader;

/// The picture's coding type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureCodingType {
    /// Intra-coded picture.
    I,
    /// Predicted picture.
    P,
    /// Bi-predicted picture.
    B,
}

impl PictureCodingType {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::I),
            2 => Some(Self::P),
            3 => Some(Self::B),
            _ => None,
        }
    }

    /// Whether this coding type is a valid anchor for prediction (I or P).
    pub const fn is_anchor(&self) -> bool {
        matches!(self, Self::I | Self::P)
    }
}

/// A decoded picture header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PictureHeader {
    /// 10-bit temporal reference, reset to 0 at the start of each GOP.
    pub temporal_reference: u16,
    /// Coding type.
    pub picture_coding_type: PictureCodingType,
    /// 16-bit VBV delay.
    pub vbv_delay: u16,
}

/// Parses a picture header from the payload following the `0x00` start
/// code.
pub fn parse(data: &[u8]) -> Option<PictureHeader> {
    let mut reader = BitReader::new_from_slice(data);

    let temporal_reference = reader.read_bits(10).ok()? as u16;
    let picture_coding_type = PictureCodingType::from_bits(reader.read_bits(3).ok()? as u8)?;
    let vbv_delay = reader.read_bits(16).ok()? as u16;

    Some(PictureHeader {
        temporal_reference,
        picture_coding_type,
        vbv_delay,
    })
}
