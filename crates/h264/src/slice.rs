use std::io;

use bytes_util::BitReader;
use expgolomb::BitReaderExpGolombExt;

use crate::NALUnitType;

/// The slice type, after folding the 5..=9 "all slices in this picture are
/// the same type" range down to its base 0..=4 value. ISO/IEC-14496-10-2022
/// - 7.4.3, Table 7-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceType {
    /// P slice: may use inter prediction from one reference list.
    P,
    /// B slice: may use inter prediction from two reference lists.
    B,
    /// I slice: intra-coded only.
    I,
    /// SP slice: switching P slice.
    Sp,
    /// SI slice: switching I slice.
    Si,
}

impl SliceType {
    fn from_exp_golomb(value: u64) -> Option<Self> {
        match value % 5 {
            0 => Some(Self::P),
            1 => Some(Self::B),
            2 => Some(Self::I),
            3 => Some(Self::Sp),
            4 => Some(Self::Si),
            _ => None,
        }
    }

    /// Whether this slice type only contains intra-coded macroblocks.
    pub const fn is_intra(&self) -> bool {
        matches!(self, Self::I | Self::Si)
    }
}

/// The header fields of a slice, read from the start of a slice NAL unit's
/// RBSP (emulation-prevention bytes already removed). Only the leading
/// fields needed to classify a slice are decoded; macroblock data and
/// reference picture list modifications are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SliceHeader {
    /// Address of the first macroblock in the slice.
    pub first_mb_in_slice: u64,
    /// The slice's coding type.
    pub slice_type: SliceType,
    /// `1` if this slice belongs to a bottom field, present only when
    /// `frame_mbs_only_flag` is false and `field_pic_flag` is true.
    pub bottom_field_flag: Option<bool>,
}

impl SliceHeader {
    /// Parses the leading fields of a slice header. `nal_unit_type` must be
    /// `NonIDRSliceLayerWithoutPartitioning` (1) or
    /// `IDRSliceLayerWithoutPartitioning` (5) — any other type has no slice
    /// header at this position. `frame_mbs_only_flag` comes from the
    /// active SPS.
    pub fn parse<R: io::Read>(
        reader: &mut BitReader<R>,
        nal_unit_type: NALUnitType,
        frame_mbs_only_flag: bool,
    ) -> io::Result<Self> {
        if !matches!(
            nal_unit_type,
            NALUnitType::NonIDRSliceLayerWithoutPartitioning
                | NALUnitType::IDRSliceLayerWithoutPartitioning
        ) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "not a slice NAL unit",
            ));
        }

        let first_mb_in_slice = reader.read_exp_golomb()?;
        let slice_type_raw = reader.read_exp_golomb()?;
        let slice_type = SliceType::from_exp_golomb(slice_type_raw).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "invalid slice_type")
        })?;

        // pic_parameter_set_id, exp-golomb; not retained.
        reader.read_exp_golomb()?;

        let bottom_field_flag = if !frame_mbs_only_flag {
            let field_pic_flag = reader.read_bit()?;
            if field_pic_flag {
                Some(reader.read_bit()?)
            } else {
                None
            }
        } else {
            None
        };

        Ok(Self {
            first_mb_in_slice,
            slice_type,
            bottom_field_flag,
        })
    }
}
