mod chroma_sample_loc;
use self::chroma_sample_loc::ChromaSampleLoc;

mod color_config;
use self::color_config::ColorConfig;

mod frame_crop_info;
use self::frame_crop_info::FrameCropInfo;

mod pic_order_count_type1;
use self::pic_order_count_type1::PicOrderCountType1;

mod sample_aspect_ratio;
use self::sample_aspect_ratio::SarDimensions;

mod sps_ext;
pub use self::sps_ext::SpsExtended;

mod timing_info;
use std::io;

use byteorder::ReadBytesExt;
use bytes_util::{BitReader, BitWriter};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt, size_of_exp_golomb};

pub use self::timing_info::TimingInfo;
use crate::{EmulationPreventionIo, NALUnitType};

/// The Sequence Parameter Set.
/// ISO/IEC-14496-10-2022 - 7.3.2
#[derive(Debug, Clone, PartialEq)]
pub struct Sps {
    /// The `nal_ref_idc` is comprised of 2 bits.
    ///
    /// A nonzero value means the NAL unit has any of the following: SPS, SPS extension,
    /// subset SPS, PPS, slice of a reference picture, slice of a data partition of a reference picture,
    /// or a prefix NAL unit preceeding a slice of a reference picture.
    ///
    /// 0 means that the stream is decoded using the process from Clauses 2-9 (ISO/IEC-14496-10-2022)
    /// that the slice or slice data partition is part of a non-reference picture.
    /// Additionally, if `nal_ref_idc` is 0 for a NAL unit with `nal_unit_type`
    /// ranging from \[1, 4\] then `nal_ref_idc` must be 0 for all NAL units with `nal_unit_type` between [1, 4].
    ///
    /// If the `nal_unit_type` is 5, then the `nal_ref_idc` cannot be 0.
    ///
    /// If `nal_unit_type` is 6, 9, 10, 11, or 12, then the `nal_ref_idc` must be 0.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.1
    pub nal_ref_idc: u8,

    /// The `nal_unit_type` is comprised of 5 bits. See the NALUnitType nutype enum for more info.
    pub nal_unit_type: NALUnitType,

    /// The `profile_idc` of the coded video sequence as a u8.
    ///
    /// It is comprised of 8 bits or 1 byte. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub profile_idc: u8,

    /// `constraint_set0_flag`: `1` if it abides by the constraints in A.2.1, `0` if unsure or otherwise.
    ///
    /// If `profile_idc` is 44, 100, 110, 122, or 244, this is automatically set to false.
    ///
    /// It is a single bit. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub constraint_set0_flag: bool,

    /// `constraint_set1_flag`: `1` if it abides by the constraints in A.2.2, `0` if unsure or otherwise.
    ///
    /// If `profile_idc` is 44, 100, 110, 122, or 244, this is automatically set to false.
    ///
    /// It is a single bit. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub constraint_set1_flag: bool,

    /// `constraint_set2_flag`: `1` if it abides by the constraints in A.2.3, `0` if unsure or otherwise.
    ///
    /// If `profile_idc` is 44, 100, 110, 122, or 244, this is automatically set to false.
    ///
    /// It is a single bit. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub constraint_set2_flag: bool,

    /// `constraint_set3_flag`:
    /// ```text
    ///     if (profile_idc == 66, 77, or 88) AND (level_idc == 11):
    ///         1 if it abides by the constraints in Annex A for level 1b
    ///         0 if it abides by the constraints in Annex A for level 1.1
    ///     elif profile_idc == 100 or 110:
    ///         1 if it abides by the constraints for the "High 10 Intra profile"
    ///         0 if unsure or otherwise
    ///     elif profile_idc == 122:
    ///         1 if it abides by the constraints in Annex A for the "High 4:2:2 Intra profile"
    ///         0 if unsure or otherwise
    ///     elif profile_idc == 44:
    ///         1 by default
    ///         0 is not possible.
    ///     elif profile_idc == 244:
    ///         1 if it abides by the constraints in Annex A for the "High 4:4:4 Intra profile"
    ///         0 if unsure or otherwise
    ///     else:
    ///         1 is reserved for future use
    ///         0 otherwise
    /// ```
    ///
    /// It is a single bit. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub constraint_set3_flag: bool,

    /// `constraint_set4_flag`:
    /// ```text
    ///     if (profile_idc == 77, 88, 100, or 110):
    ///         1 if frame_mbs_only_flag == 1
    ///         0 if unsure or otherwise
    ///     elif (profile_idc == 118, 128, or 134):
    ///         1 if it abides by the constraints in G.6.1.1
    ///         0 if unsure or otherwise
    ///     else:
    ///         1 is reserved for future use
    ///         0 otherwise
    /// ```
    ///
    /// It is a single bit. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub constraint_set4_flag: bool,

    /// `constraint_set5_flag`:
    /// ```text
    ///     if (profile_idc == 77, 88, or 100):
    ///         1 if there are no B slice types
    ///         0 if unsure or otherwise
    ///     elif profile_idc == 118:
    ///         1 if it abides by the constraints in G.6.1.2
    ///         0 if unsure or otherwise
    ///     else:
    ///         1 is reserved for future use
    ///         0 otherwise
    /// ```
    ///
    /// It is a single bit. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub constraint_set5_flag: bool,

    /// The `level_idc` of the coded video sequence as a u8.
    ///
    /// It is comprised of 8 bits or 1 byte. ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub level_idc: u8,

    /// The `seq_parameter_set_id` is the id of the SPS referred to by the PPS (picture parameter set).
    ///
    /// The value of this ranges from \[0, 31\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// The smallest encoding would be for `0` which is encoded as `1`, which is a single bit.
    /// The largest encoding would be for `31` which is encoded as `000 0010 0000`, which is 11 bits.
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    ///
    /// For more information:
    ///
    /// <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
    pub seq_parameter_set_id: u16,

    /// An optional `SpsExtended`. Refer to the SpsExtended struct for more info.
    ///
    /// This will be parsed if `profile_idc` is equal to any of the following values:
    /// 44, 83, 86, 100, 110, 118, 122, 128, 134, 135, 138, 139, or 244.
    pub ext: Option<SpsExtended>,

    /// The `log2_max_frame_num_minus4` is the value used when deriving MaxFrameNum from the equation:
    /// `MaxFrameNum` = 2^(`log2_max_frame_num_minus4` + 4)
    ///
    /// The value of this ranges from \[0, 12\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// The smallest encoding would be for `0` which is encoded as `1`, which is a single bit.
    /// The largest encoding would be for `12` which is encoded as `000 1101`, which is 7 bits.
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    ///
    /// For more information:
    ///
    /// <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
    pub log2_max_frame_num_minus4: u8,

    /// The `pic_order_cnt_type` specifies how to decode the picture order count in subclause 8.2.1.
    ///
    /// The value of this ranges from \[0, 2\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// The smallest encoding would be for `0` which is encoded as `1`, which is a single bit.
    /// The largest encoding would be for `2` which is encoded as `011`, which is 3 bits.
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    ///
    /// For more information:
    ///
    /// <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
    ///
    /// There are a few subsequent fields that are read if `pic_order_cnt_type` is 0 or 1.
    ///
    /// In the case of 0, `log2_max_pic_order_cnt_lsb_minus4` is read as an exp golomb (unsigned).
    ///
    /// In the case of 1, `delta_pic_order_always_zero_flag`, `offset_for_non_ref_pic`,
    /// `offset_for_top_to_bottom_field`, `num_ref_frames_in_pic_order_cnt_cycle` and
    /// `offset_for_ref_frame` will be read and stored in pic_order_cnt_type1.
    ///
    /// Refer to the PicOrderCountType1 struct for more info.
    pub pic_order_cnt_type: u8,

    /// The `log2_max_pic_order_cnt_lsb_minus4` is the value used when deriving MaxFrameNum from the equation:
    /// `MaxPicOrderCntLsb` = 2^(`log2_max_frame_num_minus4` + 4) from subclause 8.2.1.
    ///
    /// This is an `Option<u8>` because the value is only set if `pic_order_cnt_type == 0`.
    ///
    /// The value of this ranges from \[0, 12\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// The smallest encoding would be for `0` which is encoded as `1`, which is a single bit.
    /// The largest encoding would be for `12` which is encoded as `000 1101`, which is 7 bits.
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    ///
    /// For more information:
    ///
    /// <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
    pub log2_max_pic_order_cnt_lsb_minus4: Option<u8>,

    /// An optional `PicOrderCountType1`. This is computed from other fields, and isn't directly set.
    ///
    /// If `pic_order_cnt_type == 1`, then the `PicOrderCountType1` will be computed.
    ///
    /// Refer to the PicOrderCountType1 struct for more info.
    pub pic_order_cnt_type1: Option<PicOrderCountType1>,

    /// The `max_num_ref_frames` is the max short-term and long-term reference frames,
    /// complementary reference field pairs, and non-paired reference fields that
    /// can be used by the decoder for inter-prediction of pictures in the coded video.
    ///
    /// The value of this ranges from \[0, `MaxDpbFrames`\], which is specified in subclause A.3.1 or A.3.2.
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// The smallest encoding would be for `0` which is encoded as `1`, which is a single bit.
    /// The largest encoding would be for `14` which is encoded as `000 1111`, which is 7 bits.
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    ///
    /// For more information:
    ///
    /// <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
    pub max_num_ref_frames: u8,

    /// The `gaps_in_frame_num_value_allowed_flag` is a single bit.
    ///
    /// The value specifies the allowed values of `frame_num` from subclause 7.4.3 and the decoding process
    /// if there is an inferred gap between the values of `frame_num` from subclause 8.2.5.2.
    pub gaps_in_frame_num_value_allowed_flag: bool,

    /// The `pic_width_in_mbs_minus1` is the width of each decoded picture in macroblocks as a u64.
    ///
    /// We then use this (along with the left and right frame crop offsets) to calculate the width as:
    ///
    /// `width = ((pic_width_in_mbs_minus1 + 1) * 16) - frame_crop_right_offset * 2 - frame_crop_left_offset * 2`
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    ///
    /// For more information:
    ///
    /// <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
    pub pic_width_in_mbs_minus1: u64,

    /// The `pic_height_in_map_units_minus1` is the height of each decoded frame in slice group map units as a u64.
    ///
    /// We then use this (along with the bottom and top frame crop offsets) to calculate the height as:
    ///
    /// `height = ((2 - frame_mbs_only_flag as u64) * (pic_height_in_map_units_minus1 + 1) * 16) -
    /// frame_crop_bottom_offset * 2 - frame_crop_top_offset * 2`
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    ///
    /// For more information:
    ///
    /// <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
    pub pic_height_in_map_units_minus1: u64,

    /// The `mb_adaptive_frame_field_flag` is a single bit.
    ///
    /// If `frame_mbs_only_flag` is NOT set then this field is read and stored.
    ///
    /// 0 means there is no switching between frame and field macroblocks in a picture.
    ///
    /// 1 means the might be switching between frame and field macroblocks in a picture.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub mb_adaptive_frame_field_flag: Option<bool>,

    /// The `direct_8x8_inference_flag` specifies the method used to derive the luma motion
    /// vectors for B_Skip, B_Direct_8x8 and B_Direct_16x16 from subclause 8.4.1.2, and is a single bit.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub direct_8x8_inference_flag: bool,

    /// An optional `frame_crop_info` struct. This is computed by other fields, and isn't directly set.
    ///
    /// If the `frame_cropping_flag` is set, then `frame_crop_left_offset`, `frame_crop_right_offset`,
    /// `frame_crop_top_offset`, and `frame_crop_bottom_offset` will be read and stored.
    ///
    /// Refer to the FrameCropInfo struct for more info.
    pub frame_crop_info: Option<FrameCropInfo>,

    /// An optional `SarDimensions` struct. This is computed by other fields, and isn't directly set.
    ///
    /// If the `aspect_ratio_info_present_flag` is set, then the `aspect_ratio_idc` will be read and stored.
    ///
    /// If the `aspect_ratio_idc` is 255, then the `sar_width` and `sar_height` will be read and stored.
    ///
    /// Also known as `sample_aspect_ratio` in the spec.
    ///
    /// The default values are set to 0 for the `aspect_ratio_idc`, `sar_width`, and `sar_height`.
    /// Therefore, this will always be returned by the parse function.
    /// ISO/IEC-14496-10-2022 - E.2.1
    ///
    /// Refer to the SarDimensions struct for more info.
    pub sample_aspect_ratio: Option<SarDimensions>,

    /// An optional `overscan_appropriate_flag` is a single bit.
    ///
    /// If the `overscan_info_present_flag` is set, then this field will be read and stored.
    ///
    /// 0 means the overscan should not be used. (ex: screensharing or security cameras)
    ///
    /// 1 means the overscan can be used. (ex: entertainment TV programming or live video conference)
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1
    pub overscan_appropriate_flag: Option<bool>,

    /// An optional `ColorConfig`. This is computed from other fields, and isn't directly set.
    ///
    /// If `video_signal_type_present_flag` is set, then the `ColorConfig` will be computed, and
    /// if the `color_description_present_flag` is set, then the `ColorConfig` will be
    /// comprised of the `video_full_range_flag` (1 bit), `color_primaries` (1 byte as a u8),
    /// `transfer_characteristics` (1 byte as a u8), and `matrix_coefficients` (1 byte as a u8).
    ///
    /// Otherwise, `color_primaries`, `transfer_characteristics`, and `matrix_coefficients` are set
    /// to 2 (unspecified) by default.
    ///
    /// Refer to the ColorConfig struct for more info.
    pub color_config: Option<ColorConfig>,

    /// An optional `ChromaSampleLoc`. This is computed from other fields, and isn't directly set.
    ///
    /// If `chrome_loc_info_present_flag` is set, then the `ChromaSampleLoc` will be computed, and
    /// is comprised of `chroma_sample_loc_type_top_field` and `chroma_sample_loc_type_bottom_field`.
    ///
    /// Refer to the ChromaSampleLoc struct for more info.
    pub chroma_sample_loc: Option<ChromaSampleLoc>,

    /// An optional `TimingInfo`. This is computed from other fields, and isn't directly set.
    ///
    /// If `timing_info_present_flag` is set, then the `TimingInfo` will be computed, and
    /// is comprised of `num_units_in_tick` and `time_scale`.
    ///
    /// Refer to the TimingInfo struct for more info.
    pub timing_info: Option<TimingInfo>,
}

impl Sps {
    /// Parses an Sps from the input bytes.
    ///
    /// Returns an `Sps` struct.
    pub fn parse(reader: impl io::Read) -> io::Result<Self> {
        let mut bit_reader = BitReader::new(reader);

        let forbidden_zero_bit = bit_reader.read_bit()?;
        if forbidden_zero_bit {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "Forbidden zero bit is set"));
        }

        let nal_ref_idc = bit_reader.read_bits(2)? as u8;
        let nal_unit_type = bit_reader.read_bits(5)? as u8;
        if NALUnitType::try_from(nal_unit_type)? != NALUnitType::SPS {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "NAL unit type is not SPS"));
        }

        let profile_idc = bit_reader.read_u8()?;

        let constraint_set0_flag;
        let constraint_set1_flag;
        let constraint_set2_flag;

        match profile_idc {
            // 7.4.2.1.1
            44 | 100 | 110 | 122 | 244 => {
                // constraint_set0 thru 2 must be false in this case
                bit_reader.read_bits(3)?;
                constraint_set0_flag = false;
                constraint_set1_flag = false;
                constraint_set2_flag = false;
            }
            _ => {
                // otherwise we parse the bits as expected
                constraint_set0_flag = bit_reader.read_bit()?;
                constraint_set1_flag = bit_reader.read_bit()?;
                constraint_set2_flag = bit_reader.read_bit()?;
            }
        }

        let constraint_set3_flag = if profile_idc == 44 {
            bit_reader.read_bit()?;
            false
        } else {
            bit_reader.read_bit()?
        };

        let constraint_set4_flag = match profile_idc {
            // 7.4.2.1.1
            77 | 88 | 100 | 118 | 128 | 134 => bit_reader.read_bit()?,
            _ => {
                bit_reader.read_bit()?;
                false
            }
        };

        let constraint_set5_flag = match profile_idc {
            77 | 88 | 100 | 118 => bit_reader.read_bit()?,
            _ => {
                bit_reader.read_bit()?;
                false
            }
        };
        // reserved_zero_2bits
        bit_reader.read_bits(2)?;

        let level_idc = bit_reader.read_u8()?;
        let seq_parameter_set_id = bit_reader.read_exp_golomb()? as u16;

        let sps_ext = match profile_idc {
            100 | 110 | 122 | 244 | 44 | 83 | 86 | 118 | 128 | 138 | 139 | 134 | 135 => {
                Some(SpsExtended::parse(&mut bit_reader)?)
            }
            _ => None,
        };

        let log2_max_frame_num_minus4 = bit_reader.read_exp_golomb()? as u8;
        let pic_order_cnt_type = bit_reader.read_exp_golomb()? as u8;

        let mut log2_max_pic_order_cnt_lsb_minus4 = None;
        let mut pic_order_cnt_type1 = None;

        if pic_order_cnt_type == 0 {
            log2_max_pic_order_cnt_lsb_minus4 = Some(bit_reader.read_exp_golomb()? as u8);
        } else if pic_order_cnt_type == 1 {
            pic_order_cnt_type1 = Some(PicOrderCountType1::parse(&mut bit_reader)?)
        }

        let max_num_ref_frames = bit_reader.read_exp_golomb()? as u8;
        let gaps_in_frame_num_value_allowed_flag = bit_reader.read_bit()?;
        let pic_width_in_mbs_minus1 = bit_reader.read_exp_golomb()?;
        let pic_height_in_map_units_minus1 = bit_reader.read_exp_golomb()?;

        let frame_mbs_only_flag = bit_reader.read_bit()?;
        let mut mb_adaptive_frame_field_flag = None;
        if !frame_mbs_only_flag {
            mb_adaptive_frame_field_flag = Some(bit_reader.read_bit()?);
        }

        let direct_8x8_inference_flag = bit_reader.read_bit()?;

        let mut frame_crop_info = None;

        let frame_cropping_flag = bit_reader.read_bit()?;
        if frame_cropping_flag {
            frame_crop_info = Some(FrameCropInfo::parse(&mut bit_reader)?)
        }

        // setting default values for vui section
        let mut sample_aspect_ratio = None;
        let mut overscan_appropriate_flag = None;
        let mut color_config = None;
        let mut chroma_sample_loc = None;
        let mut timing_info = None;

        let vui_parameters_present_flag = bit_reader.read_bit()?;
        if vui_parameters_present_flag {
            // We read the VUI parameters to get the frame rate.

            let aspect_ratio_info_present_flag = bit_reader.read_bit()?;
            if aspect_ratio_info_present_flag {
                sample_aspect_ratio = Some(SarDimensions::parse(&mut bit_reader)?)
            }

            let overscan_info_present_flag = bit_reader.read_bit()?;
            if overscan_info_present_flag {
                overscan_appropriate_flag = Some(bit_reader.read_bit()?);
            }

            let video_signal_type_present_flag = bit_reader.read_bit()?;
            if video_signal_type_present_flag {
                color_config = Some(ColorConfig::parse(&mut bit_reader)?)
            }

            let chroma_loc_info_present_flag = bit_reader.read_bit()?;
            if sps_ext.as_ref().unwrap_or(&SpsExtended::default()).chroma_format_idc != 1 && chroma_loc_info_present_flag {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "chroma_loc_info_present_flag cannot be set to 1 when chroma_format_idc is not 1",
                ));
            }

            if chroma_loc_info_present_flag {
                chroma_sample_loc = Some(ChromaSampleLoc::parse(&mut bit_reader)?)
            }

            let timing_info_present_flag = bit_reader.read_bit()?;
            if timing_info_present_flag {
                timing_info = Some(TimingInfo::parse(&mut bit_reader)?)
            }
        }

        Ok(Sps {
            nal_ref_idc,
            nal_unit_type: NALUnitType::try_from(nal_unit_type)?,
            profile_idc,
            constraint_set0_flag,
            constraint_set1_flag,
            constraint_set2_flag,
            constraint_set3_flag,
            constraint_set4_flag,
            constraint_set5_flag,
            level_idc,
            seq_parameter_set_id,
            ext: sps_ext,
            log2_max_frame_num_minus4,
            pic_order_cnt_type,
            log2_max_pic_order_cnt_lsb_minus4,
            pic_order_cnt_type1,
            max_num_ref_frames,
            gaps_in_frame_num_value_allowed_flag,
            pic_width_in_mbs_minus1,
            pic_height_in_map_units_minus1,
            mb_adaptive_frame_field_flag,
            direct_8x8_inference_flag,
            frame_crop_info,
            sample_aspect_ratio,
            overscan_appropriate_flag,
            color_config,
            chroma_sample_loc,
            timing_info,
        })
    }

    /// Builds the Sps struct into a byte stream.
    /// Returns a built byte stream.
    pub fn build(&self, writer: impl io::Write) -> io::Result<()> {
        let mut bit_writer = BitWriter::new(writer);

        bit_writer.write_bit(false)?;
        bit_writer.write_bits(self.nal_ref_idc as u64, 2)?;
        bit_writer.write_bits(self.nal_unit_type as u64, 5)?;
        bit_writer.write_bits(self.profile_idc as u64, 8)?;

        bit_writer.write_bit(self.constraint_set0_flag)?;
        bit_writer.write_bit(self.constraint_set1_flag)?;
        bit_writer.write_bit(self.constraint_set2_flag)?;
        bit_writer.write_bit(self.constraint_set3_flag)?;
        bit_writer.write_bit(self.constraint_set4_flag)?;
        bit_writer.write_bit(self.constraint_set5_flag)?;
        // reserved 2 bits
        bit_writer.write_bits(0, 2)?;

        bit_writer.write_bits(self.level_idc as u64, 8)?;
        bit_writer.write_exp_golomb(self.seq_parameter_set_id as u64)?;

        // sps ext
        if let Some(ext) = &self.ext {
            ext.build(&mut bit_writer)?;
        }

        bit_writer.write_exp_golomb(self.log2_max_frame_num_minus4 as u64)?;
        bit_writer.write_exp_golomb(self.pic_order_cnt_type as u64)?;

        if self.pic_order_cnt_type == 0 {
            bit_writer.write_exp_golomb(self.log2_max_pic_order_cnt_lsb_minus4.unwrap() as u64)?;
        } else if let Some(pic_order_cnt) = &self.pic_order_cnt_type1 {
            pic_order_cnt.build(&mut bit_writer)?;
        }

        bit_writer.write_exp_golomb(self.max_num_ref_frames as u64)?;
        bit_writer.write_bit(self.gaps_in_frame_num_value_allowed_flag)?;
        bit_writer.write_exp_golomb(self.pic_width_in_mbs_minus1)?;
        bit_writer.write_exp_golomb(self.pic_height_in_map_units_minus1)?;

        bit_writer.write_bit(self.mb_adaptive_frame_field_flag.is_none())?;
        if let Some(flag) = self.mb_adaptive_frame_field_flag {
            bit_writer.write_bit(flag)?;
        }

        bit_writer.write_bit(self.direct_8x8_inference_flag)?;

        bit_writer.write_bit(self.frame_crop_info.is_some())?;
        if let Some(frame_crop_info) = &self.frame_crop_info {
            frame_crop_info.build(&mut bit_writer)?;
        }

        match (
            &self.sample_aspect_ratio,
            &self.overscan_appropriate_flag,
            &self.color_config,
            &self.chroma_sample_loc,
            &self.timing_info,
        ) {
            (None, None, None, None, None) => {
                bit_writer.write_bit(false)?;
            }
            _ => {
                // vui_parameters_present_flag
                bit_writer.write_bit(true)?;

                // aspect_ratio_info_present_flag
                bit_writer.write_bit(self.sample_aspect_ratio.is_some())?;
                if let Some(sar) = &self.sample_aspect_ratio {
                    sar.build(&mut bit_writer)?;
                }

                // overscan_info_present_flag
                bit_writer.write_bit(self.overscan_appropriate_flag.is_some())?;
                if let Some(overscan) = &self.overscan_appropriate_flag {
                    bit_writer.write_bit(*overscan)?;
                }

                // video_signal_type_prsent_flag
                bit_writer.write_bit(self.color_config.is_some())?;
                if let Some(color) = &self.color_config {
                    color.build(&mut bit_writer)?;
                }

                // chroma_log_info_present_flag
                bit_writer.write_bit(self.chroma_sample_loc.is_some())?;
                if let Some(chroma) = &self.chroma_sample_loc {
                    chroma.build(&mut bit_writer)?;
                }

                // timing_info_present_flag
                bit_writer.write_bit(self.timing_info.is_some())?;
                if let Some(timing) = &self.timing_info {
                    timing.build(&mut bit_writer)?;
                }
            }
        }
        bit_writer.finish()?;

        Ok(())
    }

    /// Parses the Sps struct from a reader that may contain emulation prevention bytes.
    /// Is the same as calling [`Self::parse`] with an [`EmulationPreventionIo`] wrapper.
    pub fn parse_with_emulation_prevention(reader: impl io::Read) -> io::Result<Self> {
        Self::parse(EmulationPreventionIo::new(reader))
    }

    /// Builds the Sps struct into a byte stream that may contain emulation prevention bytes.
    /// Is the same as calling [`Self::build`] with an [`EmulationPreventionIo`] wrapper.
    pub fn build_with_emulation_prevention(self, writer: impl io::Write) -> io::Result<()> {
        self.build(EmulationPreventionIo::new(writer))
    }

    /// Returns the total byte size of the Sps struct.
    pub fn size(&self) -> u64 {
        (1 + // forbidden zero bit
        2 + // nal_ref_idc
        5 + // nal_unit_type
        8 + // profile_idc
        8 + // 6 constraint_setn_flags + 2 reserved bits
        8 + // level_idc
        size_of_exp_golomb(self.seq_parameter_set_id as u64) +
        self.ext.as_ref().map_or(0, |ext| ext.bitsize()) +
        size_of_exp_golomb(self.log2_max_frame_num_minus4 as u64) +
        size_of_exp_golomb(self.pic_order_cnt_type as u64) +
        match self.pic_order_cnt_type {
            0 => size_of_exp_golomb(self.log2_max_pic_order_cnt_lsb_minus4.unwrap() as u64),
            1 => self.pic_order_cnt_type1.as_ref().unwrap().bitsize(),
            _ => 0
        } +
        size_of_exp_golomb(self.max_num_ref_frames as u64) +
        1 + // gaps_in_frame_num_value_allowed_flag
        size_of_exp_golomb(self.pic_width_in_mbs_minus1) +
        size_of_exp_golomb(self.pic_height_in_map_units_minus1) +
        1 + // frame_mbs_only_flag
        self.mb_adaptive_frame_field_flag.is_some() as u64 +
        1 + // direct_8x8_inference_flag
        1 + // frame_cropping_flag
        self.frame_crop_info.as_ref().map_or(0, |frame| frame.bitsize()) +
        1 + // vui_parameters_present_flag
        if matches!(
            (&self.sample_aspect_ratio, &self.overscan_appropriate_flag, &self.color_config, &self.chroma_sample_loc, &self.timing_info),
            (None, None, None, None, None)
        ) {
            0
        } else {
            self.sample_aspect_ratio.as_ref().map_or(1, |sar| 1 + sar.bitsize()) +
            self.overscan_appropriate_flag.map_or(1, |_| 2) +
            self.color_config.as_ref().map_or(1, |color| 1 + color.bitsize()) +
            self.chroma_sample_loc.as_ref().map_or(1, |chroma| 1 + chroma.bitsize()) +
            self.timing_info.as_ref().map_or(1, |timing| 1 + timing.bitsize())
        }).div_ceil(8)
    }

    /// The height as a u64. This is computed from other fields, and isn't directly set.
    ///
    /// `height = ((2 - frame_mbs_only_flag as u64) * (pic_height_in_map_units_minus1 + 1) * 16) -
    /// frame_crop_bottom_offset * 2 - frame_crop_top_offset * 2`
    ///
    /// We don't directly store `frame_mbs_only_flag` since we can tell if it's set:
    /// If `mb_adaptive_frame_field_flag` is None, then `frame_mbs_only_flag` is set (1).
    /// Otherwise `mb_adaptive_frame_field_flag` unset (0).
    pub fn height(&self) -> u64 {
        let base_height =
            (2 - self.mb_adaptive_frame_field_flag.is_none() as u64) * (self.pic_height_in_map_units_minus1 + 1) * 16;

        self.frame_crop_info.as_ref().map_or(base_height, |crop| {
            base_height - (crop.frame_crop_top_offset + crop.frame_crop_bottom_offset) * 2
        })
    }

    /// The width as a u64. This is computed from other fields, and isn't directly set.
    ///
    /// `width = ((pic_width_in_mbs_minus1 + 1) * 16) - frame_crop_right_offset * 2 - frame_crop_left_offset * 2`
    pub fn width(&self) -> u64 {
        let base_width = (self.pic_width_in_mbs_minus1 + 1) * 16;

        self.frame_crop_info.as_ref().map_or(base_width, |crop| {
            base_width - (crop.frame_crop_left_offset + crop.frame_crop_right_offset) * 2
        })
    }

    /// Returns the frame rate as a f64.
    ///
    /// If `timing_info_present_flag` is set, then the `frame_rate` will be computed, and
    /// if `num_units_in_tick` is nonzero, then the framerate will be:
    /// `frame_rate = time_scale as f64 / (2.0 * num_units_in_tick as f64)`
    pub fn frame_rate(&self) -> Option<f64> {
        self.timing_info.as_ref().map(|timing| timing.frame_rate())
    }
}
