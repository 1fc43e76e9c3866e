//! Extension payloads (`0xB5`), distinguished by a 4-bit subtype in the
//! first nibble of the payload.

use bytes_util::BitReader;

const SEQUENCE_EXTENSION_ID: u8 = 1;
const SEQUENCE_DISPLAY_EXTENSION_ID: u8 = 2;
const PICTURE_CODING_EXTENSION_ID: u8 = 8;

/// Chroma sampling format, `chroma_format` field of the sequence extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaFormat {
    /// 4:2:0.
    Yuv420,
    /// 4:2:2.
    Yuv422,
    /// 4:4:4.
    Yuv444,
}

impl ChromaFormat {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::Yuv420),
            2 => Some(Self::Yuv422),
            3 => Some(Self::Yuv444),
            _ => None,
        }
    }
}

/// The sequence extension (subtype 1): profile/level and chroma format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SequenceExtension {
    /// 8-bit profile and level indication.
    pub profile_and_level_indication: u8,
    /// Whether the sequence uses progressive scan exclusively.
    pub progressive_sequence: bool,
    /// Chroma sampling format.
    pub chroma_format: Option<ChromaFormat>,
}

fn parse_sequence_extension(data: &[u8]) -> Option<SequenceExtension> {
    let mut reader = BitReader::new_from_slice(data);
    reader.read_bits(4).ok()?; // extension_start_code_identifier, already consumed by caller normally
    let profile_and_level_indication = reader.read_bits(8).ok()? as u8;
    let progressive_sequence = reader.read_bit().ok()?;
    let chroma_format_bits = reader.read_bits(2).ok()? as u8;

    Some(SequenceExtension {
        profile_and_level_indication,
        progressive_sequence,
        chroma_format: ChromaFormat::from_bits(chroma_format_bits),
    })
}

/// The sequence display extension (subtype 2): colour description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SequenceDisplayExtension {
    /// Source video format (component/PAL/NTSC/SECAM/MAC/unspecified).
    pub video_format: u8,
    /// Colour primaries code, Table 6-6, when `colour_description` was set.
    pub colour_primaries: Option<u8>,
    /// Transfer characteristics code, Table 6-7.
    pub transfer_characteristics: Option<u8>,
    /// Matrix coefficients code, Table 6-8.
    pub matrix_coefficients: Option<u8>,
}

fn parse_sequence_display_extension(data: &[u8]) -> Option<SequenceDisplayExtension> {
    let mut reader = BitReader::new_from_slice(data);
    reader.read_bits(4).ok()?;
    let video_format = reader.read_bits(3).ok()? as u8;
    let colour_description = reader.read_bit().ok()?;

    let (colour_primaries, transfer_characteristics, matrix_coefficients) = if colour_description {
        (
            Some(reader.read_bits(8).ok()? as u8),
            Some(reader.read_bits(8).ok()? as u8),
            Some(reader.read_bits(8).ok()? as u8),
        )
    } else {
        (None, None, None)
    };

    Some(SequenceDisplayExtension {
        video_format,
        colour_primaries,
        transfer_characteristics,
        matrix_coefficients,
    })
}

/// The picture coding extension (subtype 8). Only `intra_dc_precision` is
/// retained beyond parsing, per the finalization rule that tracks its mode
/// (and, separately, its last observed value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PictureCodingExtension {
    /// 2-bit precision selector (0 => 8 bits, .. 3 => 11 bits).
    pub intra_dc_precision: u8,
}

fn parse_picture_coding_extension(data: &[u8]) -> Option<PictureCodingExtension> {
    let mut reader = BitReader::new_from_slice(data);
    reader.read_bits(4).ok()?;
    reader.read_bits(4).ok()?; // f_code[0][0]
    reader.read_bits(4).ok()?; // f_code[0][1]
    reader.read_bits(4).ok()?; // f_code[1][0]
    reader.read_bits(4).ok()?; // f_code[1][1]
    let intra_dc_precision = reader.read_bits(2).ok()? as u8;

    Some(PictureCodingExtension { intra_dc_precision })
}

/// The decoded variant of a `0xB5` extension payload; `Unknown` covers
/// subtypes this crate doesn't need to interpret (quant matrix extension,
/// picture display extension, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    /// Subtype 1.
    Sequence(SequenceExtension),
    /// Subtype 2.
    SequenceDisplay(SequenceDisplayExtension),
    /// Subtype 8, only meaningful immediately after a picture header.
    PictureCoding(PictureCodingExtension),
    /// Any other subtype.
    Unknown(u8),
}

/// Parses an extension payload (the bytes following the `0xB5` start
/// code), dispatching on its leading 4-bit subtype.
pub fn parse(data: &[u8]) -> Option<Extension> {
    let subtype = data.first()? >> 4;
    match subtype {
        SEQUENCE_EXTENSION_ID => parse_sequence_extension(data).map(Extension::Sequence),
        SEQUENCE_DISPLAY_EXTENSION_ID => {
            parse_sequence_display_extension(data).map(Extension::SequenceDisplay)
        }
        PICTURE_CODING_EXTENSION_ID => {
            parse_picture_coding_extension(data).map(Extension::PictureCoding)
        }
        other => Some(Extension::Unknown(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_util::BitWriter;

    #[test]
    fn parses_sequence_extension() {
        let mut writer = BitWriter::default();
        writer.write_bits(SEQUENCE_EXTENSION_ID as u64, 4).unwrap();
        writer.write_bits(0x4A, 8).unwrap(); // profile_and_level_indication
        writer.write_bit(true).unwrap(); // progressive_sequence
        writer.write_bits(1, 2).unwrap(); // chroma_format = 4:2:0
        writer.write_bits(0, 2).unwrap(); // pad out remaining reserved bits
        let data: Vec<u8> = writer.finish().unwrap();

        let extension = parse(&data).unwrap();
        match extension {
            Extension::Sequence(seq) => {
                assert_eq!(seq.profile_and_level_indication, 0x4A);
                assert!(seq.progressive_sequence);
                assert_eq!(seq.chroma_format, Some(ChromaFormat::Yuv420));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parses_sequence_display_extension_without_colour_description() {
        let mut writer = BitWriter::default();
        writer
            .write_bits(SEQUENCE_DISPLAY_EXTENSION_ID as u64, 4)
            .unwrap();
        writer.write_bits(1, 3).unwrap(); // video_format = PAL
        writer.write_bit(false).unwrap(); // colour_description
        let data: Vec<u8> = writer.finish().unwrap();

        let extension = parse(&data).unwrap();
        match extension {
            Extension::SequenceDisplay(display) => {
                assert_eq!(display.video_format, 1);
                assert!(display.colour_primaries.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parses_picture_coding_extension() {
        let mut writer = BitWriter::default();
        writer
            .write_bits(PICTURE_CODING_EXTENSION_ID as u64, 4)
            .unwrap();
        writer.write_bits(0, 4).unwrap();
        writer.write_bits(0, 4).unwrap();
        writer.write_bits(0, 4).unwrap();
        writer.write_bits(0, 4).unwrap();
        writer.write_bits(2, 2).unwrap(); // intra_dc_precision
        let data: Vec<u8> = writer.finish().unwrap();

        let extension = parse(&data).unwrap();
        match extension {
            Extension::PictureCoding(pce) => assert_eq!(pce.intra_dc_precision, 2),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_subtype_is_passed_through() {
        let data = [0x30u8];
        match parse(&data).unwrap() {
            Extension::Unknown(3) => {}
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
