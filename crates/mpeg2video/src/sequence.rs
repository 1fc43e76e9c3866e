//! Sequence header (`0xB3`) parsing.

use bytes_util::BitReader;

/// Default intra quantization matrix, in zig-zag scan order.
/// ISO/IEC 13818-2 Table 7-3.
pub const DEFAULT_INTRA_MATRIX: [u8; 64] = [
    8, 16, 19, 22, 26, 27, 29, 34, 16, 16, 22, 24, 27, 29, 34, 37, 19, 22, 26, 27, 29, 34, 34, 38,
    22, 22, 26, 27, 29, 34, 37, 40, 22, 26, 27, 29, 32, 35, 40, 48, 26, 27, 29, 32, 35, 40, 48, 58,
    26, 27, 29, 34, 38, 46, 56, 69, 27, 29, 35, 38, 46, 56, 69, 83,
];

/// Default (flat) non-intra quantization matrix: every coefficient scaled
/// identically.
pub const DEFAULT_NON_INTRA_MATRIX: [u8; 64] = [16; 64];

/// Whether a parsed quantization matrix matches a known default table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    /// Matches the corresponding default table exactly.
    Default,
    /// An explicit, non-default matrix was signaled.
    Custom,
}

/// Frame-rate code to (numerator, denominator), ISO/IEC 13818-2 Table 6-4.
/// Index 0 is unused (code 0 is forbidden); codes 9..=15 are reserved.
const FRAME_RATE_TABLE: [Option<(u32, u32)>; 16] = [
    None,
    Some((24000, 1001)),
    Some((24, 1)),
    Some((25, 1)),
    Some((30000, 1001)),
    Some((30, 1)),
    Some((50, 1)),
    Some((60000, 1001)),
    Some((60, 1)),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// A decoded sequence header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SequenceHeader {
    /// Horizontal size in pixels.
    pub width: u16,
    /// Vertical size in pixels.
    pub height: u16,
    /// 4-bit aspect ratio information code, Table 6-3.
    pub aspect_ratio_code: u8,
    /// 4-bit frame rate code, Table 6-4.
    pub frame_rate_code: u8,
    /// Frame rate as (numerator, denominator), when the code is not
    /// reserved.
    pub frame_rate: Option<(u32, u32)>,
    /// 18-bit bit_rate_value (units of 400 bit/s; the -1 escape is not
    /// modeled here).
    pub bit_rate_value: u32,
    /// 10-bit VBV buffer size.
    pub vbv_buffer_size: u16,
    /// Whether constrained_parameters_flag was set.
    pub constrained_parameters: bool,
    /// Classification of the intra quantization matrix, if one was loaded.
    pub intra_matrix: Option<MatrixKind>,
    /// Classification of the non-intra quantization matrix, if one was
    /// loaded.
    pub non_intra_matrix: Option<MatrixKind>,
}

/// Parses a sequence header from the payload immediately following the
/// `0xB3` start code.
pub fn parse(data: &[u8]) -> Option<SequenceHeader> {
    let mut reader = BitReader::new_from_slice(data);

    let width = reader.read_bits(12).ok()? as u16;
    let height = reader.read_bits(12).ok()? as u16;
    let aspect_ratio_code = reader.read_bits(4).ok()? as u8;
    let frame_rate_code = reader.read_bits(4).ok()? as u8;
    let frame_rate = FRAME_RATE_TABLE[frame_rate_code as usize];
    let bit_rate_value = reader.read_bits(18).ok()? as u32;
    reader.read_bit().ok()?; // marker_bit
    let vbv_buffer_size = reader.read_bits(10).ok()? as u16;
    let constrained_parameters = reader.read_bit().ok()?;

    let load_intra_matrix = reader.read_bit().ok()?;
    let intra_matrix = if load_intra_matrix {
        Some(classify_matrix(&mut reader, &DEFAULT_INTRA_MATRIX)?)
    } else {
        None
    };

    let load_non_intra_matrix = reader.read_bit().ok()?;
    let non_intra_matrix = if load_non_intra_matrix {
        Some(classify_matrix(&mut reader, &DEFAULT_NON_INTRA_MATRIX)?)
    } else {
        None
    };

    Some(SequenceHeader {
        width,
        height,
        aspect_ratio_code,
        frame_rate_code,
        frame_rate,
        bit_rate_value,
        vbv_buffer_size,
        constrained_parameters,
        intra_matrix,
        non_intra_matrix,
    })
}

fn classify_matrix<R: std::io::Read>(
    reader: &mut BitReader<R>,
    default_table: &[u8; 64],
) -> Option<MatrixKind> {
    let mut bytes = [0u8; 64];
    for slot in &mut bytes {
        *slot = reader.read_bits(8).ok()? as u8;
    }
    if &bytes == default_table {
        Some(MatrixKind::Default)
    } else {
        Some(MatrixKind::Custom)
    }
}
