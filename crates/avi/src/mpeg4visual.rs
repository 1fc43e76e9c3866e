//! A minimal ISO/IEC 14496-2 ("MPEG-4 Visual") elementary-stream scanner.
//!
//! This only decodes enough of the Video Object Layer and Video Object
//! Plane headers to answer what the container-level report needs: the
//! coded picture dimensions, pixel aspect ratio, interlacing, and whether
//! any B-VOPs are present. It does not touch DCT/motion data.

use bytes_util::BitReader;

/// Start code for a Video Object Layer header (the low nibble of the
/// fourth byte ranges `0x20..=0x2F`; any value in that range is a VOL
/// start code).
const VOL_START_CODE_MIN: u8 = 0x20;
const VOL_START_CODE_MAX: u8 = 0x2F;
/// Start code for a Video Object Plane (VOP) header.
const VOP_START_CODE: u8 = 0xB6;

/// A located start code: `offset` is the index of the `00 00 01` prefix,
/// `code` is the byte immediately following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StartCode {
    offset: usize,
    code: u8,
}

fn scan(data: &[u8]) -> Vec<StartCode> {
    let mut codes = Vec::new();
    let mut offset = 0usize;
    while offset + 4 <= data.len() {
        if data[offset] == 0x00 && data[offset + 1] == 0x00 && data[offset + 2] == 0x01 {
            codes.push(StartCode { offset, code: data[offset + 3] });
            offset += 4;
        } else {
            offset += 1;
        }
    }
    codes
}

fn payload<'a>(data: &'a [u8], all_codes: &[StartCode], index: usize) -> &'a [u8] {
    let payload_start = all_codes[index].offset + 4;
    let payload_end = all_codes.get(index + 1).map(|next| next.offset).unwrap_or(data.len());
    &data[payload_start..payload_end]
}

/// VOP coding type, read from the two bits following a VOP start code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VopCodingType {
    /// Intra-coded plane.
    I,
    /// Predicted plane.
    P,
    /// Bi-predicted plane.
    B,
    /// Sprite (static) plane.
    S,
}

impl VopCodingType {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::I,
            1 => Self::P,
            2 => Self::B,
            _ => Self::S,
        }
    }
}

fn parse_vop_coding_type(data: &[u8]) -> Option<VopCodingType> {
    let mut reader = BitReader::new_from_slice(data);
    Some(VopCodingType::from_bits(reader.read_bits(2).ok()? as u8))
}

/// Decoded fields of a Video Object Layer header, for rectangular-shape
/// video objects (the overwhelming majority of AVI-contained content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolInfo {
    /// 4-bit aspect ratio info code; `0xF` means an extended pixel aspect
    /// ratio follows, captured separately in `pixel_aspect_ratio`.
    pub aspect_ratio_code: u8,
    /// Explicit (par_width, par_height) when `aspect_ratio_code == 0xF`.
    pub pixel_aspect_ratio: Option<(u8, u8)>,
    /// Coded picture width in pixels, for rectangular-shape video objects.
    pub width: Option<u16>,
    /// Coded picture height in pixels, for rectangular-shape video
    /// objects.
    pub height: Option<u16>,
    /// `interlaced` flag from the VOL header.
    pub interlaced: bool,
}

/// Parses a Video Object Layer header from the payload following its
/// start code.
pub fn parse_vol(data: &[u8]) -> Option<VolInfo> {
    let mut reader = BitReader::new_from_slice(data);

    let _random_accessible_vop = reader.read_bit().ok()?;
    let _video_object_type_indication = reader.read_bits(8).ok()?;

    let is_object_layer_identifier = reader.read_bit().ok()?;
    if is_object_layer_identifier {
        let _video_object_layer_verid = reader.read_bits(4).ok()?;
        let _video_object_layer_priority = reader.read_bits(3).ok()?;
    }

    let aspect_ratio_code = reader.read_bits(4).ok()? as u8;
    let pixel_aspect_ratio = if aspect_ratio_code == 0xF {
        let par_width = reader.read_bits(8).ok()? as u8;
        let par_height = reader.read_bits(8).ok()? as u8;
        Some((par_width, par_height))
    } else {
        None
    };

    let vol_control_parameters = reader.read_bit().ok()?;
    if vol_control_parameters {
        let _chroma_format = reader.read_bits(2).ok()?;
        let _low_delay = reader.read_bit().ok()?;
        let vbv_parameters = reader.read_bit().ok()?;
        if vbv_parameters {
            // first_half_bit_rate(15) marker(1) latter_half_bit_rate(15) marker(1)
            // first_half_vbv_buffer_size(15) marker(1) latter_half_vbv_buffer_size(3)
            // first_half_vbv_occupancy(11) marker(1) latter_half_vbv_occupancy(15) marker(1)
            reader.read_bits(15).ok()?;
            reader.read_bit().ok()?;
            reader.read_bits(15).ok()?;
            reader.read_bit().ok()?;
            reader.read_bits(15).ok()?;
            reader.read_bit().ok()?;
            reader.read_bits(3).ok()?;
            reader.read_bits(11).ok()?;
            reader.read_bit().ok()?;
            reader.read_bits(15).ok()?;
            reader.read_bit().ok()?;
        }
    }

    let video_object_layer_shape = reader.read_bits(2).ok()? as u8;

    // marker_bit, vop_time_increment_resolution(16), marker_bit
    reader.read_bit().ok()?;
    reader.read_bits(16).ok()?;
    reader.read_bit().ok()?;

    let fixed_vop_rate = reader.read_bit().ok()?;
    if fixed_vop_rate {
        // fixed_vop_time_increment, width depends on vop_time_increment_resolution;
        // skipped since this crate does not surface it, and getting its exact
        // bit width right requires carrying vop_time_increment_resolution
        // through: stop decoding further fields from this header rather than
        // guess.
        return Some(VolInfo {
            aspect_ratio_code,
            pixel_aspect_ratio,
            width: None,
            height: None,
            interlaced: false,
        });
    }

    if video_object_layer_shape != 0 {
        // Non-rectangular (binary/grayscale) shapes are rare in AVI content
        // and this crate does not decode their extra shape fields.
        return Some(VolInfo { aspect_ratio_code, pixel_aspect_ratio, width: None, height: None, interlaced: false });
    }

    let _marker = reader.read_bit().ok()?;
    let width = reader.read_bits(13).ok()? as u16;
    let _marker = reader.read_bit().ok()?;
    let height = reader.read_bits(13).ok()? as u16;
    let _marker = reader.read_bit().ok()?;
    let interlaced = reader.read_bit().ok()?;

    Some(VolInfo {
        aspect_ratio_code,
        pixel_aspect_ratio,
        width: Some(width),
        height: Some(height),
        interlaced,
    })
}

/// Accumulates VOL/VOP observations from a run of concatenated video
/// chunk payloads.
#[derive(Debug, Default, Clone)]
pub struct Scanner {
    /// The first Video Object Layer header seen, if any.
    pub vol: Option<VolInfo>,
    /// Whether any B-coded VOP was observed.
    pub has_b_vop: bool,
    vop_count: usize,
}

impl Scanner {
    /// Creates an empty scanner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of VOP headers observed so far.
    pub fn vop_count(&self) -> usize {
        self.vop_count
    }

    /// Scans `data` (one or more concatenated video chunk payloads) for
    /// start codes and folds every VOL/VOP header found into the running
    /// summary.
    pub fn observe(&mut self, data: &[u8]) {
        self.observe_inner(data, true);
    }

    /// Like [`observe`](Self::observe), but skips VOL parsing — for the
    /// wider, cheaper pass used only to count VOP coding types once the
    /// first VOL has already been captured (or the codec-field scan
    /// budget has been exhausted).
    pub fn observe_vop_only(&mut self, data: &[u8]) {
        self.observe_inner(data, false);
    }

    fn observe_inner(&mut self, data: &[u8], parse_vol_headers: bool) {
        let codes = scan(data);
        for (index, code) in codes.iter().enumerate() {
            let body = payload(data, &codes, index);
            if parse_vol_headers && (VOL_START_CODE_MIN..=VOL_START_CODE_MAX).contains(&code.code) {
                if let Some(vol) = parse_vol(body) {
                    self.vol.get_or_insert(vol);
                }
            } else if code.code == VOP_START_CODE {
                if let Some(coding_type) = parse_vop_coding_type(body) {
                    self.vop_count += 1;
                    if coding_type == VopCodingType::B {
                        self.has_b_vop = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_util::BitWriter;

    fn vop(coding_type: u8) -> Vec<u8> {
        let mut writer = BitWriter::default();
        writer.write_bits(coding_type as u64, 2).unwrap();
        writer.write_bits(0, 6).unwrap();
        let body: Vec<u8> = writer.finish().unwrap();
        let mut data = vec![0x00, 0x00, 0x01, VOP_START_CODE];
        data.extend_from_slice(&body);
        data
    }

    fn vol_rectangular(width: u16, height: u16, interlaced: bool) -> Vec<u8> {
        let mut writer = BitWriter::default();
        writer.write_bit(false).unwrap(); // random_accessible_vop
        writer.write_bits(1, 8).unwrap(); // video_object_type_indication
        writer.write_bit(false).unwrap(); // is_object_layer_identifier
        writer.write_bits(1, 4).unwrap(); // aspect_ratio_code (square pixels)
        writer.write_bit(false).unwrap(); // vol_control_parameters
        writer.write_bits(0, 2).unwrap(); // video_object_layer_shape = rectangular
        writer.write_bit(true).unwrap(); // marker
        writer.write_bits(1000, 16).unwrap(); // vop_time_increment_resolution
        writer.write_bit(true).unwrap(); // marker
        writer.write_bit(false).unwrap(); // fixed_vop_rate
        writer.write_bit(true).unwrap(); // marker
        writer.write_bits(width as u64, 13).unwrap();
        writer.write_bit(true).unwrap(); // marker
        writer.write_bits(height as u64, 13).unwrap();
        writer.write_bit(true).unwrap(); // marker
        writer.write_bit(interlaced).unwrap();
        let body: Vec<u8> = writer.finish().unwrap();
        let mut data = vec![0x00, 0x00, 0x01, 0x20];
        data.extend_from_slice(&body);
        data
    }

    #[test]
    fn detects_b_vop_among_mixed_coding_types() {
        let mut scanner = Scanner::new();
        let mut stream = vop(0); // I
        stream.extend_from_slice(&vop(1)); // P
        stream.extend_from_slice(&vop(2)); // B
        scanner.observe(&stream);
        assert!(scanner.has_b_vop);
        assert_eq!(scanner.vop_count(), 3);
    }

    #[test]
    fn no_b_vop_when_only_i_and_p() {
        let mut scanner = Scanner::new();
        let mut stream = vop(0);
        stream.extend_from_slice(&vop(1));
        scanner.observe(&stream);
        assert!(!scanner.has_b_vop);
    }

    #[test]
    fn parses_rectangular_vol_dimensions() {
        let mut scanner = Scanner::new();
        scanner.observe(&vol_rectangular(320, 240, false));
        let vol = scanner.vol.unwrap();
        assert_eq!(vol.width, Some(320));
        assert_eq!(vol.height, Some(240));
        assert!(!vol.interlaced);
    }
}
