//! Main AVI Header (`avih`) parsing.

/// Bit set in [`MainHeader::flags`] when the file has an `idx1` index.
pub const AVIF_HASINDEX: u32 = 0x0000_0010;

/// Bit set in [`MainHeader::flags`] when audio/video chunks in `movi` are
/// interleaved at roughly one-second granularity.
pub const AVIF_ISINTERLEAVED: u32 = 0x0000_0100;

/// The fixed-layout fields this crate surfaces from `avih`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainHeader {
    /// Frame display period, in microseconds.
    pub microsec_per_frame: u32,
    /// Total number of frames in the file (across all streams, per the
    /// file's own bookkeeping).
    pub total_frames: u32,
    /// Header-level flags, see [`AVIF_HASINDEX`]/[`AVIF_ISINTERLEAVED`].
    pub flags: u32,
    /// Number of streams described by the following `strl` lists.
    pub streams: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl MainHeader {
    /// Whether `flags` declares an `idx1` index is present.
    pub fn has_index(&self) -> bool {
        self.flags & AVIF_HASINDEX != 0
    }

    /// Whether `flags` declares the streams are interleaved.
    pub fn is_interleaved(&self) -> bool {
        self.flags & AVIF_ISINTERLEAVED != 0
    }

    /// Overall duration in seconds derived from `microsec_per_frame` and
    /// `total_frames`, or `None` if either is zero.
    pub fn duration_seconds(&self) -> Option<f64> {
        if self.microsec_per_frame == 0 || self.total_frames == 0 {
            return None;
        }
        Some(self.microsec_per_frame as f64 * self.total_frames as f64 / 1_000_000.0)
    }
}

/// Parses the fixed-layout prefix of an `avih` chunk body.
pub fn parse(body: &[u8]) -> Option<MainHeader> {
    let word = |offset: usize| -> Option<u32> {
        body.get(offset..offset + 4).map(|b| u32::from_le_bytes(b.try_into().unwrap()))
    };

    Some(MainHeader {
        microsec_per_frame: word(0)?,
        total_frames: word(16)?,
        flags: word(12)?,
        streams: word(24)?,
        width: word(32)?,
        height: word(36)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> Vec<u8> {
        let mut body = vec![0u8; 40];
        body[0..4].copy_from_slice(&33_367u32.to_le_bytes()); // microsec_per_frame
        body[12..16].copy_from_slice(&(AVIF_HASINDEX | AVIF_ISINTERLEAVED).to_le_bytes());
        body[16..20].copy_from_slice(&300u32.to_le_bytes()); // total_frames
        body[24..28].copy_from_slice(&2u32.to_le_bytes()); // streams
        body[32..36].copy_from_slice(&640u32.to_le_bytes()); // width
        body[36..40].copy_from_slice(&480u32.to_le_bytes()); // height
        body
    }

    #[test]
    fn parses_main_header_fields() {
        let header = parse(&sample_body()).unwrap();
        assert_eq!(header.microsec_per_frame, 33_367);
        assert_eq!(header.total_frames, 300);
        assert_eq!(header.streams, 2);
        assert_eq!(header.width, 640);
        assert_eq!(header.height, 480);
        assert!(header.has_index());
        assert!(header.is_interleaved());
    }

    #[test]
    fn derives_duration_from_frame_period_and_count() {
        let header = parse(&sample_body()).unwrap();
        let seconds = header.duration_seconds().unwrap();
        assert!((seconds - 10.0101).abs() < 0.001);
    }

    #[test]
    fn truncated_body_yields_none() {
        assert!(parse(&[0u8; 10]).is_none());
    }
}
