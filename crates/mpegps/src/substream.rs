//! Sub-stream ID dispatch for `stream_id = 0xBD` (private_stream_1).
//!
//! The first payload byte of a private stream's PES body is not part of
//! the payload — it selects which sub-stream (subpicture, AC-3, DTS,
//! LPCM) the rest of the payload belongs to.

/// Which kind of private sub-stream a `private_stream_1` payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKind {
    /// DVD subpicture (`0x20..=0x3F`).
    Subpicture,
    /// AC-3 audio, with a four-byte audio substream header before the
    /// sync frame (`0x80..=0x87`).
    Ac3,
    /// DTS audio (`0x88..=0x8F`).
    Dts,
    /// Linear PCM audio (`0xA0..=0xA7`).
    Lpcm,
    /// Unrecognized sub-stream ID.
    Unknown,
}

/// Classifies a sub-stream ID byte.
pub fn classify(sub_id: u8) -> PrivateKind {
    match sub_id {
        0x20..=0x3F => PrivateKind::Subpicture,
        0x80..=0x87 => PrivateKind::Ac3,
        0x88..=0x8F => PrivateKind::Dts,
        0xA0..=0xA7 => PrivateKind::Lpcm,
        _ => PrivateKind::Unknown,
    }
}

/// Number of bytes of per-substream header to strip from an AC-3 private
/// payload before the first AC-3 sync frame: sub-stream ID (already
/// consumed by the caller) plus `number_of_frame_headers` and a 2-byte
/// `first_access_unit_pointer`.
pub const AC3_SUBSTREAM_HEADER_LEN: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_ranges() {
        assert_eq!(classify(0x25), PrivateKind::Subpicture);
        assert_eq!(classify(0x80), PrivateKind::Ac3);
        assert_eq!(classify(0x8F), PrivateKind::Dts);
        assert_eq!(classify(0xA3), PrivateKind::Lpcm);
        assert_eq!(classify(0xFF), PrivateKind::Unknown);
    }
}
