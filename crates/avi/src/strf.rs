//! Stream Format (`strf`) parsing: a `BITMAPINFOHEADER` for video streams,
//! a `WAVEFORMATEX` for audio streams. The caller picks which to parse
//! from the owning stream's `strh` `fccType`.

/// The fixed-layout fields this crate surfaces from a video `strf`
/// (`BITMAPINFOHEADER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFormat {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels. `BITMAPINFOHEADER` stores this signed;
    /// negative values mean top-down row order (positive is bottom-up).
    /// This field is always the magnitude.
    pub height: u32,
    /// `true` if `biHeight` was negative (top-down row order).
    pub top_down: bool,
    /// Bits per pixel.
    pub bit_depth: u16,
    /// `biCompression` four-cc. `[0; 4]` means uncompressed/unset, in
    /// which case the owning stream's `strh` `fccHandler` is authoritative
    /// for codec identification instead.
    pub compression: [u8; 4],
}

/// Parses the 20 fixed bytes of a `BITMAPINFOHEADER` that follow `biSize`
/// (itself ignored: this crate trusts the chunk's own declared length).
pub fn parse_video(body: &[u8]) -> Option<VideoFormat> {
    let width = body.get(4..8).map(|b| u32::from_le_bytes(b.try_into().unwrap()))?;
    let raw_height = body.get(8..12).map(|b| i32::from_le_bytes(b.try_into().unwrap()))?;
    let bit_depth = body.get(14..16).map(|b| u16::from_le_bytes(b.try_into().unwrap()))?;
    let compression: [u8; 4] = body.get(16..20)?.try_into().ok()?;

    Some(VideoFormat {
        width,
        height: raw_height.unsigned_abs(),
        top_down: raw_height < 0,
        bit_depth,
        compression,
    })
}

/// The fixed-layout fields this crate surfaces from an audio `strf`
/// (`WAVEFORMATEX`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// `wFormatTag`, e.g. `0x0001` PCM, `0x0055` MP3.
    pub format_tag: u16,
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

/// MP3 `wFormatTag` value, used to gate the MP3 codec-specific scan.
pub const WAVE_FORMAT_MP3: u16 = 0x0055;

/// Parses the 16 fixed bytes of a `WAVEFORMATEX`. Any trailing `cbSize`
/// plus codec-specific extra data is left unread.
pub fn parse_audio(body: &[u8]) -> Option<AudioFormat> {
    let format_tag = body.get(0..2).map(|b| u16::from_le_bytes(b.try_into().unwrap()))?;
    let channels = body.get(2..4).map(|b| u16::from_le_bytes(b.try_into().unwrap()))?;
    let sample_rate = body.get(4..8).map(|b| u32::from_le_bytes(b.try_into().unwrap()))?;
    let bits_per_sample = body.get(14..16).map(|b| u16::from_le_bytes(b.try_into().unwrap()))?;

    Some(AudioFormat { format_tag, channels, sample_rate, bits_per_sample })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bottom_up_video_format() {
        let mut body = vec![0u8; 20];
        body[4..8].copy_from_slice(&1920u32.to_le_bytes());
        body[8..12].copy_from_slice(&1080i32.to_le_bytes());
        body[14..16].copy_from_slice(&24u16.to_le_bytes());
        body[16..20].copy_from_slice(b"XVID");
        let format = parse_video(&body).unwrap();
        assert_eq!(format.width, 1920);
        assert_eq!(format.height, 1080);
        assert!(!format.top_down);
        assert_eq!(format.bit_depth, 24);
        assert_eq!(&format.compression, b"XVID");
    }

    #[test]
    fn negative_height_is_top_down() {
        let mut body = vec![0u8; 20];
        body[8..12].copy_from_slice(&(-480i32).to_le_bytes());
        let format = parse_video(&body).unwrap();
        assert_eq!(format.height, 480);
        assert!(format.top_down);
    }

    #[test]
    fn parses_mp3_audio_format() {
        let mut body = vec![0u8; 16];
        body[0..2].copy_from_slice(&WAVE_FORMAT_MP3.to_le_bytes());
        body[2..4].copy_from_slice(&2u16.to_le_bytes());
        body[4..8].copy_from_slice(&44_100u32.to_le_bytes());
        body[14..16].copy_from_slice(&16u16.to_le_bytes());
        let format = parse_audio(&body).unwrap();
        assert_eq!(format.format_tag, WAVE_FORMAT_MP3);
        assert_eq!(format.channels, 2);
        assert_eq!(format.sample_rate, 44_100);
        assert_eq!(format.bits_per_sample, 16);
    }
}
