//! Group-of-pictures header (`0xB8`) parsing.

use bytes_util::BitReader;

/// An SMPTE-style timecode as carried in the GOP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCode {
    /// Hours (0..=23).
    pub hours: u8,
    /// Minutes (0..=59).
    pub minutes: u8,
    /// Seconds (0..=59).
    pub seconds: u8,
    /// Frames (0..=59).
    pub frames: u8,
    /// Whether drop-frame counting is in effect.
    pub drop_frame: bool,
}

impl TimeCode {
    /// Formats as `HH:MM:SS:FF`, or `HH:MM:SS;FF` when drop-frame.
    pub fn formatted(&self) -> String {
        let separator = if self.drop_frame { ';' } else { ':' };
        format!(
            "{:02}:{:02}:{:02}{}{:02}",
            self.hours, self.minutes, self.seconds, separator, self.frames
        )
    }
}

/// A decoded GOP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct GopHeader {
    /// Timecode and drop-frame flag.
    pub time_code: TimeCode,
    /// Whether this GOP is closed (no prediction from a prior GOP).
    pub closed_gop: bool,
    /// Whether the first B picture(s) of this GOP reference an unavailable
    /// prior picture (only meaningful when the sequence is not closed).
    pub broken_link: bool,
}

/// Parses a GOP header from the payload following the `0xB8` start code.
pub fn parse(data: &[u8]) -> Option<GopHeader> {
    let mut reader = BitReader::new_from_slice(data);

    let drop_frame = reader.read_bit().ok()?;
    let hours = reader.read_bits(5).ok()? as u8;
    let minutes = reader.read_bits(6).ok()? as u8;
    reader.read_bit().ok()?; // marker_bit
    let seconds = reader.read_bits(6).ok()? as u8;
    let frames = reader.read_bits(6).ok()? as u8;
    let closed_gop = reader.read_bit().ok()?;
    let broken_link = reader.read_bit().ok()?;

    Some(GopHeader {
        time_code: TimeCode {
            hours,
            minutes,
            seconds,
            frames,
            drop_frame,
        },
        closed_gop,
        broken_link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_util::BitWriter;

    #[test]
    fn parses_closed_gop_header() {
        let mut writer = BitWriter::default();
        writer.write_bit(false).unwrap(); // drop_frame
        writer.write_bits(1, 5).unwrap(); // hours
        writer.write_bits(2, 6).unwrap(); // minutes
        writer.write_bit(true).unwrap(); // marker
        writer.write_bits(3, 6).unwrap(); // seconds
        writer.write_bits(4, 6).unwrap(); // frames
        writer.write_bit(true).unwrap(); // closed_gop
        writer.write_bit(false).unwrap(); // broken_link
        let data: Vec<u8> = writer.finish().unwrap();

        let header = parse(&data).unwrap();
        assert!(header.closed_gop);
        assert!(!header.broken_link);
        assert_eq!(header.time_code.formatted(), "01:02:03:04");
    }

    #[test]
    fn formats_drop_frame_timecode_with_semicolon() {
        let time_code = TimeCode {
            hours: 0,
            minutes: 1,
            seconds: 0,
            frames: 2,
            drop_frame: true,
        };
        assert_eq!(time_code.formatted(), "00:01:00;02");
    }
}
