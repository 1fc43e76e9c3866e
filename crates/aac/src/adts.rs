//! ADTS (Audio Data Transport Stream) frame header parsing.

use std::io;

use bytes_util::BitReader;
use num_traits::FromPrimitive;

use crate::{AudioObjectType, SampleFrequencyIndex};

/// A decoded ADTS frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct AdtsHeader {
    /// `MPEG-2` AAC (`true`) vs `MPEG-4` AAC (`false`), from the `ID` bit.
    pub mpeg_version_2: bool,
    /// The audio object type, offset by one from the 2-bit `profile` field
    /// (`profile + 1`), matching `AudioSpecificConfig`'s `audio_object_type`.
    pub audio_object_type: AudioObjectType,
    /// Sampling frequency in Hz.
    pub sampling_frequency: u32,
    /// Channel configuration (0 means the configuration is signaled
    /// out-of-band via PCE, not expected in practice for this header).
    pub channel_configuration: u8,
    /// Total frame length in bytes, ADTS header included.
    pub frame_length: u16,
}

/// Attempts to parse a 7-byte (fixed + variable, no CRC) ADTS header at the
/// start of `data`. Returns `None` on a short read, a missing sync word, or
/// a reserved sampling-frequency index.
pub fn parse(data: &[u8]) -> Option<AdtsHeader> {
    if data.len() < 7 {
        return None;
    }

    // 12-bit sync: 0xFFF.
    if data[0] != 0xFF || (data[1] & 0xF0) != 0xF0 {
        return None;
    }

    let mpeg_version_2 = (data[1] & 0x08) != 0;
    let protection_absent = (data[1] & 0x01) != 0;

    let mut reader = BitReader::new_from_slice(&data[2..]);
    let profile = reader.read_bits(2).ok()? as u16;
    let sampling_frequency_index = reader.read_bits(4).ok()? as u8;
    reader.read_bit().ok()?; // private_bit
    let channel_configuration = reader.read_bits(3).ok()? as u8;
    reader.read_bit().ok()?; // original_copy
    reader.read_bit().ok()?; // home
    reader.read_bit().ok()?; // copyright_identification_bit
    reader.read_bit().ok()?; // copyright_identification_start
    let frame_length = reader.read_bits(13).ok()? as u16;
    reader.read_bits(11).ok()?; // buffer_fullness
    let _num_raw_data_blocks = reader.read_bits(2).ok()?;

    let sampling_frequency = SampleFrequencyIndex::from_u8(sampling_frequency_index)?
        .to_freq()?;

    let _ = protection_absent;
    Some(AdtsHeader {
        mpeg_version_2,
        audio_object_type: AudioObjectType::from_u16(profile + 1),
        sampling_frequency,
        channel_configuration,
        frame_length,
    })
}

/// Returns the length of the leading run of consecutive, back-to-back
/// frames in `data` that share the same sampling frequency and channel
/// configuration. A run of at least two is treated as confirmation that
/// `data` begins with a genuine ADTS stream rather than a coincidental
/// sync pattern.
pub fn confirm_run(data: &[u8]) -> usize {
    let Some(first) = parse(data) else {
        return 0;
    };

    let mut offset = 0usize;
    let mut count = 0usize;
    loop {
        let Some(header) = parse(&data[offset..]) else {
            break;
        };
        if header.sampling_frequency != first.sampling_frequency
            || header.channel_configuration != first.channel_configuration
            || header.frame_length == 0
        {
            break;
        }
        count += 1;
        offset += header.frame_length as usize;
        if offset >= data.len() {
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(frame_length: u16) -> Vec<u8> {
        // profile=1 (LC), sampling_frequency_index=4 (44100), channels=2
        let mut bits: u64 = 0;
        bits |= 1 << 61; // profile (2 bits)
        bits |= 4 << 57; // sfi (4 bits)
        bits |= 0 << 56; // private
        bits |= 2 << 53; // channel config (3 bits)
        bits |= 0 << 52; // original/copy
        bits |= 0 << 51; // home
        bits |= 0 << 50; // copyright id bit
        bits |= 0 << 49; // copyright id start
        bits |= (frame_length as u64) << 36; // 13 bits
        bits |= 0x7FF << 25; // buffer fullness (11 bits), all 1s
        bits |= 0 << 23; // num_raw_data_blocks

        let payload_bytes = bits.to_be_bytes();
        let mut data = vec![0xFF, 0xF1];
        data.extend_from_slice(&payload_bytes[0..5]);
        data
    }

    #[test]
    fn parses_sample_header() {
        let data = sample_frame(200);
        let header = parse(&data).unwrap();
        assert_eq!(header.sampling_frequency, 44_100);
        assert_eq!(header.channel_configuration, 2);
        assert_eq!(header.frame_length, 200);
        assert_eq!(header.audio_object_type, AudioObjectType::AacLowComplexity);
    }

    #[test]
    fn rejects_bad_sync() {
        let mut data = sample_frame(200);
        data[0] = 0;
        assert!(parse(&data).is_none());
    }

    #[test]
    fn confirms_back_to_back_run() {
        let frame = sample_frame(7);
        let mut stream = Vec::new();
        for _ in 0..4 {
            stream.extend_from_slice(&frame);
        }
        assert_eq!(confirm_run(&stream), 4);
    }
}
