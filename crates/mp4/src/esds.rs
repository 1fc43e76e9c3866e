//! `esds` (Elementary Stream Descriptor Box) parsing.
//!
//! Walks the MPEG-4 descriptor chain (`ES_Descriptor` → `DecoderConfig
//! Descriptor` → `DecoderSpecificInfo`) down to the raw bytes `aac` already
//! knows how to decode, rather than re-deriving AAC object type parsing.

use aac::PartialAudioSpecificConfig;

const TAG_ES_DESCRIPTOR: u8 = 0x03;
const TAG_DECODER_CONFIG: u8 = 0x04;
const TAG_DECODER_SPECIFIC_INFO: u8 = 0x05;

/// Fields pulled from the `DecoderConfigDescriptor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Codec identifier (`0x40` = AAC, `0x69`/`0x6B` = MP3, ...).
    pub object_type_indication: u8,
    /// Peak bitrate, bits per second.
    pub max_bitrate: u32,
    /// Average bitrate, bits per second.
    pub avg_bitrate: u32,
}

/// Reads one descriptor's tag and MPEG-4 "expandable" length (up to 4
/// continuation-bit-prefixed bytes), returning `(tag, content_len,
/// header_len)`.
fn read_descriptor_header(data: &[u8], offset: usize) -> Option<(u8, usize, usize)> {
    let tag = *data.get(offset)?;
    let mut size: u32 = 0;
    let mut i = offset + 1;
    for _ in 0..4 {
        let b = *data.get(i)?;
        size = (size << 7) | (b & 0x7F) as u32;
        i += 1;
        if b & 0x80 == 0 {
            break;
        }
    }
    Some((tag, size as usize, i - offset))
}

/// Parses an `esds` box body (after the 8-byte box header), returning the
/// decoder config and, when the decoder-specific info parses as one, a raw
/// AAC `AudioSpecificConfig`.
pub fn parse(body: &[u8]) -> Option<(DecoderConfig, Option<PartialAudioSpecificConfig>)> {
    // version(1) + flags(3) precede the ES_Descriptor.
    let (tag, es_len, header_len) = read_descriptor_header(body, 4)?;
    if tag != TAG_ES_DESCRIPTOR {
        return None;
    }
    let es_start = 4 + header_len;
    let es_end = (es_start + es_len).min(body.len());
    let es = body.get(es_start..es_end)?;

    // ES_ID(2) + flags(1), then fields gated on the flag bits.
    let flags = *es.get(2)?;
    let mut offset = 3;
    if flags & 0x80 != 0 {
        offset += 2; // dependsOn_ES_ID
    }
    if flags & 0x40 != 0 {
        let url_len = *es.get(offset)? as usize;
        offset += 1 + url_len;
    }
    if flags & 0x20 != 0 {
        offset += 2; // OCR_ES_Id
    }

    let (tag, dc_len, header_len) = read_descriptor_header(es, offset)?;
    if tag != TAG_DECODER_CONFIG {
        return None;
    }
    let dc_start = offset + header_len;
    let dc_end = (dc_start + dc_len).min(es.len());
    let dc = es.get(dc_start..dc_end)?;
    if dc.len() < 13 {
        return None;
    }

    let config = DecoderConfig {
        object_type_indication: dc[0],
        max_bitrate: u32::from_be_bytes(dc[5..9].try_into().unwrap()),
        avg_bitrate: u32::from_be_bytes(dc[9..13].try_into().unwrap()),
    };

    let audio_specific_config = read_descriptor_header(dc, 13)
        .filter(|(tag, ..)| *tag == TAG_DECODER_SPECIFIC_INFO)
        .and_then(|(_, len, hlen)| {
            let start = 13 + hlen;
            let end = (start + len).min(dc.len());
            dc.get(start..end)
        })
        .and_then(|info| PartialAudioSpecificConfig::parse(info).ok());

    Some((config, audio_specific_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut d = vec![tag, content.len() as u8];
        d.extend_from_slice(content);
        d
    }

    #[test]
    fn walks_chain_down_to_decoder_config() {
        let dec_specific_info = descriptor(TAG_DECODER_SPECIFIC_INFO, &[0x12, 0x10]); // AAC LC, 44100, stereo
        let mut dc_content = vec![0x40]; // objectTypeIndication = AAC
        dc_content.push(0x15); // streamType
        dc_content.extend_from_slice(&[0, 0, 0]); // bufferSizeDB
        dc_content.extend_from_slice(&128_000u32.to_be_bytes()); // maxBitrate
        dc_content.extend_from_slice(&96_000u32.to_be_bytes()); // avgBitrate
        dc_content.extend_from_slice(&dec_specific_info);
        let decoder_config = descriptor(TAG_DECODER_CONFIG, &dc_content);

        let mut es_content = vec![0, 1]; // ES_ID
        es_content.push(0x00); // flags: no dependsOn/URL/OCR
        es_content.extend_from_slice(&decoder_config);
        let es_descriptor = descriptor(TAG_ES_DESCRIPTOR, &es_content);

        let mut body = vec![0u8; 4]; // version + flags
        body.extend_from_slice(&es_descriptor);

        let (config, audio) = parse(&body).unwrap();
        assert_eq!(config.object_type_indication, 0x40);
        assert_eq!(config.max_bitrate, 128_000);
        assert_eq!(config.avg_bitrate, 96_000);
        let audio = audio.unwrap();
        assert_eq!(audio.channel_configuration, 2);
    }

    #[test]
    fn missing_es_descriptor_tag_is_none() {
        let mut body = vec![0u8; 4];
        body.extend_from_slice(&descriptor(0x99, &[]));
        assert!(parse(&body).is_none());
    }
}
