//! Descriptor-loop parsing for PMT `program_info`/`es_info` byte blobs.

const ISO_639_LANGUAGE_DESCRIPTOR_TAG: u8 = 0x0A;

/// Walks a `tag, length, payload` descriptor loop and returns the first
/// three-letter language code carried by an `ISO_639_language_descriptor`.
pub fn find_language(descriptors: &[u8]) -> Option<String> {
    let mut offset = 0;
    while offset + 2 <= descriptors.len() {
        let tag = descriptors[offset];
        let length = descriptors[offset + 1] as usize;
        let payload_start = offset + 2;
        if payload_start + length > descriptors.len() {
            break;
        }
        let payload = &descriptors[payload_start..payload_start + length];
        if tag == ISO_639_LANGUAGE_DESCRIPTOR_TAG && payload.len() >= 3 {
            if let Ok(code) = std::str::from_utf8(&payload[..3]) {
                if code.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_uppercase()) {
                    return Some(code.to_ascii_lowercase());
                }
            }
        }
        offset = payload_start + length;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_language_descriptor() {
        let descriptors = [ISO_639_LANGUAGE_DESCRIPTOR_TAG, 4, b'e', b'n', b'g', 0x00];
        assert_eq!(find_language(&descriptors).as_deref(), Some("eng"));
    }

    #[test]
    fn skips_unrelated_descriptors_first() {
        let mut descriptors = vec![0x52, 1, 0x00]; // stream_identifier_descriptor
        descriptors.extend_from_slice(&[ISO_639_LANGUAGE_DESCRIPTOR_TAG, 4, b'f', b'r', b'a', 0x01]);
        assert_eq!(find_language(&descriptors).as_deref(), Some("fra"));
    }

    #[test]
    fn returns_none_without_language_descriptor() {
        let descriptors = [0x52, 1, 0x00];
        assert!(find_language(&descriptors).is_none());
    }

    #[test]
    fn returns_none_on_truncated_descriptor() {
        let descriptors = [ISO_639_LANGUAGE_DESCRIPTOR_TAG, 10, b'e', b'n', b'g'];
        assert!(find_language(&descriptors).is_none());
    }
}
