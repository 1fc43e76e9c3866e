//! Small bounds-checked big-endian field readers used by the fixed-layout
//! box parsers (`tkhd`, `mdhd`, sample entries, ...). Box bodies are short
//! and fully buffered, so plain slice indexing with an `Option` return is
//! simpler here than pulling in a cursor type for single-field reads.

/// Reads a big-endian `u16` at `offset`, or `None` if out of bounds.
pub fn u16_at(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2).map(|b| u16::from_be_bytes(b.try_into().unwrap()))
}

/// Reads a big-endian `u32` at `offset`, or `None` if out of bounds.
pub fn u32_at(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4).map(|b| u32::from_be_bytes(b.try_into().unwrap()))
}

/// Reads a big-endian `u64` at `offset`, or `None` if out of bounds.
pub fn u64_at(data: &[u8], offset: usize) -> Option<u64> {
    data.get(offset..offset + 8).map(|b| u64::from_be_bytes(b.try_into().unwrap()))
}
