use thiserror::Error;

/// Errors that can occur while walking a RIFF/AVI chunk tree.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AviError {
    /// The file does not open with a `RIFF`/`AVI ` header.
    #[error("not a RIFF/AVI file")]
    NotRiffAvi,

    /// A chunk header claimed fewer than 8 bytes, or fewer bytes than are
    /// actually available.
    #[error("truncated chunk header at offset {0}")]
    TruncatedChunk(usize),

    /// A chunk's declared size extends past the end of the buffer it was
    /// read from.
    #[error("chunk at offset {offset} declares size {size}, exceeding the {available} bytes available")]
    ChunkTooLarge { offset: usize, size: u32, available: usize },
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, AviError>;
