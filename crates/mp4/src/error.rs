use thiserror::Error;

/// Errors that can occur while walking an MP4/QuickTime box tree.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Mp4Error {
    /// A box header claimed fewer than 8 bytes, or fewer bytes than are
    /// actually available.
    #[error("truncated box header at offset {0}")]
    TruncatedBox(usize),

    /// A box's declared size is smaller than its own header.
    #[error("box at offset {offset} declares size {size}, smaller than its header")]
    BoxTooSmall { offset: usize, size: u64 },

    /// `moov` exceeded the configured payload cap.
    #[error("moov payload of {size} bytes exceeds the {cap} byte cap")]
    MoovTooLarge { size: u64, cap: u64 },
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Mp4Error>;
