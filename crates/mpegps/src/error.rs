//! Error types for MPEG Program Stream parsing.

use thiserror::Error;

/// Errors surfaced by the lower-level header parsers. The demultiplexer
/// itself never propagates these — an unparseable pack/system header is
/// skipped the same way an unrecognized start code is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PsError {
    /// A pack header (`00 00 01 BA`) was truncated before its fixed
    /// 10-byte body or its declared stuffing bytes.
    #[error("truncated pack header")]
    TruncatedPackHeader,
    /// A system header (`00 00 01 BB`) was truncated before its declared
    /// `header_length`.
    #[error("truncated system header")]
    TruncatedSystemHeader,
}

/// Result type for Program Stream header parsing.
pub type Result<T> = std::result::Result<T, PsError>;
