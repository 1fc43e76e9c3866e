use thiserror::Error;

/// Errors that `parse_file` can return. Individual codec and container
/// parsers never raise these themselves — they degrade to partial or
/// absent fields instead, per [`crate::report`]'s ownership rule.
#[derive(Error, Debug)]
pub enum MediaInfoError {
    /// The file is shorter than the smallest header the sniffer or a
    /// container parser needs to make a determination.
    #[error("input too short: need at least {expected} bytes, found {found}")]
    InputTooShort {
        /// Minimum byte count the caller needed.
        expected: usize,
        /// Bytes actually available.
        found: usize,
    },

    /// A structural invariant of the recognized container was violated
    /// (bad magic, a box/chunk size pointing outside the buffer, and so
    /// on) badly enough that no report can be produced at all.
    #[error("format violation: {0}")]
    FormatViolation(String),

    /// A parser hit one of the fixed size caps (`moov`, AVI `movi` scan
    /// windows, ID3 cover art, MP3 header search) and the remaining input
    /// could not be recovered from within the cap.
    #[error("{subsystem} exceeded its size cap of {cap} bytes")]
    SizeCapExceeded {
        /// Name of the subsystem that hit its cap.
        subsystem: &'static str,
        /// The cap itself, in bytes.
        cap: u64,
    },

    /// Reading the input file failed.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// The container was recognized but no elementary or general
    /// information could be extracted from it at all.
    #[error("no stream could be discovered in this file")]
    NoStreamDiscovered,
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, MediaInfoError>;
