//! Media container demultiplexing and codec metadata extraction.
//!
//! [`parse_file`] sniffs a file's container format from its leading
//! bytes, dispatches to the matching container adapter under
//! [`codecs`], and returns a [`Report`]: a `General` section plus one
//! entry per elementary stream the adapter discovered, with every field
//! in a fixed canonical order (see [`fields`]).

pub mod codecs;
pub mod error;
pub mod fields;
pub mod numeric;
pub mod options;
pub mod report;
pub mod sampling;

use std::path::Path;

pub use error::{MediaInfoError, Result};
pub use options::ParseOptions;
pub use report::Report;

/// Bytes of leading file data the sniffer is given to make its
/// determination. Large enough for the MPEG-TS sync-pattern check,
/// which needs three consecutive 188-byte packets.
const SNIFF_WINDOW_BYTES: usize = 64 * 1024;

/// Parses `path` into a [`Report`], sniffing its container format first
/// and dispatching to the matching adapter under [`codecs`].
///
/// Returns [`MediaInfoError::FormatViolation`] if the sniffer can't
/// recognize the container at all, and propagates whatever error the
/// chosen adapter raised (most commonly
/// [`MediaInfoError::NoStreamDiscovered`] for a recognized but
/// empty/corrupt container).
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<Report> {
    let options = options.normalized();
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let head = sampling::read_head(path, SNIFF_WINDOW_BYTES)?;
    let format = sniff::detect(&head, file_name);

    match format {
        sniff::Format::Mp4 { is_quicktime } => codecs::mp4::build_report(path, is_quicktime),
        sniff::Format::Avi => codecs::avi::build_report(path, &options),
        sniff::Format::MpegTs => codecs::ts::build_report(path, &options),
        sniff::Format::MpegPs => codecs::mpegps::build_report(path, &options),
        sniff::Format::Wave => codecs::leaf::build_wave_report(path),
        sniff::Format::Flac => codecs::leaf::build_flac_report(path),
        sniff::Format::Ogg => codecs::leaf::build_ogg_report(path),
        sniff::Format::Mp3 => codecs::leaf::build_mp3_report(path),
        sniff::Format::Matroska => Ok(Report::recognized_only("Matroska")),
        sniff::Format::DvdVideo => Ok(Report::recognized_only("DVD-Video")),
        sniff::Format::Unknown => Err(MediaInfoError::FormatViolation(format!("unrecognized container: {}", path.display()))),
    }
}
