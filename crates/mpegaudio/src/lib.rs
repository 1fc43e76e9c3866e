//! A parser for MPEG-1/2/2.5 Layer I/II/III audio frames, the Xing/Info VBR
//! header, and ID3v2 tags.
//!
//! This crate only decodes headers and metadata tags — it does not decode
//! audio samples.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod frame;
pub mod id3v2;
pub mod xing;

pub use frame::{ChannelMode, FrameHeader, Layer, MpegVersion};
pub use id3v2::Id3v2Tag;
pub use xing::XingTag;

use thiserror::Error;

/// Errors that can occur while scanning an MPEG audio stream.
#[derive(Debug, Error)]
pub enum MpegAudioError {
    /// The input ended before a complete frame header could be read.
    #[error("input too short to contain a frame header")]
    InputTooShort,
    /// An I/O error occurred while reading the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether a stream's bitrate is constant or variable, and the evidence
/// used to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateMode {
    /// A Xing/Info `Xing` tag was present: true variable bitrate.
    Variable,
    /// No VBR tag was found, or an `Info` tag indicated CBR.
    Constant,
}

/// Summary statistics derived from a leading run of frames plus an
/// optional Xing/Info tag.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct StreamSummary {
    /// Constant or variable bitrate.
    pub bitrate_mode: BitrateMode,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Overall bitrate in kbit/s (nominal for CBR, average for VBR).
    pub bitrate_kbps: u32,
}

/// Computes duration and bitrate-mode summary for a stream whose first
/// frame header and (optional) Xing/Info tag are known, given the total
/// size in bytes of the audio data (tags excluded).
pub fn summarize(first_frame: &FrameHeader, xing: Option<&XingTag>, data_size_bytes: u64) -> StreamSummary {
    if let Some(tag) = xing.filter(|t| t.is_vbr) {
        if let (Some(frames), true) = (tag.frame_count, first_frame.sample_rate > 0) {
            let total_samples = frames as u64 * first_frame.samples_per_frame as u64;
            let duration_secs = total_samples as f64 / first_frame.sample_rate as f64;
            let bitrate_kbps = tag
                .byte_count
                .map(|bytes| {
                    if duration_secs > 0.0 {
                        ((bytes as f64 * 8.0) / duration_secs / 1000.0).round() as u32
                    } else {
                        first_frame.bitrate_kbps as u32
                    }
                })
                .unwrap_or(first_frame.bitrate_kbps as u32);
            return StreamSummary {
                bitrate_mode: BitrateMode::Variable,
                duration_secs,
                bitrate_kbps,
            };
        }
    }

    let bitrate_kbps = first_frame.bitrate_kbps as u32;
    let duration_secs = if bitrate_kbps > 0 {
        (data_size_bytes as f64 * 8.0) / (bitrate_kbps as f64 * 1000.0)
    } else {
        0.0
    };

    StreamSummary {
        bitrate_mode: BitrateMode::Constant,
        duration_secs,
        bitrate_kbps,
    }
}
