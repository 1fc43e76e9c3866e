//! A parser for the ISO Base Media File Format (MP4/QuickTime) container,
//! walking the box tree from an in-memory buffer to recover track metadata
//! (codec configuration, timing, sample-table summaries) without decoding
//! sample data.
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

pub mod bbox;
pub mod demux;
pub mod edts;
pub mod error;
pub mod esds;
pub mod fields;
pub mod hdlr;
pub mod mdhd;
pub mod stco;
pub mod stsd;
pub mod stsz;
pub mod stts;
pub mod tkhd;
pub mod track;

pub use demux::{major_brand, parse, Movie, MovieHeader};
pub use error::{Mp4Error, Result};
pub use hdlr::TrackKind;
pub use track::Track;
