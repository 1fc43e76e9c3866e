//! A parser for the Audio Video Interleave (RIFF/AVI) container, walking
//! the chunk tree from an in-memory buffer to recover stream metadata,
//! interleave statistics, and codec-specific fields (MPEG-4 Visual
//! B-VOP presence, MP3 joint-stereo mode) without decoding sample data.
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

pub mod avih;
pub mod demux;
pub mod error;
pub mod idx1;
pub mod mp3scan;
pub mod mpeg4visual;
pub mod movi;
pub mod riff;
pub mod strf;
pub mod strh;

pub use demux::{parse, Movie, Stream};
pub use error::{AviError, Result};
