//! MPEG Program Stream (PS) demultiplexer.
//!
//! Parses `.vob`/`.mpg`/DVD-style Program Stream byte buffers: pack and
//! system header skipping, private-stream sub-ID dispatch (DVD
//! subpicture, AC-3, DTS, LPCM), PES payload reassembly for both
//! fixed-length and unbounded-length packets, and EIA-608 closed-caption
//! extraction from MPEG-2 video `user_data`.

pub mod demux;
pub mod error;
pub mod pack;
pub mod stream;
pub mod substream;

pub use demux::{CaptionSummary, Demuxer, FinalizedStream, SAMPLE_WINDOW_BYTES};
pub use error::PsError;
pub use stream::{CodecRecord, PsStreamState, StreamKey, StreamKind};
pub use substream::PrivateKind;
