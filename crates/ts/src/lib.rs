//! Transport Stream (TS) parser for PAT and PMT tables
//!
//! This crate provides functionality to parse Program Association Table (PAT)
//! and Program Map Table (PMT) from MPEG-TS (Transport Stream) data.

pub mod demux;
pub mod descriptor;
pub mod error;
pub mod packet;
pub mod pat;
pub mod pes;
pub mod pmt;
pub mod pts;
pub mod stream;

pub use demux::{Demuxer, FinalizedStream};
pub use error::TsError;
pub use packet::{PID_NULL, PID_PAT, TsPacket};
pub use pat::{Pat, PatProgram};
pub use pes::PesHeader;
pub use pmt::{Pmt, PmtStream, StreamType};
pub use pts::PtsTracker;
pub use stream::{CodecRecord, StreamKind, TsStreamState};

/// Result type for TS parsing operations
pub type Result<T> = std::result::Result<T, TsError>;
