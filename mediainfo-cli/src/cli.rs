use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments, mirroring [`mediainfo_core::ParseOptions`].
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Media container demultiplexing and codec metadata extraction",
    long_about = "Sniffs a media file's container format and reports its elementary \
                  streams — codec, resolution, frame rate, bit rate, duration — as \
                  structured JSON.\n\
                  \n\
                  Supports MP4/QuickTime, AVI, MPEG-TS, MPEG-PS, WAVE, FLAC, Ogg, and \
                  top-level MP3, plus recognized-only reporting for Matroska and \
                  DVD-Video."
)]
pub struct CliArgs {
    /// Path to the media file to inspect.
    #[arg(required = true, help = "Path to the media file to inspect")]
    pub input: PathBuf,

    /// How thoroughly to walk the container: 1.0 reads the whole file,
    /// lower values sample head/tail windows of streaming formats.
    #[arg(
        short = 's',
        long,
        default_value = "1.0",
        help = "Parse thoroughness from 0.0 (fastest, sampled) to 1.0 (full read)"
    )]
    pub parse_speed: f32,

    /// Enables DVD-Video specific behaviors: a middle sample window for
    /// MPEG-PS, and DVD-style closed-caption substream handling.
    #[arg(long, help = "Enable DVD-Video specific parsing behaviors")]
    pub dvd_parsing: bool,

    /// Enables deeper DVD extras discovery. Only meaningful alongside
    /// `--dvd-parsing`.
    #[arg(long, help = "Enable deeper DVD extras (menu domain) discovery")]
    pub dvd_extras: bool,

    /// Pretty-prints the JSON report instead of emitting it compact.
    #[arg(short, long, default_value = "true", help = "Pretty-print the JSON report")]
    pub pretty: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,
}
