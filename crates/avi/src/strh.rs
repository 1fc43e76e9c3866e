//! Stream Header (`strh`) parsing.

/// The stream's media kind, decoded from `fccType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// `vids`.
    Video,
    /// `auds`.
    Audio,
    /// `txts`.
    Text,
    /// Any other `fccType`.
    Other([u8; 4]),
}

impl StreamKind {
    fn from_fcc(fcc: [u8; 4]) -> Self {
        match &fcc {
            b"vids" => Self::Video,
            b"auds" => Self::Audio,
            b"txts" => Self::Text,
            other => Self::Other(*other),
        }
    }
}

/// The fixed-layout fields this crate surfaces from `strh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Media kind, from `fccType`.
    pub kind: StreamKind,
    /// Codec four-cc (for video) or format identifier (for audio, where it
    /// is usually unset and `strf`'s `wFormatTag` is authoritative).
    pub fcc_handler: [u8; 4],
    /// Rate numerator; `rate / scale` gives samples (frames, for video)
    /// per second.
    pub rate: u32,
    /// Rate denominator.
    pub scale: u32,
    /// Number of samples (frames) in the stream.
    pub length: u32,
    /// Suggested buffer size in bytes, `0` if unspecified.
    pub suggested_buffer_size: u32,
}

impl StreamHeader {
    /// Samples (frames for video, audio frames for audio) per second, or
    /// `None` if `scale` is zero.
    pub fn rate_per_second(&self) -> Option<f64> {
        if self.scale == 0 {
            return None;
        }
        Some(self.rate as f64 / self.scale as f64)
    }

    /// Stream duration in seconds derived from `length` and the rate, or
    /// `None` if the rate can't be computed or is zero.
    pub fn duration_seconds(&self) -> Option<f64> {
        let rate = self.rate_per_second()?;
        if rate <= 0.0 {
            return None;
        }
        Some(self.length as f64 / rate)
    }
}

/// Parses the fixed-layout prefix of a `strh` chunk body (56 bytes before
/// the trailing `rcFrame` rectangle, which this crate does not need).
pub fn parse(body: &[u8]) -> Option<StreamHeader> {
    let word = |offset: usize| -> Option<u32> {
        body.get(offset..offset + 4).map(|b| u32::from_le_bytes(b.try_into().unwrap()))
    };
    let fcc = |offset: usize| -> Option<[u8; 4]> { body.get(offset..offset + 4)?.try_into().ok() };

    Some(StreamHeader {
        kind: StreamKind::from_fcc(fcc(0)?),
        fcc_handler: fcc(4)?,
        scale: word(20)?,
        rate: word(24)?,
        length: word(32)?,
        suggested_buffer_size: word(36)?,
    })
}
