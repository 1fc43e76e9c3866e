/// Options controlling how thoroughly `parse_file` walks a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseOptions {
    /// `1.0` reads the whole file; values below that restrict the
    /// streaming (TS/PS) parsers to sampled head/tail windows and the
    /// seekable (AVI) parser to a short `movi` prefix plus its `idx1`
    /// index, when present. Clamped to `[0.0, 1.0]`.
    pub parse_speed: f32,

    /// Enables the DVD-Video specific behaviors: a middle sample window
    /// for MPEG-PS, and `dvdsub`/DVD-style EIA-608 substream handling.
    pub dvd_parsing: bool,

    /// Enables deeper DVD extras (menu domain, cell/PGC metadata)
    /// discovery. Only meaningful when `dvd_parsing` is also set.
    pub dvd_extras: bool,
}

impl ParseOptions {
    /// Clamps `parse_speed` into `[0.0, 1.0]`.
    pub fn normalized(mut self) -> Self {
        self.parse_speed = self.parse_speed.clamp(0.0, 1.0);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { parse_speed: 1.0, dvd_parsing: false, dvd_extras: false }
    }
}
