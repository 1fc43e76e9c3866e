//! Input strategies for the two families of container this crate reads:
//! seekable random-access formats (MP4/AVI/leaf audio), which are read
//! in full, and sequentially-read streaming formats (MPEG-TS/MPEG-PS),
//! which are sampled when `parse_speed < 1.0`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::Result;

/// Byte windows read from a streaming-format file, in file order.
pub struct SampledWindows {
    /// Head window, then (when requested) a middle window, then the
    /// tail window. A fully-read file is a single window.
    pub windows: Vec<Vec<u8>>,
    /// Total file size.
    pub file_size: u64,
}

/// Reads `path` for a streaming-format (TS/PS) parse. When `parse_speed
/// >= 1.0`, or the file is small enough that sampling wouldn't save
/// anything, the whole file is returned as one window. Otherwise the
/// first and last `window_bytes` are read, plus (when `dvd_parsing` is
/// set) a middle window of the same size.
pub fn read_sampled(path: &Path, parse_speed: f32, dvd_parsing: bool, window_bytes: usize) -> Result<SampledWindows> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();

    if parse_speed >= 1.0 || file_size <= (window_bytes as u64).saturating_mul(2) {
        let mut buf = Vec::with_capacity(file_size as usize);
        file.read_to_end(&mut buf)?;
        return Ok(SampledWindows { windows: vec![buf], file_size });
    }

    let mut head = vec![0u8; window_bytes];
    file.read_exact(&mut head)?;

    let mut windows = vec![head];

    if dvd_parsing {
        let half = file_size / 2;
        let middle_start = half.saturating_sub(window_bytes as u64 / 2);
        file.seek(SeekFrom::Start(middle_start))?;
        let middle_len = window_bytes.min((file_size - middle_start) as usize);
        let mut middle = vec![0u8; middle_len];
        file.read_exact(&mut middle)?;
        windows.push(middle);
    }

    let tail_start = file_size.saturating_sub(window_bytes as u64);
    file.seek(SeekFrom::Start(tail_start))?;
    let mut tail = vec![0u8; (file_size - tail_start) as usize];
    file.read_exact(&mut tail)?;
    windows.push(tail);

    Ok(SampledWindows { windows, file_size })
}

/// Reads the whole file into memory, for the random-access formats
/// (MP4/AVI/leaf audio) whose parsers walk a box/chunk tree that can
/// appear anywhere in the file.
pub fn read_whole(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Reads just enough of the file's head for [`sniff::detect`] to make a
/// determination, without paying for a full read on a large file.
pub fn read_head(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let want = (file_size as usize).min(max_bytes);
    let mut buf = vec![0u8; want];
    file.read_exact(&mut buf)?;
    Ok(buf)
}
