//! End-to-end checks that run a synthetic file through [`mediainfo_core::parse_file`]
//! itself, exercising the sniffer-to-adapter dispatch in [`mediainfo_core::lib`]
//! rather than a single adapter's internals in isolation.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use mediainfo_core::{parse_file, ParseOptions};

static COUNTER: AtomicU32 = AtomicU32::new(0);

struct TempFile(PathBuf);

impl TempFile {
    fn new(suffix: &str, data: &[u8]) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("mediainfo-core-test-{}-{id}.{suffix}", std::process::id()));
        fs::write(&path, data).expect("write temp fixture");
        Self(path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn le_u32(v: u32) -> [u8; 4] {
    v.to_le_bytes()
}

fn wave_bytes(sample_rate: u32, channels: u16, bits_per_sample: u16, sample_count: u32) -> Vec<u8> {
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * block_align as u32;
    let data_len = sample_count * block_align as u32;

    let mut fmt_body = vec![0u8; 16];
    fmt_body[0..2].copy_from_slice(&1u16.to_le_bytes());
    fmt_body[2..4].copy_from_slice(&channels.to_le_bytes());
    fmt_body[4..8].copy_from_slice(&le_u32(sample_rate));
    fmt_body[8..12].copy_from_slice(&le_u32(byte_rate));
    fmt_body[12..14].copy_from_slice(&block_align.to_le_bytes());
    fmt_body[14..16].copy_from_slice(&bits_per_sample.to_le_bytes());

    let mut fmt_chunk = b"fmt ".to_vec();
    fmt_chunk.extend_from_slice(&le_u32(fmt_body.len() as u32));
    fmt_chunk.extend_from_slice(&fmt_body);

    let mut data_chunk = b"data".to_vec();
    data_chunk.extend_from_slice(&le_u32(data_len));
    data_chunk.extend(std::iter::repeat(0u8).take(data_len as usize));

    let mut riff_body = b"WAVE".to_vec();
    riff_body.extend_from_slice(&fmt_chunk);
    riff_body.extend_from_slice(&data_chunk);

    let mut file = b"RIFF".to_vec();
    file.extend_from_slice(&le_u32(riff_body.len() as u32));
    file.extend_from_slice(&riff_body);
    file
}

#[test]
fn sniffs_and_parses_a_wave_file_end_to_end() {
    let fixture = TempFile::new("wav", &wave_bytes(44_100, 2, 16, 44_100));
    let report = parse_file(&fixture.0, &ParseOptions::default()).expect("parse synthetic WAVE file");

    assert_eq!(report.general.raw.get("Format").map(String::as_str), Some("Wave"));
    assert_eq!(report.streams.len(), 1);
    assert_eq!(report.streams[0].raw.get("Channel(s)").map(String::as_str), Some("2"));
    assert_eq!(report.container.duration_seconds, Some(1.0));
}

#[test]
fn rejects_a_file_with_no_recognizable_container_magic() {
    let fixture = TempFile::new("bin", &[0u8; 256]);
    let result = parse_file(&fixture.0, &ParseOptions::default());
    assert!(result.is_err());
}

#[test]
fn parse_speed_is_clamped_rather_than_rejected() {
    let fixture = TempFile::new("wav", &wave_bytes(8_000, 1, 8, 8_000));
    let options = ParseOptions { parse_speed: 5.0, ..ParseOptions::default() };
    let report = parse_file(&fixture.0, &options).expect("out-of-range parse_speed should be clamped, not rejected");
    assert_eq!(report.streams[0].raw.get("Sampling rate").map(String::as_str), Some("8000"));
}
