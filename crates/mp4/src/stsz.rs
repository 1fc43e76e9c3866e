//! `stsz`/`stz2` (Sample Size Box) parsing.

use crate::fields::u32_at;

/// Number of leading/trailing sample sizes kept for pattern detection (e.g.
/// spotting a fixed I/P/B size cadence) without holding every size.
const KEPT_SAMPLES: usize = 8;

/// Summary of an `stsz` table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleSizes {
    /// Total number of samples.
    pub count: u64,
    /// Sum of every sample's size, in bytes.
    pub total_bytes: u64,
    /// Sizes of the first [`KEPT_SAMPLES`] samples.
    pub first_sizes: Vec<u32>,
    /// Sizes of the last [`KEPT_SAMPLES`] samples.
    pub last_sizes: Vec<u32>,
}

/// Parses an `stsz` box body (after the 8-byte box header).
pub fn parse(body: &[u8]) -> Option<SampleSizes> {
    let sample_size = u32_at(body, 4)?;
    let sample_count = u32_at(body, 8)? as u64;

    if sample_size != 0 {
        let kept = sample_count.min(KEPT_SAMPLES as u64) as usize;
        let sizes = vec![sample_size; kept];
        return Some(SampleSizes {
            count: sample_count,
            total_bytes: sample_size as u64 * sample_count,
            first_sizes: sizes.clone(),
            last_sizes: sizes,
        });
    }

    let mut total_bytes: u64 = 0;
    let mut first_sizes = Vec::with_capacity(KEPT_SAMPLES);
    let mut tail = std::collections::VecDeque::with_capacity(KEPT_SAMPLES);

    for i in 0..sample_count {
        let size = u32_at(body, 12 + (i as usize) * 4)?;
        total_bytes += size as u64;
        if (i as usize) < KEPT_SAMPLES {
            first_sizes.push(size);
        }
        if tail.len() == KEPT_SAMPLES {
            tail.pop_front();
        }
        tail.push_back(size);
    }

    Some(SampleSizes {
        count: sample_count,
        total_bytes,
        first_sizes,
        last_sizes: tail.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_sample_size_is_not_expanded() {
        let mut body = vec![0u8; 4];
        body.extend_from_slice(&188u32.to_be_bytes());
        body.extend_from_slice(&1000u32.to_be_bytes());
        let summary = parse(&body).unwrap();
        assert_eq!(summary.count, 1000);
        assert_eq!(summary.total_bytes, 188_000);
        assert_eq!(summary.first_sizes, vec![188; 8]);
    }

    #[test]
    fn per_sample_sizes_keep_head_and_tail() {
        let mut body = vec![0u8; 4];
        body.extend_from_slice(&0u32.to_be_bytes()); // sample_size = 0
        body.extend_from_slice(&12u32.to_be_bytes()); // sample_count
        for n in 1..=12u32 {
            body.extend_from_slice(&n.to_be_bytes());
        }
        let summary = parse(&body).unwrap();
        assert_eq!(summary.count, 12);
        assert_eq!(summary.total_bytes, (1..=12u64).sum::<u64>());
        assert_eq!(summary.first_sizes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(summary.last_sizes, vec![5, 6, 7, 8, 9, 10, 11, 12]);
    }
}
