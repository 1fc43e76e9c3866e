use std::collections::HashMap;

/// The coding role of a single access unit, as needed to infer GOP
/// structure. Distinct from [`crate::slice::SliceType`]: an IDR access unit
/// is reported separately from a plain I slice even though both are
/// intra-only, since only IDR unconditionally restarts prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureKind {
    /// Instantaneous decoder refresh picture.
    Idr,
    /// Non-IDR intra picture.
    I,
    /// Predicted picture (uses one reference list).
    P,
    /// Bi-predicted picture (uses two reference lists).
    B,
}

/// Inferred group-of-pictures structure: nominal distance between
/// IDR/I pictures (`n`) and nominal distance between anchor (I or P)
/// pictures (`m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct GopStructure {
    /// Distance between successive refresh points, in pictures.
    pub n: u32,
    /// Distance between successive anchor (I or P) pictures, in pictures.
    pub m: u32,
}

/// A spacing is accepted as the modal value only when it recurs at least
/// this many times.
const MIN_OCCURRENCES: usize = 3;

/// Infers `N`/`M` from a prefix of decoded picture kinds, in their original
/// stream order. Returns `None` if there isn't a value that both occurs at
/// least [`MIN_OCCURRENCES`] times and accounts for at least half of the
/// observed spacings of its kind.
pub fn infer(kinds: &[PictureKind]) -> Option<GopStructure> {
    let refresh_positions: Vec<usize> = kinds
        .iter()
        .enumerate()
        .filter(|(_, kind)| matches!(kind, PictureKind::Idr))
        .map(|(index, _)| index)
        .collect();
    // Fall back to I-slice spacing when there are no IDRs at all (common in
    // open-GOP streams that never restart the whole sequence).
    let refresh_positions = if refresh_positions.len() >= 2 {
        refresh_positions
    } else {
        kinds
            .iter()
            .enumerate()
            .filter(|(_, kind)| matches!(kind, PictureKind::Idr | PictureKind::I))
            .map(|(index, _)| index)
            .collect()
    };

    let anchor_positions: Vec<usize> = kinds
        .iter()
        .enumerate()
        .filter(|(_, kind)| matches!(kind, PictureKind::Idr | PictureKind::I | PictureKind::P))
        .map(|(index, _)| index)
        .collect();

    let n = modal_spacing(&refresh_positions)?;
    let m = modal_spacing(&anchor_positions)?;

    Some(GopStructure { n, m })
}

fn modal_spacing(positions: &[usize]) -> Option<u32> {
    if positions.len() < 2 {
        return None;
    }

    let spacings: Vec<u32> = positions
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as u32)
        .collect();

    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &spacing in &spacings {
        *counts.entry(spacing).or_insert(0) += 1;
    }

    let (&modal_value, &modal_count) = counts.iter().max_by_key(|(_, count)| **count)?;

    if modal_count >= MIN_OCCURRENCES && modal_count * 2 >= spacings.len() {
        Some(modal_value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PictureKind::*;

    fn repeat_pattern(pattern: &[PictureKind], times: usize) -> Vec<PictureKind> {
        pattern.iter().copied().cycle().take(pattern.len() * times).collect()
    }

    #[test]
    fn infers_regular_n12_m3_gop() {
        let pattern = [Idr, B, B, P, B, B, P, B, B, P, B, B];
        let kinds = repeat_pattern(&pattern, 5);
        let gop = infer(&kinds).unwrap();
        assert_eq!(gop.n, 12);
        assert_eq!(gop.m, 3);
    }

    #[test]
    fn falls_back_to_i_slice_spacing_without_idr() {
        let pattern = [I, B, P, B, P, B];
        let kinds = repeat_pattern(&pattern, 5);
        let gop = infer(&kinds).unwrap();
        assert_eq!(gop.n, 6);
        assert_eq!(gop.m, 2);
    }

    #[test]
    fn returns_none_on_irregular_refresh_spacing() {
        // Four IDRs at spacings 2, 5, 1 -- no value reaches the 3-occurrence
        // floor required to call it modal.
        let kinds = vec![
            Idr, B, Idr, B, P, B, P, Idr, Idr, B, P, B, P, B, P, B,
        ];
        assert!(infer(&kinds).is_none());
    }

    #[test]
    fn returns_none_with_too_few_refresh_points() {
        let kinds = vec![Idr, B, P, B, P];
        assert!(infer(&kinds).is_none());
    }
}
