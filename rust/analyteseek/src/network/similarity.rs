use super::offsets::tenths;
use crate::models::SpectrumPeak;
use analytecore::utils::round_to;

/// Intensities of one aligned mass on both sides, zero where a side lacks it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPair {
    pub first: f64,
    pub second: f64,
}

/// Pairs the peaks of two spectra.
///
/// Masses are compared on a 0.1 Da grid. Identical masses are paired first,
/// each peak of `first` taking the first free peak of `second`. Remaining
/// peaks are then paired when `first = second + offset`. Whatever is still
/// free is paired with a zero intensity.
pub fn align_spectra<P: SpectrumPeak, Q: SpectrumPeak>(
    first: &[P],
    second: &[Q],
    offset: Option<i64>,
) -> Vec<AlignedPair> {
    let first_bins: Vec<i64> = first.iter().map(|p| tenths(p.mass())).collect();
    let second_bins: Vec<i64> = second.iter().map(|p| tenths(p.mass())).collect();
    let mut first_used = vec![false; first.len()];
    let mut second_used = vec![false; second.len()];
    let mut out = Vec::with_capacity(first.len() + second.len());

    let mut pair_up = |shift: i64, first_used: &mut [bool], second_used: &mut [bool]| {
        for (i, bin) in first_bins.iter().enumerate() {
            if first_used[i] {
                continue;
            }
            let hit = second_bins
                .iter()
                .enumerate()
                .position(|(j, other)| !second_used[j] && *bin == other + shift);
            if let Some(j) = hit {
                first_used[i] = true;
                second_used[j] = true;
                out.push(AlignedPair {
                    first: first[i].relative_intensity(),
                    second: second[j].relative_intensity(),
                });
            }
        }
    };
    pair_up(0, &mut first_used, &mut second_used);
    if let Some(shift) = offset.filter(|s| *s != 0) {
        pair_up(shift, &mut first_used, &mut second_used);
    }

    for (p, used) in first.iter().zip(first_used.iter()) {
        if !used {
            out.push(AlignedPair {
                first: p.relative_intensity(),
                second: 0.0,
            });
        }
    }
    for (p, used) in second.iter().zip(second_used.iter()) {
        if !used {
            out.push(AlignedPair {
                first: 0.0,
                second: p.relative_intensity(),
            });
        }
    }
    out
}

/// Symmetric similarity of an alignment, in `[0, 1]` with 3 decimals.
///
/// Each pair with intensity on both sides is weighted by the smaller of the
/// two intensity ratios. Each side's weighted intensity is divided by that
/// side's total and the smaller of the two fractions is the score.
///
/// # Example
///
/// ```
/// use analyteseek::network::similarity::{AlignedPair, weighted_match_score};
///
/// let pairs = [
///     AlignedPair { first: 100.0, second: 100.0 },
///     AlignedPair { first: 50.0, second: 25.0 },
///     AlignedPair { first: 0.0, second: 25.0 },
/// ];
/// // first: (100 + 50 * 0.5) / 150, second: (100 + 25 * 0.5) / 150
/// assert_eq!(weighted_match_score(&pairs), 0.75);
/// ```
pub fn weighted_match_score(pairs: &[AlignedPair]) -> f64 {
    let mut total = (0.0, 0.0);
    let mut weighted = (0.0, 0.0);
    for pair in pairs {
        total.0 += pair.first;
        total.1 += pair.second;
        if pair.first > 0.0 && pair.second > 0.0 {
            let weight = (pair.first / pair.second).min(pair.second / pair.first);
            weighted.0 += pair.first * weight;
            weighted.1 += pair.second * weight;
        }
    }
    let fraction = |w: f64, t: f64| if t > 0.0 { w / t } else { 0.0 };
    let score = fraction(weighted.0, total.0).min(fraction(weighted.1, total.1));
    round_to(score, 3)
}

pub fn spectral_similarity<P: SpectrumPeak, Q: SpectrumPeak>(
    first: &[P],
    second: &[Q],
    offset: Option<i64>,
) -> f64 {
    weighted_match_score(&align_spectra(first, second, offset))
}
