//! Systematic mass shifts between two spectra, on a 0.1 Da grid.

use std::collections::BTreeMap;

/// A mass expressed in tenths of a dalton.
pub fn tenths(mass: f64) -> i64 {
    (mass * 10.0).round() as i64
}

/// Counts of every pairwise difference `first - second`, in tenths of a dalton.
pub fn offset_counts(first: &[f64], second: &[f64]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for a in first.iter().map(|m| tenths(*m)) {
        for b in second.iter().map(|m| tenths(*m)) {
            *counts.entry(a - b).or_insert(0) += 1;
        }
    }
    counts
}

/// Picks the most frequent nonzero difference.
///
/// Nothing is picked when that frequency is below `minimum_instances`.
/// Ties go to the difference closest to zero, then to the positive one.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use analyteseek::network::offsets::select_offset;
///
/// let counts = BTreeMap::from([(140, 3), (-140, 3), (0, 5), (20, 1)]);
/// assert_eq!(select_offset(&counts, 2), Some(140));
/// assert_eq!(select_offset(&counts, 4), None);
/// ```
pub fn select_offset(counts: &BTreeMap<i64, usize>, minimum_instances: usize) -> Option<i64> {
    let best = counts
        .iter()
        .filter(|(d, _)| **d != 0)
        .map(|(_, c)| *c)
        .max()?;
    if best < minimum_instances {
        return None;
    }
    counts
        .iter()
        .filter(|(d, c)| **d != 0 && **c == best)
        .map(|(d, _)| *d)
        .min_by_key(|d| (d.abs(), *d < 0))
}

/// Mass offset between two deisotoped mass lists, in tenths of a dalton.
pub fn detect_mass_offset(first: &[f64], second: &[f64], minimum_instances: usize) -> Option<i64> {
    select_offset(&offset_counts(first, second), minimum_instances)
}
