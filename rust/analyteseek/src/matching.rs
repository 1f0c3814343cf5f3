//! Rules deciding whether two analytes (or two spectra) are the same compound.

use crate::models::spectrum::total_relative_intensity;
use crate::models::{
    Analyte,
    SpectrumPeak,
};
use analytecore::Tolerance;
use analytecore::utils::round_to;

/// Whether the apex mass of `a` is present among the peak masses of `b`.
pub fn max_peak_match(a: &Analyte, b: &Analyte, tolerance: &Tolerance) -> bool {
    b.peaks
        .iter()
        .any(|p| tolerance.mass_match(p.mass, a.max_peak_mass))
}

/// Whether enough of the intensity of `a` sits on masses also present in `b`.
///
/// Each peak of `a` counts once. The matched fraction is rounded to 2
/// decimal places before comparing against `min_score`; an analyte without
/// intensity never matches.
pub fn unidirectional_match(a: &Analyte, b: &Analyte, tolerance: &Tolerance, min_score: f64) -> bool {
    let mut total = 0u64;
    let mut matched = 0u64;
    for peak in a.peaks.iter() {
        total += peak.max_intensity;
        if b.peaks.iter().any(|p| tolerance.mass_match(peak.mass, p.mass)) {
            matched += peak.max_intensity;
        }
    }
    if total == 0 {
        return false;
    }
    round_to(matched as f64 / total as f64, 2) >= min_score
}

pub fn bidirectional_match(a: &Analyte, b: &Analyte, tolerance: &Tolerance, min_score: f64) -> bool {
    unidirectional_match(a, b, tolerance, min_score)
        && unidirectional_match(b, a, tolerance, min_score)
}

/// Whether two analytes of different replicates of a sample are the same compound.
///
/// Requires each apex mass to be present in the other analyte, retention
/// times within tolerance and a bidirectional intensity match.
pub fn replicate_match(a: &Analyte, b: &Analyte, tolerance: &Tolerance, min_score: f64) -> bool {
    max_peak_match(a, b, tolerance)
        && max_peak_match(b, a, tolerance)
        && tolerance.rt_match(a.retention_time, b.retention_time)
        && bidirectional_match(a, b, tolerance, min_score)
}

/// Bidirectional match of two relative-intensity spectra.
///
/// For every peak of `second`, the first mass-matching peak of `first` is
/// taken. Both spectra need at least `min_score` of their total relative
/// intensity matched. Empty or zero-intensity spectra never match.
pub fn relative_intensity_match<P: SpectrumPeak, Q: SpectrumPeak>(
    first: &[P],
    second: &[Q],
    tolerance: &Tolerance,
    min_score: f64,
) -> bool {
    let mut first_matched = vec![false; first.len()];
    let mut second_matched_intensity = 0.0;
    let mut any_match = false;
    for p2 in second.iter() {
        if let Some(i) = first
            .iter()
            .position(|p1| tolerance.mass_match(p1.mass(), p2.mass()))
        {
            first_matched[i] = true;
            second_matched_intensity += p2.relative_intensity();
            any_match = true;
        }
    }
    if !any_match {
        return false;
    }

    let first_total = total_relative_intensity(first);
    let second_total = total_relative_intensity(second);
    if first_total <= 0.0 || second_total <= 0.0 {
        return false;
    }
    let first_matched_intensity: f64 = first
        .iter()
        .zip(first_matched.iter())
        .filter(|(_, m)| **m)
        .map(|(p, _)| p.relative_intensity())
        .sum();

    first_matched_intensity / first_total >= min_score
        && second_matched_intensity / second_total >= min_score
}
