use crate::errors::Result;
use crate::models::{
    Analyte,
    AnalytePeak,
};
use crate::utils::correlation::linear_regression;
use analytecore::{
    Peak,
    PeakId,
    Tolerance,
};
use nohash_hasher::IntSet;
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Instant;
use tracing::{
    debug,
    info,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyteBuildingConfig {
    /// Minimum coefficient of determination between two co-eluting peaks.
    pub slope_r2_cutoff: f64,
    /// Minimum number of scans two peaks must share to be compared.
    pub matched_scan_minimum: usize,
    /// Minimum number of peaks an analyte needs to be kept.
    pub analyte_peak_minimum: usize,
    /// Keep only analytes with at least one 13C isotope pair among their peaks.
    pub require_analyte_isotope: bool,
}

impl Default for AnalyteBuildingConfig {
    fn default() -> Self {
        Self {
            slope_r2_cutoff: 0.9,
            matched_scan_minimum: 3,
            analyte_peak_minimum: 2,
            require_analyte_isotope: false,
        }
    }
}

/// Whether `candidate` co-elutes with `seed`.
///
/// The intensities of both peaks over their shared scans are regressed
/// against each other; the fit must be tight and increasing.
fn co_elutes(seed: &Peak, candidate: &Peak, config: &AnalyteBuildingConfig) -> Result<bool> {
    let shared = seed.shared_scans(candidate);
    if shared.len() < config.matched_scan_minimum || shared.is_empty() {
        return Ok(false);
    }
    let mut x = Vec::with_capacity(shared.len());
    let mut y = Vec::with_capacity(shared.len());
    for scan in shared {
        if let (Some(a), Some(b)) = (seed.intensity_at(scan), candidate.intensity_at(scan)) {
            x.push(a as f64);
            y.push(b as f64);
        }
    }
    let fit = linear_regression(&x, &y)?;
    Ok(fit.is_some_and(|f| f.r_squared >= config.slope_r2_cutoff && f.slope > 0.0))
}

fn summarize(id: u32, members: &[&Peak]) -> Analyte {
    // Strictly greater keeps the first (seed) peak on ties.
    let mut apex = members[0];
    for p in members.iter().skip(1) {
        if p.max_intensity > apex.max_intensity {
            apex = p;
        }
    }
    Analyte {
        id,
        peaks: members.iter().map(|p| AnalytePeak::from(*p)).collect(),
        max_peak_id: apex.id,
        max_peak_mass: apex.average_mass,
        max_intensity: apex.max_intensity,
        retention_time: apex.retention_time,
    }
}

/// Whether any two member masses are 13C isotopologues of each other.
pub fn has_isotope_pair(analyte: &Analyte, tolerance: &Tolerance) -> bool {
    let mut masses: Vec<f64> = analyte.peaks.iter().map(|p| p.mass).collect();
    masses.sort_by(|a, b| a.total_cmp(b));
    masses.iter().enumerate().any(|(i, lower)| {
        masses[i + 1..]
            .iter()
            .any(|upper| tolerance.isotope_match(*lower, *upper))
    })
}

/// Groups the peaks of one run into analytes.
///
/// Peaks are visited by decreasing max intensity (ties by peak id). Every
/// unassigned peak seeds a candidate and claims each unassigned peak that
/// co-elutes with it. Candidates with fewer than `analyte_peak_minimum`
/// peaks give their peaks back. Analyte ids start at 1 in seed order.
///
/// Returns an error only when the intensity vectors handed to the
/// regression are malformed, which would mean a broken peak.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn build_analytes(
    peaks: &[Peak],
    tolerance: &Tolerance,
    config: &AnalyteBuildingConfig,
) -> Result<Vec<Analyte>> {
    let st = Instant::now();
    let mut order: Vec<&Peak> = peaks.iter().collect();
    order.sort_by(|a, b| b.max_intensity.cmp(&a.max_intensity).then(a.id.cmp(&b.id)));

    let mut assigned: IntSet<PeakId> = IntSet::default();
    let mut analytes = Vec::new();
    let mut next_id = 1;

    for (i, seed) in order.iter().enumerate() {
        if assigned.contains(&seed.id) {
            continue;
        }
        let mut members: Vec<&Peak> = vec![seed];
        for candidate in order.iter().skip(i + 1) {
            if assigned.contains(&candidate.id) {
                continue;
            }
            if co_elutes(seed, candidate, config)? {
                members.push(candidate);
            }
        }
        if members.len() < config.analyte_peak_minimum {
            continue;
        }
        assigned.extend(members.iter().map(|p| p.id));
        let analyte = summarize(next_id, &members);
        debug!(
            "Analyte {} seeded by peak {} with {} peaks",
            analyte.id,
            seed.id,
            analyte.peaks.len()
        );
        analytes.push(analyte);
        next_id += 1;
    }

    if config.require_analyte_isotope {
        let before = analytes.len();
        analytes.retain(|a| has_isotope_pair(a, tolerance));
        debug!(
            "Analyte isotope filter removed {} analytes",
            before - analytes.len()
        );
    }

    info!(
        "Total number of analytes = {} ({} peaks) in {:?}",
        analytes.len(),
        peaks.len(),
        st.elapsed()
    );
    Ok(analytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytecore::Record;

    fn peak(id: PeakId, mass: f64, scans: std::ops::RangeInclusive<u32>, profile: impl Fn(u32) -> u64) -> Peak {
        let records = scans
            .map(|s| Record::new(s, s as f64 * 0.02, mass, profile(s)))
            .collect();
        Peak::try_new(id, records).unwrap()
    }

    fn triangle(apex: u32, height: u64) -> impl Fn(u32) -> u64 {
        move |s| height.saturating_sub(height / 10 * (s as i64 - apex as i64).unsigned_abs()).max(1)
    }

    #[test]
    fn test_co_eluting_peaks_form_one_analyte() {
        let peaks = vec![
            peak(1, 200.1, 10..=30, triangle(20, 1000)),
            peak(2, 201.1034, 10..=30, triangle(20, 300)),
            peak(3, 350.0, 10..=30, triangle(20, 5000)),
        ];
        let analytes =
            build_analytes(&peaks, &Tolerance::default(), &AnalyteBuildingConfig::default()).unwrap();
        assert_eq!(analytes.len(), 1);
        let a = &analytes[0];
        assert_eq!(a.id, 1);
        // seed is the most intense peak
        assert_eq!(a.peaks[0].peak_id, 3);
        assert_eq!(a.peaks.len(), 3);
        assert_eq!(a.max_peak_id, 3);
        assert_eq!(a.max_intensity, 5000);
        assert_eq!(a.retention_time, 0.4);
    }

    #[test]
    fn test_inverse_and_disjoint_peaks_are_not_merged() {
        let peaks = vec![
            peak(1, 200.1, 10..=20, |s| (s as u64) * 100),
            // decreasing while peak 1 increases
            peak(2, 300.0, 10..=20, |s| (30 - s as u64) * 100),
            // no shared scans
            peak(3, 400.0, 40..=50, triangle(45, 900)),
        ];
        let config = AnalyteBuildingConfig {
            analyte_peak_minimum: 1,
            ..Default::default()
        };
        let analytes = build_analytes(&peaks, &Tolerance::default(), &config).unwrap();
        assert_eq!(analytes.len(), 3);
        assert!(analytes.iter().all(|a| a.peaks.len() == 1));
    }

    #[test]
    fn test_small_candidates_release_their_peaks() {
        let peaks = vec![
            peak(1, 200.1, 10..=30, triangle(20, 1000)),
            peak(2, 500.0, 50..=70, triangle(60, 900)),
        ];
        let analytes =
            build_analytes(&peaks, &Tolerance::default(), &AnalyteBuildingConfig::default()).unwrap();
        assert!(analytes.is_empty());
    }

    #[test]
    fn test_deterministic_membership() {
        let peaks = vec![
            peak(1, 200.1, 10..=30, triangle(20, 1000)),
            peak(2, 201.1034, 10..=30, triangle(20, 1000)),
            peak(3, 150.0, 12..=28, triangle(20, 1000)),
        ];
        let tol = Tolerance::default();
        let config = AnalyteBuildingConfig::default();
        let first = build_analytes(&peaks, &tol, &config).unwrap();
        for _ in 0..5 {
            assert_eq!(build_analytes(&peaks, &tol, &config).unwrap(), first);
        }
        // equal intensities: lowest peak id seeds
        assert_eq!(first[0].peaks[0].peak_id, 1);
    }

    #[test]
    fn test_isotope_requirement() {
        let peaks = vec![
            peak(1, 200.1, 10..=30, triangle(20, 1000)),
            peak(2, 201.1034, 10..=30, triangle(20, 300)),
            peak(3, 400.0, 40..=60, triangle(50, 1000)),
            peak(4, 455.0, 40..=60, triangle(50, 300)),
        ];
        let config = AnalyteBuildingConfig {
            require_analyte_isotope: true,
            ..Default::default()
        };
        let analytes = build_analytes(&peaks, &Tolerance::default(), &config).unwrap();
        assert_eq!(analytes.len(), 1);
        assert_eq!(analytes[0].max_peak_mass, 200.1);
    }
}
