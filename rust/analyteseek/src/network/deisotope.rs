use crate::models::SpectrumPeak;

/// Half width of the window around an expected isotope position.
pub const ISOTOPE_WINDOW_DA: f64 = 0.1;

/// Masses of `spectrum` without isotope satellites, in increasing order.
///
/// A mass is a satellite when, for some charge `z` in `1..=max_charge`,
/// `mass - 1/z` falls strictly within [`ISOTOPE_WINDOW_DA`] of another mass
/// of the spectrum.
///
/// # Example
///
/// ```
/// use analyteseek::models::ReplicateMassPeak;
/// use analyteseek::network::deisotope::deisotoped_masses;
///
/// let spectrum: Vec<ReplicateMassPeak> = [300.0, 301.0034, 301.5017, 350.2]
///     .iter()
///     .map(|m| ReplicateMassPeak {
///         contributions: vec![],
///         average_mass: *m,
///         average_intensity: 0,
///         relative_intensity: 10.0,
///     })
///     .collect();
/// assert_eq!(deisotoped_masses(&spectrum, 2), vec![300.0, 350.2]);
/// ```
pub fn deisotoped_masses<P: SpectrumPeak>(spectrum: &[P], max_charge: u8) -> Vec<f64> {
    let mut masses: Vec<f64> = spectrum.iter().map(|p| p.mass()).collect();
    masses.sort_by(|a, b| a.total_cmp(b));
    masses
        .iter()
        .enumerate()
        .filter(|(i, m)| {
            !(1..=max_charge).any(|z| {
                let expected = *m - 1.0 / z as f64;
                masses.iter().enumerate().any(|(j, r)| {
                    j != *i && r - ISOTOPE_WINDOW_DA < expected && expected < r + ISOTOPE_WINDOW_DA
                })
            })
        })
        .map(|(_, m)| *m)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperimentAnalyteMassPeak;

    fn spectrum(masses: &[f64]) -> Vec<ExperimentAnalyteMassPeak> {
        masses
            .iter()
            .map(|m| ExperimentAnalyteMassPeak {
                average_mass: *m,
                relative_intensity: 50.0,
                contributions: vec![],
            })
            .collect()
    }

    #[test]
    fn test_isotope_ladder_keeps_monoisotopic_mass() {
        let s = spectrum(&[402.0, 400.0, 401.0]);
        assert_eq!(deisotoped_masses(&s, 1), vec![400.0]);
    }

    #[test]
    fn test_charge_limits_are_respected() {
        // z = 3 spacing
        let s = spectrum(&[600.0, 600.3345]);
        assert_eq!(deisotoped_masses(&s, 2), vec![600.0, 600.3345]);
        assert_eq!(deisotoped_masses(&s, 3), vec![600.0]);
    }

    #[test]
    fn test_unrelated_masses_are_kept() {
        let s = spectrum(&[100.0, 150.0, 151.5]);
        assert_eq!(deisotoped_masses(&s, 4), vec![100.0, 150.0, 151.5]);
    }
}
