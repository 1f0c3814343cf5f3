use analyteseek::models::ExperimentAnalyteMassPeak;
use analyteseek::network::offsets::{
    detect_mass_offset,
    select_offset,
};
use analyteseek::network::similarity::spectral_similarity;
use std::collections::BTreeMap;

fn spectrum(peaks: &[(f64, f64)]) -> Vec<ExperimentAnalyteMassPeak> {
    peaks
        .iter()
        .map(|(mass, rel)| ExperimentAnalyteMassPeak {
            average_mass: *mass,
            relative_intensity: *rel,
            contributions: vec![],
        })
        .collect()
}

#[test]
fn offset_ties_prefer_the_positive_shift() {
    let counts = BTreeMap::from([(140, 3), (-140, 3), (0, 5)]);
    assert_eq!(select_offset(&counts, 2), Some(140));
    assert_eq!(select_offset(&counts, 3), Some(140));
    assert_eq!(select_offset(&counts, 4), None);
}

#[test]
fn identical_and_disjoint_spectra() {
    let a = spectrum(&[(150.05, 100.0), (151.05, 18.0), (233.1, 42.0)]);
    let b = spectrum(&[(402.3, 100.0), (520.9, 64.0)]);
    assert_eq!(spectral_similarity(&a, &a, None), 1.0);
    assert_eq!(spectral_similarity(&a, &b, None), 0.0);
    let offset = detect_mass_offset(&[150.05, 233.1], &[402.3, 520.9], 2);
    assert_eq!(offset, None);
    assert_eq!(spectral_similarity(&a, &b, offset), 0.0);
}

#[test]
fn scores_stay_within_unit_interval() {
    let spectra = [
        spectrum(&[(100.0, 100.0), (120.0, 5.0), (134.0, 60.0)]),
        spectrum(&[(100.0, 2.0), (114.0, 100.0), (148.0, 33.0)]),
        spectrum(&[(120.0, 100.0)]),
        spectrum(&[(300.0, 100.0), (314.0, 100.0), (328.0, 100.0)]),
    ];
    for a in spectra.iter() {
        for b in spectra.iter() {
            for offset in [None, Some(140), Some(-140)] {
                let score = spectral_similarity(a, b, offset);
                assert!((0.0..=1.0).contains(&score), "{}", score);
            }
        }
    }
}
