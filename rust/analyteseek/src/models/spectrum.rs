use analytecore::utils::round_to;

/// A mass peak of a relative-intensity spectrum.
pub trait SpectrumPeak {
    fn mass(&self) -> f64;
    fn relative_intensity(&self) -> f64;
    fn set_relative_intensity(&mut self, value: f64);
}

/// Rescales a spectrum so its tallest peak reads exactly 100 (1 decimal place).
///
/// Spectra already topping at 100 and empty or all-zero spectra are left untouched.
/// Values are rounded after scaling, so a value that scales to 99.95 or more
/// also reads 100 (`[99.96, 99.99, 50.0]` becomes `[100.0, 100.0, 50.0]`).
pub fn rescale_to_max<P: SpectrumPeak>(spectrum: &mut [P]) {
    let max = spectrum
        .iter()
        .map(|p| p.relative_intensity())
        .fold(0.0, f64::max);
    if max <= 0.0 || max == 100.0 {
        return;
    }
    for p in spectrum.iter_mut() {
        let scaled = round_to(p.relative_intensity() / max * 100.0, 1);
        p.set_relative_intensity(scaled);
    }
}

pub fn total_relative_intensity<P: SpectrumPeak>(spectrum: &[P]) -> f64 {
    spectrum.iter().map(|p| p.relative_intensity()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Bar(f64);

    impl SpectrumPeak for Bar {
        fn mass(&self) -> f64 {
            0.0
        }

        fn relative_intensity(&self) -> f64 {
            self.0
        }

        fn set_relative_intensity(&mut self, value: f64) {
            self.0 = value;
        }
    }

    fn rescaled(values: &[f64]) -> Vec<f64> {
        let mut spectrum: Vec<Bar> = values.iter().map(|v| Bar(*v)).collect();
        rescale_to_max(&mut spectrum);
        spectrum.into_iter().map(|b| b.0).collect()
    }

    #[test]
    fn test_rescale_to_max() {
        assert_eq!(rescaled(&[80.0, 100.0, 40.0]), vec![80.0, 100.0, 40.0]);
        let out = rescaled(&[80.0, 98.0, 40.0]);
        assert_eq!(out, vec![81.6, 100.0, 40.8]);
        assert_eq!(out.iter().filter(|v| **v == 100.0).count(), 1);
        assert!(out.iter().all(|v| *v <= 100.0));
    }

    #[test]
    fn test_rescale_degenerate_inputs() {
        assert_eq!(rescaled(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(rescaled(&[]).is_empty());
    }

    #[test]
    fn test_rescale_rounding_can_tie_at_max() {
        assert_eq!(rescaled(&[99.96, 99.99, 50.0]), vec![100.0, 100.0, 50.0]);
    }
}
