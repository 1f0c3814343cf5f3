use serde::{
    Deserialize,
    Serialize,
};

/// Tolerance settings shared by every matching step of the pipeline.
///
/// All tolerances are absolute and symmetric: a tolerance of `0.01` on a
/// mass of `100.0` accepts anything in `[99.99, 100.01]`.
///
/// Example:
/// ```
/// use analytecore::Tolerance;
///
/// let tolerance = Tolerance::default();
/// assert!(tolerance.mass_match(200.1000, 200.1050));
/// assert!(!tolerance.mass_match(200.1000, 200.1200));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tolerance {
    /// Mass tolerance in daltons.
    pub mass_da: f64,
    /// Retention time tolerance in minutes.
    pub rt_minutes: f64,
    /// Drift time tolerance, in the same units as the input drift times.
    pub drift: f64,
    /// Mass difference between the 12C and 13C isotopologues.
    pub carbon_isotope_offset: f64,
    /// Charge states are evaluated as `1..=max_charge`.
    pub max_charge: u8,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            mass_da: 0.01,
            rt_minutes: 0.1,
            drift: 1.0,
            carbon_isotope_offset: 1.0034,
            max_charge: 4,
        }
    }
}

#[inline(always)]
fn within(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

impl Tolerance {
    pub fn mass_match(&self, a: f64, b: f64) -> bool {
        within(a, b, self.mass_da)
    }

    pub fn rt_match(&self, a: f64, b: f64) -> bool {
        within(a, b, self.rt_minutes)
    }

    pub fn drift_match(&self, a: f64, b: f64) -> bool {
        within(a, b, self.drift)
    }

    /// Whether `upper` is the 13C partner of `lower` (singly charged).
    ///
    /// ```
    /// use analytecore::Tolerance;
    ///
    /// let tolerance = Tolerance::default();
    /// assert!(tolerance.isotope_match(100.0000, 101.0034));
    /// assert!(!tolerance.isotope_match(100.0000, 102.0000));
    /// ```
    pub fn isotope_match(&self, lower: f64, upper: f64) -> bool {
        self.mass_match(lower, upper - self.carbon_isotope_offset)
    }

    /// Whether any of `candidates` sits one 13C spacing above or below `mass`
    /// for some charge state in `1..=max_charge`.
    pub fn has_isotope_partner(&self, mass: f64, candidates: &[f64]) -> bool {
        (1..=self.max_charge).any(|z| {
            let spacing = self.carbon_isotope_offset / z as f64;
            let lower_target = mass - spacing;
            let upper_target = mass + spacing;
            candidates
                .iter()
                .any(|&c| self.mass_match(lower_target, c) || self.mass_match(upper_target, c))
        })
    }

    pub fn charge_states(&self) -> impl Iterator<Item = u8> {
        1..=self.max_charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_match_is_symmetric() {
        let tol = Tolerance::default();
        let pairs = [(100.0, 100.005), (250.1234, 250.1294), (80.0, 80.02)];
        for (a, b) in pairs {
            assert_eq!(tol.mass_match(a, b), tol.mass_match(b, a));
        }
        assert!(tol.mass_match(100.0, 100.005));
        assert!(!tol.mass_match(80.0, 80.02));
    }

    #[test]
    fn test_isotope_match() {
        let tol = Tolerance::default();
        assert!(tol.isotope_match(100.0000, 101.0034));
        assert!(tol.isotope_match(100.0000, 101.0100));
        assert!(!tol.isotope_match(100.0000, 102.0000));
        assert!(!tol.isotope_match(101.0034, 100.0000));
    }

    #[test]
    fn test_isotope_partner_higher_charges() {
        let tol = Tolerance::default();
        // z = 2 spacing
        assert!(tol.has_isotope_partner(500.0, &[500.5017]));
        // below the peak
        assert!(tol.has_isotope_partner(501.0034, &[500.0]));
        assert!(!tol.has_isotope_partner(500.0, &[500.7]));
    }

    #[test]
    fn test_rt_and_drift_match() {
        let tol = Tolerance::default();
        assert!(tol.rt_match(5.0, 5.05));
        assert!(!tol.rt_match(5.0, 5.2));
        assert!(tol.drift_match(20.0, 20.9));
        assert!(!tol.drift_match(20.0, 21.5));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tol: Tolerance = serde_json::from_str(r#"{"mass_da": 0.005}"#).unwrap();
        assert_eq!(tol.mass_da, 0.005);
        assert_eq!(tol.max_charge, 4);
        assert_eq!(tol.carbon_isotope_offset, 1.0034);
    }
}
