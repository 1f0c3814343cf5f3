use crate::analyte_building::AnalyteBuildingConfig;
use crate::network::NetworkConfig;
use analytecore::{
    PeakBuildingConfig,
    Tolerance,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Fraction of intensity two analytes (or spectra) must share to match.
    pub analyte_match_score: f64,
    pub minimum_experiment_analyte_mass_peak_count: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            analyte_match_score: 0.6,
            minimum_experiment_analyte_mass_peak_count: 1,
        }
    }
}

/// Every tunable of the pipeline. Missing JSON fields take their defaults.
///
/// ```
/// use analyteseek::AnalysisParameters;
///
/// let params: AnalysisParameters =
///     serde_json::from_str(r#"{"matching": {"analyte_match_score": 0.8}}"#).unwrap();
/// assert_eq!(params.matching.analyte_match_score, 0.8);
/// assert_eq!(params.matching.minimum_experiment_analyte_mass_peak_count, 1);
/// assert_eq!(params.tolerance.mass_da, 0.01);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisParameters {
    pub tolerance: Tolerance,
    pub peak_building: PeakBuildingConfig,
    pub analyte_building: AnalyteBuildingConfig,
    pub matching: MatchingConfig,
    pub network: NetworkConfig,
}
