use super::replicate_analyte::{
    ReplicateAnalyteRef,
    ReplicateMassPeak,
};
use super::spectrum::SpectrumPeak;
use serde::{
    Deserialize,
    Serialize,
};

pub type ExperimentAnalyteId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumContribution {
    pub sample: String,
    pub peak: ReplicateMassPeak,
}

/// A mass of an experiment analyte's consensus spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentAnalyteMassPeak {
    pub average_mass: f64,
    pub relative_intensity: f64,
    pub contributions: Vec<SpectrumContribution>,
}

impl SpectrumPeak for ExperimentAnalyteMassPeak {
    fn mass(&self) -> f64 {
        self.average_mass
    }

    fn relative_intensity(&self) -> f64 {
        self.relative_intensity
    }

    fn set_relative_intensity(&mut self, value: f64) {
        self.relative_intensity = value;
    }
}

/// Consensus of replicate analytes matched across the samples of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentAnalyte {
    pub id: ExperimentAnalyteId,
    pub members: Vec<ReplicateAnalyteRef>,
    pub retention_time: f64,
    pub spectrum: Vec<ExperimentAnalyteMassPeak>,
    pub is_blank: bool,
}
