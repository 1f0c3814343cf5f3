use super::analyte::AnalyteId;
use super::spectrum::SpectrumPeak;
use serde::{
    Deserialize,
    Serialize,
};

pub type ReplicateAnalyteId = u32;

/// One mass read at the apex scan of one replicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassContribution {
    pub mass: f64,
    pub intensity: u64,
    /// Percent of that replicate's apex intensity.
    pub relative_intensity: f64,
    pub replicate: u8,
}

/// A mass of a replicate analyte's consensus spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateMassPeak {
    pub contributions: Vec<MassContribution>,
    pub average_mass: f64,
    pub average_intensity: u64,
    pub relative_intensity: f64,
}

impl SpectrumPeak for ReplicateMassPeak {
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

/// Consensus of matched analytes across the replicate runs of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateAnalyte {
    pub id: ReplicateAnalyteId,
    pub sample: String,
    /// (replicate number, analyte id) of every member analyte.
    pub members: Vec<(u8, AnalyteId)>,
    /// Mass of the tallest consensus peak.
    pub max_peak_mass: f64,
    pub max_intensity: u64,
    pub retention_time: f64,
    pub spectrum: Vec<ReplicateMassPeak>,
}

impl ReplicateAnalyte {
    pub fn reference(&self) -> ReplicateAnalyteRef {
        ReplicateAnalyteRef {
            sample: self.sample.clone(),
            replicate_analyte_id: self.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplicateAnalyteRef {
    pub sample: String,
    pub replicate_analyte_id: ReplicateAnalyteId,
}
