use analytecore::{
    Peak,
    PeakId,
};
use serde::{
    Deserialize,
    Serialize,
};

pub type AnalyteId = u32;

/// The part of a peak analyte matching needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalytePeak {
    pub peak_id: PeakId,
    pub mass: f64,
    pub max_intensity: u64,
}

impl From<&Peak> for AnalytePeak {
    fn from(p: &Peak) -> Self {
        Self {
            peak_id: p.id,
            mass: p.average_mass,
            max_intensity: p.max_intensity,
        }
    }
}

/// Co-eluting peaks of one run, believed to come from one chemical species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analyte {
    pub id: AnalyteId,
    /// Member peaks, the seed peak first.
    pub peaks: Vec<AnalytePeak>,
    pub max_peak_id: PeakId,
    pub max_peak_mass: f64,
    pub max_intensity: u64,
    pub retention_time: f64,
}

impl Analyte {
    pub fn peak_ids(&self) -> impl Iterator<Item = PeakId> + '_ {
        self.peaks.iter().map(|p| p.peak_id)
    }
}

/// Peaks and analytes built from a single run (one replicate of one sample).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAnalytes {
    pub sample: String,
    pub replicate: u8,
    pub peaks: Vec<Peak>,
    pub analytes: Vec<Analyte>,
}

impl RunAnalytes {
    pub fn analyte(&self, id: AnalyteId) -> Option<&Analyte> {
        self.analytes.iter().find(|a| a.id == id)
    }
}
