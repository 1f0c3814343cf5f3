use crate::errors::DataProcessingError;
use serde::{
    Deserialize,
    Serialize,
};

/// A single centroided reading from one scan of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub scan: u32,
    /// Retention time in minutes.
    pub retention_time: f64,
    pub mass: f64,
    pub drift_time: Option<f64>,
    pub intensity: u64,
}

impl Record {
    pub fn new(scan: u32, retention_time: f64, mass: f64, intensity: u64) -> Self {
        Self {
            scan,
            retention_time,
            mass,
            drift_time: None,
            intensity,
        }
    }

    pub fn with_drift(mut self, drift_time: f64) -> Self {
        self.drift_time = Some(drift_time);
        self
    }

    pub fn drift(&self) -> Result<f64, DataProcessingError> {
        self.drift_time
            .ok_or_else(|| DataProcessingError::ExpectedSetField {
                field: "drift_time",
                context: format!("record at scan {} mass {:.4}", self.scan, self.mass),
            })
    }

    pub fn validate(&self) -> Result<(), DataProcessingError> {
        let finite = self.mass.is_finite()
            && self.retention_time.is_finite()
            && self.drift_time.is_none_or(|d| d.is_finite());
        if !finite {
            return Err(DataProcessingError::ExpectedFiniteNonNanData {
                context: format!("record at scan {}", self.scan),
            });
        }
        Ok(())
    }
}

/// Sorts records by scan, keeping the relative order of records sharing a scan.
pub fn sort_by_scan(records: &mut [Record]) {
    records.sort_by_key(|r| r.scan);
}

pub fn mean_mass(records: &[Record]) -> f64 {
    records.iter().map(|r| r.mass).sum::<f64>() / records.len() as f64
}
