use crate::annotation::AnnotationTable;
use crate::errors::DataReadingError;
use analytecore::Tolerance;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;
use tracing::info;

/// A feature of an external peak list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalFeature {
    pub mz: f64,
    pub rt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedFeature {
    pub mz: f64,
    pub rt: f64,
    pub level: String,
    pub assigned_id: Option<u32>,
    pub blank: bool,
    pub peak_id: Option<u32>,
    pub peak_mass: Option<f64>,
    pub peak_rt: Option<f64>,
}

pub fn read_peak_list<T: AsRef<Path>>(file: T) -> Result<Vec<ExternalFeature>, DataReadingError> {
    let path = file.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataReadingError::CsvError {
            source: e,
            path: path.to_path_buf(),
        })?;
    let features = rdr
        .deserialize()
        .collect::<Result<Vec<ExternalFeature>, csv::Error>>()
        .map_err(|e| DataReadingError::CsvError {
            source: e,
            path: path.to_path_buf(),
        })?;
    info!("Read {} external features from {}", features.len(), path.display());
    Ok(features)
}

/// Looks every feature up in the annotation table of one run.
pub fn annotate_features(
    features: &[ExternalFeature],
    table: &AnnotationTable,
    sample: &str,
    replicate: u8,
    tolerance: &Tolerance,
) -> Vec<AnnotatedFeature> {
    features
        .iter()
        .map(|f| {
            let hit = table.lookup(sample, replicate, f.mz, f.rt, tolerance);
            AnnotatedFeature {
                mz: f.mz,
                rt: f.rt,
                level: hit.level.label().to_string(),
                assigned_id: hit.level.id(),
                blank: hit.blank,
                peak_id: hit.row.as_ref().map(|r| r.peak_id),
                peak_mass: hit.row.as_ref().map(|r| r.mass),
                peak_rt: hit.row.as_ref().map(|r| r.retention_time),
            }
        })
        .collect()
}

pub fn write_annotated_peak_list<T: AsRef<Path>>(
    file: T,
    features: &[AnnotatedFeature],
) -> Result<(), DataReadingError> {
    let path = file.as_ref();
    let to_err = |e: csv::Error| DataReadingError::CsvError {
        source: e,
        path: path.to_path_buf(),
    };
    let mut wtr = csv::Writer::from_path(path).map_err(to_err)?;
    for f in features {
        wtr.serialize(f).map_err(to_err)?;
    }
    wtr.flush().map_err(|e| DataReadingError::FileReadingError {
        source: e,
        path: path.to_path_buf(),
    })?;
    Ok(())
}
