use crate::errors::DataReadingError;
use analytecore::Record;
use serde::Deserialize;
use std::path::Path;
use tracing::{
    debug,
    info,
};

/// A row of a converted run file: `scan,rt,mz,drift,intensity`.
#[derive(Debug, Clone, Deserialize)]
struct RunRow {
    scan: u32,
    rt: f64,
    mz: f64,
    #[serde(default)]
    drift: Option<f64>,
    intensity: f64,
}

impl From<RunRow> for Record {
    fn from(row: RunRow) -> Self {
        Record {
            scan: row.scan,
            retention_time: row.rt,
            mass: row.mz,
            drift_time: row.drift,
            intensity: row.intensity.round() as u64,
        }
    }
}

/// Reads the records of one run, dropping those below `intensity_cutoff`.
///
/// The drift column may be empty for runs without ion mobility.
pub fn read_run_file<T: AsRef<Path>>(
    file: T,
    intensity_cutoff: u64,
) -> Result<Vec<Record>, DataReadingError> {
    let path = file.as_ref();
    let handle = std::fs::File::open(path).map_err(|e| DataReadingError::FileReadingError {
        source: e,
        path: path.to_path_buf(),
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(handle);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for result in rdr.deserialize() {
        let row: RunRow = result.map_err(|e| DataReadingError::CsvError {
            source: e,
            path: path.to_path_buf(),
        })?;
        let record = Record::from(row);
        if record.intensity < intensity_cutoff {
            dropped += 1;
            continue;
        }
        records.push(record);
    }
    debug!("Dropped {} records below intensity {}", dropped, intensity_cutoff);
    info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
