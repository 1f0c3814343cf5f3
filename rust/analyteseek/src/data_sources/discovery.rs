use crate::errors::{
    AnalyteSeekError,
    DataReadingError,
    Result,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use tracing::{
    debug,
    info,
};

/// A converted run file named `<sample>_R<replicate>.csv`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunFile {
    pub sample: String,
    pub replicate: u8,
    pub path: PathBuf,
}

const RUN_FILE_PATTERN: &str = r"^(?P<sample>.+)_R(?P<replicate>\d+)\.csv$";

fn run_file_regex() -> Result<Regex> {
    Regex::new(RUN_FILE_PATTERN).map_err(|e| AnalyteSeekError::ParseError { msg: e.to_string() })
}

fn parse_run_file(re: &Regex, path: &Path) -> Option<RunFile> {
    let name = path.file_name()?.to_str()?;
    let caps = re.captures(name)?;
    let replicate = caps.name("replicate")?.as_str().parse::<u8>().ok()?;
    Some(RunFile {
        sample: caps.name("sample")?.as_str().to_string(),
        replicate,
        path: path.to_path_buf(),
    })
}

/// Lists the run files of a directory, ordered by sample name then replicate.
///
/// Files without a `.csv` extension are ignored; `.csv` files not following
/// the naming scheme are an error.
pub fn discover_runs<T: AsRef<Path>>(directory: T) -> Result<Vec<RunFile>> {
    let directory = directory.as_ref();
    let re = run_file_regex()?;
    let entries = std::fs::read_dir(directory).map_err(|e| DataReadingError::FileReadingError {
        source: e,
        path: directory.to_path_buf(),
    })?;

    let mut runs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DataReadingError::FileReadingError {
            source: e,
            path: directory.to_path_buf(),
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "csv") {
            debug!("Skipping {}", path.display());
            continue;
        }
        match parse_run_file(&re, &path) {
            Some(run) => runs.push(run),
            None => return Err(DataReadingError::UnexpectedFileName { path }.into()),
        }
    }
    runs.sort();
    info!("Found {} run files in {}", runs.len(), directory.display());
    Ok(runs)
}

/// Checks every sample has exactly the replicates `1..=replicate_count`.
pub fn validate_replicates(runs: &[RunFile], replicate_count: usize) -> Result<()> {
    let mut by_sample: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
    for run in runs {
        by_sample.entry(run.sample.as_str()).or_default().push(run.replicate);
    }
    for (sample, mut replicates) in by_sample {
        replicates.sort_unstable();
        let expected: Vec<u8> = (1..=replicate_count).map(|r| r as u8).collect();
        if replicates != expected {
            return Err(AnalyteSeekError::ReplicateCountMismatch {
                sample: sample.to_string(),
                expected: replicate_count,
                found: replicates.len(),
            });
        }
    }
    Ok(())
}
