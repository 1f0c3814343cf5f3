use analyteseek::data_sources::{
    RunFile,
    discover_runs,
    read_run_file,
    validate_replicates,
};
use analyteseek::models::ReplicateAnalyte;
use analyteseek::{
    ExperimentResult,
    GroupInput,
    GroupKind,
    RunInput,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::errors::CliError;

/// Discovers, validates and loads the run files of one group.
///
/// Any layout problem is reported before a single record is read.
pub fn load_group(
    directory: &Path,
    kind: GroupKind,
    replicate_count: usize,
    ims: bool,
    intensity_cutoff: u64,
) -> Result<GroupInput, CliError> {
    let st = Instant::now();
    let files: Vec<RunFile> = discover_runs(directory)?;
    if files.is_empty() {
        return Err(CliError::Input {
            source: format!("No run files found in {}", directory.display()),
        });
    }
    validate_replicates(&files, replicate_count)?;

    let runs = files
        .par_iter()
        .map(|f| {
            let records = read_run_file(&f.path, intensity_cutoff)?;
            Ok(RunInput {
                sample: f.sample.clone(),
                replicate: f.replicate,
                records,
            })
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    info!(
        "Loaded {} {} runs in {:?}",
        runs.len(),
        kind,
        st.elapsed()
    );

    Ok(GroupInput {
        kind,
        ims,
        replicate_count,
        runs,
    })
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CliError> {
    let to_err = |e: std::io::Error| CliError::Io {
        source: e.to_string(),
        path: Some(path.to_string_lossy().to_string()),
    };
    let file = File::create(path).map_err(to_err)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Writes every result level as JSON into `directory`, prefixed by the experiment name.
pub fn write_results(
    result: &ExperimentResult,
    directory: &Path,
    experiment_name: &str,
) -> Result<(), CliError> {
    let out = |name: &str| directory.join(format!("{}_{}.json", experiment_name, name));

    let replicate_analytes: Vec<&ReplicateAnalyte> = result
        .samples
        .replicate_analytes
        .iter()
        .flat_map(|(_, ras)| ras.iter())
        .collect();
    write_json(&out("replicate_analytes"), &replicate_analytes)?;
    write_json(
        &out("experiment_analytes"),
        result.samples.experiment_analytes(),
    )?;
    if let Some(blanks) = &result.blanks {
        write_json(&out("blank_experiment_analytes"), blanks.experiment_analytes())?;
    }
    write_json(&out("annotation_table"), &result.annotation_table())?;
    write_json(&out("similarity_network"), &result.network)?;

    println!(
        "Wrote {} replicate analytes, {} experiment analytes ({} matching blanks) to {}",
        replicate_analytes.len(),
        result.samples.experiment_analytes().len(),
        result.blank_experiment_analytes.len(),
        directory.display()
    );
    Ok(())
}
