use analytecore::Tolerance;
use analyteseek::data_sources::{
    annotate_features,
    read_peak_list,
    write_annotated_peak_list,
};
use analyteseek::{
    AnnotationTable,
    GroupKind,
    Pipeline,
};
use std::fs::File;
use std::io::{
    BufReader,
    Write,
};
use std::path::Path;
use std::time::Instant;
use tracing::{
    info,
    instrument,
};

use crate::cli::{
    AnnotateArgs,
    RunArgs,
    WriteTemplateArgs,
};
use crate::config::Config;
use crate::errors::CliError;
use crate::gate::StdinGate;
use crate::processing::{
    load_group,
    write_json,
    write_results,
};

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> CliError + '_ {
    move |e| CliError::Io {
        source: e.to_string(),
        path: Some(path.to_string_lossy().to_string()),
    }
}

/// Main function for the 'run' subcommand.
#[instrument]
pub fn main_run(args: RunArgs) -> Result<(), CliError> {
    let st = Instant::now();
    let config = Config::from_file(&args.config)?.with_cli_args(&args)?;
    let (Some(input), Some(output)) = (config.input.as_ref(), config.output.as_ref()) else {
        return Err(CliError::Config {
            source: "Both input and output must be configured".to_string(),
        });
    };
    info!("Using analysis parameters: {:#?}", config.analysis);

    std::fs::create_dir_all(&output.directory).map_err(io_error(&output.directory))?;
    write_json(
        &output
            .directory
            .join(format!("{}_config.json", input.experiment_name)),
        &config,
    )?;

    let samples = load_group(
        &input.sample_directory,
        GroupKind::Samples,
        input.replicate_count,
        input.ims,
        input.intensity_cutoff,
    )?;
    let blanks = input
        .blank_directory
        .as_ref()
        .map(|dir| {
            load_group(
                dir,
                GroupKind::Blanks,
                input.blank_replicate_count(),
                input.ims,
                input.intensity_cutoff,
            )
        })
        .transpose()?;

    // Only consulted in safe mode.
    let gate = StdinGate::default();
    let result = Pipeline::new(&config.analysis, &gate)
        .with_progress(args.progress)
        .run_experiment(samples, blanks)?;

    write_results(&result, &output.directory, &input.experiment_name)?;
    info!("Total run time: {:?}", st.elapsed());
    Ok(())
}

/// Main function for the 'annotate' subcommand.
#[instrument]
pub fn main_annotate(args: AnnotateArgs) -> Result<(), CliError> {
    let tolerance = match &args.config {
        Some(path) => Config::from_file(path)?.analysis.tolerance,
        None => Tolerance::default(),
    };

    let handle = File::open(&args.table).map_err(io_error(&args.table))?;
    let table: AnnotationTable = serde_json::from_reader(BufReader::new(handle))?;
    info!("Loaded annotation table with {} rows", table.len());

    let features = read_peak_list(&args.peak_list)?;
    let annotated = annotate_features(
        &features,
        &table,
        &args.sample,
        args.replicate,
        &tolerance,
    );
    let found = annotated.iter().filter(|f| f.peak_id.is_some()).count();
    info!(
        "Matched {} of {} features to peaks of {} replicate {}",
        found,
        annotated.len(),
        args.sample,
        args.replicate
    );

    write_annotated_peak_list(&args.output_path, &annotated)?;
    println!("Annotated peak list written to {}", args.output_path.display());
    Ok(())
}

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let output_path = args.output_path;
    let template = serde_json::to_string_pretty(&Config::template())?;
    let mut file = File::create(&output_path).map_err(io_error(&output_path))?;
    file.write_all(template.as_bytes())
        .map_err(io_error(&output_path))?;
    println!("Template written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_template_is_a_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        main_write_template(WriteTemplateArgs {
            output_path: path.clone(),
        })
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        assert!(config.input.is_some());
        assert!(config.output.is_some());
    }

    #[test]
    fn test_run_writes_result_files() {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("samples");
        std::fs::create_dir_all(&samples).unwrap();
        let mut content = String::from("scan,rt,mz,drift,intensity\n");
        for scan in 10..=30u32 {
            let d = scan as f64 - 20.0;
            let height = (-d * d / 18.0f64).exp();
            content.push_str(&format!(
                "{},{},200.1,,{}\n",
                scan,
                scan as f64 * 0.02,
                (100_000.0 * height).round() + 1.0
            ));
            content.push_str(&format!(
                "{},{},201.1034,,{}\n",
                scan,
                scan as f64 * 0.02,
                (25_000.0 * height).round() + 1.0
            ));
        }
        std::fs::write(samples.join("S1_R1.csv"), &content).unwrap();

        let out = dir.path().join("out");
        let config_path = dir.path().join("config.json");
        let config = format!(
            r#"{{"input": {{"sample_directory": {:?}, "intensity_cutoff": 0}},
                "output": {{"directory": {:?}}}}}"#,
            samples.to_string_lossy(),
            out.to_string_lossy()
        );
        std::fs::write(&config_path, config).unwrap();

        main_run(RunArgs {
            config: config_path,
            sample_dir: None,
            blank_dir: None,
            output_dir: None,
            progress: false,
        })
        .unwrap();

        for name in [
            "config",
            "replicate_analytes",
            "experiment_analytes",
            "annotation_table",
            "similarity_network",
        ] {
            assert!(out.join(format!("experiment_{}.json", name)).exists(), "{}", name);
        }
        assert!(!out.join("experiment_blank_experiment_analytes.json").exists());

        let table: AnnotationTable = serde_json::from_reader(
            File::open(out.join("experiment_annotation_table.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(table.len(), 2);
    }
}
