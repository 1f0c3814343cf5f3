use analyteseek::AnalysisParameters;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};

use crate::cli::RunArgs;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub analysis: AnalysisParameters,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    /// Directory with `<sample>_R<n>.csv` run files.
    pub sample_directory: PathBuf,
    #[serde(default)]
    pub blank_directory: Option<PathBuf>,
    #[serde(default = "default_replicate_count")]
    pub replicate_count: usize,
    /// Replicates per blank, `replicate_count` when unset.
    #[serde(default)]
    pub blank_replicate_count: Option<usize>,
    /// Whether the run files carry drift times.
    #[serde(default)]
    pub ims: bool,
    /// Records below this intensity are dropped on load.
    #[serde(default = "default_intensity_cutoff")]
    pub intensity_cutoff: u64,
    #[serde(default = "default_experiment_name")]
    pub experiment_name: String,
}

fn default_replicate_count() -> usize {
    1
}

fn default_intensity_cutoff() -> u64 {
    2000
}

fn default_experiment_name() -> String {
    "experiment".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let conf = std::fs::File::open(path).map_err(|e| CliError::Io {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        })?;
        let config: Config =
            serde_json::from_reader(conf).map_err(|e| CliError::ParseError { msg: e.to_string() })?;
        Ok(config)
    }

    /// Command line values win over the config file.
    pub fn with_cli_args(mut self, args: &RunArgs) -> Result<Self, CliError> {
        if let Some(sample_dir) = &args.sample_dir {
            match self.input.as_mut() {
                Some(input) => input.sample_directory = sample_dir.clone(),
                None => {
                    self.input = Some(InputConfig {
                        sample_directory: sample_dir.clone(),
                        ..InputConfig::template()
                    })
                }
            }
        }
        if let Some(blank_dir) = &args.blank_dir {
            match self.input.as_mut() {
                Some(input) => input.blank_directory = Some(blank_dir.clone()),
                None => {
                    return Err(CliError::Config {
                        source: "A blank directory was given without a sample directory"
                            .to_string(),
                    });
                }
            }
        }
        if let Some(output_dir) = &args.output_dir {
            self.output = Some(OutputConfig {
                directory: output_dir.clone(),
            });
        }

        let Some(input) = self.input.as_ref() else {
            return Err(CliError::Config {
                source: "No input provided, please provide one in either the config file or with the --sample-dir flag".to_string(),
            });
        };
        if input.replicate_count == 0 || input.blank_replicate_count == Some(0) {
            return Err(CliError::Config {
                source: "Replicate counts must be at least 1".to_string(),
            });
        }
        if self.output.is_none() {
            return Err(CliError::Config {
                source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
            });
        }
        Ok(self)
    }

    pub fn template() -> Self {
        Self {
            input: Some(InputConfig::template()),
            analysis: AnalysisParameters::default(),
            output: Some(OutputConfig {
                directory: PathBuf::from("analyteseek_results"),
            }),
        }
    }
}

impl InputConfig {
    fn template() -> Self {
        Self {
            sample_directory: PathBuf::from("samples"),
            blank_directory: None,
            replicate_count: default_replicate_count(),
            blank_replicate_count: None,
            ims: false,
            intensity_cutoff: default_intensity_cutoff(),
            experiment_name: default_experiment_name(),
        }
    }

    pub fn blank_replicate_count(&self) -> usize {
        self.blank_replicate_count.unwrap_or(self.replicate_count)
    }
}
