use analyteseek::AnalyteSeekError;
use analyteseek::errors::DataReadingError;

#[derive(Debug)]
pub enum CliError {
    Config {
        source: String,
    },
    ParseError {
        msg: String,
    },
    Io {
        source: String,
        path: Option<String>,
    },
    /// Input files missing, misnamed or with the wrong number of replicates.
    Input {
        source: String,
    },
    Processing {
        source: String,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing config: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error reading file {}: {}", path, source)
                } else {
                    write!(f, "Error reading file: {}", source)
                }
            }
            CliError::Input { source } => write!(f, "Invalid input: {}", source),
            CliError::Processing { source } => write!(f, "Error processing data: {}", source),
        }
    }
}

impl From<DataReadingError> for CliError {
    fn from(e: DataReadingError) -> Self {
        CliError::Input {
            source: format!("{:?}", e),
        }
    }
}

impl From<AnalyteSeekError> for CliError {
    fn from(e: AnalyteSeekError) -> Self {
        match e {
            AnalyteSeekError::DataReadingError(e) => e.into(),
            AnalyteSeekError::ReplicateCountMismatch { .. } => CliError::Input {
                source: e.to_string(),
            },
            other => CliError::Processing {
                source: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::ParseError { msg: e.to_string() }
    }
}
