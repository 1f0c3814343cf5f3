use analytecore::{
    AnalyteCoreError,
    DataProcessingError as CoreDataProcessingError,
};
use std::path::PathBuf;

#[derive(Debug)]
pub enum DataProcessingError {
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    ExpectedNonEmptyData {
        context: Option<String>,
    },
    CoreDataProcessingError {
        error: CoreDataProcessingError,
        context: String,
    },
}

impl From<CoreDataProcessingError> for DataProcessingError {
    fn from(x: CoreDataProcessingError) -> Self {
        Self::CoreDataProcessingError {
            error: x,
            context: "".to_string(),
        }
    }
}

/// Lookups that must succeed if the stages were wired correctly.
#[derive(Debug)]
pub enum InvariantViolation {
    MissingPeak {
        peak_id: u32,
        context: String,
    },
    MissingAnalyte {
        sample: String,
        replicate: u8,
        analyte_id: u32,
    },
    MissingReplicateAnalyte {
        sample: String,
        replicate_analyte_id: u32,
    },
}

#[derive(Debug)]
pub enum DataReadingError {
    CsvError {
        source: csv::Error,
        path: PathBuf,
    },
    FileReadingError {
        source: std::io::Error,
        path: PathBuf,
    },
    UnexpectedFileName {
        path: PathBuf,
    },
}

#[derive(Debug)]
pub enum AnalyteSeekError {
    Core(AnalyteCoreError),
    DataProcessingError(DataProcessingError),
    DataReadingError(DataReadingError),
    InvariantViolation(InvariantViolation),
    /// Basketing was asked to run over a group without samples.
    NoSamples {
        group: String,
    },
    ReplicateCountMismatch {
        sample: String,
        expected: usize,
        found: usize,
    },
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    ParseError {
        msg: String,
    },
}

impl std::fmt::Display for AnalyteSeekError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core(e) => write!(f, "{}", e),
            Self::NoSamples { group } => {
                write!(f, "No sample analyte data provided for '{}', basketing failed", group)
            }
            Self::ReplicateCountMismatch {
                sample,
                expected,
                found,
            } => write!(
                f,
                "Sample {} has {} replicate runs, expected {}",
                sample, found, expected
            ),
            other => write!(f, "{:?}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyteSeekError>;

impl From<AnalyteCoreError> for AnalyteSeekError {
    fn from(x: AnalyteCoreError) -> Self {
        Self::Core(x)
    }
}

impl From<CoreDataProcessingError> for AnalyteSeekError {
    fn from(x: CoreDataProcessingError) -> Self {
        Self::DataProcessingError(x.into())
    }
}

impl From<DataProcessingError> for AnalyteSeekError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessingError(x)
    }
}

impl From<DataReadingError> for AnalyteSeekError {
    fn from(x: DataReadingError) -> Self {
        Self::DataReadingError(x)
    }
}

impl From<InvariantViolation> for AnalyteSeekError {
    fn from(x: InvariantViolation) -> Self {
        Self::InvariantViolation(x)
    }
}

impl From<serde_json::Error> for AnalyteSeekError {
    fn from(val: serde_json::Error) -> Self {
        AnalyteSeekError::ParseError {
            msg: val.to_string(),
        }
    }
}
