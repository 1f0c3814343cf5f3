use std::fmt::Display;

#[derive(Debug)]
pub enum AnalyteCoreError {
    DataProcessingError(DataProcessingError),
    PeakBuildingError(PeakBuildingError),
    Other(String),
}

impl Display for AnalyteCoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataProcessingError(e) => write!(f, "{}", e),
            Self::PeakBuildingError(e) => write!(f, "{}", e),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl AnalyteCoreError {
    pub fn custom(msg: impl Display) -> Self {
        Self::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyteCoreError>;

#[derive(Debug)]
pub enum DataProcessingError {
    ExpectedNonEmptyData {
        context: Option<String>,
    },
    ExpectedFiniteNonNanData {
        context: String,
    },
    /// Drift time missing on a record of an ion-mobility run.
    ExpectedSetField {
        field: &'static str,
        context: String,
    },
}

impl Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedNonEmptyData { context } => match context {
                Some(ctx) => write!(f, "Expected non-empty data ({})", ctx),
                None => write!(f, "Expected non-empty data"),
            },
            Self::ExpectedFiniteNonNanData { context } => {
                write!(f, "Expected finite, non-NaN data ({})", context)
            }
            Self::ExpectedSetField { field, context } => {
                write!(f, "Expected field '{}' to be set ({})", field, context)
            }
        }
    }
}

impl DataProcessingError {
    pub fn append_to_context(mut self, context: &str) -> Self {
        match &mut self {
            DataProcessingError::ExpectedNonEmptyData {
                context: owned_context,
            } => match owned_context {
                Some(x) => x.push_str(context),
                None => *owned_context = Some(context.to_string()),
            },
            DataProcessingError::ExpectedFiniteNonNanData {
                context: owned_context,
            }
            | DataProcessingError::ExpectedSetField {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
        }
        self
    }
}

#[derive(Debug)]
pub enum PeakBuildingError {
    /// The operator declined the automatic removal of duplicate scan entries.
    DuplicateScanResolutionDeclined { affected_peaks: usize },
}

impl Display for PeakBuildingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateScanResolutionDeclined { affected_peaks } => write!(
                f,
                "Duplicate scan resolution declined ({} peaks with multiple data points per scan). \
                 Check whether the run should be processed as ion-mobility data.",
                affected_peaks
            ),
        }
    }
}

impl From<DataProcessingError> for AnalyteCoreError {
    fn from(e: DataProcessingError) -> Self {
        AnalyteCoreError::DataProcessingError(e)
    }
}

impl From<PeakBuildingError> for AnalyteCoreError {
    fn from(e: PeakBuildingError) -> Self {
        AnalyteCoreError::PeakBuildingError(e)
    }
}
