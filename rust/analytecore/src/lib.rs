#![doc = include_str!("../README.md")]

// Re-export main structures
pub use crate::models::{
    Peak,
    PeakId,
    Record,
    Tolerance,
};
pub use crate::peak_building::{
    AutoApprove,
    ConfirmationGate,
    Decline,
    PeakBuilder,
    PeakBuildingConfig,
};

// Declare modules
pub mod errors;
pub mod models;
pub mod peak_building;
pub mod utils;

// Re-export errors
pub use crate::errors::{
    AnalyteCoreError,
    DataProcessingError,
    PeakBuildingError,
};
