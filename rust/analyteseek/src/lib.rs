#![doc = include_str!("../README.md")]

pub mod analyte_building;
pub mod annotation;
pub mod basket;
pub mod blank;
pub mod data_sources;
pub mod errors;
pub mod matching;
pub mod models;
pub mod network;
pub mod parameters;
pub mod pipeline;
pub mod replicate;
pub mod utils;

pub use analyte_building::{
    AnalyteBuildingConfig,
    build_analytes,
};
pub use annotation::{
    AnnotationTable,
    AssignmentLevel,
    PeakAnnotation,
};
pub use basket::{
    BasketResult,
    Basketer,
};
pub use blank::annotate_blanks;
pub use errors::{
    AnalyteSeekError,
    Result,
};
pub use network::{
    NetworkConfig,
    SimilarityGraph,
    SimilarityNetworkBuilder,
};
pub use parameters::{
    AnalysisParameters,
    MatchingConfig,
};
pub use pipeline::{
    ExperimentResult,
    GroupInput,
    GroupKind,
    GroupResult,
    Pipeline,
    RunInput,
};
pub use replicate::ReplicateConsensusEngine;
