pub mod analyte;
pub mod experiment_analyte;
pub mod id_map;
pub mod replicate_analyte;
pub mod spectrum;

pub use analyte::{
    Analyte,
    AnalyteId,
    AnalytePeak,
    RunAnalytes,
};
pub use experiment_analyte::{
    ExperimentAnalyte,
    ExperimentAnalyteId,
    ExperimentAnalyteMassPeak,
    SpectrumContribution,
};
pub use id_map::{
    AnalyteAnnotation,
    AnalyteKey,
    IdMapping,
};
pub use replicate_analyte::{
    MassContribution,
    ReplicateAnalyte,
    ReplicateAnalyteId,
    ReplicateAnalyteRef,
    ReplicateMassPeak,
};
pub use spectrum::SpectrumPeak;
