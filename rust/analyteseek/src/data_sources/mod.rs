pub mod discovery;
pub mod peak_list;
pub mod run_file;

pub use discovery::{
    RunFile,
    discover_runs,
    validate_replicates,
};
pub use peak_list::{
    AnnotatedFeature,
    ExternalFeature,
    annotate_features,
    read_peak_list,
    write_annotated_peak_list,
};
pub use run_file::read_run_file;
