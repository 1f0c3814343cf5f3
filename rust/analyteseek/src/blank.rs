use crate::matching::relative_intensity_match;
use crate::models::{
    ExperimentAnalyte,
    ExperimentAnalyteId,
    IdMapping,
};
use analytecore::Tolerance;
use rayon::prelude::*;
use tracing::info;

/// Flags every sample experiment analyte whose spectrum matches a blank one.
///
/// Retention times are not compared. Flagged ids are recorded in `mapping`,
/// which makes every run-level analyte basketed into them blank as well.
/// Returns the flagged ids in increasing order.
pub fn annotate_blanks(
    samples: &mut [ExperimentAnalyte],
    blanks: &[ExperimentAnalyte],
    tolerance: &Tolerance,
    analyte_match_score: f64,
    mapping: &mut IdMapping,
) -> Vec<ExperimentAnalyteId> {
    samples.par_iter_mut().for_each(|ea| {
        ea.is_blank = blanks.iter().any(|blank| {
            relative_intensity_match(
                &ea.spectrum,
                &blank.spectrum,
                tolerance,
                analyte_match_score,
            )
        });
    });

    let flagged: Vec<ExperimentAnalyteId> = samples
        .iter()
        .filter(|ea| ea.is_blank)
        .map(|ea| ea.id)
        .collect();
    mapping.record_blanks(flagged.iter().copied());
    info!(
        "{} of {} experiment analytes match a blank",
        flagged.len(),
        samples.len()
    );
    flagged
}
