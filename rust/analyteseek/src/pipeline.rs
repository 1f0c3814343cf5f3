//! Fork/join driver over the whole experiment.
//!
//! Runs are built into analytes in parallel, the runs of every sample are
//! merged in parallel, then samples are basketed in their name order. The
//! sample group is finally checked against the blank group and turned into
//! a similarity network.

use crate::analyte_building::build_analytes;
use crate::annotation::AnnotationTable;
use crate::basket::{
    BasketResult,
    Basketer,
};
use crate::blank::annotate_blanks;
use crate::errors::{
    AnalyteSeekError,
    Result,
};
use crate::models::{
    ExperimentAnalyte,
    ExperimentAnalyteId,
    IdMapping,
    ReplicateAnalyte,
    RunAnalytes,
};
use crate::network::{
    SimilarityGraph,
    SimilarityNetworkBuilder,
};
use crate::parameters::AnalysisParameters;
use crate::replicate::ReplicateConsensusEngine;
use analytecore::{
    ConfirmationGate,
    PeakBuilder,
    Record,
};
use indicatif::{
    ParallelProgressIterator,
    ProgressBar,
    ProgressStyle,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

/// Records of one run (one replicate injection of one sample).
#[derive(Debug, Clone)]
pub struct RunInput {
    pub sample: String,
    pub replicate: u8,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    Samples,
    Blanks,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Samples => write!(f, "Samples"),
            Self::Blanks => write!(f, "Blanks"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupInput {
    pub kind: GroupKind,
    /// Whether the records carry drift times.
    pub ims: bool,
    /// Number of runs every sample of the group must have.
    pub replicate_count: usize,
    pub runs: Vec<RunInput>,
}

#[derive(Debug, Clone)]
pub struct GroupResult {
    pub kind: GroupKind,
    /// Ordered by sample name, then replicate.
    pub runs: Vec<RunAnalytes>,
    /// Replicate analytes per sample, ordered by sample name.
    pub replicate_analytes: Vec<(String, Vec<ReplicateAnalyte>)>,
    pub basket: BasketResult,
}

impl GroupResult {
    pub fn experiment_analytes(&self) -> &[ExperimentAnalyte] {
        &self.basket.experiment_analytes
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentResult {
    pub samples: GroupResult,
    pub blanks: Option<GroupResult>,
    pub id_mapping: IdMapping,
    /// Sample experiment analytes matching a blank one.
    pub blank_experiment_analytes: Vec<ExperimentAnalyteId>,
    pub network: SimilarityGraph,
}

impl ExperimentResult {
    pub fn annotation_table(&self) -> AnnotationTable {
        AnnotationTable::build(&self.samples.runs, &self.id_mapping)
    }
}

pub struct Pipeline<'a, G: ConfirmationGate + ?Sized> {
    pub params: &'a AnalysisParameters,
    pub gate: &'a G,
    /// Draw a progress bar over the runs of a group.
    pub show_progress: bool,
}

impl<'a, G: ConfirmationGate + ?Sized> Pipeline<'a, G> {
    pub fn new(params: &'a AnalysisParameters, gate: &'a G) -> Self {
        Self {
            params,
            gate,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn process_run(&self, run: RunInput, ims: bool) -> Result<RunAnalytes> {
        let peaks = PeakBuilder::new(
            &self.params.tolerance,
            &self.params.peak_building,
            self.gate,
        )
        .build(run.records, ims)?;
        let analytes = build_analytes(
            &peaks,
            &self.params.tolerance,
            &self.params.analyte_building,
        )?;
        info!(
            "Run {} R{}: {} peaks, {} analytes",
            run.sample,
            run.replicate,
            peaks.len(),
            analytes.len()
        );
        Ok(RunAnalytes {
            sample: run.sample,
            replicate: run.replicate,
            peaks,
            analytes,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        match ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        ) {
            Ok(style) => bar.with_style(style),
            Err(_) => bar,
        }
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn process_group(&self, group: GroupInput) -> Result<GroupResult> {
        let st = Instant::now();
        let kind = group.kind;
        let ims = group.ims;
        let num_runs = group.runs.len();

        let bar = self.progress_bar(num_runs);
        let built: Vec<RunAnalytes> = group
            .runs
            .into_par_iter()
            .progress_with(bar)
            .map(|run| self.process_run(run, ims))
            .collect::<Result<Vec<_>>>()?;
        info!("{}: built {} runs in {:?}", kind, num_runs, st.elapsed());

        let mut by_sample: BTreeMap<String, Vec<RunAnalytes>> = BTreeMap::new();
        for run in built {
            by_sample.entry(run.sample.clone()).or_default().push(run);
        }
        for (sample, runs) in by_sample.iter_mut() {
            if runs.len() != group.replicate_count {
                return Err(AnalyteSeekError::ReplicateCountMismatch {
                    sample: sample.clone(),
                    expected: group.replicate_count,
                    found: runs.len(),
                });
            }
            runs.sort_by_key(|r| r.replicate);
        }

        let st = Instant::now();
        let engine = ReplicateConsensusEngine::new(
            &self.params.tolerance,
            self.params.matching.analyte_match_score,
        );
        let samples: Vec<(String, Vec<RunAnalytes>)> = by_sample.into_iter().collect();
        let replicate_analytes: Vec<(String, Vec<ReplicateAnalyte>)> = samples
            .par_iter()
            .map(|(sample, runs)| Ok((sample.clone(), engine.build(sample, runs)?)))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "{}: replicate consensus over {} samples took {:?}",
            kind,
            samples.len(),
            st.elapsed()
        );

        let ra_lists: Vec<Vec<ReplicateAnalyte>> = replicate_analytes
            .iter()
            .map(|(_, ras)| ras.clone())
            .collect();
        let basket = Basketer::new(
            &self.params.tolerance,
            self.params.matching.analyte_match_score,
            self.params.matching.minimum_experiment_analyte_mass_peak_count,
        )
        .basket(&kind.to_string(), &ra_lists)?;

        Ok(GroupResult {
            kind,
            runs: samples.into_iter().flat_map(|(_, runs)| runs).collect(),
            replicate_analytes,
            basket,
        })
    }

    /// Runs both groups, flags blank analytes and builds the similarity network.
    pub fn run_experiment(
        &self,
        samples: GroupInput,
        blanks: Option<GroupInput>,
    ) -> Result<ExperimentResult> {
        let st = Instant::now();
        let mut samples = self.process_group(samples)?;
        let blanks = blanks.map(|b| self.process_group(b)).transpose()?;

        let mut id_mapping = IdMapping::default();
        for (_, ras) in samples.replicate_analytes.iter() {
            id_mapping.record_replicate_analytes(ras);
        }
        samples.basket.record_into(&mut id_mapping);

        let blank_experiment_analytes = match &blanks {
            Some(blank_group) => annotate_blanks(
                &mut samples.basket.experiment_analytes,
                blank_group.experiment_analytes(),
                &self.params.tolerance,
                self.params.matching.analyte_match_score,
                &mut id_mapping,
            ),
            None => Vec::new(),
        };

        let network =
            SimilarityNetworkBuilder::new(&self.params.tolerance, &self.params.network)
                .build(samples.experiment_analytes());

        info!("Experiment processed in {:?}", st.elapsed());
        Ok(ExperimentResult {
            samples,
            blanks,
            id_mapping,
            blank_experiment_analytes,
            network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytecore::AutoApprove;

    fn elution(mass: f64, scale: f64) -> Vec<Record> {
        (10..=30)
            .map(|scan| {
                let d = scan as f64 - 20.0;
                let intensity = (scale * (-d * d / 18.0).exp()).round() as u64 + 1;
                Record::new(scan, scan as f64 * 0.02, mass, intensity)
            })
            .collect()
    }

    fn run(sample: &str, replicate: u8) -> RunInput {
        let mut records = elution(200.1000, 100_000.0);
        records.extend(elution(201.1034, 20_000.0));
        RunInput {
            sample: sample.into(),
            replicate,
            records,
        }
    }

    #[test]
    fn test_replicate_count_is_enforced() {
        let params = AnalysisParameters::default();
        let pipeline = Pipeline::new(&params, &AutoApprove);
        let group = GroupInput {
            kind: GroupKind::Samples,
            ims: false,
            replicate_count: 2,
            runs: vec![run("A", 1), run("A", 2), run("B", 1)],
        };
        let out = pipeline.process_group(group);
        assert!(matches!(
            out,
            Err(AnalyteSeekError::ReplicateCountMismatch { ref sample, expected: 2, found: 1 })
                if sample == "B"
        ));
    }

    #[test]
    fn test_empty_group_cannot_be_basketed() {
        let params = AnalysisParameters::default();
        let pipeline = Pipeline::new(&params, &AutoApprove);
        let group = GroupInput {
            kind: GroupKind::Blanks,
            ims: false,
            replicate_count: 1,
            runs: vec![],
        };
        assert!(matches!(
            pipeline.process_group(group),
            Err(AnalyteSeekError::NoSamples { .. })
        ));
    }

    #[test]
    fn test_process_run() {
        let params = AnalysisParameters::default();
        let pipeline = Pipeline::new(&params, &AutoApprove);
        let out = pipeline.process_run(run("A", 3), false).unwrap();
        assert_eq!(out.replicate, 3);
        assert_eq!(out.peaks.len(), 2);
        assert_eq!(out.analytes.len(), 1);
        assert_eq!(out.analytes[0].max_peak_mass, 200.1);
    }
}
