use super::analyte::AnalyteId;
use super::experiment_analyte::ExperimentAnalyteId;
use super::replicate_analyte::{
    ReplicateAnalyte,
    ReplicateAnalyteId,
    ReplicateAnalyteRef,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::{
    BTreeMap,
    BTreeSet,
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnalyteKey {
    pub sample: String,
    pub replicate: u8,
    pub analyte_id: AnalyteId,
}

impl AnalyteKey {
    pub fn new(sample: impl Into<String>, replicate: u8, analyte_id: AnalyteId) -> Self {
        Self {
            sample: sample.into(),
            replicate,
            analyte_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalyteAnnotation {
    pub replicate_analyte_id: Option<ReplicateAnalyteId>,
    pub experiment_analyte_id: Option<ExperimentAnalyteId>,
    pub blank: bool,
}

/// Cross references between the run, sample and experiment levels.
///
/// Each stage writes only its own map: replicate consensus fills
/// `analyte_to_replicate`, basketing fills `replicate_to_experiment`, blank
/// annotation fills `blank_experiment_analytes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMapping {
    analyte_to_replicate: BTreeMap<AnalyteKey, ReplicateAnalyteId>,
    replicate_to_experiment: BTreeMap<ReplicateAnalyteRef, ExperimentAnalyteId>,
    blank_experiment_analytes: BTreeSet<ExperimentAnalyteId>,
}

impl IdMapping {
    pub fn record_replicate_analytes(&mut self, replicate_analytes: &[ReplicateAnalyte]) {
        for ra in replicate_analytes {
            for (replicate, analyte_id) in ra.members.iter() {
                self.analyte_to_replicate.insert(
                    AnalyteKey::new(ra.sample.clone(), *replicate, *analyte_id),
                    ra.id,
                );
            }
        }
    }

    pub fn record_experiment_analyte(
        &mut self,
        member: ReplicateAnalyteRef,
        experiment_analyte_id: ExperimentAnalyteId,
    ) {
        self.replicate_to_experiment
            .insert(member, experiment_analyte_id);
    }

    pub fn record_blanks(&mut self, blanks: impl IntoIterator<Item = ExperimentAnalyteId>) {
        self.blank_experiment_analytes.extend(blanks);
    }

    pub fn replicate_analyte_id(&self, key: &AnalyteKey) -> Option<ReplicateAnalyteId> {
        self.analyte_to_replicate.get(key).copied()
    }

    pub fn experiment_analyte_id(&self, key: &AnalyteKey) -> Option<ExperimentAnalyteId> {
        let ra = self.replicate_analyte_id(key)?;
        self.replicate_to_experiment
            .get(&ReplicateAnalyteRef {
                sample: key.sample.clone(),
                replicate_analyte_id: ra,
            })
            .copied()
    }

    pub fn is_blank_experiment_analyte(&self, id: ExperimentAnalyteId) -> bool {
        self.blank_experiment_analytes.contains(&id)
    }

    pub fn annotation(&self, key: &AnalyteKey) -> AnalyteAnnotation {
        let replicate_analyte_id = self.replicate_analyte_id(key);
        let experiment_analyte_id = self.experiment_analyte_id(key);
        AnalyteAnnotation {
            replicate_analyte_id,
            experiment_analyte_id,
            blank: experiment_analyte_id.is_some_and(|id| self.is_blank_experiment_analyte(id)),
        }
    }

    pub fn blank_experiment_analytes(&self) -> &BTreeSet<ExperimentAnalyteId> {
        &self.blank_experiment_analytes
    }
}
