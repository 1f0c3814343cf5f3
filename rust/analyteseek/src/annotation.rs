//! Flat per-peak view of the pipeline output, and lookup of external
//! (mass, retention time) features against it.

use crate::models::{
    AnalyteId,
    AnalyteKey,
    ExperimentAnalyteId,
    IdMapping,
    ReplicateAnalyteId,
    RunAnalytes,
};
use analytecore::{
    PeakId,
    Tolerance,
};
use nohash_hasher::IntMap;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakAnnotation {
    pub sample: String,
    pub replicate: u8,
    pub peak_id: PeakId,
    pub mass: f64,
    pub retention_time: f64,
    pub analyte_id: Option<AnalyteId>,
    pub replicate_analyte_id: Option<ReplicateAnalyteId>,
    pub experiment_analyte_id: Option<ExperimentAnalyteId>,
    pub blank: bool,
}

/// How far along the pipeline an external feature made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentLevel {
    ExperimentAnalyte(ExperimentAnalyteId),
    Analyte(AnalyteId),
    /// A peak was built but joined no analyte.
    NotInAnalyte,
    NotFound,
}

impl AssignmentLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExperimentAnalyte(_) => "experiment_analyte",
            Self::Analyte(_) => "analyte",
            Self::NotInAnalyte => "dropped at peak stage",
            Self::NotFound => "not found",
        }
    }

    pub fn id(&self) -> Option<u32> {
        match self {
            Self::ExperimentAnalyte(id) | Self::Analyte(id) => Some(*id),
            Self::NotInAnalyte | Self::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalMatch {
    pub level: AssignmentLevel,
    pub blank: bool,
    /// The row the feature was assigned to.
    pub row: Option<PeakAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationTable {
    rows: Vec<PeakAnnotation>,
}

impl AnnotationTable {
    /// One row per built peak, in run then peak order.
    pub fn build(runs: &[RunAnalytes], mapping: &IdMapping) -> Self {
        let mut rows = Vec::new();
        for run in runs {
            let mut peak_to_analyte: IntMap<PeakId, AnalyteId> = IntMap::default();
            for analyte in run.analytes.iter() {
                for peak_id in analyte.peak_ids() {
                    peak_to_analyte.insert(peak_id, analyte.id);
                }
            }
            for peak in run.peaks.iter() {
                let analyte_id = peak_to_analyte.get(&peak.id).copied();
                let annotation = analyte_id
                    .map(|id| mapping.annotation(&AnalyteKey::new(run.sample.clone(), run.replicate, id)))
                    .unwrap_or_default();
                rows.push(PeakAnnotation {
                    sample: run.sample.clone(),
                    replicate: run.replicate,
                    peak_id: peak.id,
                    mass: peak.average_mass,
                    retention_time: peak.retention_time,
                    analyte_id,
                    replicate_analyte_id: annotation.replicate_analyte_id,
                    experiment_analyte_id: annotation.experiment_analyte_id,
                    blank: annotation.blank,
                });
            }
        }
        Self { rows }
    }

    pub fn from_rows(rows: Vec<PeakAnnotation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PeakAnnotation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the row of `sample`/`replicate` best explaining an external feature.
    ///
    /// Rows within tolerance of both `mass` and `retention_time` are
    /// candidates. Rows that reached an experiment analyte are preferred,
    /// then rows in an analyte, then any row. Among the preferred rows the
    /// smallest mass error wins, then the smallest retention time error,
    /// then the first row.
    pub fn lookup(
        &self,
        sample: &str,
        replicate: u8,
        mass: f64,
        retention_time: f64,
        tolerance: &Tolerance,
    ) -> ExternalMatch {
        let candidates: Vec<&PeakAnnotation> = self
            .rows
            .iter()
            .filter(|r| {
                r.sample == sample
                    && r.replicate == replicate
                    && tolerance.mass_match(r.mass, mass)
                    && tolerance.rt_match(r.retention_time, retention_time)
            })
            .collect();
        if candidates.is_empty() {
            return ExternalMatch {
                level: AssignmentLevel::NotFound,
                blank: false,
                row: None,
            };
        }

        let in_experiment: Vec<&PeakAnnotation> = candidates
            .iter()
            .copied()
            .filter(|r| r.experiment_analyte_id.is_some())
            .collect();
        let in_analyte: Vec<&PeakAnnotation> = candidates
            .iter()
            .copied()
            .filter(|r| r.analyte_id.is_some())
            .collect();
        let pool = if !in_experiment.is_empty() {
            in_experiment
        } else if !in_analyte.is_empty() {
            in_analyte
        } else {
            candidates
        };

        let key = |r: &PeakAnnotation| {
            ((r.mass - mass).abs(), (r.retention_time - retention_time).abs())
        };
        let mut best = pool[0];
        for &row in pool.iter().skip(1) {
            if key(row) < key(best) {
                best = row;
            }
        }

        let level = match (best.experiment_analyte_id, best.analyte_id) {
            (Some(ea), _) => AssignmentLevel::ExperimentAnalyte(ea),
            (None, Some(a)) => AssignmentLevel::Analyte(a),
            (None, None) => AssignmentLevel::NotInAnalyte,
        };
        ExternalMatch {
            level,
            blank: best.blank,
            row: Some(best.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        peak_id: u32,
        mass: f64,
        rt: f64,
        analyte_id: Option<u32>,
        ea: Option<u32>,
        blank: bool,
    ) -> PeakAnnotation {
        PeakAnnotation {
            sample: "S1".into(),
            replicate: 1,
            peak_id,
            mass,
            retention_time: rt,
            analyte_id,
            replicate_analyte_id: ea,
            experiment_analyte_id: ea,
            blank,
        }
    }

    #[test]
    fn test_lookup_preference_order() {
        let table = AnnotationTable::from_rows(vec![
            row(1, 200.100, 5.00, None, None, false),
            row(2, 200.105, 5.02, Some(3), None, false),
            row(3, 200.108, 5.05, Some(4), Some(9), true),
            row(4, 300.000, 5.00, Some(5), Some(10), false),
        ]);
        let tol = Tolerance::default();

        let hit = table.lookup("S1", 1, 200.1, 5.0, &tol);
        assert_eq!(hit.level, AssignmentLevel::ExperimentAnalyte(9));
        assert!(hit.blank);

        let miss = table.lookup("S1", 1, 250.0, 5.0, &tol);
        assert_eq!(miss.level, AssignmentLevel::NotFound);
        assert_eq!(miss.level.id(), None);

        let other_replicate = table.lookup("S1", 2, 200.1, 5.0, &tol);
        assert_eq!(other_replicate.level, AssignmentLevel::NotFound);
    }

    #[test]
    fn test_lookup_tie_breaks() {
        let table = AnnotationTable::from_rows(vec![
            row(1, 200.104, 5.05, Some(1), None, false),
            row(2, 200.102, 5.08, Some(2), None, false),
            row(3, 200.102, 5.01, Some(3), None, false),
            row(4, 200.100, 5.00, None, None, false),
        ]);
        let hit = table.lookup("S1", 1, 200.1, 5.0, &Tolerance::default());
        assert_eq!(hit.level, AssignmentLevel::Analyte(3));
        assert_eq!(hit.row.map(|r| r.peak_id), Some(3));
    }

    #[test]
    fn test_peak_without_analyte() {
        let table = AnnotationTable::from_rows(vec![row(1, 200.1, 5.0, None, None, false)]);
        let hit = table.lookup("S1", 1, 200.1, 5.0, &Tolerance::default());
        assert_eq!(hit.level, AssignmentLevel::NotInAnalyte);
        assert_eq!(hit.level.label(), "dropped at peak stage");
    }
}
