//! Basketing: matching replicate analytes across the samples of a group.

use crate::errors::{
    AnalyteSeekError,
    Result,
};
use crate::matching::relative_intensity_match;
use crate::models::spectrum::rescale_to_max;
use crate::models::{
    ExperimentAnalyte,
    ExperimentAnalyteId,
    ExperimentAnalyteMassPeak,
    IdMapping,
    ReplicateAnalyte,
    ReplicateAnalyteRef,
    SpectrumContribution,
};
use analytecore::Tolerance;
use analytecore::utils::streaming_calculators::RunningMean;
use analytecore::utils::{
    round_to,
    running_average_update,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{
    debug,
    error,
    info,
};

#[derive(Debug, Clone)]
pub struct BasketResult {
    pub experiment_analytes: Vec<ExperimentAnalyte>,
    /// Experiment analyte of every replicate analyte of the group.
    pub assignments: BTreeMap<ReplicateAnalyteRef, ExperimentAnalyteId>,
}

impl BasketResult {
    pub fn record_into(&self, mapping: &mut IdMapping) {
        for (member, ea) in self.assignments.iter() {
            mapping.record_experiment_analyte(member.clone(), *ea);
        }
    }
}

pub struct Basketer<'a> {
    pub tolerance: &'a Tolerance,
    pub analyte_match_score: f64,
    /// Consensus masses seen in fewer replicate analytes are dropped.
    pub minimum_mass_peak_count: usize,
}

impl<'a> Basketer<'a> {
    pub fn new(
        tolerance: &'a Tolerance,
        analyte_match_score: f64,
        minimum_mass_peak_count: usize,
    ) -> Self {
        Self {
            tolerance,
            analyte_match_score,
            minimum_mass_peak_count,
        }
    }

    /// Groups the replicate analytes of `samples` into experiment analytes.
    ///
    /// Samples are visited in the given order and the replicate analytes of
    /// each sample by decreasing max intensity. Every replicate analyte not
    /// yet in a basket opens one and takes, from each later sample, the
    /// first free replicate analyte with a matching retention time and
    /// spectrum. The first match wins even when a better one follows.
    /// Every replicate analyte ends up in exactly one basket.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn basket(&self, group: &str, samples: &[Vec<ReplicateAnalyte>]) -> Result<BasketResult> {
        if samples.is_empty() {
            error!("No sample analyte data provided for '{}', basketing failed", group);
            return Err(AnalyteSeekError::NoSamples {
                group: group.to_string(),
            });
        }
        let st = Instant::now();

        let sorted: Vec<Vec<&ReplicateAnalyte>> = samples
            .iter()
            .map(|s| {
                let mut v: Vec<&ReplicateAnalyte> = s.iter().collect();
                v.sort_by(|a, b| b.max_intensity.cmp(&a.max_intensity));
                v
            })
            .collect();
        let mut basketed: Vec<Vec<bool>> = sorted.iter().map(|s| vec![false; s.len()]).collect();
        let mut baskets: Vec<Vec<&ReplicateAnalyte>> = Vec::new();

        let last = sorted.len() - 1;
        for i in 0..last {
            for (s, seed) in sorted[i].iter().enumerate() {
                if basketed[i][s] {
                    continue;
                }
                basketed[i][s] = true;
                let mut members = vec![*seed];
                for k in (i + 1)..sorted.len() {
                    let hit = sorted[k]
                        .par_iter()
                        .zip(basketed[k].par_iter())
                        .position_first(|(candidate, done)| {
                            !*done
                                && self
                                    .tolerance
                                    .rt_match(seed.retention_time, candidate.retention_time)
                                && relative_intensity_match(
                                    &seed.spectrum,
                                    &candidate.spectrum,
                                    self.tolerance,
                                    self.analyte_match_score,
                                )
                        });
                    if let Some(pos) = hit {
                        basketed[k][pos] = true;
                        members.push(sorted[k][pos]);
                    }
                }
                baskets.push(members);
            }
        }
        for (s, ra) in sorted[last].iter().enumerate() {
            if !basketed[last][s] {
                basketed[last][s] = true;
                baskets.push(vec![*ra]);
            }
        }

        let mut result = BasketResult {
            experiment_analytes: Vec::with_capacity(baskets.len()),
            assignments: BTreeMap::new(),
        };
        for (i, members) in baskets.into_iter().enumerate() {
            let id = i as ExperimentAnalyteId + 1;
            for m in members.iter() {
                result.assignments.insert(m.reference(), id);
            }
            let ea = self.experiment_analyte(id, &members);
            debug!(
                "Experiment analyte {} from {} replicate analytes, {} masses",
                id,
                members.len(),
                ea.spectrum.len()
            );
            result.experiment_analytes.push(ea);
        }

        info!(
            "Basketing '{}': {} experiment analytes from {} samples in {:?}",
            group,
            result.experiment_analytes.len(),
            samples.len(),
            st.elapsed()
        );
        Ok(result)
    }

    fn experiment_analyte(&self, id: ExperimentAnalyteId, members: &[&ReplicateAnalyte]) -> ExperimentAnalyte {
        let mut rt = RunningMean::default();
        let mut spectrum: Vec<ExperimentAnalyteMassPeak> = Vec::new();
        for ra in members.iter() {
            rt.add(ra.retention_time);
            for peak in ra.spectrum.iter() {
                let contribution = SpectrumContribution {
                    sample: ra.sample.clone(),
                    peak: peak.clone(),
                };
                match spectrum
                    .iter_mut()
                    .find(|acc| self.tolerance.mass_match(acc.average_mass, peak.average_mass))
                {
                    Some(acc) => {
                        let count = acc.contributions.len();
                        acc.average_mass =
                            running_average_update(acc.average_mass, count, peak.average_mass, 4);
                        acc.relative_intensity = running_average_update(
                            acc.relative_intensity,
                            count,
                            peak.relative_intensity,
                            2,
                        );
                        acc.contributions.push(contribution);
                    }
                    None => spectrum.push(ExperimentAnalyteMassPeak {
                        average_mass: peak.average_mass,
                        relative_intensity: peak.relative_intensity,
                        contributions: vec![contribution],
                    }),
                }
            }
        }
        spectrum.retain(|p| p.contributions.len() >= self.minimum_mass_peak_count);
        rescale_to_max(&mut spectrum);

        ExperimentAnalyte {
            id,
            members: members.iter().map(|m| m.reference()).collect(),
            retention_time: round_to(rt.mean().unwrap_or(0.0), 3),
            spectrum,
            is_blank: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReplicateMassPeak;

    fn ra(sample: &str, id: u32, rt: f64, intensity: u64, spectrum: &[(f64, f64)]) -> ReplicateAnalyte {
        ReplicateAnalyte {
            id,
            sample: sample.to_string(),
            members: vec![(1, id)],
            max_peak_mass: spectrum[0].0,
            max_intensity: intensity,
            retention_time: rt,
            spectrum: spectrum
                .iter()
                .map(|(m, r)| ReplicateMassPeak {
                    contributions: vec![],
                    average_mass: *m,
                    average_intensity: intensity,
                    relative_intensity: *r,
                })
                .collect(),
        }
    }

    #[test]
    fn test_no_samples_is_an_error() {
        let tol = Tolerance::default();
        let out = Basketer::new(&tol, 0.6, 1).basket("Samples", &[]);
        assert!(matches!(out, Err(AnalyteSeekError::NoSamples { .. })));
    }

    #[test]
    fn test_single_sample_gives_singletons() {
        let tol = Tolerance::default();
        let samples = vec![vec![
            ra("A", 1, 1.0, 100, &[(200.1, 100.0)]),
            ra("A", 2, 1.0, 500, &[(200.1, 100.0)]),
        ]];
        let out = Basketer::new(&tol, 0.6, 1).basket("Samples", &samples).unwrap();
        assert_eq!(out.experiment_analytes.len(), 2);
        // most intense first
        assert_eq!(out.experiment_analytes[0].members[0].replicate_analyte_id, 2);
        assert_eq!(out.assignments.len(), 2);
    }

    #[test]
    fn test_baskets_form_a_partition() {
        let tol = Tolerance::default();
        let samples = vec![
            vec![
                ra("A", 1, 2.0, 1000, &[(200.1, 100.0), (201.1, 30.0)]),
                ra("A", 2, 5.0, 800, &[(300.0, 100.0)]),
            ],
            vec![
                ra("B", 1, 2.05, 900, &[(200.102, 100.0), (201.1, 20.0)]),
                ra("B", 2, 8.0, 700, &[(410.0, 100.0)]),
            ],
            vec![
                ra("C", 1, 5.02, 600, &[(300.004, 100.0)]),
                ra("C", 2, 2.01, 500, &[(200.1, 100.0), (201.1, 40.0)]),
            ],
        ];
        let out = Basketer::new(&tol, 0.6, 1).basket("Samples", &samples).unwrap();

        let total: usize = samples.iter().map(|s| s.len()).sum();
        assert_eq!(out.assignments.len(), total);
        let members: usize = out.experiment_analytes.iter().map(|e| e.members.len()).sum();
        assert_eq!(members, total);

        assert_eq!(out.experiment_analytes.len(), 3);
        let first = &out.experiment_analytes[0];
        assert_eq!(first.members.len(), 3);
        assert_eq!(first.retention_time, 2.02);
        assert_eq!(first.spectrum.len(), 2);
        assert_eq!(first.spectrum[0].relative_intensity, 100.0);
        assert_eq!(first.spectrum[1].relative_intensity, 30.0);
        assert_eq!(first.spectrum[0].contributions.len(), 3);

        let b2 = ReplicateAnalyteRef {
            sample: "B".into(),
            replicate_analyte_id: 2,
        };
        assert_eq!(out.assignments[&b2], 3);
    }

    #[test]
    fn test_first_match_wins() {
        let tol = Tolerance::default();
        let samples = vec![
            vec![ra("A", 1, 2.0, 1000, &[(200.1, 100.0), (250.0, 50.0)])],
            // weaker match comes first in intensity order
            vec![
                ra("B", 1, 2.0, 900, &[(200.1, 100.0), (260.0, 40.0)]),
                ra("B", 2, 2.0, 800, &[(200.1, 100.0), (250.0, 50.0)]),
            ],
        ];
        let out = Basketer::new(&tol, 0.6, 1).basket("Samples", &samples).unwrap();
        assert_eq!(out.experiment_analytes.len(), 2);
        let b1 = ReplicateAnalyteRef {
            sample: "B".into(),
            replicate_analyte_id: 1,
        };
        assert_eq!(out.assignments[&b1], 1);
    }

    #[test]
    fn test_minimum_mass_peak_count() {
        let tol = Tolerance::default();
        let samples = vec![
            vec![ra("A", 1, 2.0, 1000, &[(200.1, 100.0), (201.1, 10.0)])],
            vec![ra("B", 1, 2.0, 1000, &[(200.1, 100.0), (450.0, 5.0)])],
        ];
        let out = Basketer::new(&tol, 0.6, 2).basket("Samples", &samples).unwrap();
        assert_eq!(out.experiment_analytes.len(), 1);
        let spectrum = &out.experiment_analytes[0].spectrum;
        assert_eq!(spectrum.len(), 1);
        assert_eq!(spectrum[0].average_mass, 200.1);
    }
}
