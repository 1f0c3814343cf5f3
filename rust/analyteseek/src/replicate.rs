//! Consensus of analytes across the replicate runs of one sample.

use crate::errors::{
    InvariantViolation,
    Result,
};
use crate::matching::replicate_match;
use crate::models::spectrum::rescale_to_max;
use crate::models::{
    Analyte,
    AnalyteId,
    MassContribution,
    ReplicateAnalyte,
    ReplicateMassPeak,
    RunAnalytes,
};
use analytecore::utils::round_to;
use analytecore::{
    Peak,
    PeakId,
    Record,
    Tolerance,
};
use nohash_hasher::IntMap;
use std::collections::{
    BTreeSet,
    HashSet,
};
use tracing::{
    debug,
    info,
    warn,
};

/// Matches analytes across the runs of one sample and builds their consensus spectra.
///
/// `runs` must all belong to `sample` and be ordered by replicate number.
pub struct ReplicateConsensusEngine<'a> {
    pub tolerance: &'a Tolerance,
    pub analyte_match_score: f64,
}

struct RunIndex<'r> {
    run: &'r RunAnalytes,
    peaks: IntMap<PeakId, &'r Peak>,
    by_intensity: Vec<&'r Analyte>,
}

impl<'r> RunIndex<'r> {
    fn new(run: &'r RunAnalytes) -> Self {
        let peaks = run.peaks.iter().map(|p| (p.id, p)).collect();
        let mut by_intensity: Vec<&Analyte> = run.analytes.iter().collect();
        by_intensity.sort_by(|a, b| b.max_intensity.cmp(&a.max_intensity));
        Self {
            run,
            peaks,
            by_intensity,
        }
    }

    fn analyte(&self, id: AnalyteId) -> Result<&'r Analyte> {
        self.run.analyte(id).ok_or_else(|| {
            InvariantViolation::MissingAnalyte {
                sample: self.run.sample.clone(),
                replicate: self.run.replicate,
                analyte_id: id,
            }
            .into()
        })
    }

    fn peak(&self, id: PeakId) -> Result<&'r Peak> {
        self.peaks.get(&id).copied().ok_or_else(|| {
            InvariantViolation::MissingPeak {
                peak_id: id,
                context: format!(
                    "sample {} replicate {}",
                    self.run.sample, self.run.replicate
                ),
            }
            .into()
        })
    }
}

impl<'a> ReplicateConsensusEngine<'a> {
    pub fn new(tolerance: &'a Tolerance, analyte_match_score: f64) -> Self {
        Self {
            tolerance,
            analyte_match_score,
        }
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn build(&self, sample: &str, runs: &[RunAnalytes]) -> Result<Vec<ReplicateAnalyte>> {
        let indices: Vec<RunIndex> = runs.iter().map(RunIndex::new).collect();
        let groups = self.match_analytes(&indices);

        let mut out = Vec::with_capacity(groups.len());
        for (id, members) in groups {
            out.push(self.consensus(sample, id, members, &indices)?);
        }
        info!(
            "Sample {}: {} replicate analytes from {} runs",
            sample,
            out.len(),
            runs.len()
        );
        Ok(out)
    }

    /// Greedy matching in replicate order, then intensity order.
    ///
    /// An analyte of an earlier run collects every unmatched analyte of the
    /// later runs that it matches. Analytes matching nothing are dropped
    /// when there is more than one run; with a single run every analyte is
    /// its own group and keeps its id.
    fn match_analytes(&self, runs: &[RunIndex]) -> Vec<(u32, Vec<(usize, AnalyteId)>)> {
        if runs.len() == 1 {
            return runs[0]
                .run
                .analytes
                .iter()
                .map(|a| (a.id, vec![(0, a.id)]))
                .collect();
        }

        let mut matched: HashSet<(usize, AnalyteId)> = HashSet::new();
        let mut groups = Vec::new();
        let mut next_id = 1;
        for (j, run) in runs.iter().enumerate().take(runs.len().saturating_sub(1)) {
            for a in run.by_intensity.iter() {
                if matched.contains(&(j, a.id)) {
                    continue;
                }
                let mut members = vec![(j, a.id)];
                for (k, later) in runs.iter().enumerate().skip(j + 1) {
                    for b in later.by_intensity.iter() {
                        if matched.contains(&(k, b.id)) {
                            continue;
                        }
                        if replicate_match(a, b, self.tolerance, self.analyte_match_score) {
                            matched.insert((k, b.id));
                            members.push((k, b.id));
                        }
                    }
                }
                if members.len() > 1 {
                    matched.insert((j, a.id));
                    groups.push((next_id, members));
                    next_id += 1;
                }
            }
        }
        debug!("Replicate matching kept {} groups", groups.len());
        groups
    }

    fn consensus(
        &self,
        sample: &str,
        id: u32,
        members: Vec<(usize, AnalyteId)>,
        runs: &[RunIndex],
    ) -> Result<ReplicateAnalyte> {
        let mut analytes: Vec<(usize, &Analyte)> = Vec::with_capacity(members.len());
        for (run_idx, analyte_id) in members.iter() {
            analytes.push((*run_idx, runs[*run_idx].analyte(*analyte_id)?));
        }

        let run_order: BTreeSet<usize> = analytes.iter().map(|(r, _)| *r).collect();
        let mut contributions = Vec::new();
        for run_idx in run_order {
            let index = &runs[run_idx];
            let mut records: Vec<&Record> = Vec::new();
            for (_, analyte) in analytes.iter().filter(|(r, _)| *r == run_idx) {
                for peak_id in analyte.peak_ids() {
                    records.extend(index.peak(peak_id)?.records.iter());
                }
            }
            contributions.extend(apex_scan_masses(&records, index.run.replicate));
        }

        let mut spectrum = align_contributions(contributions, self.tolerance, runs.len() > 1);
        rescale_to_max(&mut spectrum);

        let rt_sum: f64 = analytes.iter().map(|(_, a)| a.retention_time).sum();
        let retention_time = round_to(rt_sum / analytes.len() as f64, 2);

        let (max_peak_mass, max_intensity) = match representative(&spectrum) {
            Some(x) => x,
            None => {
                warn!(
                    "Replicate analyte {} of sample {} has an empty consensus spectrum",
                    id, sample
                );
                let apex = analytes
                    .iter()
                    .map(|(_, a)| *a)
                    .fold(analytes[0].1, |best, a| {
                        if a.max_intensity > best.max_intensity { a } else { best }
                    });
                (apex.max_peak_mass, apex.max_intensity)
            }
        };

        Ok(ReplicateAnalyte {
            id,
            sample: sample.to_string(),
            members: analytes
                .iter()
                .map(|(r, a)| (runs[*r].run.replicate, a.id))
                .collect(),
            max_peak_mass,
            max_intensity,
            retention_time,
            spectrum,
        })
    }
}

/// Masses seen at the scan holding the largest intensity of `records`.
///
/// The first record with the largest intensity decides the scan. Relative
/// intensities are percent of that largest intensity.
fn apex_scan_masses(records: &[&Record], replicate: u8) -> Vec<MassContribution> {
    let Some(apex) = records
        .iter()
        .fold(None, |acc: Option<&Record>, r| match acc {
            Some(best) if best.intensity >= r.intensity => Some(best),
            _ => Some(r),
        })
    else {
        return Vec::new();
    };
    if apex.intensity == 0 {
        return Vec::new();
    }
    let max = apex.intensity as f64;
    records
        .iter()
        .filter(|r| r.scan == apex.scan)
        .map(|r| MassContribution {
            mass: round_to(r.mass, 4),
            intensity: r.intensity,
            relative_intensity: round_to(r.intensity as f64 / max * 100.0, 2),
            replicate,
        })
        .collect()
}

/// Groups contributions by nearest mass and averages every group.
///
/// Each contribution joins the group whose first mass is closest, if that
/// is within tolerance; otherwise it opens a new group. With
/// `require_multiple_replicates`, only groups seen in at least two
/// replicates are kept.
fn align_contributions(
    contributions: Vec<MassContribution>,
    tolerance: &Tolerance,
    require_multiple_replicates: bool,
) -> Vec<ReplicateMassPeak> {
    let mut groups: Vec<Vec<MassContribution>> = Vec::new();
    for c in contributions {
        let mut nearest: Option<(usize, f64)> = None;
        for (i, g) in groups.iter().enumerate() {
            let err = (g[0].mass - c.mass).abs();
            if nearest.is_none_or(|(_, best)| err < best) {
                nearest = Some((i, err));
            }
        }
        match nearest {
            Some((i, _)) if tolerance.mass_match(groups[i][0].mass, c.mass) => groups[i].push(c),
            _ => groups.push(vec![c]),
        }
    }

    groups
        .into_iter()
        .filter_map(|group| {
            if require_multiple_replicates {
                let replicates: BTreeSet<u8> = group.iter().map(|c| c.replicate).collect();
                if replicates.len() < 2 {
                    return None;
                }
                let n = group.len() as f64;
                let mass = group.iter().map(|c| c.mass).sum::<f64>() / n;
                let intensity = group.iter().map(|c| c.intensity as f64).sum::<f64>() / n;
                let rel = group.iter().map(|c| c.relative_intensity).sum::<f64>() / n;
                Some(ReplicateMassPeak {
                    average_mass: round_to(mass, 4),
                    average_intensity: intensity as u64,
                    relative_intensity: round_to(rel, 1),
                    contributions: group,
                })
            } else {
                let first = group[0];
                Some(ReplicateMassPeak {
                    average_mass: first.mass,
                    average_intensity: first.intensity,
                    relative_intensity: first.relative_intensity,
                    contributions: group,
                })
            }
        })
        .collect()
}

/// Mass of the first tallest peak and the largest average intensity.
fn representative(spectrum: &[ReplicateMassPeak]) -> Option<(f64, u64)> {
    let first = spectrum.first()?;
    let mut tallest = first;
    for p in spectrum.iter().skip(1) {
        if p.relative_intensity > tallest.relative_intensity {
            tallest = p;
        }
    }
    let max_intensity = spectrum
        .iter()
        .map(|p| p.average_intensity)
        .max()
        .unwrap_or(0);
    Some((tallest.average_mass, max_intensity))
}
