//! Mass and scan based segmentation stages.

use super::table::PeakTable;
use crate::errors::DataProcessingError;
use crate::models::record::{
    mean_mass,
    sort_by_scan,
};
use crate::models::{
    PeakId,
    Record,
    Tolerance,
};
use crate::utils::round_to;
use nohash_hasher::BuildNoHashHasher;
use std::collections::{
    BTreeMap,
    HashMap,
};
use tracing::debug;

type ScanMap<V> = HashMap<u32, V, BuildNoHashHasher<u32>>;

/// Greedy 1-D clustering on mass.
///
/// Records are sorted by mass and a new peak starts whenever the gap to the
/// previous mass exceeds the mass tolerance. Ids start at 1.
pub fn mass_bin(mut records: Vec<Record>, tolerance: &Tolerance) -> PeakTable {
    records.sort_by(|a, b| a.mass.total_cmp(&b.mass));
    let mut groups: BTreeMap<PeakId, Vec<Record>> = BTreeMap::new();
    let mut previous_mass = 0.0;
    let mut current_id: PeakId = 0;
    for record in records {
        if record.mass - previous_mass > tolerance.mass_da {
            current_id += 1;
        }
        previous_mass = record.mass;
        groups.entry(current_id).or_default().push(record);
    }
    PeakTable::from_groups(groups)
}

/// Splits peaks whose mass spread exceeds twice the tolerance.
///
/// Records more than one tolerance below (or above) the peak mean move into
/// a new peak each. Repeats until no peak is split, dropping small peaks
/// after every pass.
pub fn mass_range_check(table: &mut PeakTable, tolerance: &Tolerance, min_records: usize) {
    let tol = tolerance.mass_da;
    let mut passes = 0;
    loop {
        let mut splits = 0;
        for id in table.ids() {
            let Some(records) = table.get(id) else {
                continue;
            };
            let (lo, hi) = records
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                    (lo.min(r.mass), hi.max(r.mass))
                });
            if hi - lo <= 2.0 * tol {
                continue;
            }
            let mean = mean_mass(records);
            if table.split_off(id, |r| r.mass + tol < mean).is_some() {
                splits += 1;
            }
            if table.split_off(id, |r| r.mass - tol > mean).is_some() {
                splits += 1;
            }
        }
        table.remove_small(min_records);
        passes += 1;
        if splits == 0 {
            break;
        }
        debug!("Mass range check pass {} split {} peaks", passes, splits);
    }
}

fn has_duplicate_scans(records: &[Record]) -> bool {
    let mut seen: ScanMap<()> = ScanMap::default();
    records.iter().any(|r| seen.insert(r.scan, ()).is_some())
}

/// Ids of the peaks holding more than one record for some scan.
pub fn peaks_with_duplicate_scans(table: &PeakTable) -> Vec<PeakId> {
    table
        .iter()
        .filter(|(_, records)| has_duplicate_scans(records))
        .map(|(id, _)| id)
        .collect()
}

/// Keeps, for every duplicated scan of a peak, the record closest in mass to
/// the peak mean (the first one on ties).
pub fn resolve_scan_duplicates(table: &mut PeakTable, ids: &[PeakId]) {
    for id in ids {
        let Some(records) = table.get_mut(*id) else {
            continue;
        };
        let mean = mean_mass(records);
        let mut best: ScanMap<(usize, f64)> = ScanMap::default();
        for (i, r) in records.iter().enumerate() {
            let diff = (r.mass - mean).abs();
            best.entry(r.scan)
                .and_modify(|e| {
                    if diff < e.1 {
                        *e = (i, diff);
                    }
                })
                .or_insert((i, diff));
        }
        let before = records.len();
        let mut i = 0;
        records.retain(|r| {
            let keep = best.get(&r.scan).is_some_and(|(b, _)| *b == i);
            i += 1;
            keep
        });
        debug!(
            "Peak {} dropped {} duplicate scan entries",
            id,
            before - records.len()
        );
    }
}

/// Drops peaks without a 13C partner peak at any allowed charge state.
pub fn isotope_filter(table: &mut PeakTable, tolerance: &Tolerance) {
    let averages: Vec<(PeakId, f64)> = table
        .iter()
        .map(|(id, records)| (id, round_to(mean_mass(records), 4)))
        .collect();
    let masses: Vec<f64> = averages.iter().map(|(_, m)| *m).collect();
    let keep: Vec<PeakId> = averages
        .iter()
        .filter(|(_, m)| tolerance.has_isotope_partner(*m, &masses))
        .map(|(id, _)| *id)
        .collect();
    table.retain(|id, _| keep.binary_search(&id).is_ok());
}

/// Splits peaks wherever consecutive scans are further apart than `gap_size`.
pub fn scan_split(table: &mut PeakTable, gap_size: u32, min_records: usize) {
    for id in table.ids() {
        let Some(mut records) = table.remove(id) else {
            continue;
        };
        sort_by_scan(&mut records);
        let mut runs: Vec<Vec<Record>> = Vec::new();
        let mut current: Vec<Record> = Vec::new();
        for r in records {
            if let Some(last) = current.last() {
                if r.scan - last.scan > gap_size {
                    runs.push(std::mem::take(&mut current));
                }
            }
            current.push(r);
        }
        runs.push(current);

        let mut runs = runs.into_iter();
        if let Some(first) = runs.next() {
            table.restore(id, first);
        }
        for run in runs {
            table.insert_new(run);
        }
    }
    table.remove_small(min_records);
}

/// Splits peaks holding several drift-separated species in the same scans.
///
/// Fails if any record lacks a drift time.
pub fn drift_split(
    table: &mut PeakTable,
    tolerance: &Tolerance,
    min_records: usize,
) -> Result<(), DataProcessingError> {
    for (id, records) in table.iter() {
        for r in records {
            r.drift()
                .map_err(|e| e.append_to_context(&format!(", peak {}", id)))?;
        }
    }

    loop {
        let mut duplicated = 0;
        for id in table.ids() {
            let Some(records) = table.get_mut(id) else {
                continue;
            };
            if !has_duplicate_scans(records) {
                continue;
            }
            duplicated += 1;
            sort_by_scan(records);
            let second_group = drift_partition(records, tolerance);
            let mut i = 0;
            table.split_off(id, |_| {
                let moved = second_group[i];
                i += 1;
                moved
            });
        }
        table.remove_small(min_records);
        if duplicated == 0 {
            break;
        }
    }
    Ok(())
}

/// Marks the records (sorted by scan) that do not belong to the
/// drift-coherent group seeded from the first scan.
fn drift_partition(records: &[Record], tolerance: &Tolerance) -> Vec<bool> {
    let drifts: Vec<f64> = records.iter().map(|r| r.drift_time.unwrap_or(0.0)).collect();
    let mut second_group = vec![false; records.len()];
    let first_scan = records[0].scan;
    let first_scan_len = records.iter().take_while(|r| r.scan == first_scan).count();

    // Seed: the first-scan record agreeing with the most records of the peak.
    let mut seed = 0;
    let mut seed_count = 0;
    for (i, d) in drifts.iter().enumerate().take(first_scan_len) {
        let count = drifts.iter().filter(|o| tolerance.drift_match(*d, **o)).count();
        if count > seed_count {
            seed_count = count;
            seed = i;
        }
    }
    for (i, flag) in second_group.iter_mut().enumerate().take(first_scan_len) {
        *flag = i != seed;
    }

    let mut group_sum = drifts[seed];
    let mut group_len = 1.0;
    let mut start = first_scan_len;
    while start < records.len() {
        let scan = records[start].scan;
        let end = start
            + records[start..]
                .iter()
                .take_while(|r| r.scan == scan)
                .count();
        let group_mean = group_sum / group_len;

        let mut chosen: Option<(usize, f64)> = None;
        for (i, d) in drifts.iter().enumerate().take(end).skip(start) {
            let err = (d - group_mean).abs();
            if tolerance.drift_match(*d, group_mean) && chosen.is_none_or(|(_, e)| err < e) {
                chosen = Some((i, err));
            }
        }
        for (i, flag) in second_group.iter_mut().enumerate().take(end).skip(start) {
            *flag = chosen.is_none_or(|(c, _)| c != i);
        }
        if let Some((c, _)) = chosen {
            group_sum += drifts[c];
            group_len += 1.0;
        }
        start = end;
    }
    second_group
}
