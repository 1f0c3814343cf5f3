//! Chromatographic shape corrections, applied once every peak holds a
//! single record per scan.

use super::table::PeakTable;
use crate::models::record::sort_by_scan;
use crate::models::{
    PeakId,
    Record,
};
use crate::utils::extrema::{
    local_maxima,
    local_minima,
};
use std::collections::BTreeSet;
use tracing::debug;

fn intensity_series(records: &[Record]) -> Vec<f64> {
    records.iter().map(|r| r.intensity as f64).collect()
}

fn scan_sorted(records: &[Record]) -> Vec<Record> {
    let mut out = records.to_vec();
    sort_by_scan(&mut out);
    out
}

/// Drops peaks with no local intensity maximum (pure slopes).
pub fn remove_no_maxima(table: &mut PeakTable) {
    table.retain(|_, records| {
        let sorted = scan_sorted(records);
        !local_maxima(&intensity_series(&sorted)).is_empty()
    });
}

/// Trims leading records before a minimum that precedes the first maximum,
/// and trailing records after a minimum that follows the last maximum.
pub fn minima_trim(table: &mut PeakTable, min_records: usize) {
    for id in table.ids() {
        let Some(records) = table.get_mut(id) else {
            continue;
        };
        sort_by_scan(records);
        let series = intensity_series(records);
        let maxima = local_maxima(&series);
        let minima = local_minima(&series);
        let (Some(first_max), Some(last_max)) = (maxima.first(), maxima.last()) else {
            continue;
        };
        let (Some(first_min), Some(last_min)) = (minima.first(), minima.last()) else {
            continue;
        };
        if last_min > last_max {
            records.truncate(last_min + 1);
        }
        if first_min < first_max {
            records.drain(..*first_min);
        }
    }
    table.remove_small(min_records);
}

/// Splits peaks with several apexes at sufficiently deep valleys.
///
/// For every unfinished peak, the tallest apex is compared against each other
/// apex in decreasing intensity order. When the lowest minimum between the
/// two is at most `split_ratio` of both apex intensities, the records after
/// that minimum move to a new peak. A peak is finished once a pass makes no
/// split on it; new peaks are evaluated in the next pass.
pub fn split_multi_apex(table: &mut PeakTable, split_ratio: f64, min_records: usize) {
    let mut completed: BTreeSet<PeakId> = BTreeSet::new();
    let mut passes = 0;
    loop {
        let pending: Vec<PeakId> = table
            .ids()
            .into_iter()
            .filter(|id| !completed.contains(id))
            .collect();
        if pending.is_empty() {
            break;
        }
        passes += 1;

        for id in pending {
            let Some(records) = table.get(id) else {
                continue;
            };
            let records = scan_sorted(records);
            let series = intensity_series(&records);
            let maxima = local_maxima(&series);
            if maxima.len() <= 1 {
                completed.insert(id);
                continue;
            }

            let minima_scans: Vec<u32> = local_minima(&series)
                .into_iter()
                .map(|i| records[i].scan)
                .collect();
            let mut apexes: Vec<&Record> = maxima.iter().map(|&i| &records[i]).collect();
            apexes.sort_by(|a, b| b.intensity.cmp(&a.intensity));

            let tallest = apexes[0];
            let mut split_performed = false;
            for other in &apexes[1..] {
                let (start, end) = if tallest.scan < other.scan {
                    (tallest.scan, other.scan)
                } else {
                    (other.scan, tallest.scan)
                };
                let valley = records
                    .iter()
                    .filter(|r| r.scan > start && r.scan < end && minima_scans.contains(&r.scan))
                    .fold(None, |acc: Option<&Record>, r| match acc {
                        Some(best) if best.intensity <= r.intensity => Some(best),
                        _ => Some(r),
                    });
                let Some(valley) = valley else {
                    continue;
                };
                let depth = valley.intensity as f64;
                if depth / tallest.intensity as f64 <= split_ratio
                    && depth / other.intensity as f64 <= split_ratio
                {
                    let split_scan = valley.scan;
                    if let Some(new_id) = table.split_off(id, |r| r.scan > split_scan) {
                        debug!("Split peak {} at scan {} into {}", id, split_scan, new_id);
                        split_performed = true;
                    }
                }
            }
            if !split_performed {
                completed.insert(id);
            }
        }

        table.remove_small(min_records);
        remove_no_maxima(table);
    }
    debug!("Multi-apex split finished after {} passes", passes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_from_intensities(start_scan: u32, intensities: &[u64]) -> PeakTable {
        let records = intensities
            .iter()
            .enumerate()
            .map(|(i, x)| Record::new(start_scan + i as u32, 0.0, 250.0, *x))
            .collect();
        PeakTable::from_groups([(1, records)].into_iter().collect())
    }

    fn scans_of(table: &PeakTable) -> Vec<Vec<u32>> {
        table
            .iter()
            .map(|(_, r)| r.iter().map(|x| x.scan).collect())
            .collect()
    }

    #[test]
    fn test_remove_no_maxima() {
        let mut table = table_from_intensities(1, &[1, 2, 3, 4, 5]);
        remove_no_maxima(&mut table);
        assert!(table.is_empty());

        let mut table = table_from_intensities(1, &[1, 2, 5, 2, 1]);
        remove_no_maxima(&mut table);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_minima_trim_removes_ski_jumps() {
        // scans 1..=9: falling start, valley at scan 2, apex at 5, valley at 8, rising tail
        let mut table = table_from_intensities(1, &[20, 10, 30, 60, 100, 60, 30, 10, 20]);
        minima_trim(&mut table, 3);
        assert_eq!(scans_of(&table), vec![vec![2, 3, 4, 5, 6, 7, 8]]);
    }

    #[test]
    fn test_minima_trim_keeps_clean_peak() {
        let mut table = table_from_intensities(1, &[1, 5, 10, 5, 1]);
        minima_trim(&mut table, 3);
        assert_eq!(scans_of(&table), vec![vec![1, 2, 3, 4, 5]]);
    }

    #[test]
    fn test_split_at_deep_valley() {
        let mut table = table_from_intensities(1, &[10, 50, 100, 50, 10, 40, 80, 40, 10]);
        split_multi_apex(&mut table, 0.5, 3);
        assert_eq!(
            scans_of(&table),
            vec![vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9]]
        );
    }

    #[test]
    fn test_shallow_valley_is_not_split() {
        let mut table = table_from_intensities(1, &[10, 50, 100, 80, 70, 90, 40, 10]);
        split_multi_apex(&mut table, 0.5, 3);
        assert_eq!(table.len(), 1);
        assert_eq!(table.num_records(), 8);
    }

    #[test]
    fn test_three_apexes_reach_fixed_point() {
        let mut table = table_from_intensities(
            1,
            &[5, 60, 5, 50, 100, 50, 5, 30, 60, 30, 5],
        );
        split_multi_apex(&mut table, 0.5, 3);
        for (_, records) in table.iter() {
            let series = intensity_series(records);
            assert!(local_maxima(&series).len() <= 1, "{:?}", records);
        }
        assert_eq!(
            scans_of(&table),
            vec![vec![1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10, 11]]
        );
    }
}
