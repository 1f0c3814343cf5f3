use super::record::{
    Record,
    mean_mass,
    sort_by_scan,
};
use crate::errors::DataProcessingError;
use crate::utils::round_to;
use serde::{
    Deserialize,
    Serialize,
};

pub type PeakId = u32;

/// A chromatographic peak: records of one mass over a contiguous run of scans.
///
/// Records are kept sorted by scan and, once a peak is built, there is at
/// most one record per scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub id: PeakId,
    pub records: Vec<Record>,
    pub max_intensity: u64,
    pub scan_min: u32,
    pub scan_max: u32,
    /// Mean of the member masses, 4 decimal places.
    pub average_mass: f64,
    /// Retention time of the most intense record, 3 decimal places.
    pub retention_time: f64,
    /// Mean drift time, 1 decimal place. Only set for ion-mobility runs.
    pub average_drift: Option<f64>,
}

impl Peak {
    pub fn try_new(id: PeakId, mut records: Vec<Record>) -> Result<Self, DataProcessingError> {
        if records.is_empty() {
            return Err(DataProcessingError::ExpectedNonEmptyData {
                context: Some(format!("building peak {}", id)),
            });
        }
        sort_by_scan(&mut records);

        let apex = apex_record(&records);
        let max_intensity = apex.intensity;
        let retention_time = round_to(apex.retention_time, 3);
        let scan_min = records[0].scan;
        let scan_max = records[records.len() - 1].scan;
        let average_mass = round_to(mean_mass(&records), 4);
        let average_drift = if records.iter().all(|r| r.drift_time.is_some()) {
            let total: f64 = records.iter().filter_map(|r| r.drift_time).sum();
            Some(round_to(total / records.len() as f64, 1))
        } else {
            None
        };

        Ok(Self {
            id,
            records,
            max_intensity,
            scan_min,
            scan_max,
            average_mass,
            retention_time,
            average_drift,
        })
    }

    pub fn scans(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|r| r.scan)
    }

    pub fn intensity_at(&self, scan: u32) -> Option<u64> {
        self.records
            .binary_search_by_key(&scan, |r| r.scan)
            .ok()
            .map(|i| self.records[i].intensity)
    }

    /// Scans present in both peaks, in increasing order.
    pub fn shared_scans(&self, other: &Peak) -> Vec<u32> {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.records.len() && j < other.records.len() {
            let (a, b) = (self.records[i].scan, other.records[j].scan);
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    if out.last() != Some(&a) {
                        out.push(a);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }
}

/// First record holding the maximum intensity, in the order given.
pub(crate) fn apex_record(records: &[Record]) -> &Record {
    let mut best = &records[0];
    for r in records.iter().skip(1) {
        if r.intensity > best.intensity {
            best = r;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(scan: u32, mass: f64, intensity: u64) -> Record {
        Record::new(scan, scan as f64 * 0.01, mass, intensity)
    }

    #[test]
    fn test_peak_summary_fields() {
        let records = vec![
            rec(12, 200.1002, 500),
            rec(10, 200.0998, 100),
            rec(11, 200.1000, 900),
            rec(13, 200.1000, 900),
        ];
        let peak = Peak::try_new(3, records).unwrap();
        assert_eq!(peak.scan_min, 10);
        assert_eq!(peak.scan_max, 13);
        assert_eq!(peak.max_intensity, 900);
        // first apex in scan order
        assert_eq!(peak.retention_time, 0.11);
        assert_eq!(peak.average_mass, 200.1);
        assert_eq!(peak.average_drift, None);
        assert_eq!(peak.intensity_at(12), Some(500));
        assert_eq!(peak.intensity_at(14), None);
    }

    #[test]
    fn test_empty_peak_is_an_error() {
        assert!(Peak::try_new(1, vec![]).is_err());
    }

    #[test]
    fn test_shared_scans() {
        let a = Peak::try_new(1, (10..20).map(|s| rec(s, 100.0, 10)).collect()).unwrap();
        let b = Peak::try_new(2, (15..25).map(|s| rec(s, 101.0, 10)).collect()).unwrap();
        assert_eq!(a.shared_scans(&b), vec![15, 16, 17, 18, 19]);
    }

    #[test]
    fn test_average_drift() {
        let records = vec![
            rec(1, 300.0, 10).with_drift(20.04),
            rec(2, 300.0, 20).with_drift(20.16),
        ];
        let peak = Peak::try_new(1, records).unwrap();
        assert_eq!(peak.average_drift, Some(20.1));
    }
}
