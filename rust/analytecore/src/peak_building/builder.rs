use super::gate::ConfirmationGate;
use super::segmentation::{
    drift_split,
    isotope_filter,
    mass_bin,
    mass_range_check,
    peaks_with_duplicate_scans,
    resolve_scan_duplicates,
    scan_split,
};
use super::shape::{
    minima_trim,
    remove_no_maxima,
    split_multi_apex,
};
use super::PeakBuildingConfig;
use crate::errors::{
    DataProcessingError,
    PeakBuildingError,
    Result,
};
use crate::models::{
    Peak,
    Record,
    Tolerance,
};
use std::time::Instant;
use tracing::{
    debug,
    info,
    warn,
};

/// Turns one run's records into peaks.
pub struct PeakBuilder<'a, G: ConfirmationGate + ?Sized> {
    pub tolerance: &'a Tolerance,
    pub config: &'a PeakBuildingConfig,
    pub gate: &'a G,
}

impl<'a, G: ConfirmationGate + ?Sized> PeakBuilder<'a, G> {
    pub fn new(tolerance: &'a Tolerance, config: &'a PeakBuildingConfig, gate: &'a G) -> Self {
        Self {
            tolerance,
            config,
            gate,
        }
    }

    /// Runs every segmentation and shape stage, in order:
    ///
    /// 1. Mass binning
    /// 2. Mass range repair
    /// 3. Duplicate scan resolution (runs without drift data only)
    /// 4. Isotope filter
    /// 5. Scan gap split
    /// 6. Drift split, followed by another scan gap split (drift data only)
    /// 7. Removal of peaks without a maximum
    /// 8. Minima trim
    /// 9. Multi-apex split
    ///
    /// Peaks smaller than `minimum_peak_scan_count` are dropped after every stage.
    /// Returned peaks are ordered by id.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn build(&self, records: Vec<Record>, ims: bool) -> Result<Vec<Peak>> {
        if records.is_empty() {
            warn!("No records to build peaks from");
            return Ok(Vec::new());
        }
        for r in records.iter() {
            r.validate()?;
        }
        let st = Instant::now();
        let min_records = self.config.minimum_peak_scan_count;
        let num_records = records.len();

        let mut table = mass_bin(records, self.tolerance);
        info!("Number of mass bin peaks = {}", table.len());
        table.remove_small(min_records);

        mass_range_check(&mut table, self.tolerance, min_records);
        debug!("Peaks after mass range check: {}", table.len());

        if !ims {
            let duplicated = peaks_with_duplicate_scans(&table);
            if !duplicated.is_empty() {
                warn!(
                    "Found multiple data points for a single scan in {} peaks",
                    duplicated.len()
                );
                if self.config.safe_mode && !self.gate.confirm_duplicate_resolution(duplicated.len()) {
                    return Err(PeakBuildingError::DuplicateScanResolutionDeclined {
                        affected_peaks: duplicated.len(),
                    }
                    .into());
                }
                resolve_scan_duplicates(&mut table, &duplicated);
                table.remove_small(min_records);
            }
        }

        isotope_filter(&mut table, self.tolerance);
        table.remove_small(min_records);
        debug!("Peaks after isotope filter: {}", table.len());

        scan_split(&mut table, self.config.scan_split_gap_size, min_records);
        debug!("Peaks after scan split: {}", table.len());

        if ims {
            drift_split(&mut table, self.tolerance, min_records)
                .map_err(|e| e.append_to_context(", drift split"))?;
            scan_split(&mut table, self.config.scan_split_gap_size, min_records);
            debug!("Peaks after drift split: {}", table.len());
        }

        remove_no_maxima(&mut table);
        table.remove_small(min_records);
        minima_trim(&mut table, min_records);
        split_multi_apex(
            &mut table,
            self.config.peak_to_trough_split_ratio,
            min_records,
        );

        let peaks = table.into_peaks().map_err(|e: DataProcessingError| {
            e.append_to_context(", finalizing peaks")
        })?;
        info!(
            "Built {} peaks from {} records in {:?}",
            peaks.len(),
            num_records,
            st.elapsed()
        );
        Ok(peaks)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{
        AutoApprove,
        Decline,
    };
    use super::*;
    use crate::errors::AnalyteCoreError;

    /// Gaussian-ish elution profile over scans 10..=30 with its apex at scan 20.
    fn elution(mass: f64, scale: f64) -> Vec<Record> {
        (10..=30)
            .map(|scan| {
                let d = scan as f64 - 20.0;
                let intensity = (scale * (-d * d / 18.0).exp()).round() as u64 + 1;
                Record::new(scan, scan as f64 * 0.02, mass, intensity)
            })
            .collect()
    }

    #[test]
    fn test_builds_isotope_pair() {
        let mut records = elution(200.1000, 100_000.0);
        records.extend(elution(201.1034, 20_000.0));
        // lone mass without an isotope partner
        records.extend(elution(350.0000, 50_000.0));

        let tol = Tolerance::default();
        let config = PeakBuildingConfig::default();
        let peaks = PeakBuilder::new(&tol, &config, &AutoApprove)
            .build(records, false)
            .unwrap();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].average_mass, 200.1);
        assert_eq!(peaks[0].scan_min, 10);
        assert_eq!(peaks[0].scan_max, 30);
        assert_eq!(peaks[0].retention_time, 0.4);
        assert_eq!(peaks[1].average_mass, 201.1034);
    }

    #[test]
    fn test_declined_duplicate_resolution_aborts() {
        let mut records = elution(200.1000, 100_000.0);
        records.extend(elution(201.1034, 20_000.0));
        records.push(Record::new(20, 0.4, 200.1020, 500));

        let tol = Tolerance::default();
        let config = PeakBuildingConfig {
            safe_mode: true,
            ..Default::default()
        };
        let out = PeakBuilder::new(&tol, &config, &Decline).build(records.clone(), false);
        assert!(matches!(
            out,
            Err(AnalyteCoreError::PeakBuildingError(
                PeakBuildingError::DuplicateScanResolutionDeclined { affected_peaks: 1 }
            ))
        ));

        let peaks = PeakBuilder::new(&tol, &config, &AutoApprove)
            .build(records, false)
            .unwrap();
        assert_eq!(peaks[0].records.len(), 21);
        assert!(peaks[0].records.iter().all(|r| r.mass == 200.1));
    }

    #[test]
    fn test_gate_not_consulted_without_safe_mode() {
        let mut records = elution(200.1000, 100_000.0);
        records.extend(elution(201.1034, 20_000.0));
        records.push(Record::new(20, 0.4, 200.1020, 500));

        let tol = Tolerance::default();
        let config = PeakBuildingConfig::default();
        let peaks = PeakBuilder::new(&tol, &config, &Decline)
            .build(records, false)
            .unwrap();
        assert_eq!(peaks.len(), 2);
    }

    #[test]
    fn test_ims_run_splits_on_drift() {
        let mut records: Vec<Record> = elution(400.2000, 80_000.0)
            .into_iter()
            .map(|r| r.with_drift(15.0))
            .collect();
        records.extend(
            elution(400.2000, 30_000.0)
                .into_iter()
                .map(|r| r.with_drift(25.0)),
        );
        records.extend(
            elution(401.2034, 10_000.0)
                .into_iter()
                .map(|r| r.with_drift(15.0)),
        );

        let tol = Tolerance::default();
        let config = PeakBuildingConfig::default();
        let peaks = PeakBuilder::new(&tol, &config, &AutoApprove)
            .build(records, true)
            .unwrap();
        assert_eq!(peaks.len(), 3);
        let drifts: Vec<Option<f64>> = peaks.iter().map(|p| p.average_drift).collect();
        assert!(drifts.contains(&Some(15.0)));
        assert!(drifts.contains(&Some(25.0)));
    }

    #[test]
    fn test_empty_input() {
        let tol = Tolerance::default();
        let config = PeakBuildingConfig::default();
        let peaks = PeakBuilder::new(&tol, &config, &AutoApprove)
            .build(vec![], false)
            .unwrap();
        assert!(peaks.is_empty());
    }
}
