//! Segmentation of a run's record stream into shape-corrected peaks.
//!
//! The stages run in a fixed order (see [`PeakBuilder::build`]) over a
//! [`PeakTable`], which owns the current record-to-peak assignment.

mod builder;
mod gate;
pub mod segmentation;
pub mod shape;
mod table;

pub use builder::PeakBuilder;
pub use gate::{
    AutoApprove,
    ConfirmationGate,
    Decline,
};
pub use table::PeakTable;

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PeakBuildingConfig {
    /// Largest allowed gap between consecutive scans of a peak.
    pub scan_split_gap_size: u32,
    pub minimum_peak_scan_count: usize,
    /// A valley this deep (relative to both apexes) splits a peak in two.
    pub peak_to_trough_split_ratio: f64,
    /// Ask before dropping duplicate scan entries.
    pub safe_mode: bool,
}

impl Default for PeakBuildingConfig {
    fn default() -> Self {
        Self {
            scan_split_gap_size: 2,
            minimum_peak_scan_count: 3,
            peak_to_trough_split_ratio: 0.5,
            safe_mode: false,
        }
    }
}
