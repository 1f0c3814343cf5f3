use crate::errors::DataProcessingError;
use crate::models::{
    Peak,
    PeakId,
    Record,
};
use std::collections::BTreeMap;

/// Record-to-peak assignment for one run while peaks are being built.
///
/// Peaks are visited in increasing id order, new ids are always larger than
/// any id handed out before.
#[derive(Debug, Clone, Default)]
pub struct PeakTable {
    peaks: BTreeMap<PeakId, Vec<Record>>,
    next_id: PeakId,
}

impl PeakTable {
    pub fn from_groups(peaks: BTreeMap<PeakId, Vec<Record>>) -> Self {
        let next_id = peaks.keys().next_back().map(|k| k + 1).unwrap_or(1);
        Self { peaks, next_id }
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn num_records(&self) -> usize {
        self.peaks.values().map(|v| v.len()).sum()
    }

    /// Snapshot of the live ids, so stages can mutate the table while walking it.
    pub fn ids(&self) -> Vec<PeakId> {
        self.peaks.keys().copied().collect()
    }

    pub fn get(&self, id: PeakId) -> Option<&[Record]> {
        self.peaks.get(&id).map(|v| v.as_slice())
    }

    pub fn get_mut(&mut self, id: PeakId) -> Option<&mut Vec<Record>> {
        self.peaks.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PeakId, &[Record])> {
        self.peaks.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn remove(&mut self, id: PeakId) -> Option<Vec<Record>> {
        self.peaks.remove(&id)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(PeakId, &[Record]) -> bool) {
        self.peaks.retain(|k, v| keep(*k, v));
    }

    /// Inserts a new peak under a fresh id and returns the id.
    pub fn insert_new(&mut self, records: Vec<Record>) -> PeakId {
        let id = self.next_id;
        self.next_id += 1;
        self.peaks.insert(id, records);
        id
    }

    /// Puts records back under an id taken out with [`PeakTable::remove`].
    pub fn restore(&mut self, id: PeakId, records: Vec<Record>) {
        debug_assert!(id < self.next_id);
        self.peaks.insert(id, records);
    }

    /// Moves the records of `id` matching `predicate` into a new peak.
    ///
    /// Returns the new id, or `None` if nothing matched (no id is consumed).
    pub fn split_off(
        &mut self,
        id: PeakId,
        mut predicate: impl FnMut(&Record) -> bool,
    ) -> Option<PeakId> {
        let records = self.peaks.get_mut(&id)?;
        let (moved, kept): (Vec<Record>, Vec<Record>) =
            records.drain(..).partition(|r| predicate(r));
        *records = kept;
        if moved.is_empty() {
            return None;
        }
        Some(self.insert_new(moved))
    }

    /// Drops every peak with fewer than `min_records` records.
    pub fn remove_small(&mut self, min_records: usize) {
        self.peaks.retain(|_, v| v.len() >= min_records);
    }

    pub fn into_peaks(self) -> Result<Vec<Peak>, DataProcessingError> {
        self.peaks
            .into_iter()
            .map(|(id, records)| Peak::try_new(id, records))
            .collect()
    }
}
