//! Per-category density series for plotting or summary output.

use serde::{Deserialize, Serialize};

use crate::types::MeasureRecord;

/// Don, Ka and combined densities as parallel vectors in measure order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DensitySeries {
    pub don: Vec<f64>,
    pub ka: Vec<f64>,
    pub combined: Vec<f64>,
}

impl DensitySeries {
    pub fn from_records(records: &[MeasureRecord]) -> Self {
        DensitySeries {
            don: records.iter().map(|r| r.don_rate).collect(),
            ka: records.iter().map(|r| r.ka_rate).collect(),
            combined: records.iter().map(|r| r.combined_rate).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.combined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }
}

/// The measure with the highest combined density. NaN measures are skipped.
pub fn peak(records: &[MeasureRecord]) -> Option<&MeasureRecord> {
    records
        .iter()
        .filter(|r| !r.combined_rate.is_nan())
        .max_by(|a, b| a.combined_rate.total_cmp(&b.combined_rate))
}
