// src/coverage.rs
//
// Coverage aggregation: how many selected cameras detect each object, and
// the k-cover (minimum of those counts) for one step.

use serde::{Deserialize, Serialize};

use crate::detect::DetectionTable;
use crate::types::ZoomConfig;

/// `counts[m]` = number of cameras whose selected zoom detects object `m`.
pub fn per_object_counts(table: &DetectionTable, config: &ZoomConfig) -> Vec<usize> {
    let mut counts = vec![0usize; table.object_count()];
    for (n, z) in config.as_slice().iter().enumerate() {
        for (m, detected) in table.row(n, *z).iter().enumerate() {
            if *detected {
                counts[m] += 1;
            }
        }
    }
    counts
}

/// `detected[n]` = number of objects camera `n` detects at its selected zoom.
pub fn per_camera_detected(table: &DetectionTable, config: &ZoomConfig) -> Vec<usize> {
    config
        .as_slice()
        .iter()
        .enumerate()
        .map(|(n, z)| table.detected_count(n, *z))
        .collect()
}

/// Minimum per-object count. An empty object set covers nothing: 0.
pub fn k_cover(counts: &[usize]) -> usize {
    counts.iter().copied().min().unwrap_or(0)
}

/// k-cover of `config` under `table`.
pub fn score(table: &DetectionTable, config: &ZoomConfig) -> usize {
    k_cover(&per_object_counts(table, config))
}

/// Per-step k-cover values of one policy run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageSeries(Vec<usize>);

impl CoverageSeries {
    pub fn new(values: Vec<usize>) -> Self {
        Self(values)
    }

    pub fn with_capacity(steps: usize) -> Self {
        Self(Vec::with_capacity(steps))
    }

    pub(crate) fn push(&mut self, k: usize) {
        self.0.push(k);
    }

    pub fn values(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<usize> {
        self.0.get(step).copied()
    }

    /// Sum over every step.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|k| *k as u64).sum()
    }

    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            self.total() as f64 / self.0.len() as f64
        }
    }
}
