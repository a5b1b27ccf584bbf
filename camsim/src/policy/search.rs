// src/policy/search.rs
//
// Exhaustive and one-hop constrained configuration search.
//
// `ConfigurationSpace` enumerates joint configurations as immutable values
// in ascending mixed-radix order (camera 0 is the fastest-changing digit).
// Scoring is the pure k-cover function; the policies just keep the best.

use serde::{Deserialize, Serialize};

use crate::coverage;
use crate::detect::DetectionTable;
use crate::types::ZoomConfig;

use super::ZoomPolicy;

/// Which of several equally scoring configurations wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Lowest encoded configuration (narrowest zooms).
    #[default]
    First,
    /// Highest encoded configuration (widest zooms).
    Last,
}

/// Iterator over joint configurations, optionally bounded per camera.
#[derive(Debug, Clone)]
pub struct ConfigurationSpace {
    lo: Vec<usize>,
    hi: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl ConfigurationSpace {
    /// Every configuration for cameras with the given zoom counts.
    pub fn full(zoom_counts: &[usize]) -> Self {
        let lo = vec![0; zoom_counts.len()];
        let hi: Vec<usize> = zoom_counts.iter().map(|z| z.saturating_sub(1)).collect();
        let empty = zoom_counts.iter().any(|z| *z == 0);
        Self {
            next: if empty { None } else { Some(lo.clone()) },
            lo,
            hi,
        }
    }

    /// Configurations within Chebyshev distance `hop` of `center`.
    pub fn around(zoom_counts: &[usize], center: &ZoomConfig, hop: usize) -> Self {
        let mut space = Self::full(zoom_counts);
        for (n, zc) in zoom_counts.iter().enumerate() {
            if let Some(z) = center.get(n) {
                let z = z.min(zc.saturating_sub(1));
                space.lo[n] = z.saturating_sub(hop);
                space.hi[n] = (z + hop).min(zc.saturating_sub(1));
            }
        }
        if space.next.is_some() {
            space.next = Some(space.lo.clone());
        }
        space
    }

    /// Number of configurations this space yields in total.
    pub fn cardinality(&self) -> u64 {
        if self.next.is_none() && !self.lo.is_empty() {
            return 0;
        }
        self.lo
            .iter()
            .zip(&self.hi)
            .map(|(lo, hi)| (hi - lo + 1) as u64)
            .product()
    }
}

impl Iterator for ConfigurationSpace {
    type Item = ZoomConfig;

    fn next(&mut self) -> Option<ZoomConfig> {
        let current = self.next.take()?;

        let mut succ = current.clone();
        let mut carried_out = true;
        for n in 0..succ.len() {
            if succ[n] < self.hi[n] {
                succ[n] += 1;
                carried_out = false;
                break;
            }
            succ[n] = self.lo[n];
        }
        if !carried_out {
            self.next = Some(succ);
        }

        Some(ZoomConfig::new(current))
    }
}

/// Best configuration in `space` and its k-cover.
///
/// Returns `None` only for an empty space.
pub fn best_configuration(
    table: &DetectionTable,
    space: ConfigurationSpace,
    tie_break: TieBreak,
) -> Option<(ZoomConfig, usize)> {
    let mut best: Option<(ZoomConfig, usize)> = None;
    for config in space {
        let k = coverage::score(table, &config);
        let better = match (&best, tie_break) {
            (None, _) => true,
            (Some((_, best_k)), TieBreak::First) => k > *best_k,
            (Some((_, best_k)), TieBreak::Last) => k >= *best_k,
        };
        if better {
            best = Some((config, k));
        }
    }
    best
}

/// Full enumeration every step.
#[derive(Debug, Clone)]
pub struct Optimal {
    tie_break: TieBreak,
}

impl Optimal {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl ZoomPolicy for Optimal {
    fn label(&self) -> &str {
        "optimal"
    }

    fn select(&mut self, _step: usize, table: &DetectionTable) -> ZoomConfig {
        let zoom_counts = table.zoom_counts();
        best_configuration(table, ConfigurationSpace::full(&zoom_counts), self.tie_break)
            .map(|(config, _)| config)
            .unwrap_or_else(|| ZoomConfig::new(vec![0; zoom_counts.len()]))
    }
}

/// Best configuration within `hop` of the previous step's choice.
#[derive(Debug, Clone)]
pub struct OneHopOptimal {
    hop: usize,
    tie_break: TieBreak,
    previous: Option<ZoomConfig>,
}

impl OneHopOptimal {
    pub fn new(hop: usize, tie_break: TieBreak) -> Self {
        Self {
            hop,
            tie_break,
            previous: None,
        }
    }
}

impl ZoomPolicy for OneHopOptimal {
    fn label(&self) -> &str {
        "one-hop-optimal"
    }

    fn select(&mut self, _step: usize, table: &DetectionTable) -> ZoomConfig {
        let zoom_counts = table.zoom_counts();
        let space = match &self.previous {
            Some(prev) => ConfigurationSpace::around(&zoom_counts, prev, self.hop),
            None => ConfigurationSpace::full(&zoom_counts),
        };
        let config = best_configuration(table, space, self.tie_break)
            .map(|(config, _)| config)
            .unwrap_or_else(|| ZoomConfig::new(vec![0; zoom_counts.len()]));
        self.previous = Some(config.clone());
        config
    }
}
