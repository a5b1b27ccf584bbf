// src/policy/egreedy.rs
//
// Per-camera ε-greedy bandits over zoom indices.
//
// Each camera keeps a `BanditTable` of (times applied, objects detected)
// per zoom index. Step 0 is uniform random. Afterwards a draw p decides:
// p > ε exploits the best index, otherwise one of the other indices is
// drawn uniformly.
//
// Gradual variants never move a camera more than `hop` levels per step.
// Credit selects which index the step's detections are booked against: the
// one actually applied, or the (possibly clamped-away) candidate.

use serde::{Deserialize, Serialize};

use crate::detect::DetectionTable;
use crate::rng::RandomSource;
use crate::types::ZoomConfig;

use super::{StepOutcome, ZoomPolicy};

/// How an arm's quality is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reward {
    /// Number of times the arm was booked.
    Visits,
    /// Running average of objects detected.
    DetectedObjects,
}

/// Which zoom index a step is booked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credit {
    #[default]
    Applied,
    Intended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Arm {
    count: u64,
    detected: u64,
}

impl Arm {
    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.detected as f64 / self.count as f64
        }
    }
}

/// Bandit statistics over the zoom indices of one camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanditTable {
    arms: Vec<Arm>,
}

impl BanditTable {
    pub fn new(zoom_count: usize) -> Self {
        Self {
            arms: vec![Arm::default(); zoom_count],
        }
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Book one application of zoom `z` that detected `detected` objects.
    pub fn record(&mut self, z: usize, detected: usize) {
        if let Some(arm) = self.arms.get_mut(z) {
            arm.count += 1;
            arm.detected += detected as u64;
        }
    }

    pub fn count(&self, z: usize) -> u64 {
        self.arms.get(z).map_or(0, |a| a.count)
    }

    pub fn average(&self, z: usize) -> f64 {
        self.arms.get(z).map_or(0.0, Arm::average)
    }

    /// Best index under `reward`. Scans left to right with `>=`, so the
    /// highest of several equal arms wins.
    pub fn best(&self, reward: Reward) -> usize {
        match reward {
            Reward::Visits => {
                let mut index = 0;
                let mut max = -1i64;
                for (i, arm) in self.arms.iter().enumerate() {
                    let count = arm.count as i64;
                    if count >= max {
                        index = i;
                        max = count;
                    }
                }
                index
            }
            Reward::DetectedObjects => {
                let mut index = 0;
                let mut max = 0.0;
                for (i, arm) in self.arms.iter().enumerate() {
                    let avg = arm.average();
                    if avg >= max {
                        index = i;
                        max = avg;
                    }
                }
                index
            }
        }
    }

    /// ε-greedy choice against this table.
    pub fn choose(&self, reward: Reward, epsilon: f64, rng: &mut RandomSource) -> usize {
        let best = self.best(reward);
        let p = rng.next_f64();
        if p > epsilon || self.arms.len() < 2 {
            return best;
        }
        // uniform over the other len - 1 indices
        let pick = rng.next_index(self.arms.len() - 1);
        if pick >= best {
            pick + 1
        } else {
            pick
        }
    }
}

/// Move from `last` toward `candidate` by at most `hop` levels.
pub(crate) fn clamp_hop(last: usize, candidate: usize, hop: usize) -> usize {
    if candidate.abs_diff(last) <= hop {
        candidate
    } else if candidate > last {
        last + hop
    } else {
        last - hop
    }
}

/// ε-greedy zoom policy, one bandit table per camera.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    label: String,
    reward: Reward,
    credit: Credit,
    epsilon: f64,
    hop: Option<usize>,
    tables: Vec<BanditTable>,
    applied: Vec<usize>,
    intended: Vec<usize>,
    rng: RandomSource,
}

impl EpsilonGreedy {
    /// Unconstrained ε-greedy on average detected objects.
    pub fn plain(zoom_counts: &[usize], epsilon: f64, rng: RandomSource) -> Self {
        Self::build("egreedy", zoom_counts, Reward::DetectedObjects, Credit::Applied, epsilon, None, rng)
    }

    /// Gradual ε-greedy moving at most `hop` levels per step.
    pub fn gradual(
        label: &str,
        zoom_counts: &[usize],
        reward: Reward,
        credit: Credit,
        epsilon: f64,
        hop: usize,
        rng: RandomSource,
    ) -> Self {
        Self::build(label, zoom_counts, reward, credit, epsilon, Some(hop), rng)
    }

    fn build(
        label: &str,
        zoom_counts: &[usize],
        reward: Reward,
        credit: Credit,
        epsilon: f64,
        hop: Option<usize>,
        rng: RandomSource,
    ) -> Self {
        Self {
            label: label.to_string(),
            reward,
            credit,
            epsilon,
            hop,
            tables: zoom_counts.iter().map(|z| BanditTable::new(*z)).collect(),
            applied: vec![0; zoom_counts.len()],
            intended: vec![0; zoom_counts.len()],
            rng,
        }
    }

    pub fn table(&self, camera: usize) -> Option<&BanditTable> {
        self.tables.get(camera)
    }
}

impl ZoomPolicy for EpsilonGreedy {
    fn label(&self) -> &str {
        &self.label
    }

    fn select(&mut self, step: usize, _table: &DetectionTable) -> ZoomConfig {
        for (n, table) in self.tables.iter().enumerate() {
            let candidate = if step == 0 {
                self.rng.next_index(table.len())
            } else {
                table.choose(self.reward, self.epsilon, &mut self.rng)
            };
            let applied = match self.hop {
                Some(hop) if step > 0 => clamp_hop(self.applied[n], candidate, hop),
                _ => candidate,
            };
            self.intended[n] = candidate;
            self.applied[n] = applied;
        }
        ZoomConfig::new(self.applied.clone())
    }

    fn observe(
        &mut self,
        _step: usize,
        _table: &DetectionTable,
        applied: &ZoomConfig,
        outcome: &StepOutcome,
    ) {
        for (n, table) in self.tables.iter_mut().enumerate() {
            let booked = match self.credit {
                Credit::Applied => applied.get(n).unwrap_or(self.applied[n]),
                Credit::Intended => self.intended[n],
            };
            let detected = outcome.per_camera_detected.get(n).copied().unwrap_or(0);
            table.record(booked, detected);
        }
    }
}
