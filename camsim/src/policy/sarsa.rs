// src/policy/sarsa.rs
//
// Online tabular SARSA-style policy.
//
// Each camera keeps one bandit table per state (previous zoom, previous
// detected count). The next zoom is an ε-greedy choice on the table of the
// current state; after the step, the state's entry for the applied zoom is
// credited with the objects detected. Step 0 draws uniformly and books
// nothing, since there is no previous state yet.

use std::collections::BTreeMap;

use crate::detect::DetectionTable;
use crate::rng::RandomSource;
use crate::types::ZoomConfig;

use super::egreedy::{BanditTable, Reward};
use super::qlearning::StateKey;
use super::{StepOutcome, ZoomPolicy};

#[derive(Debug, Clone)]
struct CameraLearner {
    zoom_count: usize,
    tables: BTreeMap<StateKey, BanditTable>,
    state: Option<StateKey>,
}

#[derive(Debug, Clone)]
pub struct Sarsa {
    epsilon: f64,
    cameras: Vec<CameraLearner>,
    rng: RandomSource,
}

impl Sarsa {
    pub fn new(zoom_counts: &[usize], epsilon: f64, rng: RandomSource) -> Self {
        let cameras = zoom_counts
            .iter()
            .map(|&zoom_count| CameraLearner {
                zoom_count,
                tables: BTreeMap::new(),
                state: None,
            })
            .collect();
        Self {
            epsilon,
            cameras,
            rng,
        }
    }

    /// Statistics camera `n` has gathered in `state`.
    pub fn table(&self, n: usize, state: StateKey) -> Option<&BanditTable> {
        self.cameras.get(n).and_then(|c| c.tables.get(&state))
    }
}

impl ZoomPolicy for Sarsa {
    fn label(&self) -> &str {
        "sarsa"
    }

    fn select(&mut self, step: usize, _table: &DetectionTable) -> ZoomConfig {
        let mut zooms = Vec::with_capacity(self.cameras.len());
        for cam in &self.cameras {
            let z = match cam.state {
                Some(state) if step > 0 => {
                    let fresh;
                    let table = match cam.tables.get(&state) {
                        Some(t) => t,
                        None => {
                            fresh = BanditTable::new(cam.zoom_count);
                            &fresh
                        }
                    };
                    table.choose(Reward::DetectedObjects, self.epsilon, &mut self.rng)
                }
                _ => self.rng.next_index(cam.zoom_count),
            };
            zooms.push(z);
        }
        ZoomConfig::new(zooms)
    }

    fn observe(
        &mut self,
        _step: usize,
        _table: &DetectionTable,
        applied: &ZoomConfig,
        outcome: &StepOutcome,
    ) {
        for (n, cam) in self.cameras.iter_mut().enumerate() {
            let (Some(z), Some(&detected)) = (applied.get(n), outcome.per_camera_detected.get(n)) else {
                continue;
            };
            if let Some(prev) = cam.state {
                cam.tables
                    .entry(prev)
                    .or_insert_with(|| BanditTable::new(cam.zoom_count))
                    .record(z, detected);
            }
            cam.state = Some(StateKey::new(z, detected));
        }
    }
}
