// src/policy/qlearning.rs
//
// Offline-trained tabular Q-learning.
//
// A camera's state is (zoom index, objects detected at that zoom). Training
// runs `cycles` episodes of `steps + 1` states on a private copy of the
// scenario (objects keep moving from one cycle into the next), then applies
// the update
//
//   Q[s][s'] += α (r + γ · max_a Q[s'][a] − Q[s][s']),   r = detected' − detected
//
// for every consecutive pair. The successor row maximum is taken over the
// dense row of zoomCount × (objects + 1) entries; entries never written
// count as zero.
//
// Distillation collapses the successor's detected count away,
// QF[s][z'] = Σ_d' Q[s][(z', d')], and keeps argmax_z' QF (ties go to the
// higher zoom). Evaluation starts from a random zoom per camera and follows
// the distilled action of the previous step's state; states never seen in
// training fall back to a uniform draw.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimConfig;
use crate::detect::DetectionTable;
use crate::rng::RandomSource;
use crate::scenario::Scenario;
use crate::types::ZoomConfig;

use super::{StepOutcome, ZoomPolicy};

/// One camera's observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub zoom: usize,
    pub detected: usize,
}

impl StateKey {
    pub const fn new(zoom: usize, detected: usize) -> Self {
        Self { zoom, detected }
    }
}

/// How zooms are picked while collecting training episodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingExploration {
    Uniform,
    /// Exploit the current distilled actions with probability 1 − ε.
    EpsilonGreedy(f64),
}

/// Sparse Q table of one camera.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    q: BTreeMap<StateKey, BTreeMap<StateKey, f64>>,
}

impl QTable {
    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Number of states with at least one stored successor.
    pub fn state_count(&self) -> usize {
        self.q.len()
    }

    pub fn get(&self, from: StateKey, to: StateKey) -> f64 {
        self.q
            .get(&from)
            .and_then(|row| row.get(&to))
            .copied()
            .unwrap_or(0.0)
    }

    /// Row maximum over a dense row of `dense_len` entries.
    fn row_max(&self, from: StateKey, dense_len: usize) -> f64 {
        match self.q.get(&from) {
            None => 0.0,
            Some(row) => {
                let stored = row.values().copied().fold(f64::NEG_INFINITY, f64::max);
                if row.len() < dense_len {
                    stored.max(0.0)
                } else {
                    stored
                }
            }
        }
    }

    fn update(
        &mut self,
        from: StateKey,
        to: StateKey,
        target_row_max: f64,
        reward: f64,
        alpha: f64,
        gamma: f64,
    ) {
        let entry = self.q.entry(from).or_default().entry(to).or_insert(0.0);
        *entry += alpha * (reward + gamma * target_row_max - *entry);
    }

    /// Learned zoom per state.
    pub fn distill(&self, zoom_count: usize) -> BTreeMap<StateKey, usize> {
        let mut actions = BTreeMap::new();
        for (state, row) in &self.q {
            let mut qf = vec![0.0; zoom_count];
            for (next, value) in row {
                if let Some(slot) = qf.get_mut(next.zoom) {
                    *slot += value;
                }
            }
            let mut best = 0;
            let mut best_value = f64::NEG_INFINITY;
            for (z, value) in qf.iter().enumerate() {
                if *value >= best_value {
                    best = z;
                    best_value = *value;
                }
            }
            actions.insert(*state, best);
        }
        actions
    }
}

/// Q-learning policy: trained tables plus the evaluation-time state.
#[derive(Debug, Clone)]
pub struct QLearning {
    label: String,
    zoom_counts: Vec<usize>,
    tables: Vec<QTable>,
    actions: Vec<BTreeMap<StateKey, usize>>,
    previous: Vec<Option<StateKey>>,
    rng: RandomSource,
}

impl QLearning {
    /// Train on a copy of `scenario` and return the ready-to-evaluate policy.
    ///
    /// Training and evaluation share `rng`, training first.
    pub fn trained(
        label: &str,
        scenario: &Scenario,
        cfg: &SimConfig,
        exploration: TrainingExploration,
        mut rng: RandomSource,
    ) -> Self {
        let zoom_counts = scenario.zoom_counts();
        let mut tables = vec![QTable::default(); zoom_counts.len()];
        let mut actions = vec![BTreeMap::new(); zoom_counts.len()];

        let mut world = scenario.clone();
        let dense_len = |zc: usize| zc * (scenario.object_count() + 1);
        let steps = cfg.steps as usize;
        let ql = &cfg.qlearning;

        for cycle in 0..ql.cycles {
            let mut episode: Vec<Vec<StateKey>> = Vec::with_capacity(steps + 1);

            for step in 0..=steps {
                let table = DetectionTable::build(&world, cfg.threshold);
                let prev = if step == 0 { None } else { episode.last() };
                let states: Vec<StateKey> = zoom_counts
                    .iter()
                    .enumerate()
                    .map(|(n, &zc)| {
                        let last = prev.and_then(|p| p.get(n)).copied();
                        let zoom = training_zoom(exploration, zc, last, &actions[n], &mut rng);
                        StateKey::new(zoom, table.detected_count(n, zoom))
                    })
                    .collect();
                episode.push(states);
                world.advance_all();
            }

            for pair in episode.windows(2) {
                for (n, table) in tables.iter_mut().enumerate() {
                    let (s, s_next) = (pair[0][n], pair[1][n]);
                    let reward = s_next.detected as f64 - s.detected as f64;
                    let row_max = table.row_max(s_next, dense_len(zoom_counts[n]));
                    table.update(s, s_next, row_max, reward, ql.alpha, ql.gamma);
                }
            }

            if matches!(exploration, TrainingExploration::EpsilonGreedy(_)) {
                actions = distill_all(&tables, &zoom_counts);
            }
            if cycle % 100 == 0 {
                debug!(label, cycle, "q-learning training cycle");
            }
        }

        let actions = distill_all(&tables, &zoom_counts);
        Self {
            label: label.to_string(),
            previous: vec![None; zoom_counts.len()],
            zoom_counts,
            tables,
            actions,
            rng,
        }
    }

    pub fn table(&self, camera: usize) -> Option<&QTable> {
        self.tables.get(camera)
    }

    /// Distilled action of `camera` in `state`, if learned.
    pub fn action(&self, camera: usize, state: StateKey) -> Option<usize> {
        self.actions.get(camera).and_then(|a| a.get(&state)).copied()
    }
}

fn distill_all(tables: &[QTable], zoom_counts: &[usize]) -> Vec<BTreeMap<StateKey, usize>> {
    tables
        .iter()
        .zip(zoom_counts)
        .map(|(t, zc)| t.distill(*zc))
        .collect()
}

fn training_zoom(
    exploration: TrainingExploration,
    zoom_count: usize,
    last: Option<StateKey>,
    actions: &BTreeMap<StateKey, usize>,
    rng: &mut RandomSource,
) -> usize {
    match (exploration, last) {
        (TrainingExploration::EpsilonGreedy(epsilon), Some(state)) => {
            if rng.next_f64() > epsilon {
                if let Some(z) = actions.get(&state) {
                    return *z;
                }
            }
            rng.next_index(zoom_count)
        }
        _ => rng.next_index(zoom_count),
    }
}

impl ZoomPolicy for QLearning {
    fn label(&self) -> &str {
        &self.label
    }

    fn select(&mut self, _step: usize, _table: &DetectionTable) -> ZoomConfig {
        let mut zooms = Vec::with_capacity(self.zoom_counts.len());
        for (n, &zc) in self.zoom_counts.iter().enumerate() {
            let learned = self.previous[n].and_then(|s| self.actions[n].get(&s).copied());
            let z = match learned {
                Some(z) => z,
                None => self.rng.next_index(zc),
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
        let pairs = applied.as_slice().iter().zip(&outcome.per_camera_detected);
        for (slot, (z, d)) in self.previous.iter_mut().zip(pairs) {
            *slot = Some(StateKey::new(*z, *d));
        }
    }
}
