// src/policy/mod.rs
//
// Zoom-selection policies.
//
// Every policy implements `ZoomPolicy`: the driver asks it for a joint zoom
// configuration each step (`select`), then reports what that configuration
// achieved (`observe`). Policies own their random source and any learned
// tables; nothing is shared between policies or runs.
//
// Families:
// - fixed:      Baseline (externally supplied config), ZoomOut
// - arbitrary:  uniform random, one-hop bounded random walk
// - search:     exhaustive Optimal, one-hop constrained OneHopOptimal
// - egreedy:    per-camera ε-greedy bandits (plain, visit-count, gradual DO)
// - qlearning:  offline-trained tabular Q-learning
// - sarsa:      online tabular SARSA-style bandit over (zoom, detected) states

pub mod arbitrary;
pub mod egreedy;
pub mod fixed;
pub mod qlearning;
pub mod sarsa;
pub mod search;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::detect::DetectionTable;
use crate::error::PolicyError;
use crate::rng::RandomSource;
use crate::scenario::Scenario;
use crate::types::ZoomConfig;

pub use arbitrary::{Arbitrary, OneHopArbitrary};
pub use egreedy::{BanditTable, Credit, EpsilonGreedy, Reward};
pub use fixed::{Baseline, ZoomOut};
pub use qlearning::{QLearning, QTable, StateKey, TrainingExploration};
pub use sarsa::Sarsa;
pub use search::{best_configuration, ConfigurationSpace, OneHopOptimal, Optimal, TieBreak};

/// What a configuration achieved on one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Objects each camera detected at its applied zoom.
    pub per_camera_detected: Vec<usize>,
    /// Cameras detecting each object.
    pub per_object_counts: Vec<usize>,
    pub k_cover: usize,
}

/// A zoom-selection strategy.
pub trait ZoomPolicy: Send {
    /// Stable label used in output file names and reports.
    fn label(&self) -> &str;

    /// Choose the joint configuration for `step`.
    ///
    /// Must return one in-range zoom index per camera of `table`.
    fn select(&mut self, step: usize, table: &DetectionTable) -> ZoomConfig;

    /// Feedback after `applied` was evaluated on `step`.
    fn observe(
        &mut self,
        _step: usize,
        _table: &DetectionTable,
        _applied: &ZoomConfig,
        _outcome: &StepOutcome,
    ) {
    }
}

/// Every policy the suite knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Baseline,
    Optimal,
    #[serde(rename = "zoomout")]
    ZoomOut,
    #[serde(rename = "random")]
    Arbitrary,
    #[serde(rename = "egreedy")]
    EpsilonGreedy,
    #[serde(rename = "egreedy-act")]
    EpsilonGreedyActual,
    #[serde(rename = "egreedy-act-do")]
    EpsilonGreedyActualDo,
    #[serde(rename = "egreedy-int-do")]
    EpsilonGreedyIntendedDo,
    #[serde(rename = "qlearning")]
    QLearning,
    #[serde(rename = "qlearning-eg")]
    QLearningEg,
    Sarsa,
    #[serde(rename = "one-hop-random")]
    OneHopArbitrary,
    OneHopOptimal,
}

impl PolicyKind {
    /// Reporting order.
    pub const ALL: [PolicyKind; 13] = [
        PolicyKind::Baseline,
        PolicyKind::Optimal,
        PolicyKind::ZoomOut,
        PolicyKind::Arbitrary,
        PolicyKind::EpsilonGreedy,
        PolicyKind::EpsilonGreedyActual,
        PolicyKind::EpsilonGreedyActualDo,
        PolicyKind::EpsilonGreedyIntendedDo,
        PolicyKind::QLearning,
        PolicyKind::QLearningEg,
        PolicyKind::Sarsa,
        PolicyKind::OneHopArbitrary,
        PolicyKind::OneHopOptimal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PolicyKind::Baseline => "baseline",
            PolicyKind::Optimal => "optimal",
            PolicyKind::ZoomOut => "zoomout",
            PolicyKind::Arbitrary => "random",
            PolicyKind::EpsilonGreedy => "egreedy",
            PolicyKind::EpsilonGreedyActual => "egreedy-act",
            PolicyKind::EpsilonGreedyActualDo => "egreedy-act-do",
            PolicyKind::EpsilonGreedyIntendedDo => "egreedy-int-do",
            PolicyKind::QLearning => "qlearning",
            PolicyKind::QLearningEg => "qlearning-eg",
            PolicyKind::Sarsa => "sarsa",
            PolicyKind::OneHopArbitrary => "one-hop-random",
            PolicyKind::OneHopOptimal => "one-hop-optimal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PolicyKind::Baseline => "fixed at the optimal policy's step-0 configuration",
            PolicyKind::Optimal => "exhaustive search for the best joint configuration every step",
            PolicyKind::ZoomOut => "every camera at its widest zoom",
            PolicyKind::Arbitrary => "uniform random zoom per camera every step",
            PolicyKind::EpsilonGreedy => "ε-greedy on average detected objects",
            PolicyKind::EpsilonGreedyActual => "gradual ε-greedy on visit counts",
            PolicyKind::EpsilonGreedyActualDo => "gradual ε-greedy on detected objects, applied-zoom credit",
            PolicyKind::EpsilonGreedyIntendedDo => "gradual ε-greedy on detected objects, intended-zoom credit",
            PolicyKind::QLearning => "tabular Q-learning trained with random exploration",
            PolicyKind::QLearningEg => "tabular Q-learning trained with ε-greedy exploration",
            PolicyKind::Sarsa => "online ε-greedy over (zoom, detected) states",
            PolicyKind::OneHopArbitrary => "bounded random walk of at most one hop per step",
            PolicyKind::OneHopOptimal => "best configuration within one hop of the previous step",
        }
    }

    /// Whether building this policy needs Optimal's step-0 configuration.
    pub fn needs_initial_config(&self) -> bool {
        matches!(self, PolicyKind::Baseline)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PolicyKind::ALL
            .iter()
            .copied()
            .find(|k| k.label() == wanted)
            .ok_or_else(|| PolicyError::UnknownPolicy(s.to_string()))
    }
}

/// Build a ready-to-run policy of `kind` for `scenario`.
///
/// `initial` is Optimal's step-0 configuration; only Baseline needs it.
/// Q-learning variants train here, on their own copy of the scenario.
pub fn build_policy(
    kind: PolicyKind,
    scenario: &Scenario,
    cfg: &SimConfig,
    initial: Option<&ZoomConfig>,
) -> Result<Box<dyn ZoomPolicy>, PolicyError> {
    let zoom_counts = scenario.zoom_counts();
    let seeds = &cfg.seeds;

    let policy: Box<dyn ZoomPolicy> = match kind {
        PolicyKind::Baseline => {
            let config = initial.ok_or_else(|| PolicyError::MissingInitialConfig {
                policy: kind.label().to_string(),
            })?;
            Box::new(Baseline::new(config.clone(), &zoom_counts)?)
        }
        PolicyKind::Optimal => Box::new(Optimal::new(cfg.tie_break)),
        PolicyKind::ZoomOut => Box::new(ZoomOut::new(&zoom_counts)),
        PolicyKind::Arbitrary => Box::new(Arbitrary::new(RandomSource::new(seeds.arbitrary))),
        PolicyKind::OneHopArbitrary => Box::new(OneHopArbitrary::new(
            cfg.hop_limit,
            RandomSource::new(seeds.one_hop_arbitrary),
        )),
        PolicyKind::OneHopOptimal => Box::new(OneHopOptimal::new(cfg.hop_limit, cfg.tie_break)),
        PolicyKind::EpsilonGreedy => Box::new(EpsilonGreedy::plain(
            &zoom_counts,
            cfg.epsilon,
            RandomSource::new(seeds.egreedy),
        )),
        PolicyKind::EpsilonGreedyActual => Box::new(EpsilonGreedy::gradual(
            kind.label(),
            &zoom_counts,
            Reward::Visits,
            Credit::Applied,
            cfg.epsilon,
            cfg.hop_limit,
            RandomSource::new(seeds.egreedy),
        )),
        PolicyKind::EpsilonGreedyActualDo => Box::new(EpsilonGreedy::gradual(
            kind.label(),
            &zoom_counts,
            Reward::DetectedObjects,
            Credit::Applied,
            cfg.epsilon,
            cfg.hop_limit,
            RandomSource::new(seeds.egreedy),
        )),
        PolicyKind::EpsilonGreedyIntendedDo => Box::new(EpsilonGreedy::gradual(
            kind.label(),
            &zoom_counts,
            Reward::DetectedObjects,
            Credit::Intended,
            cfg.epsilon,
            cfg.hop_limit,
            RandomSource::new(seeds.egreedy),
        )),
        PolicyKind::QLearning => Box::new(QLearning::trained(
            kind.label(),
            scenario,
            cfg,
            TrainingExploration::Uniform,
            RandomSource::new(seeds.qlearning),
        )),
        PolicyKind::QLearningEg => Box::new(QLearning::trained(
            kind.label(),
            scenario,
            cfg,
            TrainingExploration::EpsilonGreedy(cfg.epsilon),
            RandomSource::new(seeds.qlearning),
        )),
        PolicyKind::Sarsa => Box::new(Sarsa::new(
            &zoom_counts,
            cfg.epsilon,
            RandomSource::new(seeds.sarsa),
        )),
    };

    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.label().parse::<PolicyKind>().unwrap(), kind);
        }
        assert_eq!(" ZoomOut ".parse::<PolicyKind>().unwrap(), PolicyKind::ZoomOut);
        assert!(matches!(
            "greedy".parse::<PolicyKind>(),
            Err(PolicyError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn serde_names_match_labels() {
        for kind in PolicyKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.label()));
        }
    }

    #[test]
    fn baseline_requires_initial_config() {
        let sc = Scenario::from_yaml_str(
            "scenario_id: t\nfield: {min_x: 0, min_y: 0, max_x: 10, max_y: 10}\nzooms: [1, 2]\ncameras: [{id: c, x: 0, y: 0}]\n",
        )
        .unwrap();
        let cfg = SimConfig::default();
        assert!(matches!(
            build_policy(PolicyKind::Baseline, &sc, &cfg, None),
            Err(PolicyError::MissingInitialConfig { .. })
        ));
        let p = build_policy(PolicyKind::Baseline, &sc, &cfg, Some(&ZoomConfig::new(vec![1]))).unwrap();
        assert_eq!(p.label(), "baseline");
    }
}
