// src/config.rs
//
// Central configuration for a camsim evaluation run.
//
// Defaults mirror the research harness the policies were tuned against
// (300 steps, threshold 0.3, ε = 0.1, 1000 Q-learning cycles, fixed
// per-policy seeds). Environment overrides sit between the defaults and
// explicit CLI flags:
//
//   CAMSIM_STEPS      (u32)
//   CAMSIM_THRESHOLD  (f64)
//   CAMSIM_EPSILON    (f64)
//   CAMSIM_QL_CYCLES  (u32)

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::policy::TieBreak;

pub const ENV_STEPS: &str = "CAMSIM_STEPS";
pub const ENV_THRESHOLD: &str = "CAMSIM_THRESHOLD";
pub const ENV_EPSILON: &str = "CAMSIM_EPSILON";
pub const ENV_QL_CYCLES: &str = "CAMSIM_QL_CYCLES";

/// Top-level run configuration shared by every policy in a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of simulated steps per policy run (>= 1).
    pub steps: u32,
    /// Detection confidence threshold.
    pub threshold: f64,
    /// Exploration rate for the ε-greedy family, SARSA and `qlearning-eg`.
    pub epsilon: f64,
    /// Maximum per-camera zoom change for the one-hop / gradual policies.
    pub hop_limit: usize,
    /// Which of several equally good configurations the search policies keep.
    pub tie_break: TieBreak,
    pub qlearning: QLearningConfig,
    pub seeds: SeedConfig,
}

/// Tabular Q-learning hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Training cycles; 0 leaves the table empty.
    pub cycles: u32,
    /// Learning rate α.
    pub alpha: f64,
    /// Discount γ.
    pub gamma: f64,
}

/// Per-policy seeds. Each policy owns an independently seeded stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub arbitrary: u64,
    pub one_hop_arbitrary: u64,
    pub egreedy: u64,
    pub sarsa: u64,
    pub qlearning: u64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            cycles: 1000,
            alpha: 0.1,
            gamma: 0.9,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            arbitrary: 0,
            one_hop_arbitrary: 0,
            egreedy: 9011,
            sarsa: 9011,
            qlearning: 4_112_017,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps: 300,
            threshold: 0.3,
            epsilon: 0.1,
            hop_limit: 1,
            tie_break: TieBreak::First,
            qlearning: QLearningConfig::default(),
            seeds: SeedConfig::default(),
        }
    }
}

impl SimConfig {
    /// Defaults with `CAMSIM_*` environment overrides applied.
    ///
    /// Any variable that fails to parse is ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SimConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = SimConfig::default();

        if let Some(v) = parse_override::<u32, _>(&lookup, ENV_STEPS, cfg.steps) {
            cfg.steps = v;
        }
        if let Some(v) = parse_override::<f64, _>(&lookup, ENV_THRESHOLD, cfg.threshold) {
            cfg.threshold = v;
        }
        if let Some(v) = parse_override::<f64, _>(&lookup, ENV_EPSILON, cfg.epsilon) {
            cfg.epsilon = v;
        }
        if let Some(v) = parse_override::<u32, _>(&lookup, ENV_QL_CYCLES, cfg.qlearning.cycles) {
            cfg.qlearning.cycles = v;
        }

        cfg
    }

    /// Fail fast on values no policy can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::new("steps", "must be >= 1"));
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::new("threshold", "must be finite"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::new(
                "epsilon",
                format!("must be within [0, 1], got {}", self.epsilon),
            ));
        }
        if self.hop_limit == 0 {
            return Err(ConfigError::new("hop_limit", "must be >= 1"));
        }
        let alpha = self.qlearning.alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::new(
                "qlearning.alpha",
                format!("must be within (0, 1], got {alpha}"),
            ));
        }
        if !(0.0..=1.0).contains(&self.qlearning.gamma) {
            return Err(ConfigError::new(
                "qlearning.gamma",
                format!("must be within [0, 1], got {}", self.qlearning.gamma),
            ));
        }
        Ok(())
    }
}

/// Explicit overrides, typically from CLI flags. `None` keeps the current
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub steps: Option<u32>,
    pub threshold: Option<f64>,
    pub epsilon: Option<f64>,
    pub ql_cycles: Option<u32>,
    pub hop_limit: Option<usize>,
    pub tie_break: Option<TieBreak>,
}

impl ConfigOverrides {
    /// Apply on top of `cfg` and validate the result.
    pub fn apply(&self, mut cfg: SimConfig) -> Result<SimConfig, ConfigError> {
        if let Some(v) = self.steps {
            cfg.steps = v;
        }
        if let Some(v) = self.threshold {
            cfg.threshold = v;
        }
        if let Some(v) = self.epsilon {
            cfg.epsilon = v;
        }
        if let Some(v) = self.ql_cycles {
            cfg.qlearning.cycles = v;
        }
        if let Some(v) = self.hop_limit {
            cfg.hop_limit = v;
        }
        if let Some(v) = self.tie_break {
            cfg.tie_break = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_override<T, F>(lookup: &F, key: &str, current: T) -> Option<T>
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => {
            info!(key, value = %v, "config override from environment");
            Some(v)
        }
        Err(_) => {
            warn!(key, raw = %raw, default = %current, "could not parse environment override; keeping default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_harness() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.steps, 300);
        assert_eq!(cfg.threshold, 0.3);
        assert_eq!(cfg.epsilon, 0.1);
        assert_eq!(cfg.qlearning.cycles, 1000);
        assert_eq!(cfg.seeds.egreedy, 9011);
        assert_eq!(cfg.seeds.qlearning, 4_112_017);
        assert_eq!(cfg.tie_break, TieBreak::First);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = SimConfig::from_lookup(lookup_from(&[
            (ENV_STEPS, "42"),
            (ENV_THRESHOLD, "0.25"),
            (ENV_EPSILON, " 0.2 "),
            (ENV_QL_CYCLES, "7"),
        ]));
        assert_eq!(cfg.steps, 42);
        assert_eq!(cfg.threshold, 0.25);
        assert_eq!(cfg.epsilon, 0.2);
        assert_eq!(cfg.qlearning.cycles, 7);
    }

    #[test]
    fn unparseable_env_is_ignored() {
        let cfg = SimConfig::from_lookup(lookup_from(&[(ENV_STEPS, "lots"), (ENV_EPSILON, "")]));
        assert_eq!(cfg.steps, 300);
        assert_eq!(cfg.epsilon, 0.1);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = SimConfig {
            steps: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate().unwrap_err().field, "steps");

        cfg.steps = 10;
        cfg.epsilon = 1.5;
        assert_eq!(cfg.validate().unwrap_err().field, "epsilon");

        cfg.epsilon = 0.1;
        cfg.threshold = f64::NAN;
        assert_eq!(cfg.validate().unwrap_err().field, "threshold");

        cfg.threshold = 0.3;
        cfg.qlearning.alpha = 0.0;
        assert_eq!(cfg.validate().unwrap_err().field, "qlearning.alpha");
    }

    #[test]
    fn explicit_overrides_beat_environment() {
        let from_env = SimConfig::from_lookup(lookup_from(&[(ENV_STEPS, "42"), (ENV_EPSILON, "0.3")]));
        let cfg = ConfigOverrides {
            steps: Some(7),
            tie_break: Some(TieBreak::Last),
            ..ConfigOverrides::default()
        }
        .apply(from_env)
        .unwrap();
        assert_eq!(cfg.steps, 7);
        assert_eq!(cfg.epsilon, 0.3);
        assert_eq!(cfg.tie_break, TieBreak::Last);

        let bad = ConfigOverrides {
            hop_limit: Some(0),
            ..ConfigOverrides::default()
        };
        assert_eq!(bad.apply(SimConfig::default()).unwrap_err().field, "hop_limit");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: SimConfig = serde_yaml::from_str("steps: 12\nqlearning:\n  cycles: 3\n").unwrap();
        assert_eq!(cfg.steps, 12);
        assert_eq!(cfg.qlearning.cycles, 3);
        assert_eq!(cfg.qlearning.alpha, 0.1);
        assert_eq!(cfg.seeds.sarsa, 9011);
    }
}
