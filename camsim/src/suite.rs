// src/suite.rs
//
// Suite runner: evaluate several policies against independent copies of one
// scenario.
//
// Optimal always runs first when Baseline is requested, because Baseline is
// pinned to Optimal's step-0 configuration. The remaining policies are
// independent and may run on a rayon pool; results come back in the
// requested order and are identical to a sequential run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimConfig;
use crate::driver::{run_policy, PolicyRun};
use crate::error::SimError;
use crate::logging::{MemorySink, NoopSink, StepRecord};
use crate::policy::{build_policy, PolicyKind};
use crate::report::{ratio_rows, RatioRow};
use crate::scenario::Scenario;
use crate::types::ZoomConfig;

/// What to run and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteOptions {
    /// Policies in reporting order. Duplicates are dropped.
    pub policies: Vec<PolicyKind>,
    /// Worker threads; 0 or 1 runs sequentially.
    pub threads: usize,
    /// Keep per-step records for every run.
    pub telemetry: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            policies: PolicyKind::ALL.to_vec(),
            threads: 1,
            telemetry: false,
        }
    }
}

/// Every requested run, in requested order.
#[derive(Debug, Clone)]
pub struct SuiteResult {
    pub scenario_id: String,
    pub motion_seed: u64,
    pub config: SimConfig,
    pub runs: Vec<PolicyRun>,
    /// Total k-cover of the Optimal run, also when it only ran to seed
    /// Baseline and is not in `runs`.
    pub optimal_total: Option<u64>,
    /// Per-step records, grouped by run in the same order as `runs`.
    pub telemetry: Vec<StepRecord>,
}

impl SuiteResult {
    pub fn run(&self, label: &str) -> Option<&PolicyRun> {
        self.runs.iter().find(|r| r.label == label)
    }

    /// Ratio report rows against [`SuiteResult::optimal_total`].
    pub fn ratio_rows(&self) -> Vec<RatioRow> {
        ratio_rows(&self.runs, self.optimal_total)
    }
}

struct Finished {
    kind: PolicyKind,
    run: PolicyRun,
    records: Vec<StepRecord>,
}

fn run_one(
    kind: PolicyKind,
    scenario: &Scenario,
    cfg: &SimConfig,
    initial: Option<&ZoomConfig>,
    telemetry: bool,
) -> Result<Finished, SimError> {
    let mut policy = build_policy(kind, scenario, cfg, initial)?;
    if telemetry {
        let mut sink = MemorySink::new();
        let run = run_policy(scenario, policy.as_mut(), cfg, &mut sink)?;
        Ok(Finished {
            kind,
            run,
            records: sink.into_records(),
        })
    } else {
        let run = run_policy(scenario, policy.as_mut(), cfg, &mut NoopSink)?;
        Ok(Finished {
            kind,
            run,
            records: Vec::new(),
        })
    }
}

/// Run the suite described by `opts`.
pub fn run_suite(
    scenario: &Scenario,
    cfg: &SimConfig,
    opts: &SuiteOptions,
) -> Result<SuiteResult, SimError> {
    cfg.validate()?;

    let mut requested: Vec<PolicyKind> = Vec::with_capacity(opts.policies.len());
    for kind in &opts.policies {
        if !requested.contains(kind) {
            requested.push(*kind);
        }
    }

    info!(
        scenario = %scenario.id,
        policies = requested.len(),
        threads = opts.threads,
        steps = cfg.steps,
        "suite started"
    );

    let needs_optimal_first = requested.iter().any(PolicyKind::needs_initial_config);
    let mut finished: Vec<Finished> = Vec::with_capacity(requested.len() + 1);

    let initial = if needs_optimal_first {
        let optimal = run_one(PolicyKind::Optimal, scenario, cfg, None, opts.telemetry)?;
        let initial = optimal.run.initial_config.clone();
        finished.push(optimal);
        Some(initial)
    } else {
        None
    };

    let remaining: Vec<PolicyKind> = requested
        .iter()
        .copied()
        .filter(|k| !(needs_optimal_first && *k == PolicyKind::Optimal))
        .collect();

    let rest: Vec<Finished> = if opts.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.threads)
            .build()
            .map_err(|e| SimError::WorkerPool(e.to_string()))?;
        pool.install(|| {
            remaining
                .par_iter()
                .map(|kind| run_one(*kind, scenario, cfg, initial.as_ref(), opts.telemetry))
                .collect::<Result<Vec<_>, _>>()
        })?
    } else {
        remaining
            .iter()
            .map(|kind| run_one(*kind, scenario, cfg, initial.as_ref(), opts.telemetry))
            .collect::<Result<Vec<_>, _>>()?
    };
    finished.extend(rest);

    let optimal_total = finished
        .iter()
        .find(|f| f.kind == PolicyKind::Optimal)
        .map(|f| f.run.total());

    let mut runs = Vec::with_capacity(requested.len());
    let mut telemetry = Vec::new();
    for kind in &requested {
        if let Some(pos) = finished.iter().position(|f| f.kind == *kind) {
            let done = finished.swap_remove(pos);
            runs.push(done.run);
            telemetry.extend(done.records);
        }
    }

    info!(scenario = %scenario.id, runs = runs.len(), "suite finished");

    Ok(SuiteResult {
        scenario_id: scenario.id.clone(),
        motion_seed: scenario.motion_seed(),
        config: cfg.clone(),
        runs,
        optimal_total,
        telemetry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        Scenario::from_yaml_str(
            r#"
scenario_id: suite
field: { min_x: 0, min_y: 0, max_x: 30, max_y: 30 }
zooms: [4, 8, 16]
cameras:
  - { id: c1, x: 5, y: 5 }
  - { id: c2, x: 25, y: 25 }
objects:
  - { id: o1, x: 15, y: 15, heading: 0.3, speed: 1.0 }
  - { id: o2, x: 8, y: 20, heading: 2.1, speed: 0.7 }
"#,
        )
        .unwrap()
    }

    fn cfg() -> SimConfig {
        let mut cfg = SimConfig {
            steps: 25,
            ..SimConfig::default()
        };
        cfg.qlearning.cycles = 5;
        cfg
    }

    #[test]
    fn baseline_is_pinned_to_optimal_step_zero() {
        let opts = SuiteOptions {
            policies: vec![PolicyKind::Baseline, PolicyKind::ZoomOut],
            ..SuiteOptions::default()
        };
        let result = run_suite(&scenario(), &cfg(), &opts).unwrap();
        let labels: Vec<&str> = result.runs.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["baseline", "zoomout"]);

        let optimal = run_one(PolicyKind::Optimal, &scenario(), &cfg(), None, false).unwrap();
        let baseline = result.run("baseline").unwrap();
        assert!(baseline.configs.iter().all(|c| *c == optimal.run.initial_config));
        assert_eq!(result.optimal_total, Some(optimal.run.total()));
    }

    #[test]
    fn hidden_optimal_still_defines_ratios() {
        let mut cfg = cfg();
        cfg.threshold = -1.0;
        let opts = SuiteOptions {
            policies: vec![PolicyKind::Baseline],
            ..SuiteOptions::default()
        };
        let result = run_suite(&scenario(), &cfg, &opts).unwrap();
        assert!(result.run("optimal").is_none());

        let optimal_total = result.optimal_total.unwrap();
        assert!(optimal_total > 0);
        let rows = result.ratio_rows();
        assert_eq!(rows.len(), 1);
        let expected = result.runs[0].total() as f64 / optimal_total as f64;
        assert_eq!(rows[0].ratio_to_optimal, Some(expected));
    }

    #[test]
    fn duplicates_dropped_and_order_kept() {
        let opts = SuiteOptions {
            policies: vec![PolicyKind::Sarsa, PolicyKind::Optimal, PolicyKind::Sarsa, PolicyKind::Baseline],
            ..SuiteOptions::default()
        };
        let result = run_suite(&scenario(), &cfg(), &opts).unwrap();
        let labels: Vec<&str> = result.runs.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["sarsa", "optimal", "baseline"]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let seq = SuiteOptions {
            telemetry: true,
            ..SuiteOptions::default()
        };
        let par = SuiteOptions {
            threads: 4,
            ..seq.clone()
        };
        let a = run_suite(&scenario(), &cfg(), &seq).unwrap();
        let b = run_suite(&scenario(), &cfg(), &par).unwrap();
        assert_eq!(a.runs.len(), PolicyKind::ALL.len());
        for (x, y) in a.runs.iter().zip(&b.runs) {
            assert_eq!(x.label, y.label);
            assert_eq!(x.series, y.series);
            assert_eq!(x.configs, y.configs);
        }
        assert_eq!(a.telemetry, b.telemetry);
        assert_eq!(a.telemetry.len(), PolicyKind::ALL.len() * 25);
    }
}
