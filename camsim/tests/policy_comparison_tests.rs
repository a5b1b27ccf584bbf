// tests/policy_comparison_tests.rs
//
// Cross-policy properties on the demo scenario.

use camsim::config::SimConfig;
use camsim::driver::{run_policy, PolicyRun};
use camsim::logging::NoopSink;
use camsim::policy::{build_policy, Arbitrary, PolicyKind};
use camsim::rng::RandomSource;
use camsim::scenario::Scenario;
use camsim::suite::{run_suite, SuiteOptions};

const DEMO: &str = include_str!("../scenarios/demo.yaml");

fn demo() -> Scenario {
    Scenario::from_yaml_str(DEMO).unwrap()
}

fn quick_cfg() -> SimConfig {
    let mut cfg = SimConfig {
        steps: 60,
        ..SimConfig::default()
    };
    cfg.qlearning.cycles = 15;
    cfg
}

fn run_kind(kind: PolicyKind, scenario: &Scenario, cfg: &SimConfig) -> PolicyRun {
    let mut policy = build_policy(kind, scenario, cfg, None).unwrap();
    run_policy(scenario, policy.as_mut(), cfg, &mut NoopSink).unwrap()
}

#[test]
fn no_policy_beats_optimal_on_any_step() {
    let scenario = demo();
    let cfg = quick_cfg();
    let result = run_suite(&scenario, &cfg, &SuiteOptions::default()).unwrap();
    let optimal = result.run("optimal").unwrap();

    assert_eq!(result.runs.len(), PolicyKind::ALL.len());
    for run in &result.runs {
        assert_eq!(run.series.len(), cfg.steps as usize, "{}", run.label);
        for (step, (k, best)) in run
            .series
            .values()
            .iter()
            .zip(optimal.series.values())
            .enumerate()
        {
            assert!(k <= best, "{} beat optimal at step {step}", run.label);
        }
    }
}

#[test]
fn one_hop_optimal_moves_at_most_one_level() {
    let scenario = demo();
    let cfg = quick_cfg();
    let one_hop = run_kind(PolicyKind::OneHopOptimal, &scenario, &cfg);
    let optimal = run_kind(PolicyKind::Optimal, &scenario, &cfg);

    assert_eq!(one_hop.configs[0], optimal.configs[0]);
    for pair in one_hop.configs.windows(2) {
        assert!(pair[0].chebyshev_distance(&pair[1]) <= 1);
    }
    for (k, best) in one_hop.series.values().iter().zip(optimal.series.values()) {
        assert!(k <= best);
    }
}

#[test]
fn one_hop_random_moves_at_most_one_level_on_wide_cameras() {
    let scenario = demo();
    let cfg = quick_cfg();
    let run = run_kind(PolicyKind::OneHopArbitrary, &scenario, &cfg);
    // cameras 0..4 have three zoom levels; the centre camera has two and draws freely
    for pair in run.configs.windows(2) {
        for n in 0..4 {
            let (a, b) = (pair[0].get(n).unwrap(), pair[1].get(n).unwrap());
            assert!(a.abs_diff(b) <= 1);
        }
    }
}

#[test]
fn gradual_egreedy_moves_at_most_one_level() {
    let scenario = demo();
    let cfg = quick_cfg();
    for kind in [
        PolicyKind::EpsilonGreedyActual,
        PolicyKind::EpsilonGreedyActualDo,
        PolicyKind::EpsilonGreedyIntendedDo,
    ] {
        let run = run_kind(kind, &scenario, &cfg);
        for pair in run.configs.windows(2) {
            assert!(pair[0].chebyshev_distance(&pair[1]) <= 1, "{kind}");
        }
    }
}

#[test]
fn untrained_qlearning_matches_random() {
    let scenario = demo();
    let mut cfg = quick_cfg();
    cfg.qlearning.cycles = 0;
    cfg.seeds.qlearning = 77;

    let qlearning = run_kind(PolicyKind::QLearning, &scenario, &cfg);

    let mut random = Arbitrary::new(RandomSource::new(77));
    let random = run_policy(&scenario, &mut random, &cfg, &mut NoopSink).unwrap();

    assert_eq!(qlearning.configs, random.configs);
    assert_eq!(qlearning.series, random.series);
}

#[test]
fn baseline_is_pinned_to_optimal_step_zero() {
    let scenario = demo();
    let cfg = quick_cfg();
    let opts = SuiteOptions {
        policies: vec![PolicyKind::Baseline],
        ..SuiteOptions::default()
    };
    let result = run_suite(&scenario, &cfg, &opts).unwrap();
    assert_eq!(result.runs.len(), 1);

    let optimal = run_kind(PolicyKind::Optimal, &scenario, &cfg);
    let baseline = &result.runs[0];
    assert_eq!(baseline.label, "baseline");
    assert!(baseline.configs.iter().all(|c| *c == optimal.configs[0]));
    assert_eq!(baseline.series.get(0), optimal.series.get(0));
}
