// tests/determinism_tests.rs
//
// Same scenario + same config => identical series and checksum, regardless
// of worker count.

use camsim::config::SimConfig;
use camsim::output::{compute_checksum, RunSummary};
use camsim::policy::PolicyKind;
use camsim::scenario::Scenario;
use camsim::suite::{run_suite, SuiteOptions};

const DEMO: &str = include_str!("../scenarios/demo.yaml");

fn cfg() -> SimConfig {
    let mut cfg = SimConfig {
        steps: 40,
        ..SimConfig::default()
    };
    cfg.qlearning.cycles = 10;
    cfg
}

#[test]
fn repeated_suite_runs_are_identical() {
    let scenario = Scenario::from_yaml_str(DEMO).unwrap();
    let a = run_suite(&scenario, &cfg(), &SuiteOptions::default()).unwrap();
    let b = run_suite(&scenario, &cfg(), &SuiteOptions::default()).unwrap();

    for (x, y) in a.runs.iter().zip(&b.runs) {
        assert_eq!(x.label, y.label);
        assert_eq!(x.series, y.series);
        assert_eq!(x.configs, y.configs);
    }
    assert_eq!(
        RunSummary::from_suite(&a).determinism,
        RunSummary::from_suite(&b).determinism
    );
}

#[test]
fn parallel_suite_matches_sequential() {
    let scenario = Scenario::from_yaml_str(DEMO).unwrap();
    let sequential = run_suite(&scenario, &cfg(), &SuiteOptions::default()).unwrap();
    let parallel = run_suite(
        &scenario,
        &cfg(),
        &SuiteOptions {
            threads: 4,
            telemetry: true,
            ..SuiteOptions::default()
        },
    )
    .unwrap();

    let labels = |r: &camsim::SuiteResult| r.runs.iter().map(|x| x.label.clone()).collect::<Vec<_>>();
    assert_eq!(labels(&sequential), labels(&parallel));
    assert_eq!(
        compute_checksum(sequential.motion_seed, &sequential.runs),
        compute_checksum(parallel.motion_seed, &parallel.runs)
    );
    assert_eq!(parallel.telemetry.len(), PolicyKind::ALL.len() * 40);
}

#[test]
fn motion_seed_is_part_of_the_checksum() {
    let scenario = Scenario::from_yaml_str(DEMO).unwrap();
    let opts = SuiteOptions {
        policies: vec![PolicyKind::Optimal, PolicyKind::ZoomOut],
        ..SuiteOptions::default()
    };

    let a = run_suite(&scenario, &cfg(), &opts).unwrap();
    let b = run_suite(&scenario.clone().with_motion_seed(8), &cfg(), &opts).unwrap();
    assert_eq!(a.motion_seed, 7);
    assert_eq!(b.motion_seed, 8);
    assert_ne!(
        compute_checksum(a.motion_seed, &a.runs),
        compute_checksum(b.motion_seed, &b.runs)
    );
}
