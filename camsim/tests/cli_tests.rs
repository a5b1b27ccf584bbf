// tests/cli_tests.rs
//
// Binary-level tests for `camsim` and `monte_carlo`.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::tempdir;

fn scenario(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
        .display()
        .to_string()
}

fn camsim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_camsim"))
        .args(args)
        .env_remove("CAMSIM_STEPS")
        .env_remove("CAMSIM_QL_CYCLES")
        .output()
        .expect("Failed to execute camsim binary")
}

fn monte_carlo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_monte_carlo"))
        .args(args)
        .env_remove("CAMSIM_STEPS")
        .env_remove("CAMSIM_QL_CYCLES")
        .output()
        .expect("Failed to execute monte_carlo binary")
}

#[test]
fn policies_lists_every_label() {
    let out = camsim(&["policies"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 13);
    for label in ["baseline", "optimal", "qlearning-eg", "one-hop-optimal"] {
        assert!(
            stdout.lines().any(|l| l.split_whitespace().next() == Some(label)),
            "missing {label}"
        );
    }
}

#[test]
fn run_writes_every_artifact() {
    let dir = tempdir().unwrap();
    let demo = scenario("demo.yaml");
    let out = camsim(&[
        "run",
        &demo,
        "--steps",
        "30",
        "--ql-cycles",
        "5",
        "--telemetry",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(
        out.status.success(),
        "camsim run failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("checksum="));
    assert!(stdout.contains("optimal"));

    let results = dir.path().join("demo");
    for file in ["optimal.csv", "sarsa.csv", "results.csv", "run_summary.json", "steps.jsonl"] {
        assert!(results.join(file).exists(), "missing {file}");
    }

    let optimal = fs::read_to_string(results.join("optimal.csv")).unwrap();
    assert_eq!(optimal.lines().next(), Some("optimal"));
    assert_eq!(optimal.lines().count(), 31);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(results.join("run_summary.json")).unwrap()).unwrap();
    assert_eq!(summary["scenario_id"], "demo");
    assert_eq!(summary["config"]["steps"], 30);
    assert_eq!(summary["policies"].as_array().unwrap().len(), 13);
    assert_eq!(summary["policies"][1]["ratio_to_optimal"], 1.0);
}

#[test]
fn run_selected_policies_only() {
    let dir = tempdir().unwrap();
    let demo = scenario("demo.yaml");
    let out = camsim(&[
        "run",
        &demo,
        "--steps",
        "10",
        "--policy",
        "zoomout",
        "--policy",
        "optimal",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let table = fs::read_to_string(dir.path().join("demo").join("results.csv")).unwrap();
    assert_eq!(table.lines().next(), Some("step\tzoomout\toptimal"));
    assert!(!dir.path().join("demo").join("steps.jsonl").exists());
}

#[test]
fn missing_scenario_exits_with_code_2() {
    let dir = tempdir().unwrap();
    let out = camsim(&[
        "run",
        "does/not/exist.yaml",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("exist.yaml"));
}

#[test]
fn invalid_epsilon_is_rejected() {
    let demo = scenario("single_camera.yaml");
    let out = camsim(&["run", &demo, "--epsilon", "1.5"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("epsilon"));
}

#[test]
fn unknown_policy_is_a_usage_error() {
    let demo = scenario("demo.yaml");
    let out = camsim(&["run", &demo, "--policy", "oracle"]);
    assert!(!out.status.success());
}

#[test]
fn monte_carlo_threads_do_not_change_summary() {
    let dir1 = tempdir().unwrap();
    let dir4 = tempdir().unwrap();
    let demo = scenario("demo.yaml");

    let common = ["--runs", "3", "--seed", "42", "--steps", "20", "--ql-cycles", "3", "--quiet"];
    let mut args1: Vec<&str> = vec![demo.as_str()];
    args1.extend(common);
    args1.extend(["--threads", "1", "--csv", "--output-dir", dir1.path().to_str().unwrap()]);
    let mut args4: Vec<&str> = vec![demo.as_str()];
    args4.extend(common);
    args4.extend(["--threads", "4", "--csv", "--output-dir", dir4.path().to_str().unwrap()]);

    let out1 = monte_carlo(&args1);
    assert!(out1.status.success(), "{}", String::from_utf8_lossy(&out1.stderr));
    let out4 = monte_carlo(&args4);
    assert!(out4.status.success(), "{}", String::from_utf8_lossy(&out4.stderr));

    let read = |d: &std::path::Path, f: &str| fs::read_to_string(d.join(f)).unwrap();
    let s1: serde_json::Value = serde_json::from_str(&read(dir1.path(), "mc_summary.json")).unwrap();
    let s4: serde_json::Value = serde_json::from_str(&read(dir4.path(), "mc_summary.json")).unwrap();
    assert_eq!(s1, s4);
    assert_eq!(read(dir1.path(), "mc_runs.csv"), read(dir4.path(), "mc_runs.csv"));

    assert_eq!(s1["runs"].as_array().unwrap().len(), 3);
    assert_eq!(s1["runs"][2]["motion_seed"], 44);
    let aggregate = s1["aggregate"].as_array().unwrap();
    assert_eq!(aggregate.len(), 13);
    let optimal = aggregate.iter().find(|a| a["label"] == "optimal").unwrap();
    assert_eq!(optimal["mean_k_cover"]["n"], 3);
    assert_eq!(optimal["mean_ratio_to_optimal"], 1.0);
}
