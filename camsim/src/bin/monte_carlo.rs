// src/bin/monte_carlo.rs
//
// Multi-seed harness: rerun the policy suite over a range of motion seeds
// and aggregate each policy's mean k-cover.
//
// Run i uses motion seed `seed + i`; policy seeds stay fixed, so the spread
// across runs reflects object motion only.
//
// Run examples:
//   cargo run --bin monte_carlo -- scenarios/demo.yaml --runs 20 --seed 1
//   CAMSIM_STEPS=100 cargo run --bin monte_carlo -- scenarios/demo.yaml --policy optimal --policy random --threads 4
//
// Output (under --output-dir):
//   mc_summary.json   config, per-run means, per-policy aggregate statistics
//   mc_runs.csv       one row per run, one column per policy (with --csv)

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{error, info};

use camsim::config::{ConfigOverrides, SimConfig};
use camsim::logging::init_tracing;
use camsim::metrics::{p05_p50_p95, OnlineStats, StatsSummary};
use camsim::output::atomic_write;
use camsim::policy::PolicyKind;
use camsim::scenario::Scenario;
use camsim::suite::{run_suite, SuiteOptions};
use camsim::SimError;

const MC_SCHEMA_VERSION: u32 = 1;
const MC_SUMMARY_FILE: &str = "mc_summary.json";
const MC_RUNS_FILE: &str = "mc_runs.csv";

#[derive(Debug, Parser)]
#[command(
    name = "monte_carlo",
    about = "Multi-seed k-coverage evaluation across motion seeds",
    version
)]
struct Args {
    /// Scenario YAML file.
    scenario: PathBuf,

    /// Number of runs.
    #[arg(long, default_value_t = 10)]
    runs: u64,

    /// Base motion seed. Run i uses seed + i.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long)]
    steps: Option<u32>,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    epsilon: Option<f64>,

    #[arg(long = "ql-cycles")]
    ql_cycles: Option<u32>,

    /// Policy to run (repeatable). Defaults to every policy.
    #[arg(long = "policy", value_name = "LABEL")]
    policies: Vec<PolicyKind>,

    /// Worker threads for independent policies within a run.
    #[arg(long, default_value_t = 1)]
    threads: usize,

    #[arg(long = "output-dir", default_value = "runs/monte_carlo")]
    output_dir: PathBuf,

    /// Also write mc_runs.csv.
    #[arg(long)]
    csv: bool,

    /// Suppress per-run lines; only print the final summary.
    #[arg(long)]
    quiet: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct McConfig {
    scenario_id: String,
    runs: u64,
    seed: u64,
    sim: SimConfig,
}

#[derive(Debug, Serialize)]
struct McRun {
    motion_seed: u64,
    /// Mean k-cover per policy label.
    means: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
struct McPolicyAggregate {
    label: String,
    mean_k_cover: StatsSummary,
    p05: f64,
    p50: f64,
    p95: f64,
    /// Mean of the per-run ratio to optimal, over runs where it is defined.
    /// Uses the Optimal run seeding Baseline even when optimal is not
    /// requested.
    mean_ratio_to_optimal: Option<f64>,
}

#[derive(Debug, Serialize)]
struct McSummary {
    schema_version: u32,
    camsim_version: String,
    config: McConfig,
    runs: Vec<McRun>,
    aggregate: Vec<McPolicyAggregate>,
}

struct Accumulator {
    label: String,
    means: Vec<f64>,
    ratios: Vec<f64>,
}

fn run(args: &Args) -> Result<(), SimError> {
    let overrides = ConfigOverrides {
        steps: args.steps,
        threshold: args.threshold,
        epsilon: args.epsilon,
        ql_cycles: args.ql_cycles,
        ..ConfigOverrides::default()
    };
    let cfg = overrides.apply(SimConfig::from_env())?;
    let base = Scenario::from_yaml_file(&args.scenario)?;

    let opts = SuiteOptions {
        policies: if args.policies.is_empty() {
            PolicyKind::ALL.to_vec()
        } else {
            args.policies.clone()
        },
        threads: args.threads,
        telemetry: false,
    };

    println!(
        "camsim monte_carlo v{} | scenario={} | runs={} | seed={} | steps={} | policies={}",
        env!("CARGO_PKG_VERSION"),
        base.id,
        args.runs,
        args.seed,
        cfg.steps,
        opts.policies.len(),
    );

    let mut accumulators: Vec<Accumulator> = Vec::new();
    let mut run_records = Vec::with_capacity(args.runs as usize);

    for i in 0..args.runs {
        let motion_seed = args.seed.wrapping_add(i);
        let scenario = base.clone().with_motion_seed(motion_seed);
        let result = run_suite(&scenario, &cfg, &opts)?;

        let optimal_total = result.optimal_total.filter(|t| *t > 0);

        let mut means = BTreeMap::new();
        for policy_run in &result.runs {
            let idx = match accumulators.iter().position(|a| a.label == policy_run.label) {
                Some(idx) => idx,
                None => {
                    accumulators.push(Accumulator {
                        label: policy_run.label.clone(),
                        means: Vec::with_capacity(args.runs as usize),
                        ratios: Vec::with_capacity(args.runs as usize),
                    });
                    accumulators.len() - 1
                }
            };
            let acc = &mut accumulators[idx];
            let mean = policy_run.mean();
            acc.means.push(mean);
            if let Some(opt) = optimal_total {
                acc.ratios.push(policy_run.total() as f64 / opt as f64);
            }
            means.insert(policy_run.label.clone(), mean);
        }

        if !args.quiet {
            let line: Vec<String> = result
                .runs
                .iter()
                .map(|r| format!("{}={:.3}", r.label, r.mean()))
                .collect();
            println!(
                "run {:>4}/{:<4} seed={:<10} {}",
                i + 1,
                args.runs,
                motion_seed,
                line.join(" ")
            );
        }
        info!(run = i, motion_seed, "monte carlo run finished");
        run_records.push(McRun { motion_seed, means });
    }

    let aggregate: Vec<McPolicyAggregate> = accumulators
        .into_iter()
        .map(|acc| {
            let stats: OnlineStats = acc.means.iter().copied().collect();
            let ratio: OnlineStats = acc.ratios.into_iter().collect();
            let (p05, p50, p95) = p05_p50_p95(acc.means);
            McPolicyAggregate {
                label: acc.label,
                mean_k_cover: stats.summary(),
                p05,
                p50,
                p95,
                mean_ratio_to_optimal: (ratio.n() > 0).then(|| ratio.mean()),
            }
        })
        .collect();

    println!();
    println!("SUMMARY");
    println!("  runs: {}", args.runs);
    for agg in &aggregate {
        let s = &agg.mean_k_cover;
        let ratio = agg
            .mean_ratio_to_optimal
            .map(|r| format!("{r:.4}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<16} mean={:.4}  std={:.4}  min={:.4}  max={:.4}  p50={:.4}  ratio={}",
            agg.label, s.mean, s.stddev, s.min, s.max, agg.p50, ratio
        );
    }

    fs::create_dir_all(&args.output_dir).map_err(|e| SimError::io(&args.output_dir, e))?;

    if args.csv {
        let csv_path = args.output_dir.join(MC_RUNS_FILE);
        let mut csv = String::from("motion_seed");
        for agg in &aggregate {
            csv.push(',');
            csv.push_str(&agg.label);
        }
        csv.push('\n');
        for record in &run_records {
            csv.push_str(&record.motion_seed.to_string());
            for agg in &aggregate {
                csv.push(',');
                if let Some(mean) = record.means.get(&agg.label) {
                    csv.push_str(&format!("{mean:.6}"));
                }
            }
            csv.push('\n');
        }
        atomic_write(&csv_path, csv.as_bytes()).map_err(|e| SimError::io(&csv_path, e))?;
        println!("Wrote: {}", csv_path.display());
    }

    let summary = McSummary {
        schema_version: MC_SCHEMA_VERSION,
        camsim_version: env!("CARGO_PKG_VERSION").to_string(),
        config: McConfig {
            scenario_id: base.id.clone(),
            runs: args.runs,
            seed: args.seed,
            sim: cfg,
        },
        runs: run_records,
        aggregate,
    };

    let summary_path = args.output_dir.join(MC_SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&summary).map_err(|e| SimError::Serialize {
        what: MC_SUMMARY_FILE.to_string(),
        message: e.to_string(),
    })?;
    atomic_write(&summary_path, json.as_bytes()).map_err(|e| SimError::io(&summary_path, e))?;
    println!("Wrote: {}", summary_path.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "monte carlo failed");
            eprintln!("monte_carlo: {e}");
            ExitCode::from(2)
        }
    }
}
