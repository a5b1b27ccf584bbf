// src/main.rs
//
// Research-harness CLI entrypoint for camsim.
//
// Subcommands:
//   camsim run <SCENARIO> [flags]   run the policy suite, write results, print
//                                   the ratio-to-optimal report
//   camsim policies                 list the policy labels
//
// Precedence: CLI flag > CAMSIM_* environment > defaults.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::error;

use camsim::config::{ConfigOverrides, SimConfig};
use camsim::logging::init_tracing;
use camsim::output::{write_results, RunSummary};
use camsim::policy::{PolicyKind, TieBreak};
use camsim::report::render_report;
use camsim::scenario::Scenario;
use camsim::suite::{run_suite, SuiteOptions};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TieBreakArg {
    First,
    Last,
}

#[derive(Debug, Parser)]
#[command(
    name = "camsim",
    about = "Camera zoom k-coverage policy evaluation (research harness)",
    version
)]
struct Cli {
    /// Verbosity: -v, -vv, -vvv
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the policy suite against a scenario file.
    Run(RunArgs),
    /// List every policy label.
    Policies,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Scenario YAML file.
    scenario: PathBuf,

    /// Steps per policy run.
    #[arg(long)]
    steps: Option<u32>,

    /// Detection confidence threshold.
    #[arg(long)]
    threshold: Option<f64>,

    /// Exploration rate for the ε-greedy family, SARSA and qlearning-eg.
    #[arg(long)]
    epsilon: Option<f64>,

    /// Q-learning training cycles.
    #[arg(long = "ql-cycles")]
    ql_cycles: Option<u32>,

    /// Maximum zoom change per step for one-hop / gradual policies.
    #[arg(long = "hop-limit")]
    hop_limit: Option<usize>,

    /// Which equally good configuration the search policies keep.
    #[arg(long = "tie-break", value_enum)]
    tie_break: Option<TieBreakArg>,

    /// Override the scenario's motion seed.
    #[arg(long = "motion-seed")]
    motion_seed: Option<u64>,

    /// Policy to run (repeatable). Defaults to every policy.
    #[arg(long = "policy", value_name = "LABEL")]
    policies: Vec<PolicyKind>,

    /// Worker threads for independent policies.
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Output directory; results land in <DIR>/<scenario_id>/.
    #[arg(long = "output-dir", default_value = "runs")]
    output_dir: PathBuf,

    /// Also write per-step telemetry (steps.jsonl).
    #[arg(long)]
    telemetry: bool,
}

impl RunArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            steps: self.steps,
            threshold: self.threshold,
            epsilon: self.epsilon,
            ql_cycles: self.ql_cycles,
            hop_limit: self.hop_limit,
            tie_break: self.tie_break.map(|t| match t {
                TieBreakArg::First => TieBreak::First,
                TieBreakArg::Last => TieBreak::Last,
            }),
        }
    }
}

fn run(args: &RunArgs) -> Result<(), camsim::SimError> {
    let cfg = args.overrides().apply(SimConfig::from_env())?;

    let mut scenario = Scenario::from_yaml_file(&args.scenario)?;
    if let Some(seed) = args.motion_seed {
        scenario = scenario.with_motion_seed(seed);
    }

    println!(
        "camsim v{} | scenario={} | cameras={} | objects={} | steps={} | threshold={} | epsilon={} | ql_cycles={} | motion_seed={}",
        env!("CARGO_PKG_VERSION"),
        scenario.id,
        scenario.camera_count(),
        scenario.object_count(),
        cfg.steps,
        cfg.threshold,
        cfg.epsilon,
        cfg.qlearning.cycles,
        scenario.motion_seed(),
    );

    let opts = SuiteOptions {
        policies: if args.policies.is_empty() {
            PolicyKind::ALL.to_vec()
        } else {
            args.policies.clone()
        },
        threads: args.threads,
        telemetry: args.telemetry,
    };

    let result = run_suite(&scenario, &cfg, &opts)?;
    let paths = write_results(&result, &args.output_dir)?;
    let summary = RunSummary::from_suite(&result);

    print!("{}", render_report(&result.ratio_rows()));
    println!("checksum={}", summary.determinism.checksum);
    println!("results={}", paths.dir.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Policies => {
            for kind in PolicyKind::ALL {
                println!("{:<16} {}", kind.label(), kind.description());
            }
            ExitCode::SUCCESS
        }
        Command::Run(args) => match run(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "run failed");
                eprintln!("camsim: {e}");
                ExitCode::from(2)
            }
        },
    }
}
