// src/output.rs
//
// Result sink.
//
// Layout under <output_dir>/<scenario_id>/:
//   <label>.csv       header line = label, then one k-cover per line
//   results.csv       tab-separated; `step` column then one column per policy
//   run_summary.json  config, per-policy totals, ratios, determinism checksum
//   steps.jsonl       per-step telemetry (only when recorded)
//
// Files are written atomically (temp file + rename).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::SimConfig;
use crate::driver::PolicyRun;
use crate::error::SimError;
use crate::logging::{EventSink, JsonlSink};
use crate::report::RatioRow;
use crate::suite::SuiteResult;
use crate::types::ZoomConfig;

/// Current run summary schema version.
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

pub const RESULTS_FILE: &str = "results.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";
pub const STEPS_FILE: &str = "steps.jsonl";

/// Per-policy entry of the run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySummary {
    pub label: String,
    pub total: u64,
    pub mean: f64,
    pub initial_config: ZoomConfig,
    pub ratio_to_optimal: Option<f64>,
    pub elapsed_ms: u64,
}

/// Determinism information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismInfo {
    /// SHA-256 over every label and series.
    pub checksum: String,
}

/// Machine-readable summary of one suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub scenario_id: String,
    pub motion_seed: u64,
    pub config: SimConfig,
    pub policies: Vec<PolicySummary>,
    pub determinism: DeterminismInfo,
}

impl RunSummary {
    pub fn from_suite(result: &SuiteResult) -> Self {
        let rows = result.ratio_rows();
        let policies = result
            .runs
            .iter()
            .zip(rows)
            .map(|(run, row): (&PolicyRun, RatioRow)| PolicySummary {
                label: row.label,
                total: row.total,
                mean: row.mean,
                initial_config: run.initial_config.clone(),
                ratio_to_optimal: row.ratio_to_optimal,
                elapsed_ms: run.elapsed_ms,
            })
            .collect();

        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            scenario_id: result.scenario_id.clone(),
            motion_seed: result.motion_seed,
            config: result.config.clone(),
            policies,
            determinism: DeterminismInfo {
                checksum: compute_checksum(result.motion_seed, &result.runs),
            },
        }
    }
}

/// Checksum of the deterministic part of a suite run.
///
/// Covers the motion seed and, per run in order, the label and every
/// k-cover value. Timing is excluded.
pub fn compute_checksum(motion_seed: u64, runs: &[PolicyRun]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(motion_seed.to_le_bytes());
    for run in runs {
        hasher.update(run.label.as_bytes());
        hasher.update([0u8]);
        hasher.update((run.series.len() as u64).to_le_bytes());
        for k in run.series.values() {
            hasher.update((*k as u64).to_le_bytes());
        }
    }
    hex_encode(&hasher.finalize())
}

/// `<label>.csv` contents.
pub fn render_series_csv(run: &PolicyRun) -> String {
    let mut out = String::with_capacity(run.series.len() * 3 + run.label.len() + 1);
    out.push_str(&run.label);
    out.push('\n');
    for k in run.series.values() {
        out.push_str(&k.to_string());
        out.push('\n');
    }
    out
}

/// `results.csv` contents: one row per step, one column per policy.
pub fn render_results_table(runs: &[PolicyRun]) -> String {
    let mut out = String::from("step");
    for run in runs {
        out.push('\t');
        out.push_str(&run.label);
    }
    out.push('\n');

    let steps = runs.iter().map(|r| r.series.len()).max().unwrap_or(0);
    for step in 0..steps {
        out.push_str(&step.to_string());
        for run in runs {
            out.push('\t');
            if let Some(k) = run.series.get(step) {
                out.push_str(&k.to_string());
            }
        }
        out.push('\n');
    }
    out
}

/// Paths written by [`write_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub series: Vec<PathBuf>,
    pub results: PathBuf,
    pub summary: PathBuf,
    pub steps: Option<PathBuf>,
}

/// Persist every artifact of `result` under `<output_dir>/<scenario_id>/`.
pub fn write_results(result: &SuiteResult, output_dir: &Path) -> Result<OutputPaths, SimError> {
    let dir = output_dir.join(&result.scenario_id);
    fs::create_dir_all(&dir).map_err(|e| SimError::io(&dir, e))?;

    let mut series = Vec::with_capacity(result.runs.len());
    for run in &result.runs {
        let path = dir.join(format!("{}.csv", run.label));
        atomic_write(&path, render_series_csv(run).as_bytes()).map_err(|e| SimError::io(&path, e))?;
        series.push(path);
    }

    let results = dir.join(RESULTS_FILE);
    atomic_write(&results, render_results_table(&result.runs).as_bytes())
        .map_err(|e| SimError::io(&results, e))?;

    let summary = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&RunSummary::from_suite(result)).map_err(|e| {
        SimError::Serialize {
            what: SUMMARY_FILE.to_string(),
            message: e.to_string(),
        }
    })?;
    atomic_write(&summary, json.as_bytes()).map_err(|e| SimError::io(&summary, e))?;

    let steps = if result.telemetry.is_empty() {
        None
    } else {
        let path = dir.join(STEPS_FILE);
        let mut sink = JsonlSink::create(&path).map_err(|e| SimError::io(&path, e))?;
        for record in &result.telemetry {
            sink.log_step(record);
        }
        sink.flush().map_err(|e| SimError::io(&path, e))?;
        if sink.failed_writes() > 0 {
            return Err(SimError::Serialize {
                what: STEPS_FILE.to_string(),
                message: format!("{} records could not be written", sink.failed_writes()),
            });
        }
        Some(path)
    };

    info!(dir = %dir.display(), files = series.len() + 2, "results written");

    Ok(OutputPaths {
        dir,
        series,
        results,
        summary,
        steps,
    })
}

/// Write a file atomically (temp file + rename).
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_name = format!(
        ".tmp_{}_{}",
        std::process::id(),
        path.file_name()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    );
    let temp_path = parent.join(&temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
