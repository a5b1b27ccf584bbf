// src/report.rs
//
// Ratio report: each policy's total coverage relative to Optimal's.
//
// ratio = Σ_t k_policy(t) / Σ_t k_optimal(t). The Optimal total may come
// from a run that is not itself reported (the one seeding Baseline). When
// Optimal was not run or covered nothing the ratio is undefined and
// reported as "n/a".

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::driver::PolicyRun;

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub label: String,
    pub total: u64,
    pub mean: f64,
    pub ratio_to_optimal: Option<f64>,
}

/// Build the report rows in run order, against the `optimal` run among
/// `runs`.
pub fn ratio_report(runs: &[PolicyRun]) -> Vec<RatioRow> {
    let optimal_total = runs
        .iter()
        .find(|r| r.label == "optimal")
        .map(PolicyRun::total);
    ratio_rows(runs, optimal_total)
}

/// Build the report rows in run order against a known Optimal total.
pub fn ratio_rows(runs: &[PolicyRun], optimal_total: Option<u64>) -> Vec<RatioRow> {
    let optimal_total = optimal_total.filter(|t| *t > 0);
    runs.iter()
        .map(|run| RatioRow {
            label: run.label.clone(),
            total: run.total(),
            mean: run.mean(),
            ratio_to_optimal: optimal_total.map(|opt| run.total() as f64 / opt as f64),
        })
        .collect()
}

/// Plain-text table for the terminal.
pub fn render_report(rows: &[RatioRow]) -> String {
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0).max("policy".len());
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>8}  {:>8}  {:>8}", "policy", "total", "mean", "ratio");
    for row in rows {
        let ratio = row
            .ratio_to_optimal
            .map(|r| format!("{r:.4}"))
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            out,
            "{:<width$}  {:>8}  {:>8.4}  {:>8}",
            row.label, row.total, row.mean, ratio
        );
    }
    out
}
