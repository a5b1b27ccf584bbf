// src/driver.rs
//
// Simulation driver: one loop for every policy.
//
// Per step:
//   1. build the detection table for the current object positions
//   2. ask the policy for a configuration and check it is in range
//   3. aggregate per-object counts and the k-cover
//   4. report the outcome back to the policy and to the event sink
//   5. advance every object
//
// The driver works on its own clone of the scenario, so the caller's
// scenario stays pristine and runs are independent.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::coverage::{self, CoverageSeries};
use crate::detect::DetectionTable;
use crate::error::{PolicyError, SimError};
use crate::logging::{EventSink, StepRecord};
use crate::policy::{StepOutcome, ZoomPolicy};
use crate::scenario::Scenario;
use crate::types::ZoomConfig;

/// Result of running one policy for the configured number of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRun {
    pub label: String,
    pub series: CoverageSeries,
    /// Configuration applied at step 0.
    pub initial_config: ZoomConfig,
    /// Configuration applied at every step.
    pub configs: Vec<ZoomConfig>,
    /// Wall-clock time of the run; excluded from determinism checks.
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl PolicyRun {
    pub fn total(&self) -> u64 {
        self.series.total()
    }

    pub fn mean(&self) -> f64 {
        self.series.mean()
    }
}

/// Run `policy` on a fresh copy of `scenario`.
pub fn run_policy(
    scenario: &Scenario,
    policy: &mut dyn ZoomPolicy,
    cfg: &SimConfig,
    sink: &mut dyn EventSink,
) -> Result<PolicyRun, SimError> {
    cfg.validate()?;

    let started = Instant::now();
    let label = policy.label().to_string();
    let steps = cfg.steps as usize;
    let zoom_counts = scenario.zoom_counts();

    info!(policy = %label, steps, cameras = zoom_counts.len(), objects = scenario.object_count(), "policy run started");

    let mut world = scenario.clone();
    let mut series = CoverageSeries::with_capacity(steps);
    let mut configs = Vec::with_capacity(steps);

    for step in 0..steps {
        let table = DetectionTable::build(&world, cfg.threshold);

        let config = policy.select(step, &table);
        check_config(&config, &zoom_counts)?;

        let per_object_counts = coverage::per_object_counts(&table, &config);
        let k = coverage::k_cover(&per_object_counts);
        let outcome = StepOutcome {
            per_camera_detected: coverage::per_camera_detected(&table, &config),
            per_object_counts,
            k_cover: k,
        };

        policy.observe(step, &table, &config, &outcome);
        sink.log_step(&StepRecord {
            policy: label.clone(),
            step,
            config: config.clone(),
            per_camera_detected: outcome.per_camera_detected,
            k_cover: k,
        });
        debug!(policy = %label, step, config = %config, k, "step evaluated");

        series.push(k);
        configs.push(config);
        world.advance_all();
    }

    let initial_config = configs
        .first()
        .cloned()
        .unwrap_or_else(|| ZoomConfig::new(Vec::new()));
    let elapsed_ms = started.elapsed().as_millis() as u64;

    info!(
        policy = %label,
        total = series.total(),
        mean = series.mean(),
        elapsed_ms,
        "policy run finished"
    );

    Ok(PolicyRun {
        label,
        series,
        initial_config,
        configs,
        elapsed_ms,
    })
}

fn check_config(config: &ZoomConfig, zoom_counts: &[usize]) -> Result<(), PolicyError> {
    if config.len() != zoom_counts.len() {
        return Err(PolicyError::ConfigLength {
            expected: zoom_counts.len(),
            actual: config.len(),
        });
    }
    for (camera, (&zoom, &zoom_count)) in config.as_slice().iter().zip(zoom_counts).enumerate() {
        if zoom >= zoom_count {
            return Err(PolicyError::ZoomOutOfRange {
                camera,
                zoom,
                zoom_count,
            });
        }
    }
    Ok(())
}
