//! camsim core library.
//!
//! Evaluates strategies for setting the zoom of a fixed set of stationary
//! cameras watching moving objects, scored by k-coverage: the minimum, over
//! objects, of the number of cameras that confidently detect the object at a
//! given step. The binaries (`src/main.rs`, `src/bin/monte_carlo.rs`) are thin
//! research harnesses around these components.
//!
//! # Architecture
//!
//! - **Model** (`types`, `motion`, `scenario`, `detect`, `coverage`): planar
//!   geometry, the object motion model, YAML scenarios, the detectability
//!   function and the per-step k-cover aggregation.
//!
//! - **Policies** (`policy`): every zoom strategy behind the `ZoomPolicy`
//!   trait; static baselines, random walks, exhaustive and one-hop search,
//!   ε-greedy bandits, tabular Q-learning and SARSA.
//!
//! - **Driver** (`driver`, `suite`): one select / detect / aggregate /
//!   observe / advance loop, and a suite runner that evaluates many policies
//!   against independent copies of one scenario, optionally in parallel.
//!
//! - **Results** (`output`, `report`, `metrics`): CSV / JSON artifacts with a
//!   determinism checksum, the ratio-to-optimal report, and aggregate
//!   statistics for multi-seed runs.
//!
//! Every source of randomness is an explicitly seeded `RandomSource`, so a
//! scenario plus a `SimConfig` fully determines every series.

pub mod config;
pub mod coverage;
pub mod detect;
pub mod driver;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod motion;
pub mod output;
pub mod policy;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod suite;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use config::SimConfig;
pub use coverage::CoverageSeries;
pub use detect::{assess, detect, Assessment, DetectionTable};
pub use driver::{run_policy, PolicyRun};
pub use error::{ConfigError, PolicyError, ScenarioError, SimError};
pub use logging::{EventSink, JsonlSink, MemorySink, NoopSink, StepRecord};
pub use motion::{Motion, TrackedObject};
pub use output::{write_results, RunSummary};
pub use policy::{build_policy, PolicyKind, StepOutcome, TieBreak, ZoomPolicy};
pub use report::{ratio_report, ratio_rows, render_report, RatioRow};
pub use rng::RandomSource;
pub use scenario::{Scenario, ScenarioSpec};
pub use suite::{run_suite, SuiteOptions, SuiteResult};
pub use types::{Camera, Field, Point, ZoomConfig};
