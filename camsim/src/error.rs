// src/error.rs
//
// Error types for the evaluation core.
//
// Everything here is deterministic, so no variant is retryable: a failing
// configuration or scenario fails identically on every attempt.

use thiserror::Error;

/// Invalid simulation configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration '{field}': {message}")]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while loading or validating a scenario.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file '{path}': {message}")]
    Io { path: String, message: String },
    #[error("failed to parse scenario YAML: {message}")]
    Parse { message: String },
    #[error("scenario validation error in '{field}': {message}")]
    Validation { field: String, message: String },
}

impl ScenarioError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ScenarioError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised when constructing a policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("fixed zoom configuration has {actual} entries but the scenario has {expected} cameras")]
    ConfigLength { expected: usize, actual: usize },
    #[error("zoom index {zoom} for camera {camera} is out of range (camera has {zoom_count} zoom levels)")]
    ZoomOutOfRange {
        camera: usize,
        zoom: usize,
        zoom_count: usize,
    },
    #[error("policy '{policy}' needs a step-0 configuration from the optimal policy")]
    MissingInitialConfig { policy: String },
    #[error("unknown policy '{0}'")]
    UnknownPolicy(String),
}

/// Umbrella error for running simulations and writing their results.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {what}: {message}")]
    Serialize { what: String, message: String },
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl SimError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = ConfigError::new("steps", "must be >= 1");
        assert_eq!(e.to_string(), "invalid configuration 'steps': must be >= 1");

        let e = PolicyError::ConfigLength {
            expected: 3,
            actual: 2,
        };
        assert!(e.to_string().contains("3 cameras"));

        let e: SimError = ScenarioError::validation("field", "min_x must be < max_x").into();
        assert!(e.to_string().contains("'field'"));
    }
}
