// src/policy/fixed.rs
//
// Static policies: the same configuration every step.

use crate::detect::DetectionTable;
use crate::error::PolicyError;
use crate::types::ZoomConfig;

use super::ZoomPolicy;

/// Fixed, externally supplied configuration.
#[derive(Debug, Clone)]
pub struct Baseline {
    config: ZoomConfig,
}

impl Baseline {
    /// Validates `config` against the cameras' zoom counts.
    pub fn new(config: ZoomConfig, zoom_counts: &[usize]) -> Result<Self, PolicyError> {
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
        Ok(Self { config })
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }
}

impl ZoomPolicy for Baseline {
    fn label(&self) -> &str {
        "baseline"
    }

    fn select(&mut self, _step: usize, _table: &DetectionTable) -> ZoomConfig {
        self.config.clone()
    }
}

/// Every camera at its widest zoom.
#[derive(Debug, Clone)]
pub struct ZoomOut {
    config: ZoomConfig,
}

impl ZoomOut {
    pub fn new(zoom_counts: &[usize]) -> Self {
        let widest = zoom_counts.iter().map(|z| z.saturating_sub(1)).collect();
        Self {
            config: ZoomConfig::new(widest),
        }
    }
}

impl ZoomPolicy for ZoomOut {
    fn label(&self) -> &str {
        "zoomout"
    }

    fn select(&mut self, _step: usize, _table: &DetectionTable) -> ZoomConfig {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_validates_length_and_range() {
        assert!(Baseline::new(ZoomConfig::new(vec![0, 2]), &[3, 3]).is_ok());
        assert_eq!(
            Baseline::new(ZoomConfig::new(vec![0]), &[3, 3]).unwrap_err(),
            PolicyError::ConfigLength {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            Baseline::new(ZoomConfig::new(vec![0, 3]), &[3, 3]).unwrap_err(),
            PolicyError::ZoomOutOfRange {
                camera: 1,
                zoom: 3,
                zoom_count: 3
            }
        );
    }

    #[test]
    fn zoomout_picks_widest_per_camera() {
        let p = ZoomOut::new(&[3, 2, 1]);
        assert_eq!(p.config.as_slice(), &[2, 1, 0]);
    }
}
