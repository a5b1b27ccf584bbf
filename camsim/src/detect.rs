// src/detect.rs
//
// Detectability model.
//
// For a camera at zoom radius r and an object at distance d:
//   d > r  -> not detected
//   else   -> conf = 0.95 * (15 / (r * d)) - 0.15, detected iff conf >= threshold
//
// An object exactly on (or vanishingly close to) the camera gets the
// maximal finite confidence. The decision uses the raw confidence; `assess` reports it
// clamped at zero.

use crate::scenario::Scenario;
use crate::types::Point;

pub const CONFIDENCE_SCALE: f64 = 15.0;
pub const CONFIDENCE_GAIN: f64 = 0.95;
pub const CONFIDENCE_OFFSET: f64 = 0.15;

/// Raw detection confidence for an object `distance` away under a zoom of
/// `radius`. Does not check the field of view.
#[inline]
pub fn confidence(distance: f64, radius: f64) -> f64 {
    if distance <= 0.0 {
        return f64::MAX;
    }
    // subnormal distances overflow the quotient
    (CONFIDENCE_GAIN * (CONFIDENCE_SCALE / (radius * distance)) - CONFIDENCE_OFFSET).min(f64::MAX)
}

/// Boolean detection decision.
#[inline]
pub fn detect(camera: Point, radius: f64, object: Point, threshold: f64) -> bool {
    let d = camera.distance(&object);
    d <= radius && confidence(d, radius) >= threshold
}

/// Distance, reported confidence and decision for one camera/object pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub distance: f64,
    /// Clamped to >= 0; zero outside the field of view.
    pub confidence: f64,
    pub detected: bool,
}

pub fn assess(camera: Point, radius: f64, object: Point, threshold: f64) -> Assessment {
    let distance = camera.distance(&object);
    if distance > radius {
        return Assessment {
            distance,
            confidence: 0.0,
            detected: false,
        };
    }
    let raw = confidence(distance, radius);
    Assessment {
        distance,
        confidence: raw.max(0.0),
        detected: raw >= threshold,
    }
}

/// Per-step detection decisions for every (camera, zoom, object) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionTable {
    // detected[camera][zoom][object]
    detected: Vec<Vec<Vec<bool>>>,
    object_count: usize,
}

impl DetectionTable {
    /// Evaluate every camera at every zoom level against the current object
    /// positions.
    pub fn build(scenario: &Scenario, threshold: f64) -> Self {
        let detected = scenario
            .cameras
            .iter()
            .map(|cam| {
                cam.zooms
                    .iter()
                    .map(|&radius| {
                        scenario
                            .objects
                            .iter()
                            .map(|obj| detect(cam.position, radius, obj.position, threshold))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Self {
            detected,
            object_count: scenario.object_count(),
        }
    }

    pub fn camera_count(&self) -> usize {
        self.detected.len()
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Zoom levels of camera `n`.
    pub fn zoom_count(&self, n: usize) -> usize {
        self.detected.get(n).map_or(0, Vec::len)
    }

    pub fn zoom_counts(&self) -> Vec<usize> {
        self.detected.iter().map(Vec::len).collect()
    }

    /// Decisions of camera `n` at zoom `z`, one per object.
    pub fn row(&self, n: usize, z: usize) -> &[bool] {
        self.detected
            .get(n)
            .and_then(|zs| zs.get(z))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of objects camera `n` detects at zoom `z`.
    pub fn detected_count(&self, n: usize, z: usize) -> usize {
        self.row(n, z).iter().filter(|d| **d).count()
    }
}
