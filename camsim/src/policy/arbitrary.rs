// src/policy/arbitrary.rs
//
// Random policies: unconstrained per-step draws and a bounded random walk.

use crate::detect::DetectionTable;
use crate::rng::RandomSource;
use crate::types::ZoomConfig;

use super::ZoomPolicy;

/// Each camera draws a uniform zoom index every step.
#[derive(Debug, Clone)]
pub struct Arbitrary {
    rng: RandomSource,
}

impl Arbitrary {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }
}

impl ZoomPolicy for Arbitrary {
    fn label(&self) -> &str {
        "random"
    }

    fn select(&mut self, _step: usize, table: &DetectionTable) -> ZoomConfig {
        (0..table.camera_count())
            .map(|n| self.rng.next_index(table.zoom_count(n)))
            .collect::<Vec<_>>()
            .into()
    }
}

/// Bounded random walk: each camera moves at most `hop` zoom levels per step.
///
/// Step 0 draws freely. A camera with fewer than `2 * hop + 1` zoom levels
/// cannot be meaningfully constrained and keeps drawing freely.
#[derive(Debug, Clone)]
pub struct OneHopArbitrary {
    hop: usize,
    rng: RandomSource,
    previous: Option<ZoomConfig>,
}

impl OneHopArbitrary {
    pub fn new(hop: usize, rng: RandomSource) -> Self {
        Self {
            hop,
            rng,
            previous: None,
        }
    }
}

impl ZoomPolicy for OneHopArbitrary {
    fn label(&self) -> &str {
        "one-hop-random"
    }

    fn select(&mut self, _step: usize, table: &DetectionTable) -> ZoomConfig {
        let mut zooms = Vec::with_capacity(table.camera_count());
        for n in 0..table.camera_count() {
            let zoom_count = table.zoom_count(n);
            let prev = self.previous.as_ref().and_then(|p| p.get(n));
            let z = match prev {
                Some(z) if zoom_count >= 2 * self.hop + 1 => {
                    let lo = z.saturating_sub(self.hop);
                    let hi = (z + self.hop).min(zoom_count - 1);
                    self.rng.next_index_between(lo, hi)
                }
                _ => self.rng.next_index(zoom_count),
            };
            zooms.push(z);
        }
        let config = ZoomConfig::new(zooms);
        self.previous = Some(config.clone());
        config
    }
}
