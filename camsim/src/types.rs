// src/types.rs
//
// Common shared types for the camsim evaluation core: planar geometry,
// the observed field, cameras and joint zoom configurations.

use serde::{Deserialize, Serialize};

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle the objects move inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Field {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True if `p` lies inside the field. The boundary counts as inside.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// A stationary camera with an ascending list of zoom radii.
///
/// Index 0 is the narrowest field of view (shortest range), the last index
/// the widest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub position: Point,
    pub zooms: Vec<f64>,
}

impl Camera {
    pub fn new(id: impl Into<String>, position: Point, zooms: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            position,
            zooms,
        }
    }

    pub fn zoom_count(&self) -> usize {
        self.zooms.len()
    }

    /// Radius for zoom index `z`, if in range.
    pub fn radius(&self, z: usize) -> Option<f64> {
        self.zooms.get(z).copied()
    }

    /// Index of the widest zoom level.
    pub fn widest(&self) -> usize {
        self.zooms.len().saturating_sub(1)
    }
}

/// One zoom index per camera, in camera order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoomConfig(Vec<usize>);

impl ZoomConfig {
    pub fn new(zooms: Vec<usize>) -> Self {
        Self(zooms)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zoom index of camera `n`.
    pub fn get(&self, n: usize) -> Option<usize> {
        self.0.get(n).copied()
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }

    /// Mixed-radix encoding: digit `n` has place value `Π_{k<n} radices[k]`.
    ///
    /// With a uniform zoom count `Z` this is `Σ z_n · Z^n`. `None` when the
    /// code does not fit in a `u64` (e.g. 41+ cameras with 3 zoom levels).
    pub fn encode(&self, radices: &[usize]) -> Option<u64> {
        let mut code = 0u64;
        let mut place = Some(1u64);
        for (z, radix) in self.0.iter().zip(radices) {
            if *z > 0 {
                code = code.checked_add((*z as u64).checked_mul(place?)?)?;
            }
            place = place.and_then(|p| p.checked_mul(*radix as u64));
        }
        Some(code)
    }

    /// Inverse of [`ZoomConfig::encode`].
    pub fn decode(mut code: u64, radices: &[usize]) -> Self {
        let mut zooms = Vec::with_capacity(radices.len());
        for radix in radices {
            let radix = (*radix as u64).max(1);
            zooms.push((code % radix) as usize);
            code /= radix;
        }
        Self(zooms)
    }

    /// Largest per-camera index difference to `other` (Chebyshev distance).
    pub fn chebyshev_distance(&self, other: &ZoomConfig) -> usize {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.abs_diff(*b))
            .max()
            .unwrap_or(0)
    }
}

impl From<Vec<usize>> for ZoomConfig {
    fn from(v: Vec<usize>) -> Self {
        Self(v)
    }
}

impl std::fmt::Display for ZoomConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, z) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{z}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn field_boundary_is_inside() {
        let f = Field::new(0.0, 0.0, 10.0, 5.0);
        assert!(f.contains(&Point::new(0.0, 0.0)));
        assert!(f.contains(&Point::new(10.0, 5.0)));
        assert!(!f.contains(&Point::new(10.000001, 2.0)));
        assert!(!f.contains(&Point::new(3.0, -0.1)));
        assert_eq!(f.width(), 10.0);
        assert_eq!(f.height(), 5.0);
    }

    #[test]
    fn uniform_radix_matches_powers() {
        // digit n weighted by 3^n
        let cfg = ZoomConfig::new(vec![2, 0, 1]);
        assert_eq!(cfg.encode(&[3, 3, 3]), Some(11));
        assert_eq!(ZoomConfig::decode(11, &[3, 3, 3]), cfg);
    }

    #[test]
    fn mixed_radix_decode() {
        // radices 2, 3: code = z0 + 2*z1
        assert_eq!(ZoomConfig::decode(5, &[2, 3]).as_slice(), &[1, 2]);
        assert_eq!(ZoomConfig::new(vec![1, 2]).encode(&[2, 3]), Some(5));
    }

    #[test]
    fn encode_reports_overflow() {
        let radices = vec![3; 45];
        let mut zooms = vec![0; 45];
        assert_eq!(ZoomConfig::new(zooms.clone()).encode(&radices), Some(0));
        zooms[44] = 2;
        assert_eq!(ZoomConfig::new(zooms).encode(&radices), None);
        // 3^40 still fits
        let mut zooms = vec![0; 41];
        zooms[40] = 1;
        assert_eq!(ZoomConfig::new(zooms).encode(&[3; 41]), Some(3u64.pow(40)));
    }

    #[test]
    fn chebyshev() {
        let a = ZoomConfig::new(vec![0, 2, 1]);
        let b = ZoomConfig::new(vec![1, 2, 3]);
        assert_eq!(a.chebyshev_distance(&b), 2);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn display_and_widest() {
        assert_eq!(ZoomConfig::new(vec![1, 0, 2]).to_string(), "[1,0,2]");
        let cam = Camera::new("c", Point::new(0.0, 0.0), vec![1.0, 2.0, 3.0]);
        assert_eq!(cam.widest(), 2);
        assert_eq!(cam.radius(1), Some(2.0));
        assert_eq!(cam.radius(3), None);
    }
}
