// src/motion.rs
//
// Object motion model.
//
// An object is created in exactly one motion mode and keeps it:
// - Heading: straight-line motion with a randomised ~180° bounce off the
//   field boundary. Bounce randomness comes from the scenario's motion
//   random source, passed in explicitly.
// - Waypoints: constant-speed travel around a closed loop of waypoints.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;
use crate::types::{Field, Point};

/// Maximum extra bounce deflection either side of a straight turnaround.
pub const BOUNCE_JITTER_RAD: f64 = PI / 6.0;

/// Motion mode of a tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    /// Heading in radians, measured from the +y axis towards +x.
    Heading { heading: f64 },
    /// Closed loop of waypoints; `next` is the index currently travelled to.
    Waypoints { points: Vec<Point>, next: usize },
}

/// A moving object observed by the cameras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub id: String,
    pub position: Point,
    pub speed: f64,
    pub motion: Motion,
}

impl TrackedObject {
    /// Heading-mode object.
    pub fn with_heading(id: impl Into<String>, position: Point, heading: f64, speed: f64) -> Self {
        Self {
            id: id.into(),
            position,
            speed,
            motion: Motion::Heading { heading },
        }
    }

    /// Waypoint-mode object, placed on the first waypoint and heading for
    /// the second. Returns `None` for an empty waypoint list.
    pub fn with_waypoints(id: impl Into<String>, points: Vec<Point>, speed: f64) -> Option<Self> {
        let start = *points.first()?;
        let next = 1 % points.len();
        Some(Self {
            id: id.into(),
            position: start,
            speed,
            motion: Motion::Waypoints { points, next },
        })
    }

    /// Current heading, for heading-mode objects.
    pub fn heading(&self) -> Option<f64> {
        match self.motion {
            Motion::Heading { heading } => Some(heading),
            Motion::Waypoints { .. } => None,
        }
    }

    /// Index of the waypoint being travelled to, for waypoint-mode objects.
    pub fn next_waypoint(&self) -> Option<usize> {
        match self.motion {
            Motion::Heading { .. } => None,
            Motion::Waypoints { next, .. } => Some(next),
        }
    }

    /// Advance the object by one step.
    ///
    /// Only this object's own position / heading / waypoint index change.
    pub fn advance(&mut self, field: &Field, rng: &mut RandomSource) {
        match &mut self.motion {
            Motion::Heading { heading } => {
                let dx = heading.sin() * self.speed;
                let dy = heading.cos() * self.speed;
                let moved = Point::new(self.position.x + dx, self.position.y + dy);

                if field.contains(&moved) {
                    self.position = moved;
                } else {
                    // Undo the move (stay put) and turn around.
                    *heading += turnaround_angle(rng);
                }
            }
            Motion::Waypoints { points, next } => {
                let target = points[*next];
                let distance = self.position.distance(&target);

                if distance <= self.speed {
                    self.position = target;
                    *next = (*next + 1) % points.len();
                } else {
                    self.position.x += self.speed * (target.x - self.position.x) / distance;
                    self.position.y += self.speed * (target.y - self.position.y) / distance;
                }
            }
        }
    }
}

/// π plus a uniform offset in [-π/6, +π/6).
fn turnaround_angle(rng: &mut RandomSource) -> f64 {
    PI + (rng.next_f64() * 2.0 - 1.0) * BOUNCE_JITTER_RAD
}
