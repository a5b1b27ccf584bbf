// src/scenario.rs
//
// Scenario description and the live scenario a policy run mutates.
//
// A scenario file (YAML) defines:
// - scenario_id for tracking
// - the field rectangle objects move in
// - a shared zoom list plus cameras (optionally overriding the zoom list)
// - heading-mode objects
// - "add object" events introducing waypoint-mode objects
// - the motion seed for boundary-bounce randomness
//
// `ScenarioSpec` is the serde shape; `Scenario` is the validated, runnable
// form. Every policy run works on its own clone of a pristine `Scenario`,
// motion random source included, so runs never see each other's state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::motion::{Motion, TrackedObject};
use crate::rng::RandomSource;
use crate::types::{Camera, Field, Point};

/// Camera entry in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Per-camera zoom radii; falls back to the scenario-wide list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zooms: Option<Vec<f64>>,
}

/// Heading-mode object entry in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Radians from +y towards +x.
    pub heading: f64,
    pub speed: f64,
}

/// Scenario event. Only `participant: object, event: add` is acted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub participant: String,
    pub event: String,
    pub name: String,
    #[serde(default)]
    pub timestep: u32,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub waypoints: Vec<Point>,
}

impl EventSpec {
    fn adds_object(&self) -> bool {
        self.participant == "object" && self.event == "add"
    }
}

/// Serialized scenario shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_id: String,
    pub field: Field,
    /// Scenario-wide zoom radii, narrowest first.
    #[serde(default)]
    pub zooms: Vec<f64>,
    pub cameras: Vec<CameraSpec>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
    #[serde(default)]
    pub motion_seed: u64,
}

impl ScenarioSpec {
    /// Load a scenario from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| ScenarioError::Io {
            path: path.as_ref().display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a scenario from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_yaml::from_str(yaml).map_err(|e| ScenarioError::Parse {
            message: e.to_string(),
        })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate the scenario specification.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.scenario_id.trim().is_empty() {
            return Err(ScenarioError::validation(
                "scenario_id",
                "scenario_id cannot be empty",
            ));
        }

        validate_field(&self.field)?;

        if self.cameras.is_empty() {
            return Err(ScenarioError::validation(
                "cameras",
                "at least one camera is required",
            ));
        }
        for (i, cam) in self.cameras.iter().enumerate() {
            if !(cam.x.is_finite() && cam.y.is_finite()) {
                return Err(ScenarioError::validation(
                    format!("cameras[{i}]"),
                    "position must be finite",
                ));
            }
            let zooms = cam.zooms.as_ref().unwrap_or(&self.zooms);
            let field = if cam.zooms.is_some() {
                format!("cameras[{i}].zooms")
            } else {
                "zooms".to_string()
            };
            validate_zooms(&field, zooms)?;
        }

        for (i, obj) in self.objects.iter().enumerate() {
            let field = format!("objects[{i}]");
            if !(obj.x.is_finite() && obj.y.is_finite() && obj.heading.is_finite()) {
                return Err(ScenarioError::validation(
                    field,
                    "position and heading must be finite",
                ));
            }
            validate_speed(&field, obj.speed)?;
            if !self.field.contains(&Point::new(obj.x, obj.y)) {
                return Err(ScenarioError::validation(field, "object starts outside the field"));
            }
        }

        for (i, ev) in self.events.iter().enumerate() {
            if !ev.adds_object() {
                continue;
            }
            let field = format!("events[{i}]");
            validate_speed(&field, ev.speed)?;
            if ev.waypoints.is_empty() {
                return Err(ScenarioError::validation(
                    format!("{field}.waypoints"),
                    "waypoint list cannot be empty",
                ));
            }
            if ev.waypoints.iter().any(|p| !p.is_finite()) {
                return Err(ScenarioError::validation(
                    format!("{field}.waypoints"),
                    "waypoints must be finite",
                ));
            }
        }

        Ok(())
    }
}

fn validate_field(field: &Field) -> Result<(), ScenarioError> {
    let finite = [field.min_x, field.min_y, field.max_x, field.max_y]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(ScenarioError::validation("field", "bounds must be finite"));
    }
    if field.width() <= 0.0 || field.height() <= 0.0 {
        return Err(ScenarioError::validation(
            "field",
            "min must be strictly below max on both axes",
        ));
    }
    Ok(())
}

fn validate_zooms(field: &str, zooms: &[f64]) -> Result<(), ScenarioError> {
    if zooms.is_empty() {
        return Err(ScenarioError::validation(field, "at least one zoom radius is required"));
    }
    if zooms.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        return Err(ScenarioError::validation(
            field,
            "zoom radii must be finite and > 0",
        ));
    }
    if zooms.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ScenarioError::validation(
            field,
            "zoom radii must be strictly ascending",
        ));
    }
    Ok(())
}

fn validate_speed(field: &str, speed: f64) -> Result<(), ScenarioError> {
    if !speed.is_finite() || speed < 0.0 {
        return Err(ScenarioError::validation(
            format!("{field}.speed"),
            "speed must be finite and >= 0",
        ));
    }
    Ok(())
}

/// Checks a constructed object against `field`.
///
/// Heading objects must start inside the field, since a move is only undone
/// relative to the current position. Waypoint objects need a non-empty,
/// finite loop and an in-range target index.
fn validate_object(field_name: &str, obj: &TrackedObject, field: &Field) -> Result<(), ScenarioError> {
    if !obj.position.is_finite() {
        return Err(ScenarioError::validation(field_name, "position must be finite"));
    }
    validate_speed(field_name, obj.speed)?;
    match &obj.motion {
        Motion::Heading { heading } => {
            if !heading.is_finite() {
                return Err(ScenarioError::validation(field_name, "heading must be finite"));
            }
            if !field.contains(&obj.position) {
                return Err(ScenarioError::validation(field_name, "object starts outside the field"));
            }
        }
        Motion::Waypoints { points, next } => {
            let waypoints = format!("{field_name}.waypoints");
            if points.is_empty() {
                return Err(ScenarioError::validation(waypoints, "waypoint list cannot be empty"));
            }
            if points.iter().any(|p| !p.is_finite()) {
                return Err(ScenarioError::validation(waypoints, "waypoints must be finite"));
            }
            if *next >= points.len() {
                return Err(ScenarioError::validation(
                    waypoints,
                    format!("next waypoint {next} out of range for {} waypoints", points.len()),
                ));
            }
        }
    }
    Ok(())
}

/// Runnable scenario: geometry plus the mutable object set.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub id: String,
    pub field: Field,
    pub cameras: Vec<Camera>,
    pub objects: Vec<TrackedObject>,
    motion_rng: RandomSource,
}

impl Scenario {
    /// Build a scenario directly from its parts.
    pub fn new(
        id: impl Into<String>,
        field: Field,
        cameras: Vec<Camera>,
        objects: Vec<TrackedObject>,
        motion_seed: u64,
    ) -> Result<Self, ScenarioError> {
        validate_field(&field)?;
        for (i, cam) in cameras.iter().enumerate() {
            validate_zooms(&format!("cameras[{i}].zooms"), &cam.zooms)?;
        }
        for (i, obj) in objects.iter().enumerate() {
            validate_object(&format!("objects[{i}]"), obj, &field)?;
        }
        Ok(Self {
            id: id.into(),
            field,
            cameras,
            objects,
            motion_rng: RandomSource::new(motion_seed),
        })
    }

    /// Build from a validated spec. Event objects follow heading objects in
    /// file order.
    pub fn from_spec(spec: &ScenarioSpec) -> Result<Self, ScenarioError> {
        spec.validate()?;

        let cameras = spec
            .cameras
            .iter()
            .map(|c| {
                Camera::new(
                    c.id.clone(),
                    Point::new(c.x, c.y),
                    c.zooms.clone().unwrap_or_else(|| spec.zooms.clone()),
                )
            })
            .collect();

        let mut objects: Vec<TrackedObject> = spec
            .objects
            .iter()
            .map(|o| TrackedObject::with_heading(o.id.clone(), Point::new(o.x, o.y), o.heading, o.speed))
            .collect();

        for (i, ev) in spec.events.iter().enumerate() {
            if !ev.adds_object() {
                continue;
            }
            let obj = TrackedObject::with_waypoints(ev.name.clone(), ev.waypoints.clone(), ev.speed)
                .ok_or_else(|| {
                    ScenarioError::validation(
                        format!("events[{i}].waypoints"),
                        "waypoint list cannot be empty",
                    )
                })?;
            objects.push(obj);
        }

        Self::new(
            spec.scenario_id.clone(),
            spec.field,
            cameras,
            objects,
            spec.motion_seed,
        )
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        Self::from_spec(&ScenarioSpec::from_yaml_file(path)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScenarioError> {
        Self::from_spec(&ScenarioSpec::from_yaml_str(yaml)?)
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Zoom count of each camera, in camera order.
    pub fn zoom_counts(&self) -> Vec<usize> {
        self.cameras.iter().map(Camera::zoom_count).collect()
    }

    /// Same scenario with a different motion seed.
    pub fn with_motion_seed(mut self, seed: u64) -> Self {
        self.motion_rng = RandomSource::new(seed);
        self
    }

    pub fn motion_seed(&self) -> u64 {
        self.motion_rng.seed()
    }

    /// Advance every object by one step, in list order.
    pub fn advance_all(&mut self) {
        let field = self.field;
        for obj in &mut self.objects {
            obj.advance(&field, &mut self.motion_rng);
        }
    }
}
