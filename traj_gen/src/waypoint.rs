//! # Waypoints
//!
//! Waypoints are the input to the path generators: an ordered sequence of 3D
//! points, each with the speed the vehicle may travel at towards it and an
//! optional heading offset to apply on top of the direction of travel.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single target point of a mission.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// The position of the waypoint in the inertial frame.
    ///
    /// Units: meters
    point: Vector3<f64>,

    /// Maximum forward speed of the vehicle along the segment.
    ///
    /// Units: meters/second
    max_forward_speed: f64,

    /// Offset added to the heading derived from the direction of travel.
    ///
    /// Units: radians
    #[serde(default)]
    heading_offset: f64,
}

/// An ordered set of waypoints. The order defines the direction of the path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointSet {
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a waypoint file.
#[derive(Debug, thiserror::Error)]
pub enum WaypointLoadError {
    #[error("Cannot load the waypoint file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the waypoint file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x: f64, y: f64, z: f64, max_forward_speed: f64, heading_offset: f64) -> Self {
        Self::from_point(Vector3::new(x, y, z), max_forward_speed, heading_offset)
    }

    pub fn from_point(point: Vector3<f64>, max_forward_speed: f64, heading_offset: f64) -> Self {
        Self {
            point,
            max_forward_speed,
            heading_offset,
        }
    }

    /// Position of the waypoint in meters.
    pub fn pos(&self) -> Vector3<f64> {
        self.point
    }

    pub fn max_forward_speed(&self) -> f64 {
        self.max_forward_speed
    }

    pub fn heading_offset(&self) -> f64 {
        self.heading_offset
    }

    /// Distance between this waypoint and another one.
    pub fn dist(&self, other: &Waypoint) -> f64 {
        (other.point - self.point).norm()
    }
}

impl WaypointSet {
    /// Create a new empty set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Load a waypoint set from a TOML file containing an array of
    /// `[[waypoints]]` tables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WaypointLoadError> {
        let waypoints_str =
            std::fs::read_to_string(path).map_err(WaypointLoadError::FileLoadError)?;

        toml::from_str(&waypoints_str).map_err(WaypointLoadError::DeserialiseError)
    }

    /// Append a waypoint to the end of the set.
    pub fn add_waypoint(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub fn num_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get_waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }

    /// Length of the polyline joining all waypoints in order.
    pub fn total_length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|w| w[0].dist(&w[1]))
            .sum()
    }
}

impl<'a> IntoIterator for &'a WaypointSet {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
