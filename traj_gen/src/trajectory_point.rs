//! # Trajectory point
//!
//! A single timestamped pose sample of a trajectory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pose reference at a given time.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Timestamp of the point.
    ///
    /// Units: seconds
    pub t: f64,

    /// Position in the inertial frame.
    ///
    /// Units: meters
    pub pos: Vector3<f64>,

    /// Rotation from the inertial frame into the body frame.
    pub rotq: UnitQuaternion<f64>,
}

/// Flat version of a `TrajectoryPoint`, suitable for CSV archives.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TrajectoryRecord {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    pub qw: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryPoint {
    pub fn new(t: f64, pos: Vector3<f64>, rotq: UnitQuaternion<f64>) -> Self {
        Self { t, pos, rotq }
    }

    /// Rotation quaternion as `[x, y, z, w]`.
    pub fn rotq_xyzw(&self) -> [f64; 4] {
        // nalgebra stores the vector part first
        let c = &self.rotq.quaternion().coords;
        [c[0], c[1], c[2], c[3]]
    }

    /// Heading (yaw) of the point in radians.
    pub fn heading(&self) -> f64 {
        self.rotq.euler_angles().2
    }

    pub fn to_record(&self) -> TrajectoryRecord {
        let [qx, qy, qz, qw] = self.rotq_xyzw();

        TrajectoryRecord {
            t: self.t,
            x: self.pos[0],
            y: self.pos[1],
            z: self.pos[2],
            qx,
            qy,
            qz,
            qw,
        }
    }
}

impl Default for TrajectoryPoint {
    fn default() -> Self {
        Self {
            t: 0.0,
            pos: Vector3::zeros(),
            rotq: UnitQuaternion::identity(),
        }
    }
}

impl From<&TrajectoryPoint> for TrajectoryRecord {
    fn from(pnt: &TrajectoryPoint) -> Self {
        pnt.to_record()
    }
}
