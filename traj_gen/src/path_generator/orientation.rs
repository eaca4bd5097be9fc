//! Orientation synthesis from the path tangent

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::{UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tangent components smaller than this are treated as zero.
pub const TANGENT_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Orientation state remembered between orientation queries.
///
/// The cursor is updated by every orientation query, so a generator owning
/// one must not be queried from several places at once without external
/// synchronisation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrientationCursor {
    /// Orientation returned at the very start of the path
    init_rot: UnitQuaternion<f64>,

    /// Last orientation returned, including the heading offset
    last_rot: UnitQuaternion<f64>,

    /// Last look direction, without the heading offset
    last_look_rot: UnitQuaternion<f64>,

    /// Heading of the last look direction
    last_heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OrientationCursor {
    pub fn new(init_rot: UnitQuaternion<f64>) -> Self {
        Self {
            init_rot,
            last_rot: init_rot,
            last_look_rot: init_rot,
            last_heading_rad: init_rot.euler_angles().2,
        }
    }

    pub fn init_rot(&self) -> UnitQuaternion<f64> {
        self.init_rot
    }

    pub fn last_rot(&self) -> UnitQuaternion<f64> {
        self.last_rot
    }

    /// Move the cursor back to the start of the path and return the initial
    /// orientation.
    pub fn reset(&mut self) -> UnitQuaternion<f64> {
        self.last_rot = self.init_rot;
        self.last_look_rot = self.init_rot;
        self.last_heading_rad = self.init_rot.euler_angles().2;
        self.init_rot
    }

    /// Compute the rotation looking along the tangent `d`.
    ///
    /// The heading is the angle of `d` in the XY plane. In full DOF mode the
    /// rotation is also pitched to follow the vertical component of `d`.
    /// Roll is always zero.
    ///
    /// If `d` is too small to define a direction the previous look direction
    /// is kept. If only its horizontal part is too small the previous heading
    /// is kept.
    pub fn look_rotation(&mut self, d: &Vector3<f64>, full_dof: bool) -> UnitQuaternion<f64> {
        if d.norm() < TANGENT_EPS {
            trace!("Degenerate tangent {:?}, keeping previous look direction", d);
            return self.last_look_rot;
        }

        let horizontal = d[0].hypot(d[1]);

        let heading_rad = if horizontal < TANGENT_EPS {
            trace!("Vertical tangent {:?}, keeping previous heading", d);
            self.last_heading_rad
        } else {
            d[1].atan2(d[0])
        };

        let mut rot = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), heading_rad);

        if full_dof {
            let pitch_rad = -d[2].atan2(horizontal);
            rot *= UnitQuaternion::from_axis_angle(&Vector3::y_axis(), pitch_rad);
        }

        self.last_heading_rad = heading_rad;
        self.last_look_rot = rot;
        rot
    }

    /// Compose the look direction with a heading offset about the body's
    /// vertical axis and store the result as the last orientation.
    pub fn apply_heading_offset(
        &mut self,
        look_rot: UnitQuaternion<f64>,
        heading_offset_rad: f64,
    ) -> UnitQuaternion<f64> {
        let offset_rot = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), heading_offset_rad);

        self.last_rot = look_rot * offset_rot;
        self.last_rot
    }
}

impl Default for OrientationCursor {
    fn default() -> Self {
        Self::new(UnitQuaternion::identity())
    }
}
