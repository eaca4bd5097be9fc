//! # Trajectory generation library
//!
//! Converts an ordered set of waypoints into a continuous, time parametrised
//! path giving a reference position and orientation at any time of a
//! mission.
//!
//! ```no_run
//! use traj_lib::{LinearInterpolator, PathGenerator, Waypoint, WaypointSet};
//!
//! let mut waypoints = WaypointSet::new();
//! waypoints.add_waypoint(Waypoint::new(0.0, 0.0, -1.0, 0.5, 0.0));
//! waypoints.add_waypoint(Waypoint::new(5.0, 2.0, -2.0, 0.5, 0.0));
//! waypoints.add_waypoint(Waypoint::new(8.0, 0.0, -2.0, 0.5, 0.3));
//!
//! let mut interp = LinearInterpolator::new();
//! interp.init_waypoints(waypoints).unwrap();
//! interp.init_interpolator().unwrap();
//!
//! // Coarse positions along the path
//! let pnts: Vec<_> = interp.get_samples(None, 0.01).unwrap().collect();
//!
//! // Full pose reference at a given time
//! let reference = interp.generate_reference(4.0).unwrap();
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Arc-length reparametrisation of a multi-segment path
pub mod arc_length;

/// Smooth interpolation of the waypoint heading offsets
pub mod heading_spline;

/// Generator parameters, loaded from parameter files
pub mod params;

/// The path generator contract and its strategies
pub mod path_generator;

/// Segment primitives
pub mod segment;

/// Timestamped pose samples
pub mod trajectory_point;

/// Waypoint input data
pub mod waypoint;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use arc_length::ArcLengthTable;
pub use heading_spline::HeadingSpline;
pub use params::GeneratorParams;
pub use path_generator::{
    create_path_generator, GeneratorSettings, LinearInterpolator, MissionDuration, PathError,
    PathGenerator, Samples, DEFAULT_S_STEP, INTERPOLATORS,
};
pub use segment::{LineSegment, Segment};
pub use trajectory_point::{TrajectoryPoint, TrajectoryRecord};
pub use waypoint::{Waypoint, WaypointLoadError, WaypointSet};
