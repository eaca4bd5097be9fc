//! # Path generators
//!
//! A path generator turns a `WaypointSet` into a continuous path, queried
//! through the normalised curve parameter `s` in [0, 1] or through time.
//!
//! Using a generator is a two step process:
//!
//! 1. Hand it the waypoints with `init_waypoints`.
//! 2. Compile the path with `init_interpolator`.
//!
//! After that positions, orientations and full trajectory points can be
//! queried. Replacing the waypoints requires compiling again.
//!
//! Strategies differ only in how they build segments and interpolate within
//! them, they all implement the `PathGenerator` trait and can be created from
//! their label with `create_path_generator`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod linear;
mod orientation;
mod samples;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;
use toml::value::Table;

// Internal
pub use linear::LinearInterpolator;
pub use orientation::{OrientationCursor, TANGENT_EPS};
pub use samples::Samples;
use crate::{TrajectoryPoint, WaypointSet};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default step in `s` used for sampling and for the tangent estimation.
pub const DEFAULT_S_STEP: f64 = 0.001;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while building or querying a path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("Attempted to initialise the waypoints with an empty set")]
    EmptyWaypointSet,

    #[error("No waypoints have been provided to the generator")]
    NoWaypoints,

    #[error("At least 2 waypoints are needed to build a path, found {0}")]
    NotEnoughWaypoints(usize),

    #[error("The path has not been initialised, call init_interpolator first")]
    NotInitialised,

    #[error("The total length of the path is zero or not finite")]
    DegeneratePath,

    #[error("Invalid mission duration: {0} s")]
    InvalidDuration(f64),

    #[error("Invalid start time: {0} s")]
    InvalidStartTime(f64),

    #[error("Invalid step in the curve parameter: {0}")]
    InvalidStep(f64),

    #[error("Cannot derive the mission duration from a mean speed of {0} m/s")]
    InvalidSpeed(f64),

    #[error("The mission duration is unbounded, time cannot be mapped onto the path")]
    UnboundedDuration,

    #[error("Unknown interpolator \"{0}\", expected one of {:?}", INTERPOLATORS)]
    UnknownInterpolator(String),

    #[error("Could not fit the heading offset spline")]
    HeadingSplineFit,
}

/// Duration of a mission.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum MissionDuration {
    /// The mission lasts for the given number of seconds.
    Finite(f64),

    /// The mission has no time limit.
    Unbounded,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Settings common to all path generators.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GeneratorSettings {
    /// Start time of the mission, `None` to start at 0 s.
    start_time_s: Option<f64>,

    /// Duration of the mission, `None` to derive it from the waypoints.
    duration: Option<MissionDuration>,

    /// Finite difference step in `s` used to estimate the path tangent.
    s_step: f64,

    /// If true orientations also pitch to follow the path.
    full_dof: bool,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract shared by all path generation strategies.
pub trait PathGenerator {
    /// Label identifying the strategy.
    fn label(&self) -> &'static str;

    /// Store the waypoints to build the path from.
    ///
    /// This does not build the path, see `init_interpolator`. Fails if the
    /// set is empty.
    fn init_waypoints(&mut self, waypoints: WaypointSet) -> Result<(), PathError>;

    fn waypoints(&self) -> Option<&WaypointSet>;

    /// Build the path from the current waypoints.
    ///
    /// Any previously built path is discarded first, so on failure the
    /// generator is left uninitialised.
    fn init_interpolator(&mut self) -> Result<(), PathError>;

    /// True if the path has been built.
    fn is_initialised(&self) -> bool;

    /// Set strategy specific parameters.
    fn set_parameters(&mut self, params: &Table) -> Result<(), PathError>;

    /// Index of the first waypoint whose arc-length position is at or after
    /// `s`.
    fn get_segment_idx(&self, s: f64) -> Result<usize, PathError>;

    /// Position on the path for the curve parameter `s`.
    ///
    /// `s` is not clamped, values outside [0, 1] extrapolate the end
    /// segments.
    fn generate_pos(&self, s: f64) -> Result<Vector3<f64>, PathError>;

    /// Orientation on the path for the curve parameter `s`.
    ///
    /// `s` is clamped into [0, 1]. This updates the generator's orientation
    /// cursor, see `last_orientation`.
    fn generate_quat(&mut self, s: f64) -> Result<UnitQuaternion<f64>, PathError>;

    /// The orientation returned by the last call to `generate_quat`.
    fn last_orientation(&self) -> UnitQuaternion<f64>;

    /// Lazily sample the path positions from `s = 0` to `s = 1` inclusive.
    ///
    /// Only the positions of the samples are set, their time is 0 and their
    /// orientation the identity. `max_time` is accepted for strategies that
    /// bound sampling in time, the arc-length strategies ignore it.
    fn get_samples(&self, max_time: Option<f64>, step: f64) -> Result<Samples<'_>, PathError>;

    fn settings(&self) -> &GeneratorSettings;

    fn settings_mut(&mut self) -> &mut GeneratorSettings;

    /// Duration derived from the path when the last `init_interpolator`
    /// succeeded.
    fn derived_duration(&self) -> Option<f64>;

    /// Trajectory point for the curve parameter `s`, stamped with time `t`.
    ///
    /// `s` is clamped into [0, 1].
    fn generate_pnt(&mut self, s: f64, t: f64) -> Result<TrajectoryPoint, PathError> {
        let s = s.max(0.0).min(1.0);

        let pos = self.generate_pos(s)?;
        let rotq = self.generate_quat(s)?;

        Ok(TrajectoryPoint::new(t, pos, rotq))
    }

    /// Start time of the mission.
    ///
    /// If no start time was set this is 0 once the path has been built.
    fn start_time(&self) -> Option<f64> {
        match self.settings().start_time_s {
            Some(t) => Some(t),
            None if self.is_initialised() => Some(0.0),
            None => None,
        }
    }

    fn set_start_time(&mut self, start_time_s: f64) -> Result<(), PathError> {
        self.settings_mut().set_start_time(start_time_s)
    }

    /// Duration of the mission, either as set or derived from the path.
    fn duration(&self) -> Option<MissionDuration> {
        self.settings()
            .duration
            .or_else(|| self.derived_duration().map(MissionDuration::Finite))
    }

    /// Set the duration of the mission, a negative value meaning unbounded.
    fn set_duration(&mut self, duration_s: f64) -> Result<(), PathError> {
        self.settings_mut().set_duration(duration_s)
    }

    fn s_step(&self) -> f64 {
        self.settings().s_step
    }

    fn set_s_step(&mut self, s_step: f64) -> Result<(), PathError> {
        self.settings_mut().set_s_step(s_step)
    }

    fn is_full_dof(&self) -> bool {
        self.settings().full_dof
    }

    fn set_full_dof(&mut self, full_dof: bool) {
        self.settings_mut().full_dof = full_dof;
    }

    /// Map a time onto the curve parameter, clamped into [0, 1].
    fn s_from_time(&self, t: f64) -> Result<f64, PathError> {
        let start_time_s = self.start_time().ok_or(PathError::NotInitialised)?;

        match self.duration() {
            Some(MissionDuration::Finite(duration_s)) => Ok(lin_map(
                (start_time_s, start_time_s + duration_s),
                (0.0, 1.0),
                t,
            )
            .max(0.0)
            .min(1.0)),
            Some(MissionDuration::Unbounded) => Err(PathError::UnboundedDuration),
            None => Err(PathError::NotInitialised),
        }
    }

    /// Trajectory point the vehicle should be at at time `t`.
    fn generate_reference(&mut self, t: f64) -> Result<TrajectoryPoint, PathError> {
        let s = self.s_from_time(t)?;
        self.generate_pnt(s, t)
    }

    fn has_started(&self, t: f64) -> bool {
        self.start_time().map_or(false, |start_time_s| t >= start_time_s)
    }

    /// True if `t` is past the end of a finite mission.
    fn has_finished(&self, t: f64) -> bool {
        match (self.start_time(), self.duration()) {
            (Some(start_time_s), Some(MissionDuration::Finite(duration_s))) => {
                t >= start_time_s + duration_s
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MissionDuration {
    /// Build a duration from a number of seconds.
    ///
    /// Negative (or infinite) values mean unbounded, zero and NaN are
    /// rejected.
    pub fn from_seconds(duration_s: f64) -> Result<Self, PathError> {
        if duration_s.is_nan() || duration_s == 0.0 {
            Err(PathError::InvalidDuration(duration_s))
        } else if duration_s < 0.0 || duration_s.is_infinite() {
            Ok(MissionDuration::Unbounded)
        } else {
            Ok(MissionDuration::Finite(duration_s))
        }
    }

    /// The duration in seconds, or `None` if unbounded.
    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            MissionDuration::Finite(d) => Some(*d),
            MissionDuration::Unbounded => None,
        }
    }
}

impl GeneratorSettings {
    pub fn start_time_s(&self) -> Option<f64> {
        self.start_time_s
    }

    pub fn set_start_time(&mut self, start_time_s: f64) -> Result<(), PathError> {
        if !start_time_s.is_finite() || start_time_s < 0.0 {
            return Err(PathError::InvalidStartTime(start_time_s));
        }

        self.start_time_s = Some(start_time_s);
        Ok(())
    }

    pub fn duration(&self) -> Option<MissionDuration> {
        self.duration
    }

    pub fn set_duration(&mut self, duration_s: f64) -> Result<(), PathError> {
        self.duration = Some(MissionDuration::from_seconds(duration_s)?);
        Ok(())
    }

    pub fn s_step(&self) -> f64 {
        self.s_step
    }

    pub fn set_s_step(&mut self, s_step: f64) -> Result<(), PathError> {
        if !s_step.is_finite() || s_step <= 0.0 {
            return Err(PathError::InvalidStep(s_step));
        }

        self.s_step = s_step;
        Ok(())
    }

    pub fn full_dof(&self) -> bool {
        self.full_dof
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            start_time_s: None,
            duration: None,
            s_step: DEFAULT_S_STEP,
            full_dof: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Labels of all available strategies.
pub const INTERPOLATORS: &[&str] = &[LinearInterpolator::LABEL];

/// Create a new, empty path generator from its strategy label.
pub fn create_path_generator(label: &str) -> Result<Box<dyn PathGenerator + Send>, PathError> {
    match label {
        LinearInterpolator::LABEL => Ok(Box::new(LinearInterpolator::new())),
        _ => Err(PathError::UnknownInterpolator(label.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mission_duration() {
        assert_eq!(
            MissionDuration::from_seconds(12.0),
            Ok(MissionDuration::Finite(12.0))
        );
        assert_eq!(
            MissionDuration::from_seconds(-1.0),
            Ok(MissionDuration::Unbounded)
        );
        assert_eq!(
            MissionDuration::from_seconds(0.0),
            Err(PathError::InvalidDuration(0.0))
        );
        assert!(MissionDuration::from_seconds(std::f64::NAN).is_err());
        assert_eq!(MissionDuration::Unbounded.as_seconds(), None);
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = GeneratorSettings::default();
        assert_eq!(settings.s_step(), DEFAULT_S_STEP);

        assert_eq!(
            settings.set_start_time(-1.0),
            Err(PathError::InvalidStartTime(-1.0))
        );
        assert_eq!(settings.start_time_s(), None);
        settings.set_start_time(5.0).unwrap();
        assert_eq!(settings.start_time_s(), Some(5.0));

        assert_eq!(settings.set_s_step(0.0), Err(PathError::InvalidStep(0.0)));
        settings.set_s_step(1e-4).unwrap();
        assert_eq!(settings.s_step(), 1e-4);

        assert!(settings.set_duration(0.0).is_err());
        assert_eq!(settings.duration(), None);
    }

    #[test]
    fn test_create_path_generator() {
        let gen = create_path_generator("linear").unwrap();
        assert_eq!(gen.label(), "linear");
        assert!(!gen.is_initialised());

        assert_eq!(
            create_path_generator("bezier").err(),
            Some(PathError::UnknownInterpolator(String::from("bezier")))
        );

        // Every listed label can be created
        for label in INTERPOLATORS {
            assert_eq!(create_path_generator(label).unwrap().label(), *label);
        }
    }

    #[test]
    fn test_unknown_interpolator_lists_labels() {
        let msg = PathError::UnknownInterpolator(String::from("bezier")).to_string();
        assert!(msg.contains("\"bezier\""));
        for label in INTERPOLATORS {
            assert!(msg.contains(label), "{} missing from \"{}\"", label, msg);
        }
    }
}
