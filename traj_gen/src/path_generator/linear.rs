//! Linear interpolation between waypoints

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::{UnitQuaternion, Vector3};
use std::sync::Arc;
use toml::value::Table;

// Internal
use super::{
    GeneratorSettings, MissionDuration, OrientationCursor, PathError, PathGenerator, Samples,
};
use crate::{ArcLengthTable, HeadingSpline, LineSegment, Segment, WaypointSet};
use util::maths::mean;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Path made of straight lines joining consecutive waypoints.
///
/// Cloning the interpolator shares the compiled path between the clones, each
/// clone keeping its own orientation cursor.
#[derive(Debug, Clone, Default)]
pub struct LinearInterpolator {
    waypoints: Option<WaypointSet>,

    settings: GeneratorSettings,

    /// The compiled path, `None` until `init_interpolator` succeeds.
    path: Option<Arc<LinearPath>>,

    cursor: OrientationCursor,
}

/// Read-only tables built from the waypoints.
#[derive(Debug)]
struct LinearPath {
    segments: Vec<LineSegment>,

    arc_length: ArcLengthTable,

    heading: HeadingSpline,

    /// Total length over the mean of the waypoint speeds, if it can be
    /// computed.
    derived_duration_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LinearInterpolator {
    pub const LABEL: &'static str = "linear";

    pub fn new() -> Self {
        Self::default()
    }

    /// The line segments of the compiled path.
    pub fn segments(&self) -> Option<&[LineSegment]> {
        self.path.as_deref().map(|p| p.segments.as_slice())
    }

    /// The arc-length table of the compiled path.
    pub fn arc_length(&self) -> Option<&ArcLengthTable> {
        self.path.as_deref().map(|p| &p.arc_length)
    }

    pub fn heading_spline(&self) -> Option<&HeadingSpline> {
        self.path.as_deref().map(|p| &p.heading)
    }

    /// True if both interpolators use the same compiled path.
    pub fn shares_path_with(&self, other: &LinearInterpolator) -> bool {
        match (&self.path, &other.path) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn compiled(&self) -> Result<&LinearPath, PathError> {
        self.path.as_deref().ok_or(PathError::NotInitialised)
    }
}

impl PathGenerator for LinearInterpolator {
    fn label(&self) -> &'static str {
        Self::LABEL
    }

    fn init_waypoints(&mut self, waypoints: WaypointSet) -> Result<(), PathError> {
        if waypoints.is_empty() {
            return Err(PathError::EmptyWaypointSet);
        }

        debug!("Linear interpolator given {} waypoints", waypoints.num_waypoints());

        self.waypoints = Some(waypoints);
        Ok(())
    }

    fn waypoints(&self) -> Option<&WaypointSet> {
        self.waypoints.as_ref()
    }

    fn init_interpolator(&mut self) -> Result<(), PathError> {
        // Never keep a path built from older waypoints
        self.path = None;
        self.cursor.reset();

        let waypoints = self.waypoints.as_ref().ok_or(PathError::NoWaypoints)?;

        if waypoints.num_waypoints() < 2 {
            return Err(PathError::NotEnoughWaypoints(waypoints.num_waypoints()));
        }

        let path = LinearPath::build(waypoints)?;

        // The duration is only needed from the waypoints if it wasn't set
        if self.settings.duration().is_none() {
            path.check_derived_duration(waypoints)?;
        }

        info!(
            "Linear interpolator initialised: {} segments, {:.3} m, duration {:?}",
            path.segments.len(),
            path.arc_length.total_length_m(),
            self.settings
                .duration()
                .or_else(|| path.derived_duration_s.map(MissionDuration::Finite))
        );

        self.path = Some(Arc::new(path));

        Ok(())
    }

    fn is_initialised(&self) -> bool {
        self.path.is_some()
    }

    /// The linear interpolator has no parameters, any are accepted and
    /// ignored.
    fn set_parameters(&mut self, params: &Table) -> Result<(), PathError> {
        if !params.is_empty() {
            debug!(
                "Ignoring parameters for the linear interpolator: {:?}",
                params.keys().collect::<Vec<_>>()
            );
        }

        Ok(())
    }

    fn get_segment_idx(&self, s: f64) -> Result<usize, PathError> {
        Ok(self.compiled()?.arc_length.segment_idx(s))
    }

    fn generate_pos(&self, s: f64) -> Result<Vector3<f64>, PathError> {
        Ok(self.compiled()?.position(s))
    }

    fn generate_quat(&mut self, s: f64) -> Result<UnitQuaternion<f64>, PathError> {
        let path = self.path.as_deref().ok_or(PathError::NotInitialised)?;

        let s = s.max(0.0).min(1.0);

        // No tangent is estimated at the very start of the path
        if s == 0.0 {
            return Ok(self.cursor.reset());
        }

        let last_s = (s - self.settings.s_step()).max(0.0);

        let tangent = path.position(s) - path.position(last_s);

        let look_rot = self.cursor.look_rotation(&tangent, self.settings.full_dof());

        Ok(self
            .cursor
            .apply_heading_offset(look_rot, path.heading.eval(s)))
    }

    fn last_orientation(&self) -> UnitQuaternion<f64> {
        self.cursor.last_rot()
    }

    fn get_samples(&self, _max_time: Option<f64>, step: f64) -> Result<Samples<'_>, PathError> {
        Samples::new(self, step)
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut GeneratorSettings {
        &mut self.settings
    }

    fn derived_duration(&self) -> Option<f64> {
        self.path.as_deref().and_then(|p| p.derived_duration_s)
    }
}

impl LinearPath {
    fn build(waypoints: &WaypointSet) -> Result<Self, PathError> {
        let segments: Vec<LineSegment> = waypoints
            .iter()
            .zip(waypoints.iter().skip(1))
            .map(|(from, to)| LineSegment::new(from.pos(), to.pos()))
            .collect();

        for (i, seg) in segments.iter().enumerate() {
            if seg.length() == 0.0 {
                warn!("Waypoints {} and {} coincide, the segment between them is skipped", i, i + 1);
            }
        }

        let lengths_m: Vec<f64> = segments.iter().map(|s| s.length()).collect();
        let arc_length = ArcLengthTable::from_lengths(&lengths_m)?;

        let offsets: Vec<f64> = waypoints.iter().map(|w| w.heading_offset()).collect();
        let heading = HeadingSpline::fit(arc_length.values(), &offsets)?;
        debug!("Heading offset spline fitted through {} knots", heading.knots().len());

        let speeds: Vec<f64> = waypoints.iter().map(|w| w.max_forward_speed()).collect();
        let derived_duration_s = match mean(&speeds) {
            Some(v) if v.is_finite() && v > 0.0 => Some(arc_length.total_length_m() / v),
            _ => None,
        };

        Ok(Self {
            segments,
            arc_length,
            heading,
            derived_duration_s,
        })
    }

    /// Fail if the duration could not be derived from the waypoints.
    fn check_derived_duration(&self, waypoints: &WaypointSet) -> Result<(), PathError> {
        match self.derived_duration_s {
            Some(_) => Ok(()),
            None => {
                let speeds: Vec<f64> = waypoints.iter().map(|w| w.max_forward_speed()).collect();
                Err(PathError::InvalidSpeed(mean(&speeds).unwrap_or(0.0)))
            }
        }
    }

    fn position(&self, s: f64) -> Vector3<f64> {
        let (seg_idx, u) = self.arc_length.locate(s);
        self.segments[seg_idx].interpolate(u)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Waypoint;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn waypoints(points: &[(f64, f64, f64)], offsets: &[f64]) -> WaypointSet {
        WaypointSet::from_waypoints(
            points
                .iter()
                .zip(offsets.iter())
                .map(|(&(x, y, z), &h)| Waypoint::new(x, y, z, 0.5, h))
                .collect(),
        )
    }

    fn compiled(points: &[(f64, f64, f64)], offsets: &[f64]) -> LinearInterpolator {
        let mut interp = LinearInterpolator::new();
        interp.init_waypoints(waypoints(points, offsets)).unwrap();
        interp.init_interpolator().unwrap();
        interp
    }

    fn x_line() -> LinearInterpolator {
        compiled(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)], &[0.0, 0.0])
    }

    #[test]
    fn test_endpoints() {
        let points = [(0.0, 0.0, 0.0), (1.0, 2.0, 3.0), (4.0, -1.0, 2.0), (5.0, 5.0, 5.0)];
        let interp = compiled(&points, &[0.0; 4]);

        assert_eq!(interp.generate_pos(0.0).unwrap(), Vector3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(
            interp.generate_pos(1.0).unwrap(),
            Vector3::new(5.0, 5.0, 5.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_arc_length_table() {
        let points = [(0.0, 0.0, 0.0), (1.0, 2.0, 3.0), (4.0, -1.0, 2.0), (5.0, 5.0, 5.0)];
        let interp = compiled(&points, &[0.0; 4]);

        let table = interp.arc_length().unwrap().values();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0], 0.0);
        assert_eq!(table[3], 1.0);
        assert!(table.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(interp.segments().unwrap().len(), 3);
    }

    #[test]
    fn test_straight_line() {
        let interp = x_line();
        assert_eq!(interp.generate_pos(0.5).unwrap(), Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_collinear_waypoints() {
        let interp = compiled(
            &[(0.0, 0.0, 0.0), (5.0, 0.0, 0.0), (10.0, 0.0, 0.0)],
            &[0.0; 3],
        );

        assert_eq!(interp.arc_length().unwrap().values(), &[0.0, 0.5, 1.0]);
        assert_eq!(interp.generate_pos(0.25).unwrap(), Vector3::new(2.5, 0.0, 0.0));
        assert_eq!(interp.get_segment_idx(0.25).unwrap(), 1);
        assert_eq!(interp.get_segment_idx(0.75).unwrap(), 2);
    }

    #[test]
    fn test_position_extrapolates() {
        let mut interp = x_line();

        assert_eq!(interp.generate_pos(1.5).unwrap(), Vector3::new(15.0, 0.0, 0.0));
        assert_eq!(interp.generate_pos(-0.5).unwrap(), Vector3::new(0.0, 0.0, 0.0));

        // Full points are clamped onto the path
        let pnt = interp.generate_pnt(1.5, 3.0).unwrap();
        assert_eq!(pnt.t, 3.0);
        assert_eq!(pnt.pos, Vector3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_quat_at_start() {
        let mut interp = compiled(&[(0.0, 0.0, 0.0), (0.0, 10.0, 0.0)], &[0.4, 0.4]);

        let rot = interp.generate_quat(0.5).unwrap();
        assert_relative_eq!(rot.euler_angles().2, FRAC_PI_2 + 0.4, epsilon = 1e-9);
        assert_eq!(interp.last_orientation(), rot);

        // The start always gives the initial orientation, offset or not
        assert_eq!(interp.generate_quat(0.0).unwrap(), UnitQuaternion::identity());
        assert_eq!(interp.generate_quat(-1.0).unwrap(), UnitQuaternion::identity());
        assert_eq!(interp.last_orientation(), UnitQuaternion::identity());
    }

    #[test]
    fn test_forward_facing_without_offset() {
        let mut interp = x_line();

        for &s in &[0.001, 0.1, 0.5, 0.99, 1.0] {
            let rot = interp.generate_quat(s).unwrap();
            assert_abs_diff_eq!(rot.angle(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_heading_offset_overlay() {
        let mut interp = compiled(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)], &[0.0, 0.5]);

        for &s in &[0.1, 0.5, 0.8, 1.0] {
            let rot = interp.generate_quat(s).unwrap();
            assert_relative_eq!(rot.euler_angles().2, 0.5 * s, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_heading_offset_at_waypoints() {
        let offsets = [0.0, 0.3, -0.2, 0.1, 0.25];
        let points = [
            (0.0, 0.0, 0.0),
            (2.0, 0.0, 0.0),
            (4.0, 0.0, 0.0),
            (7.0, 0.0, 0.0),
            (8.0, 0.0, 0.0),
        ];
        let mut interp = compiled(&points, &offsets);

        let table: Vec<f64> = interp.arc_length().unwrap().values().to_vec();
        for (&s, &offset) in table.iter().zip(offsets.iter()).skip(1) {
            let rot = interp.generate_quat(s).unwrap();
            assert_relative_eq!(rot.euler_angles().2, offset, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_full_dof() {
        let points = [(0.0, 0.0, 0.0), (10.0, 0.0, -10.0)];

        let mut interp = compiled(&points, &[0.0, 0.0]);
        let rot = interp.generate_quat(0.5).unwrap();
        assert_abs_diff_eq!(rot.angle(), 0.0, epsilon = 1e-9);

        interp.set_full_dof(true);
        let rot = interp.generate_quat(0.5).unwrap();
        assert_relative_eq!(
            rot * Vector3::x(),
            Vector3::new(1.0, 0.0, -1.0).normalize(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_degenerate_tangent() {
        let mut interp = compiled(&[(0.0, 0.0, 0.0), (0.0, 10.0, 0.0)], &[0.0, 0.0]);

        let first = interp.generate_quat(0.5).unwrap();

        // A step this small gives a tangent too short to define a direction
        interp.set_s_step(1e-12).unwrap();
        let second = interp.generate_quat(0.7).unwrap();

        assert!(second.coords.iter().all(|c| c.is_finite()));
        assert_relative_eq!(second.euler_angles().2, FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(first, second, epsilon = 1e-9);
    }

    #[test]
    fn test_coincident_waypoints() {
        let mut interp = compiled(
            &[(0.0, 0.0, 0.0), (5.0, 0.0, 0.0), (5.0, 0.0, 0.0), (5.0, 5.0, 0.0)],
            &[0.0, 0.1, 0.2, 0.2],
        );

        assert_eq!(interp.arc_length().unwrap().values(), &[0.0, 0.5, 0.5, 1.0]);
        assert_eq!(interp.generate_pos(0.5).unwrap(), Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(interp.generate_pos(0.75).unwrap(), Vector3::new(5.0, 2.5, 0.0));

        for i in 1..=100 {
            let s = i as f64 / 100.0;
            let pos = interp.generate_pos(s).unwrap();
            let rot = interp.generate_quat(s).unwrap();
            assert!(pos.iter().all(|c| c.is_finite()));
            assert!(rot.coords.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_idempotent_init() {
        let points = [(0.0, 0.0, 0.0), (3.0, 1.0, -1.0), (6.0, -2.0, -1.0)];
        let mut interp = compiled(&points, &[0.0, 0.2, -0.1]);

        let run = |interp: &mut LinearInterpolator| -> Vec<crate::TrajectoryPoint> {
            (0..=50)
                .map(|i| interp.generate_pnt(i as f64 / 50.0, i as f64).unwrap())
                .collect()
        };

        let first = run(&mut interp);
        interp.init_interpolator().unwrap();
        let second = run(&mut interp);

        assert_eq!(first, second);
    }

    #[test]
    fn test_samples() {
        let interp = x_line();

        let samples: Vec<_> = interp.get_samples(None, 0.1).unwrap().collect();
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[0].pos, Vector3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(samples[10].pos, Vector3::new(10.0, 0.0, 0.0), epsilon = 1e-12);
        assert!(samples.iter().all(|p| p.t == 0.0));
        assert!(samples.iter().all(|p| p.rotq == UnitQuaternion::identity()));

        // Steps that don't divide the path still end on it
        let samples: Vec<_> = interp.get_samples(None, 0.3).unwrap().collect();
        assert_eq!(samples.len(), 5);
        assert_relative_eq!(samples[4].pos, Vector3::new(10.0, 0.0, 0.0), epsilon = 1e-12);

        assert_eq!(interp.get_samples(None, 0.001).unwrap().len(), 1001);
    }

    #[test]
    fn test_samples_restart() {
        let interp = x_line();

        let mut samples = interp.get_samples(Some(10.0), 0.25).unwrap();
        let replay = samples.clone();
        let first: Vec<_> = samples.by_ref().collect();
        assert_eq!(samples.next(), None);

        // The total and step are kept once exhausted
        assert_eq!(samples.len(), 0);
        assert_eq!(samples.count_total(), 5);
        assert_eq!(samples.step(), 0.25);

        samples.restart();
        let second: Vec<_> = samples.collect();
        let third: Vec<_> = replay.collect();

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_samples_errors() {
        let interp = LinearInterpolator::new();
        assert!(matches!(
            interp.get_samples(None, 0.1),
            Err(PathError::NotInitialised)
        ));

        let interp = x_line();
        assert!(matches!(
            interp.get_samples(None, 0.0),
            Err(PathError::InvalidStep(_))
        ));
        assert!(matches!(
            interp.get_samples(None, -0.1),
            Err(PathError::InvalidStep(_))
        ));
    }

    #[test]
    fn test_preconditions() {
        let mut interp = LinearInterpolator::new();
        assert_eq!(interp.init_interpolator(), Err(PathError::NoWaypoints));
        assert_eq!(
            interp.init_waypoints(WaypointSet::new()),
            Err(PathError::EmptyWaypointSet)
        );
        assert_eq!(interp.generate_pos(0.5), Err(PathError::NotInitialised));
        assert_eq!(interp.generate_quat(0.5), Err(PathError::NotInitialised));

        interp
            .init_waypoints(waypoints(&[(1.0, 1.0, 1.0)], &[0.0]))
            .unwrap();
        assert_eq!(
            interp.init_interpolator(),
            Err(PathError::NotEnoughWaypoints(1))
        );
        assert!(!interp.is_initialised());
        assert_eq!(interp.generate_pos(0.5), Err(PathError::NotInitialised));
    }

    #[test]
    fn test_failed_reinit_clears_path() {
        let mut interp = x_line();
        assert!(interp.is_initialised());

        interp
            .init_waypoints(waypoints(&[(0.0, 0.0, 0.0), (0.0, 0.0, 0.0)], &[0.0, 0.0]))
            .unwrap();
        assert_eq!(interp.init_interpolator(), Err(PathError::DegeneratePath));
        assert!(!interp.is_initialised());
        assert_eq!(interp.get_segment_idx(0.5), Err(PathError::NotInitialised));
    }

    #[test]
    fn test_derived_duration() {
        let mut interp = LinearInterpolator::new();
        interp
            .init_waypoints(WaypointSet::from_waypoints(vec![
                Waypoint::new(0.0, 0.0, 0.0, 0.5, 0.0),
                Waypoint::new(10.0, 0.0, 0.0, 1.5, 0.0),
            ]))
            .unwrap();

        assert_eq!(interp.duration(), None);
        assert_eq!(interp.start_time(), None);

        interp.init_interpolator().unwrap();
        assert_eq!(interp.duration(), Some(MissionDuration::Finite(10.0)));
        assert_eq!(interp.start_time(), Some(0.0));

        // A set duration takes precedence
        interp.set_duration(20.0).unwrap();
        interp.init_interpolator().unwrap();
        assert_eq!(interp.duration(), Some(MissionDuration::Finite(20.0)));
    }

    #[test]
    fn test_duration_needs_speed() {
        let zero_speed = WaypointSet::from_waypoints(vec![
            Waypoint::new(0.0, 0.0, 0.0, 0.0, 0.0),
            Waypoint::new(10.0, 0.0, 0.0, 0.0, 0.0),
        ]);

        let mut interp = LinearInterpolator::new();
        interp.init_waypoints(zero_speed).unwrap();
        assert_eq!(interp.init_interpolator(), Err(PathError::InvalidSpeed(0.0)));

        interp.set_duration(30.0).unwrap();
        interp.init_interpolator().unwrap();
        assert_eq!(interp.duration(), Some(MissionDuration::Finite(30.0)));
    }

    #[test]
    fn test_time_mapping() {
        let mut interp = x_line();
        interp.set_start_time(5.0).unwrap();
        // Length 10 m at 0.5 m/s
        assert_eq!(interp.duration(), Some(MissionDuration::Finite(20.0)));

        assert_eq!(interp.s_from_time(0.0), Ok(0.0));
        assert_eq!(interp.s_from_time(15.0), Ok(0.5));
        assert_eq!(interp.s_from_time(40.0), Ok(1.0));

        assert!(!interp.has_started(4.0));
        assert!(interp.has_started(5.0));
        assert!(!interp.has_finished(24.0));
        assert!(interp.has_finished(25.0));

        let pnt = interp.generate_reference(15.0).unwrap();
        assert_eq!(pnt.t, 15.0);
        assert_eq!(pnt.pos, Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_unbounded_duration() {
        let mut interp = x_line();
        interp.set_duration(-1.0).unwrap();

        assert_eq!(interp.duration(), Some(MissionDuration::Unbounded));
        assert_eq!(interp.s_from_time(3.0), Err(PathError::UnboundedDuration));
        assert!(!interp.has_finished(1e9));
    }

    #[test]
    fn test_set_parameters_is_noop() {
        let mut interp = x_line();
        let before = interp.generate_pos(0.3).unwrap();

        let mut params = Table::new();
        params.insert(String::from("tension"), toml::Value::Float(0.5));
        assert_eq!(interp.set_parameters(&params), Ok(()));
        assert_eq!(interp.set_parameters(&Table::new()), Ok(()));

        assert_eq!(interp.generate_pos(0.3).unwrap(), before);
    }

    #[test]
    fn test_clones_share_path() {
        let mut a = compiled(&[(0.0, 0.0, 0.0), (0.0, 10.0, 0.0)], &[0.0, 0.0]);
        let b = a.clone();

        assert!(a.shares_path_with(&b));

        a.generate_quat(0.5).unwrap();
        assert_relative_eq!(a.last_orientation().euler_angles().2, FRAC_PI_2, epsilon = 1e-9);
        assert_eq!(b.last_orientation(), UnitQuaternion::identity());
    }
}
