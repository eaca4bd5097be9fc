//! # Path segments
//!
//! Segments are the geometric building blocks of a path. Each one is
//! parametrised locally by `u` in [0, 1], with `u = 0` at its start and
//! `u = 1` at its end.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::Serialize;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Local contract shared by all segment primitives.
pub trait Segment {
    /// Position on the segment for the local parameter `u`.
    ///
    /// `u` is not clamped, values outside of [0, 1] extrapolate the segment.
    fn interpolate(&self, u: f64) -> Vector3<f64>;

    /// Length of the segment in meters.
    fn length(&self) -> f64;

    fn start(&self) -> Vector3<f64> {
        self.interpolate(0.0)
    }

    fn end(&self) -> Vector3<f64> {
        self.interpolate(1.0)
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Straight line between two points.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    p0: Vector3<f64>,
    p1: Vector3<f64>,
    length_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineSegment {
    pub fn new(p0: Vector3<f64>, p1: Vector3<f64>) -> Self {
        Self {
            p0,
            p1,
            length_m: (p1 - p0).norm(),
        }
    }

    /// Unit vector pointing along the segment, or `None` if the segment has
    /// zero length.
    pub fn direction(&self) -> Option<Vector3<f64>> {
        (self.p1 - self.p0).try_normalize(0.0)
    }
}

impl Segment for LineSegment {
    fn interpolate(&self, u: f64) -> Vector3<f64> {
        self.p0 + u * (self.p1 - self.p0)
    }

    fn length(&self) -> f64 {
        self.length_m
    }

    fn start(&self) -> Vector3<f64> {
        self.p0
    }

    fn end(&self) -> Vector3<f64> {
        self.p1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_segment() {
        let seg = LineSegment::new(Vector3::new(1.0, 1.0, 0.0), Vector3::new(4.0, 5.0, 0.0));

        assert_eq!(seg.length(), 5.0);
        assert_eq!(seg.start(), Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(seg.end(), Vector3::new(4.0, 5.0, 0.0));
        assert_eq!(seg.interpolate(0.5), Vector3::new(2.5, 3.0, 0.0));
        assert_relative_eq!(
            seg.direction().unwrap(),
            Vector3::new(0.6, 0.8, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_line_segment_extrapolates() {
        let seg = LineSegment::new(Vector3::zeros(), Vector3::new(2.0, 0.0, 0.0));

        assert_eq!(seg.interpolate(1.5), Vector3::new(3.0, 0.0, 0.0));
        assert_eq!(seg.interpolate(-0.5), Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_length_segment() {
        let p = Vector3::new(1.0, 2.0, 3.0);
        let seg = LineSegment::new(p, p);

        assert_eq!(seg.length(), 0.0);
        assert_eq!(seg.direction(), None);
        assert_eq!(seg.interpolate(0.7), p);
    }
}
