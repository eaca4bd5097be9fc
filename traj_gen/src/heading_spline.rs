//! # Heading offset spline
//!
//! Smooth 1D interpolant of the per-waypoint heading offsets, indexed by the
//! arc-length position of each waypoint.
//!
//! With four or more knots this is a cubic spline with not-a-knot end
//! conditions, i.e. the first and last two intervals share a single cubic.
//! With fewer knots the same conditions reduce to the interpolating parabola
//! (3 knots), the straight line (2 knots) or a constant (1 knot).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::path_generator::PathError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Interpolating spline through `(s, heading_offset)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadingSpline {
    /// Strictly increasing knot positions
    knots: Vec<f64>,

    /// Value at each knot
    values: Vec<f64>,

    /// Second derivative at each knot
    curvatures: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingSpline {
    /// Fit the spline through the given knots and values.
    ///
    /// Knots must be non-decreasing. Repeated knots are merged, the value of
    /// the last repeated knot is kept.
    pub fn fit(knots: &[f64], values: &[f64]) -> Result<Self, PathError> {
        if knots.is_empty() || knots.len() != values.len() {
            return Err(PathError::HeadingSplineFit);
        }

        // Merge repeated knots
        let mut x: Vec<f64> = Vec::with_capacity(knots.len());
        let mut y: Vec<f64> = Vec::with_capacity(values.len());
        for (&k, &v) in knots.iter().zip(values.iter()) {
            match x.last() {
                Some(&last) if k < last => return Err(PathError::HeadingSplineFit),
                Some(&last) if k == last => {
                    if let Some(last_v) = y.last_mut() {
                        *last_v = v;
                    }
                }
                _ => {
                    x.push(k);
                    y.push(v);
                }
            }
        }

        let curvatures = Self::solve_curvatures(&x, &y)?;

        Ok(Self {
            knots: x,
            values: y,
            curvatures,
        })
    }

    /// Evaluate the spline at `s`.
    ///
    /// Outside of the knot range the end polynomials are extended.
    pub fn eval(&self, s: f64) -> f64 {
        let n = self.knots.len();
        if n == 1 {
            return self.values[0];
        }

        // Interval containing s, end intervals are used for extrapolation
        let i = self
            .knots
            .partition_point(|&k| k <= s)
            .saturating_sub(1)
            .min(n - 2);

        let h = self.knots[i + 1] - self.knots[i];
        let a = self.knots[i + 1] - s;
        let b = s - self.knots[i];
        let m0 = self.curvatures[i];
        let m1 = self.curvatures[i + 1];

        (m0 * a.powi(3) + m1 * b.powi(3)) / (6.0 * h)
            + (self.values[i] / h - m0 * h / 6.0) * a
            + (self.values[i + 1] / h - m1 * h / 6.0) * b
    }

    /// Knots of the spline after merging.
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Compute the second derivative of the spline at each knot.
    fn solve_curvatures(x: &[f64], y: &[f64]) -> Result<Vec<f64>, PathError> {
        let n = x.len();

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slope = |i: usize| (y[i + 1] - y[i]) / h[i];

        match n {
            // Constant and straight line
            1 | 2 => Ok(vec![0.0; n]),
            // Parabola, the second derivative is the same everywhere
            3 => {
                let m = 2.0 * (slope(1) - slope(0)) / (h[0] + h[1]);
                Ok(vec![m; 3])
            }
            _ => {
                let mut a = DMatrix::<f64>::zeros(n, n);
                let mut rhs = DVector::<f64>::zeros(n);

                // Not-a-knot: third derivative continuous at the second knot
                a[(0, 0)] = h[1];
                a[(0, 1)] = -(h[0] + h[1]);
                a[(0, 2)] = h[0];

                // Continuity of the first derivative at the interior knots
                for i in 1..n - 1 {
                    a[(i, i - 1)] = h[i - 1];
                    a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
                    a[(i, i + 1)] = h[i];
                    rhs[i] = 6.0 * (slope(i) - slope(i - 1));
                }

                // Not-a-knot at the penultimate knot
                a[(n - 1, n - 3)] = h[n - 2];
                a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
                a[(n - 1, n - 1)] = h[n - 3];

                let m = a.lu().solve(&rhs).ok_or(PathError::HeadingSplineFit)?;

                Ok(m.iter().copied().collect())
            }
        }
    }
}
