//! Lazy sampling of a path at a fixed step in the curve parameter

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::UnitQuaternion;

use super::{PathError, PathGenerator};
use crate::TrajectoryPoint;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Relative tolerance used when counting the number of steps in [0, 1].
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Iterator over the points of a path at `s = 0, step, 2 * step, ..., 1`.
///
/// The last value is clamped to 1. Cloning the iterator, or calling
/// `restart`, replays the sequence from the start.
pub struct Samples<'a> {
    generator: &'a dyn PathGenerator,
    step: f64,
    index: usize,
    count: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'a> Samples<'a> {
    /// Create the sample sequence of an initialised generator.
    pub fn new(generator: &'a dyn PathGenerator, step: f64) -> Result<Self, PathError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(PathError::InvalidStep(step));
        }

        if !generator.is_initialised() {
            return Err(PathError::NotInitialised);
        }

        let num_steps = 1.0 / step;
        let count = ((num_steps - STEP_COUNT_TOLERANCE * num_steps.max(1.0)).ceil() as usize)
            .saturating_add(1);

        Ok(Self {
            generator,
            step,
            index: 0,
            count,
        })
    }

    /// Total number of points in the sequence.
    pub fn count_total(&self) -> usize {
        self.count
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Go back to the start of the sequence.
    pub fn restart(&mut self) {
        self.index = 0;
    }

    /// Curve parameter of the `index`th sample.
    fn s_at(&self, index: usize) -> f64 {
        (index as f64 * self.step).min(1.0)
    }
}

impl<'a> Clone for Samples<'a> {
    fn clone(&self) -> Self {
        Self {
            generator: self.generator,
            step: self.step,
            index: self.index,
            count: self.count,
        }
    }
}

impl<'a> Iterator for Samples<'a> {
    type Item = TrajectoryPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        let s = self.s_at(self.index);
        self.index += 1;

        // Stop on the first failure, previous points stay valid
        let pos = self.generator.generate_pos(s).ok()?;

        Some(TrajectoryPoint::new(0.0, pos, UnitQuaternion::identity()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Samples<'a> {}
