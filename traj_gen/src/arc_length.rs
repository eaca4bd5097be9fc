//! # Arc-length reparametrisation
//!
//! Maps the normalised curve parameter `s` in [0, 1] onto the segments of a
//! path so that progress in `s` is proportional to distance travelled.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::path_generator::PathError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Normalised cumulative arc length at each waypoint.
///
/// Entry `i` is the fraction of the total path length covered when reaching
/// waypoint `i`, so the first entry is always 0 and the last one always 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcLengthTable {
    s: Vec<f64>,
    total_length_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArcLengthTable {
    /// Build the table from the lengths of consecutive segments.
    ///
    /// Fails with `PathError::DegeneratePath` if there are no segments or
    /// their total length is not strictly positive.
    pub fn from_lengths(lengths_m: &[f64]) -> Result<Self, PathError> {
        let total_length_m: f64 = lengths_m.iter().sum();

        if lengths_m.is_empty() || !total_length_m.is_finite() || total_length_m <= 0.0 {
            return Err(PathError::DegeneratePath);
        }

        let mut s = Vec::with_capacity(lengths_m.len() + 1);
        s.push(0.0);

        let mut cumulative_m = 0.0;
        for length_m in lengths_m {
            cumulative_m += length_m;
            s.push(cumulative_m / total_length_m);
        }

        // Rounding in the cumulative sum must not move the end of the path
        if let Some(last) = s.last_mut() {
            *last = 1.0;
        }

        Ok(Self { s, total_length_m })
    }

    /// The table values, one per waypoint.
    pub fn values(&self) -> &[f64] {
        &self.s
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn total_length_m(&self) -> f64 {
        self.total_length_m
    }

    /// Smallest index `idx` for which `s <= table[idx]`.
    ///
    /// `s` is clamped into [0, 1] before the search.
    pub fn segment_idx(&self, s: f64) -> usize {
        let s = s.max(0.0).min(1.0);

        self.s
            .partition_point(|&v| v < s)
            .min(self.s.len().saturating_sub(1))
    }

    /// Resolve `s` into the index of the segment containing it and the local
    /// parameter `u` on that segment.
    ///
    /// `s = 0` (index 0) resolves to the start of the first segment without a
    /// division. The local parameter is computed from the unclamped `s`, so
    /// values outside [0, 1] extrapolate the end segments.
    pub fn locate(&self, s: f64) -> (usize, f64) {
        let idx = self.segment_idx(s);

        if idx == 0 {
            (0, 0.0)
        } else {
            let u = (s - self.s[idx - 1]) / (self.s[idx] - self.s[idx - 1]);
            (idx - 1, u)
        }
    }
}
