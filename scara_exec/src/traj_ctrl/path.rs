//! # Path
//!
//! Linear interpolation of path segments into waypoints.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::Point2D;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The waypoints along one straight segment, start and end inclusive.
///
/// A clone replays the remaining waypoints, [`Waypoints::restart`] replays
/// the whole segment.
#[derive(Debug, Clone)]
pub struct Waypoints {
    start: Point2D,
    end: Point2D,
    delta: Point2D,
    steps: usize,
    next: usize,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Interpolate the segment from `start` to `end` into `steps + 1` waypoints.
///
/// Point `i` is `start + (end - start) * i / steps`, so the first point is
/// exactly `start` and the last is exactly `end`. A `steps` of zero is
/// treated as one so that both endpoints are always visited.
pub fn interpolate(start: Point2D, end: Point2D, steps: usize) -> Waypoints {
    Waypoints {
        start,
        end,
        delta: end - start,
        steps: steps.max(1),
        next: 0,
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoints {
    /// The number of steps the segment is divided into.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Get a fresh copy of the sequence, starting again from the first point.
    pub fn restart(&self) -> Self {
        Self {
            next: 0,
            ..self.clone()
        }
    }
}

impl Iterator for Waypoints {
    type Item = Point2D;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.steps {
            return None;
        }

        let i = self.next;
        self.next += 1;

        if i == self.steps {
            Some(self.end)
        } else {
            Some(self.start + self.delta * (i as f64 / self.steps as f64))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Waypoints {}
