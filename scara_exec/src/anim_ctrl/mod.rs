//! # Animation control module
//!
//! Animation control drives the arm along a path, one waypoint at a time, and
//! renders one frame per reached waypoint. Two modes are supported:
//!
//! - Explicit path: a fixed list of vertices, optionally closed, always traced.
//! - Random: a chain of randomly sampled reachable lines, with the pen
//!   scheduler deciding which are traced.
//!
//! Waypoints the arm cannot reach are skipped without producing a frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod render;
mod sink;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::Point2D;
use util::archive::ArchiveError;

pub use params::*;
pub use render::*;
pub use sink::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A piece of the drawn trace, between two consecutive hand positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceSegment {
    pub start: Point2D,
    pub end: Point2D,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during AnimCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum AnimCtrlError {
    #[error("Could not output a frame: {0}")]
    Encode(#[from] EncodeError),

    #[error("Could not archive a frame: {0}")]
    Archive(#[from] ArchiveError),

    #[error("No reachable target found in {attempts} samples, check the sample region")]
    NoReachableSample { attempts: usize },

    #[error("Invalid sample region, {0}")]
    InvalidSampleRegion(&'static str),

    #[error("Expected a finite draw probability, found {0}")]
    InvalidDrawProbability(f64),
}
