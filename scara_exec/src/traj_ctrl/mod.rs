//! # Trajectory control module
//!
//! Trajectory control turns a sequence of targets into the waypoints the arm
//! passes through. Each segment between two targets is linearly interpolated
//! into a fixed number of steps. The waypoints know nothing about the arm:
//! whether each one can actually be reached is decided by arm control.
//!
//! The pen scheduler decides, once per segment, whether the end effector
//! traces the segment (pen down) or just moves along it (pen up).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod path;
pub mod pen;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use path::*;
pub use pen::*;
