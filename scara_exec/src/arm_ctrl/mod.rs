//! Arm control module
//!
//! Converts workspace targets into joint angles for the two-link planar arm
//! (shoulder and elbow), and joint angles back into an arm pose.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arm_config;
mod inverse_kinematics;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use arm_config::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of rotational joints on the arm (shoulder, elbow).
pub const NUM_JOINTS: usize = 2;

/// Index of the shoulder joint in per-joint arrays.
pub const SHOULDER: usize = 0;

/// Index of the elbow joint in per-joint arrays.
pub const ELBOW: usize = 1;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ArmCtrlError {
    /// The target is outside the annulus the links can reach, or the joint
    /// limits move the solution further than the reach tolerance from it.
    #[error("Target ({x:.3}, {y:.3}) is unreachable")]
    Unreachable { x: f64, y: f64 },
}
