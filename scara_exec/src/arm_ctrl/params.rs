//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::NUM_JOINTS;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
///
/// Lengths are in workspace units, which the renderer maps 1:1 onto canvas
/// pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The length of the shoulder link (shoulder joint to elbow joint).
    pub shoulder_length: f64,

    /// The length of the elbow link (elbow joint to end effector).
    pub elbow_length: f64,

    // ---- CAPABILITIES ----
    /// Maximum joint absolute position, shoulder first.
    ///
    /// Units: degrees
    pub max_abs_pos_deg: [f64; NUM_JOINTS],

    /// Minimum joint absolute position, shoulder first.
    ///
    /// Units: degrees
    pub min_abs_pos_deg: [f64; NUM_JOINTS],

    // ---- VALIDATION ----
    /// Maximum distance between the target and the forward kinematics of the
    /// limited solution for the solution to be accepted.
    pub reach_tolerance: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            shoulder_length: 195.0,
            elbow_length: 200.0,
            max_abs_pos_deg: [90.0, 145.0],
            min_abs_pos_deg: [-90.0, -145.0],
            reach_tolerance: 10.0,
        }
    }
}

impl Params {
    /// Radius of the outer edge of the reachable annulus.
    pub fn max_reach(&self) -> f64 {
        self.shoulder_length + self.elbow_length
    }

    /// Radius of the inner edge of the reachable annulus.
    pub fn min_reach(&self) -> f64 {
        (self.shoulder_length - self.elbow_length).abs()
    }
}
