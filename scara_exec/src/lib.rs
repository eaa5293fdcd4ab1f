//! # SCARA arm library.
//!
//! Kinematics, path generation and animation for a two-link planar (SCARA)
//! arm, plus the gate used to wait on a single axis actuator reaching a
//! commanded position. Shared by the executables in this crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Animation control - drives the arm along paths and renders one frame per waypoint
pub mod anim_ctrl;

/// Arm control - inverse and forward kinematics of the two-link arm
pub mod arm_ctrl;

/// Motion gate - waits for an actuator to arrive at a commanded position
pub mod motion_gate;

/// Simulated stepper motor, an actuator for use with the motion gate
pub mod stepper_sim;

/// Trajectory control - path interpolation and pen scheduling
pub mod traj_ctrl;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A point or vector in the plane of the arm.
///
/// The arm frame has its origin at the shoulder joint, +x along the zero
/// shoulder angle and +y 90 degrees anticlockwise from it.
pub type Point2D = nalgebra::Vector2<f64>;
