//! # Motion gate module
//!
//! Waits for a single axis actuator to arrive at a commanded position.
//!
//! The gate installs a position listener on the actuator, commands the target
//! and then races the position notifications against a timeout window. The
//! first to settle wins and the other is dropped. The listener is detached on
//! every exit path, including when the waiting future is itself dropped.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Callback invoked by an actuator each time its position changes.
pub type PositionListener = Box<dyn FnMut(f64) + Send>;

/// A single axis positioning actuator, such as a stepper motor driver.
///
/// Positions are in the actuator's own units (e.g. steps).
pub trait Actuator {
    /// Units: position units/s^2
    fn set_acceleration(&mut self, acceleration: f64);

    /// Units: position units/s
    fn set_velocity_limit(&mut self, velocity_limit: f64);

    /// Command the actuator to move to the given position.
    fn set_target_position(&mut self, target: f64);

    /// The current position.
    fn position(&self) -> f64;

    /// Set the listener notified of position changes, replacing any previous
    /// one. `None` detaches the current listener.
    fn set_position_listener(&mut self, listener: Option<PositionListener>);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while waiting for motion to complete.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MotionGateError {
    #[error("Timed out after {window_ms} ms waiting for the actuator to reach {target}")]
    TimedOut { target: f64, window_ms: u64 },

    #[error("The position listener was detached before the actuator reached {target}")]
    ListenerClosed { target: f64 },
}
