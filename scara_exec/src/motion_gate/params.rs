//! Parameters structure for the motion gate

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the motion gate.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Params {
    /// Time allowed for the actuator to arrive before the command times out.
    ///
    /// Units: milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// The actuator has arrived when strictly closer than this to the target.
    /// Commands closer than this to the current position are extended to it.
    ///
    /// Units: position units
    #[serde(default = "default_arrival_tolerance")]
    pub arrival_tolerance: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            arrival_tolerance: default_arrival_tolerance(),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn default_window_ms() -> u64 {
    10_000
}

fn default_arrival_tolerance() -> f64 {
    1.0
}
