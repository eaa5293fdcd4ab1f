//! Parameters structure for AnimCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::AnimCtrlError;
use crate::traj_ctrl::DEFAULT_DRAW_PROBABILITY;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for animation control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- TRAJECTORY ----
    /// Number of interpolation steps per segment, each segment renders
    /// `steps_per_segment + 1` waypoints.
    pub steps_per_segment: usize,

    /// Probability that a randomised segment is traced, when the previous
    /// one was traced too.
    #[serde(default = "default_draw_probability")]
    pub draw_probability: f64,

    /// Seed for the random sampling and pen decisions. If not set each run
    /// is different.
    #[serde(default)]
    pub seed: Option<u64>,

    // ---- RANDOM SAMPLING ----
    /// Region random targets are drawn from.
    pub sample_region: SampleRegion,

    /// Maximum number of samples drawn to find one reachable target.
    pub max_sample_attempts: usize,

    // ---- EXPLICIT SHAPE ----
    /// Vertices of the shape drawn in explicit path mode, in the arm frame.
    #[serde(default)]
    pub shape: Vec<[f64; 2]>,

    /// Whether the shape is closed (last vertex joined back to the first).
    #[serde(default)]
    pub shape_closed: bool,

    // ---- OUTPUT ----
    /// Delay between frames of the output animation.
    ///
    /// Units: milliseconds
    pub frame_delay_ms: u32,

    /// Canvas the arm is drawn on.
    pub canvas: CanvasParams,
}

/// Annular sector random targets are sampled from, in the arm frame.
///
/// Radius and angle are sampled uniformly, which biases samples toward the
/// inner edge of the region.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SampleRegion {
    pub min_radius: f64,
    pub max_radius: f64,

    /// Units: degrees
    pub min_angle_deg: f64,

    /// Units: degrees
    pub max_angle_deg: f64,
}

/// Canvas and drawing style parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasParams {
    /// Units: pixels
    pub width: u32,

    /// Units: pixels
    pub height: u32,

    /// Position of the shoulder joint on the canvas. The arm frame's +y axis
    /// points up the canvas.
    ///
    /// Units: pixels
    pub shoulder_px: [f64; 2],

    pub background_colour: [u8; 4],
    pub trace_colour: [u8; 4],
    pub link_colour: [u8; 4],
    pub joint_colour: [u8; 4],

    /// Units: pixels
    pub trace_width: f64,

    /// Units: pixels
    pub link_width: f64,

    /// Units: pixels
    pub joint_radius: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters which would otherwise fail part way through a run.
    pub fn validate(&self) -> Result<(), AnimCtrlError> {
        if !self.draw_probability.is_finite() {
            return Err(AnimCtrlError::InvalidDrawProbability(self.draw_probability));
        }

        self.sample_region.validate()
    }
}

impl SampleRegion {
    /// Check that the region is a non-empty annular sector.
    pub fn validate(&self) -> Result<(), AnimCtrlError> {
        let finite = [
            self.min_radius,
            self.max_radius,
            self.min_angle_deg,
            self.max_angle_deg,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !finite {
            Err(AnimCtrlError::InvalidSampleRegion("bounds must be finite"))
        } else if self.min_radius < 0.0 {
            Err(AnimCtrlError::InvalidSampleRegion("min_radius is negative"))
        } else if self.min_radius > self.max_radius {
            Err(AnimCtrlError::InvalidSampleRegion(
                "min_radius is greater than max_radius",
            ))
        } else if self.min_angle_deg > self.max_angle_deg {
            Err(AnimCtrlError::InvalidSampleRegion(
                "min_angle_deg is greater than max_angle_deg",
            ))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn default_draw_probability() -> f64 {
    DEFAULT_DRAW_PROBABILITY
}
