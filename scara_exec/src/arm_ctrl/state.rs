//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::{Deserialize, Serialize};

// Internal
use super::{ArmCtrlError, ArmPose, JointAngles, Params, NUM_JOINTS};
use crate::Point2D;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Input data to Arm Control.
pub struct InputData {
    /// The target for the end effector in the arm frame.
    pub target: Point2D,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug)]
pub struct StatusReport {
    pub abs_pos_limited: [bool; NUM_JOINTS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = JointAngles;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = params::load(init_data)?;

        debug!(
            "ArmCtrl initialised, reach {:.1} to {:.1}",
            self.params.min_reach(),
            self.params.max_reach()
        );

        Ok(())
    }

    /// Solve for the joint angles reaching the input target.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let solution = self.solve_limited(&input_data.target)?;
        self.report.abs_pos_limited = solution.abs_pos_limited;

        Ok((solution.angles, self.report))
    }
}

impl ArmCtrl {
    /// Create a new arm controller from already loaded parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            report: StatusReport::default(),
        }
    }

    /// Get the parameters of the arm.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Compute the pose of the arm for the given joint angles.
    pub fn pose(&self, angles: &JointAngles) -> ArmPose {
        ArmPose::from_joint_angles(angles, &self.params)
    }
}
