//! Arm configuration structures

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{Params, ELBOW, NUM_JOINTS, SHOULDER};
use crate::Point2D;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Absolute positions of the arm's joints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    /// Shoulder angle measured from the +x axis of the arm frame.
    ///
    /// Units: degrees
    pub theta1_deg: f64,

    /// Elbow angle measured relative to the shoulder link.
    ///
    /// Units: degrees
    pub theta2_deg: f64,
}

/// Positions of the arm's joints and end effector, in the arm frame.
///
/// Always derived from a set of [`JointAngles`], never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArmPose {
    /// Shoulder joint, fixed at the arm frame origin.
    pub shoulder: Point2D,

    /// Elbow joint.
    pub elbow: Point2D,

    /// End effector (the "pen").
    pub hand: Point2D,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointAngles {
    pub fn new(theta1_deg: f64, theta2_deg: f64) -> Self {
        Self {
            theta1_deg,
            theta2_deg,
        }
    }

    /// Build from a per-joint array, shoulder first.
    pub fn from_array(abs_pos_deg: [f64; NUM_JOINTS]) -> Self {
        Self::new(abs_pos_deg[SHOULDER], abs_pos_deg[ELBOW])
    }

    /// Get the angles as a per-joint array, shoulder first.
    pub fn as_array(&self) -> [f64; NUM_JOINTS] {
        [self.theta1_deg, self.theta2_deg]
    }
}

impl ArmPose {
    /// Forward kinematics: compute the pose reached by the given joint angles.
    pub fn from_joint_angles(angles: &JointAngles, params: &Params) -> Self {
        let theta1_rad = angles.theta1_deg.to_radians();
        let theta12_rad = theta1_rad + angles.theta2_deg.to_radians();

        let shoulder = Point2D::zeros();
        let elbow = shoulder
            + params.shoulder_length * Point2D::new(theta1_rad.cos(), theta1_rad.sin());
        let hand =
            elbow + params.elbow_length * Point2D::new(theta12_rad.cos(), theta12_rad.sin());

        Self {
            shoulder,
            elbow,
            hand,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: &Point2D, b: &Point2D) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn test_forward_kinematics() {
        let params = Params::default();

        // Fully stretched along +x
        let pose = ArmPose::from_joint_angles(&JointAngles::new(0.0, 0.0), &params);
        assert!(close(&pose.shoulder, &Point2D::zeros()));
        assert!(close(&pose.elbow, &Point2D::new(195.0, 0.0)));
        assert!(close(&pose.hand, &Point2D::new(395.0, 0.0)));

        // Shoulder straight up, elbow bent back toward -x
        let pose = ArmPose::from_joint_angles(&JointAngles::new(90.0, 90.0), &params);
        assert!(close(&pose.elbow, &Point2D::new(0.0, 195.0)));
        assert!(close(&pose.hand, &Point2D::new(-200.0, 195.0)));
    }

    #[test]
    fn test_joint_array_order() {
        let angles = JointAngles::from_array([12.0, -40.0]);
        assert_eq!(angles.theta1_deg, 12.0);
        assert_eq!(angles.theta2_deg, -40.0);
        assert_eq!(angles.as_array(), [12.0, -40.0]);
    }
}
