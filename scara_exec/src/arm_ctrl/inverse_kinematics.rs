//! Arm inverse kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use util::maths::{clamp, norm};

// Internal imports
use super::*;
use crate::Point2D;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A validated inverse kinematics solution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Solution {
    pub angles: JointAngles,

    /// Which joints had to be limited to stay within their range.
    pub abs_pos_limited: [bool; NUM_JOINTS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmCtrl {
    /// Perform the inverse kinematics calculations.
    ///
    /// Inverse kinematics is described in
    /// https://en.wikipedia.org/wiki/Inverse_kinematics. For a two link planar
    /// arm with link lengths `L1` and `L2`, the cosine of the elbow angle is
    ///
    /// ```text
    /// D = (x^2 + y^2 - L1^2 - L2^2) / (2 L1 L2)
    /// ```
    ///
    /// The elbow-down branch (negative root of `1 - D^2`) is always taken, so
    /// a target has exactly one solution. Both angles are then limited to the
    /// joint ranges and the limited solution is fed back through forward
    /// kinematics: if it lands further than `reach_tolerance` from the target
    /// the target is reported as unreachable.
    ///
    /// The target must be given in the arm frame (shoulder at the origin).
    pub fn solve(&self, target: &Point2D) -> Result<JointAngles, ArmCtrlError> {
        self.solve_limited(target).map(|s| s.angles)
    }

    /// Returns true if [`ArmCtrl::solve`] would succeed for this target.
    ///
    /// Use this only as a filter, callers that need the angles shall call
    /// `solve` directly.
    pub fn is_reachable(&self, target: &Point2D) -> bool {
        self.solve_limited(target).is_ok()
    }

    pub(crate) fn solve_limited(&self, target: &Point2D) -> Result<Solution, ArmCtrlError> {
        let l1 = self.params.shoulder_length;
        let l2 = self.params.elbow_length;
        let unreachable = ArmCtrlError::Unreachable {
            x: target.x,
            y: target.y,
        };

        // Cosine of the elbow angle, outside [-1, 1] means the target is
        // outside the annulus the links can reach.
        let d = (target.x.powi(2) + target.y.powi(2) - l1.powi(2) - l2.powi(2)) / (2.0 * l1 * l2);
        if d.abs() > 1.0 {
            trace!("IK target {:?} outside annulus (D = {:.6})", target, d);
            return Err(unreachable);
        }

        // Elbow-down branch
        let theta2_rad = (-(1.0 - d.powi(2)).sqrt()).atan2(d);
        let theta1_rad =
            target.y.atan2(target.x) - (l2 * theta2_rad.sin()).atan2(l1 + l2 * theta2_rad.cos());

        // Limit each joint to its range
        let mut abs_pos_deg = [theta1_rad.to_degrees(), theta2_rad.to_degrees()];
        let mut abs_pos_limited = [false; NUM_JOINTS];
        for i in 0..NUM_JOINTS {
            let (limited, was_limited) = clamp(
                &abs_pos_deg[i],
                &self.params.min_abs_pos_deg[i],
                &self.params.max_abs_pos_deg[i],
            );
            abs_pos_deg[i] = limited;
            abs_pos_limited[i] = was_limited;
        }
        let angles = JointAngles::from_array(abs_pos_deg);

        // Check the limited solution still reaches the target
        let hand = ArmPose::from_joint_angles(&angles, &self.params).hand;
        let error = norm(hand.as_slice(), target.as_slice()).unwrap_or(std::f64::INFINITY);
        if error > self.params.reach_tolerance {
            trace!(
                "IK target {:?} rejected, limited solution {:?} misses by {:.3}",
                target,
                angles,
                error
            );
            return Err(unreachable);
        }

        Ok(Solution {
            angles,
            abs_pos_limited,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn arm(params: Params) -> ArmCtrl {
        ArmCtrl::new(params)
    }

    fn fk_error(ctrl: &ArmCtrl, angles: &JointAngles, target: &Point2D) -> f64 {
        (ArmPose::from_joint_angles(angles, &ctrl.params).hand - target).norm()
    }

    #[test]
    fn test_outside_annulus() {
        let ctrl = arm(Params::default());

        assert_eq!(
            ctrl.solve(&Point2D::new(1000.0, 1000.0)),
            Err(ArmCtrlError::Unreachable {
                x: 1000.0,
                y: 1000.0
            })
        );

        // Just beyond the outer and inside the inner edge (L1 - L2 = -5)
        assert!(ctrl.solve(&Point2D::new(395.1, 0.0)).is_err());
        assert!(ctrl.solve(&Point2D::new(0.0, -396.0)).is_err());
        assert!(ctrl.solve(&Point2D::new(4.9, 0.0)).is_err());
        assert!(ctrl.solve(&Point2D::zeros()).is_err());
    }

    #[test]
    fn test_outside_annulus_sweep() {
        let ctrl = arm(Params {
            max_abs_pos_deg: [360.0, 145.0],
            min_abs_pos_deg: [-360.0, -145.0],
            ..Params::default()
        });

        for i in 0..72 {
            let a = (i as f64 * 5.0).to_radians();
            let dir = Point2D::new(a.cos(), a.sin());
            assert!(!ctrl.is_reachable(&(dir * 400.0)));
            assert!(!ctrl.is_reachable(&(dir * 4.0)));
        }
    }

    #[test]
    fn test_reachable_within_tolerance() {
        let ctrl = arm(Params::default());
        let target = Point2D::new(300.0, 0.0);

        let angles = ctrl.solve(&target).unwrap();
        assert!(fk_error(&ctrl, &angles, &target) <= 10.0);
        // Nothing is limited here so the solution is exact
        assert!(fk_error(&ctrl, &angles, &target) < 1e-9);
    }

    #[test]
    fn test_elbow_down_branch() {
        let ctrl = arm(Params::default());
        let target = Point2D::new(300.0, 0.0);
        let d: f64 = (300f64.powi(2) - 195f64.powi(2) - 200f64.powi(2)) / (2.0 * 195.0 * 200.0);

        let angles = ctrl.solve(&target).unwrap();

        // The elbow bends negative and the shoulder compensates positive
        assert!((angles.theta2_deg - (-d.acos().to_degrees())).abs() < 1e-9);
        assert!(angles.theta2_deg < 0.0);
        assert!(angles.theta1_deg > 0.0);

        // The elbow sits above the line from shoulder to hand
        let pose = ArmPose::from_joint_angles(&angles, &ctrl.params);
        assert!(pose.elbow.y > 0.0);
    }

    #[test]
    fn test_deterministic() {
        let ctrl = arm(Params::default());
        let target = Point2D::new(123.4, -210.9);

        let a = ctrl.solve(&target).unwrap();
        for _ in 0..10 {
            assert_eq!(ctrl.solve(&target).unwrap(), a);
        }
    }

    #[test]
    fn test_grid_within_tolerance() {
        let ctrl = arm(Params::default());

        let mut num_reachable = 0;
        for ix in -40..=40 {
            for iy in -40..=40 {
                let target = Point2D::new(ix as f64 * 10.0, iy as f64 * 10.0);
                if let Ok(angles) = ctrl.solve(&target) {
                    num_reachable += 1;
                    assert!(fk_error(&ctrl, &angles, &target) <= 10.0);
                    for i in 0..NUM_JOINTS {
                        assert!(angles.as_array()[i] <= ctrl.params.max_abs_pos_deg[i]);
                        assert!(angles.as_array()[i] >= ctrl.params.min_abs_pos_deg[i]);
                    }
                }
            }
        }
        assert!(num_reachable > 0);
    }

    #[test]
    fn test_shoulder_limit_rejects() {
        // Straight up needs a shoulder of ~131 deg, beyond +-90
        let target = Point2D::new(0.0, 300.0);
        assert!(arm(Params::default()).solve(&target).is_err());

        // With a full turn of shoulder range the same target is fine
        let ctrl = arm(Params {
            max_abs_pos_deg: [360.0, 145.0],
            min_abs_pos_deg: [-360.0, -145.0],
            ..Params::default()
        });
        let angles = ctrl.solve(&target).unwrap();
        assert!(fk_error(&ctrl, &angles, &target) < 1e-9);
    }

    #[test]
    fn test_elbow_limit_rejects() {
        // Inside the annulus, but folding back this far needs ~-177 deg of
        // elbow which is beyond -145.
        let ctrl = arm(Params::default());
        assert!(!ctrl.is_reachable(&Point2D::new(10.0, 0.0)));
    }

    #[test]
    fn test_limited_but_within_tolerance() {
        // A slightly tighter elbow limit moves the hand a little, which is
        // still accepted and reported as limited.
        let ctrl = arm(Params {
            max_abs_pos_deg: [90.0, 80.0],
            min_abs_pos_deg: [-90.0, -80.0],
            ..Params::default()
        });
        let target = Point2D::new(300.0, 0.0);

        let solution = ctrl.solve_limited(&target).unwrap();
        assert_eq!(solution.abs_pos_limited, [false, true]);
        assert_eq!(solution.angles.theta2_deg, -80.0);

        let error = fk_error(&ctrl, &solution.angles, &target);
        assert!(error > 0.0 && error <= 10.0);
    }
}
