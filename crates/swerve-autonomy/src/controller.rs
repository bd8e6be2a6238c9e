//! Holonomic path-following controller.
//!
//! Feed-forward from the trajectory's field velocity plus three independent
//! PID loops: X and Y share the translation gains, heading uses the rotation
//! gains with continuous input on (-π, π].  The result is converted into the
//! robot frame, which is what the drive accepts.

use std::f64::consts::PI;

use swerve_hal::PidController;
use swerve_types::{ChassisSpeeds, Pose2d};

use crate::trajectory::TrajectoryState;

/// Proportional/integral/derivative gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidConstants {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidConstants {
    /// Proportional-only gains.
    pub const fn p(kp: f64) -> Self {
        Self {
            kp,
            ki: 0.0,
            kd: 0.0,
        }
    }

    fn controller(&self) -> PidController {
        PidController::new(self.kp, self.ki, self.kd)
    }
}

/// Trajectory tracking controller for a holonomic chassis.
#[derive(Debug, Clone)]
pub struct HolonomicController {
    x: PidController,
    y: PidController,
    rotation: PidController,
    period_s: f64,
}

impl HolonomicController {
    pub fn new(translation: PidConstants, rotation: PidConstants, period_s: f64) -> Self {
        let mut rotation = rotation.controller();
        rotation.enable_continuous_input(-PI, PI);
        Self {
            x: translation.controller(),
            y: translation.controller(),
            rotation,
            period_s,
        }
    }

    /// Time step the PID terms integrate and differentiate over.
    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    /// Forget accumulated integral and derivative state.  Call before
    /// starting a new trajectory.
    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.rotation.reset();
    }

    /// Robot-relative speeds that move `current` onto `target`.
    pub fn calculate(&mut self, current: &Pose2d, target: &TrajectoryState) -> ChassisSpeeds {
        self.x.set_set_point(target.pose.x());
        self.y.set_set_point(target.pose.y());
        self.rotation
            .set_set_point(target.pose.rotation().wrapped().radians());

        let vx = target.field_speeds.vx_mps + self.x.update(current.x(), self.period_s);
        let vy = target.field_speeds.vy_mps + self.y.update(current.y(), self.period_s);
        let omega = target.field_speeds.omega_rps
            + self
                .rotation
                .update(current.rotation().wrapped().radians(), self.period_s);

        ChassisSpeeds::from_field_relative(vx, vy, omega, current.rotation())
    }
}
