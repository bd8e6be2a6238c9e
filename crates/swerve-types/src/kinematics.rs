//! Kinematic value types shared between the drive, estimator and autonomy
//! layers.  The solvers that convert between these types live behind the
//! `DriveKinematics` trait in `swerve-perception`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Pose2d, Rotation2d, Translation2d};

/// Number of swerve modules on the chassis.
pub const MODULE_COUNT: usize = 4;

/// Chassis velocity `(vx, vy, ω)` in m/s and rad/s.
///
/// Whether the vector is field- or robot-relative depends on where it came
/// from; the conversion helpers make that explicit at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    pub vx_mps: f64,
    pub vy_mps: f64,
    pub omega_rps: f64,
}

impl ChassisSpeeds {
    pub const fn new(vx_mps: f64, vy_mps: f64, omega_rps: f64) -> Self {
        Self {
            vx_mps,
            vy_mps,
            omega_rps,
        }
    }

    /// Convert field-relative speeds into the robot frame given the robot's
    /// current heading.
    pub fn from_field_relative(vx: f64, vy: f64, omega: f64, robot_angle: Rotation2d) -> Self {
        let v = Translation2d::new(vx, vy).rotate_by(robot_angle.inverse());
        Self::new(v.x, v.y, omega)
    }

    /// Convert robot-relative speeds into the field frame given the robot's
    /// current heading.
    pub fn from_robot_relative(vx: f64, vy: f64, omega: f64, robot_angle: Rotation2d) -> Self {
        let v = Translation2d::new(vx, vy).rotate_by(robot_angle);
        Self::new(v.x, v.y, omega)
    }

    /// Compensate for the translational skew that appears when a chassis
    /// translates and rotates at the same time over a discrete period `dt_s`.
    ///
    /// Returns the constant speeds that, integrated along an arc for `dt_s`,
    /// land on the pose a straight-line application of `self` would reach.
    pub fn discretize(&self, dt_s: f64) -> Self {
        if dt_s <= 0.0 {
            return *self;
        }
        let desired = Pose2d::new(
            self.vx_mps * dt_s,
            self.vy_mps * dt_s,
            Rotation2d::from_radians(self.omega_rps * dt_s),
        );
        let twist = Pose2d::origin().log(&desired);
        Self::new(twist.dx / dt_s, twist.dy / dt_s, twist.dtheta / dt_s)
    }
}

/// Velocity and steering angle of one swerve module.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwerveModuleState {
    pub speed_mps: f64,
    pub angle: Rotation2d,
}

impl SwerveModuleState {
    pub const fn new(speed_mps: f64, angle: Rotation2d) -> Self {
        Self { speed_mps, angle }
    }
}

impl fmt::Display for SwerveModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwerveModuleState(Speed: {:.2} m/s, Angle: {})",
            self.speed_mps, self.angle
        )
    }
}

/// Cumulative travelled distance and steering angle of one swerve module.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwerveModulePosition {
    pub distance_m: f64,
    pub angle: Rotation2d,
}

impl SwerveModulePosition {
    pub const fn new(distance_m: f64, angle: Rotation2d) -> Self {
        Self { distance_m, angle }
    }
}

/// Per-module values in front-left, front-right, back-left, back-right order.
pub type ModuleArray<T> = [T; MODULE_COUNT];
