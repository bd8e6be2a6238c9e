//! The kinematics collaborator.
//!
//! Converting between chassis motion and per-module motion depends on the
//! chassis geometry and belongs to the robotics math library the robot links
//! against.  The drive stack only relies on the three conversions of
//! [`DriveKinematics`].

use swerve_types::{
    ChassisSpeeds, ModuleArray, Rotation2d, SwerveModulePosition, SwerveModuleState,
    Translation2d, Twist2d,
};

/// Forward and inverse kinematics of a four-module chassis.
pub trait DriveKinematics: Send + Sync {
    /// Robot-relative chassis speeds produced by the measured module states.
    fn to_chassis_speeds(&self, states: &ModuleArray<SwerveModuleState>) -> ChassisSpeeds;

    /// Module states that realise robot-relative `speeds`.
    fn to_module_states(&self, speeds: ChassisSpeeds) -> ModuleArray<SwerveModuleState>;

    /// Robot-relative motion between two sets of module positions.
    fn to_twist(
        &self,
        start: &ModuleArray<SwerveModulePosition>,
        end: &ModuleArray<SwerveModulePosition>,
    ) -> Twist2d;
}

/// Point-mass kinematics for simulation: every module is treated as sitting
/// at the chassis centre, so translation is the mean module vector and
/// rotation is never observed (heading comes from the gyro anyway).
#[derive(Debug, Clone, Copy, Default)]
pub struct PointKinematics;

impl DriveKinematics for PointKinematics {
    fn to_chassis_speeds(&self, states: &ModuleArray<SwerveModuleState>) -> ChassisSpeeds {
        let sum = states.iter().fold(Translation2d::default(), |acc, s| {
            acc.plus(Translation2d::new(s.speed_mps, 0.0).rotate_by(s.angle))
        });
        let mean = sum.scale(1.0 / states.len() as f64);
        ChassisSpeeds::new(mean.x, mean.y, 0.0)
    }

    fn to_module_states(&self, speeds: ChassisSpeeds) -> ModuleArray<SwerveModuleState> {
        let v = Translation2d::new(speeds.vx_mps, speeds.vy_mps);
        let angle = if v.norm() > 1e-9 {
            v.angle()
        } else {
            Rotation2d::default()
        };
        [SwerveModuleState::new(v.norm(), angle); 4]
    }

    fn to_twist(
        &self,
        start: &ModuleArray<SwerveModulePosition>,
        end: &ModuleArray<SwerveModulePosition>,
    ) -> Twist2d {
        let sum = start
            .iter()
            .zip(end)
            .fold(Translation2d::default(), |acc, (a, b)| {
                acc.plus(Translation2d::new(b.distance_m - a.distance_m, 0.0).rotate_by(b.angle))
            });
        let mean = sum.scale(1.0 / start.len() as f64);
        Twist2d::new(mean.x, mean.y, 0.0)
    }
}
