//! Time-parameterised trajectories.
//!
//! Spline generation belongs to the external path planner; the follower only
//! needs to sample a trajectory at a given time, which is what
//! [`Trajectory`] captures.  [`LinearTrajectory`] is a constant-velocity
//! stand-in for simulation and tests.
//!
//! Field coordinates always have their origin on the blue alliance wall.
//! [`flip_pose`] mirrors a blue-side pose onto the red side by rotating it
//! half a turn about the field centre.

use std::f64::consts::PI;

use swerve_types::{ChassisSpeeds, Pose2d, Rotation2d, Translation2d};

/// Field length along X, in metres.
pub const FIELD_LENGTH_M: f64 = 17.548;
/// Field width along Y, in metres.
pub const FIELD_WIDTH_M: f64 = 8.052;

/// Target state at one instant of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrajectoryState {
    pub time_s: f64,
    pub pose: Pose2d,
    /// Field-relative feed-forward velocity.
    pub field_speeds: ChassisSpeeds,
}

impl TrajectoryState {
    /// The same state on the other alliance's half of the field.
    pub fn flipped(&self) -> Self {
        Self {
            time_s: self.time_s,
            pose: flip_pose(&self.pose),
            field_speeds: ChassisSpeeds::new(
                -self.field_speeds.vx_mps,
                -self.field_speeds.vy_mps,
                self.field_speeds.omega_rps,
            ),
        }
    }
}

/// A trajectory produced by the path planner.
pub trait Trajectory: Send {
    /// Total duration in seconds.
    fn total_time_s(&self) -> f64;

    /// Target state at `time_s`, clamped to the trajectory's time span.
    fn sample(&self, time_s: f64) -> TrajectoryState;

    fn initial_pose(&self) -> Pose2d {
        self.sample(0.0).pose
    }
}

/// Mirror a blue-origin pose onto the red alliance's half of the field.
pub fn flip_pose(pose: &Pose2d) -> Pose2d {
    Pose2d::new(
        FIELD_LENGTH_M - pose.x(),
        FIELD_WIDTH_M - pose.y(),
        pose.rotation().plus(Rotation2d::from_radians(PI)),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// LinearTrajectory
// ────────────────────────────────────────────────────────────────────────────

/// Straight-line, constant-velocity motion between two poses with the
/// heading interpolated linearly along the short way round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrajectory {
    start: Pose2d,
    end: Pose2d,
    duration_s: f64,
}

impl LinearTrajectory {
    /// A trajectory from `start` to `end` travelled at `speed_mps`.
    ///
    /// Pure rotations take one second.
    pub fn new(start: Pose2d, end: Pose2d, speed_mps: f64) -> Self {
        let distance = end.translation().minus(start.translation()).norm();
        let duration_s = if speed_mps > 0.0 && distance > 1e-9 {
            distance / speed_mps
        } else {
            1.0
        };
        Self {
            start,
            end,
            duration_s,
        }
    }
}

impl Trajectory for LinearTrajectory {
    fn total_time_s(&self) -> f64 {
        self.duration_s
    }

    fn sample(&self, time_s: f64) -> TrajectoryState {
        let t = time_s.clamp(0.0, self.duration_s);
        let fraction = t / self.duration_s;

        let delta = self.end.translation().minus(self.start.translation());
        let turn = self.end.rotation().minus(self.start.rotation()).radians();

        let translation = self.start.translation().plus(delta.scale(fraction));
        let rotation = self
            .start
            .rotation()
            .plus(Rotation2d::from_radians(turn * fraction));

        let field_speeds = if time_s < self.duration_s {
            let v: Translation2d = delta.scale(1.0 / self.duration_s);
            ChassisSpeeds::new(v.x, v.y, turn / self.duration_s)
        } else {
            ChassisSpeeds::default()
        };

        TrajectoryState {
            time_s: t,
            pose: Pose2d::from_parts(translation, rotation),
            field_speeds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_trajectory_interpolates_and_clamps() {
        let traj = LinearTrajectory::new(
            Pose2d::origin(),
            Pose2d::new(2.0, 0.0, Rotation2d::from_degrees(90.0)),
            1.0,
        );
        assert!((traj.total_time_s() - 2.0).abs() < 1e-12);

        let mid = traj.sample(1.0);
        assert!((mid.pose.x() - 1.0).abs() < 1e-12);
        assert!((mid.pose.rotation().degrees() - 45.0).abs() < 1e-9);
        assert!((mid.field_speeds.vx_mps - 1.0).abs() < 1e-12);

        let past_end = traj.sample(10.0);
        assert!((past_end.pose.x() - 2.0).abs() < 1e-12);
        assert_eq!(past_end.field_speeds, ChassisSpeeds::default());
        assert_eq!(traj.initial_pose(), Pose2d::origin());
    }

    #[test]
    fn heading_interpolation_takes_short_way() {
        let traj = LinearTrajectory::new(
            Pose2d::new(0.0, 0.0, Rotation2d::from_degrees(170.0)),
            Pose2d::new(1.0, 0.0, Rotation2d::from_degrees(-170.0)),
            1.0,
        );
        let mid = traj.sample(0.5).pose.rotation().wrapped().degrees();
        assert!((mid.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn flip_mirrors_through_field_centre() {
        let blue = Pose2d::new(1.0, 2.0, Rotation2d::from_degrees(30.0));
        let red = flip_pose(&blue);
        assert!((red.x() - (FIELD_LENGTH_M - 1.0)).abs() < 1e-12);
        assert!((red.y() - (FIELD_WIDTH_M - 2.0)).abs() < 1e-12);
        assert!((red.rotation().wrapped().degrees() + 150.0).abs() < 1e-9);

        let back = flip_pose(&red);
        assert!((back.x() - 1.0).abs() < 1e-12);
        assert!((back.rotation().wrapped().degrees() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn flipped_state_reverses_translation_velocity() {
        let state = TrajectoryState {
            time_s: 0.5,
            pose: Pose2d::origin(),
            field_speeds: ChassisSpeeds::new(1.0, -2.0, 0.3),
        };
        let flipped = state.flipped();
        assert_eq!(flipped.field_speeds, ChassisSpeeds::new(-1.0, 2.0, 0.3));
        assert_eq!(flipped.time_s, 0.5);
    }
}
