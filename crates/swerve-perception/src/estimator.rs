//! Pose estimation.
//!
//! [`PoseEstimator`] is the seam to the robotics library's swerve pose
//! estimator: odometry propagation every cycle plus occasional, lower-trust
//! vision corrections.  The drive loop only ever talks to the trait.
//!
//! [`ComplementaryEstimator`] is a lightweight stand-in for simulation and
//! tests.  It blends the two sources with a fixed-gain complementary filter:
//!
//! ```text
//! k      = q / (q + sqrt(q * r))          per axis, q = σ_state², r = σ_vision²
//! pose  ← pose ⊕ (k ∘ log(pose → vision))
//! ```
//!
//! Measurement timestamps are recorded but not replayed against history, so
//! latency is not compensated.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use swerve_perception::estimator::{ComplementaryEstimator, PoseEstimator};
//! use swerve_perception::kinematics::PointKinematics;
//! use swerve_types::config::EstimatorConfig;
//! use swerve_types::{Pose2d, Rotation2d, SwerveModulePosition};
//!
//! let start = [SwerveModulePosition::default(); 4];
//! let mut est = ComplementaryEstimator::new(
//!     Arc::new(PointKinematics),
//!     Rotation2d::default(),
//!     &start,
//!     Pose2d::origin(),
//!     EstimatorConfig::default(),
//! );
//!
//! let moved = [SwerveModulePosition::new(1.0, Rotation2d::default()); 4];
//! let pose = est.update(Rotation2d::default(), &moved);
//! assert!((pose.x() - 1.0).abs() < 1e-9);
//! ```

use std::sync::Arc;

use swerve_types::config::{EstimatorConfig, StdDevs};
use swerve_types::{ModuleArray, Pose2d, Rotation2d, SwerveModulePosition};

use crate::kinematics::DriveKinematics;

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

/// Odometry + vision pose estimator.
pub trait PoseEstimator: Send {
    /// Set the noise model applied to subsequent vision measurements.
    fn set_vision_measurement_std_devs(&mut self, std_devs: StdDevs);

    /// Fold one vision pose, captured at `timestamp_s`, into the estimate.
    fn add_vision_measurement(&mut self, pose: Pose2d, timestamp_s: f64);

    /// Dead-reckon from the previous module positions to `positions`.
    /// Returns the updated estimate.
    fn update(
        &mut self,
        gyro_angle: Rotation2d,
        positions: &ModuleArray<SwerveModulePosition>,
    ) -> Pose2d;

    /// Discard history and declare the robot to be at `pose`.
    fn reset_position(
        &mut self,
        gyro_angle: Rotation2d,
        positions: &ModuleArray<SwerveModulePosition>,
        pose: Pose2d,
    );

    fn estimated_position(&self) -> Pose2d;
}

// ────────────────────────────────────────────────────────────────────────────
// ComplementaryEstimator
// ────────────────────────────────────────────────────────────────────────────

/// Fixed-gain complementary filter implementing [`PoseEstimator`].
pub struct ComplementaryEstimator {
    kinematics: Arc<dyn DriveKinematics>,
    state_std_devs: StdDevs,
    /// Per-axis vision gains `(kx, ky, kθ)`, each in `[0, 1]`.
    gains: [f64; 3],
    pose: Pose2d,
    /// Field heading minus gyro angle.
    gyro_offset: Rotation2d,
    prev_gyro: Rotation2d,
    prev_positions: ModuleArray<SwerveModulePosition>,
    last_vision_timestamp: Option<f64>,
}

impl ComplementaryEstimator {
    /// Create an estimator at `initial_pose` with the vision noise model
    /// defaulting to `(0.9, 0.9, 0.9)` until
    /// [`PoseEstimator::set_vision_measurement_std_devs`] is called.
    pub fn new(
        kinematics: Arc<dyn DriveKinematics>,
        gyro_angle: Rotation2d,
        positions: &ModuleArray<SwerveModulePosition>,
        initial_pose: Pose2d,
        config: EstimatorConfig,
    ) -> Self {
        let mut est = Self {
            kinematics,
            state_std_devs: config.state_std_devs,
            gains: [0.0; 3],
            pose: initial_pose,
            gyro_offset: Rotation2d::default(),
            prev_gyro: gyro_angle,
            prev_positions: *positions,
            last_vision_timestamp: None,
        };
        est.set_vision_measurement_std_devs(StdDevs::new(0.9, 0.9, 0.9));
        est.reset_position(gyro_angle, positions, initial_pose);
        est
    }

    /// Capture time of the most recent vision measurement folded in.
    pub fn last_vision_timestamp(&self) -> Option<f64> {
        self.last_vision_timestamp
    }

    /// Current per-axis vision gains `(kx, ky, kθ)`.
    pub fn gains(&self) -> [f64; 3] {
        self.gains
    }
}

fn gain(state_std: f64, vision_std: f64) -> f64 {
    let q = state_std * state_std;
    let r = vision_std * vision_std;
    if q == 0.0 {
        0.0
    } else {
        q / (q + (q * r).sqrt())
    }
}

impl PoseEstimator for ComplementaryEstimator {
    fn set_vision_measurement_std_devs(&mut self, std_devs: StdDevs) {
        let s = self.state_std_devs;
        self.gains = [
            gain(s.x, std_devs.x),
            gain(s.y, std_devs.y),
            gain(s.heading, std_devs.heading),
        ];
    }

    fn add_vision_measurement(&mut self, pose: Pose2d, timestamp_s: f64) {
        let [kx, ky, kt] = self.gains;
        let correction = self.pose.log(&pose).scale_each(kx, ky, kt);
        self.pose = self.pose.exp(correction);
        // Keep the heading correction through subsequent gyro updates.
        self.gyro_offset = self.pose.rotation().minus(self.prev_gyro);
        self.last_vision_timestamp = Some(timestamp_s);
    }

    fn update(
        &mut self,
        gyro_angle: Rotation2d,
        positions: &ModuleArray<SwerveModulePosition>,
    ) -> Pose2d {
        let heading = gyro_angle.plus(self.gyro_offset);
        let mut twist = self.kinematics.to_twist(&self.prev_positions, positions);
        twist.dtheta = heading.minus(self.pose.rotation()).radians();

        let advanced = self.pose.exp(twist);
        self.pose = Pose2d::from_parts(advanced.translation(), heading);
        self.prev_gyro = gyro_angle;
        self.prev_positions = *positions;
        self.pose
    }

    fn reset_position(
        &mut self,
        gyro_angle: Rotation2d,
        positions: &ModuleArray<SwerveModulePosition>,
        pose: Pose2d,
    ) {
        self.pose = pose;
        self.gyro_offset = pose.rotation().minus(gyro_angle);
        self.prev_gyro = gyro_angle;
        self.prev_positions = *positions;
    }

    fn estimated_position(&self) -> Pose2d {
        self.pose
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
