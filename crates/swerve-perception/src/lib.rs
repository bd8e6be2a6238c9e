//! `swerve-perception` – where the robot thinks it is.
//!
//! Turns raw gyro, wheel and camera readings into a field-relative pose.
//!
//! # Modules
//!
//! - [`orientation`] – [`Orientation`][orientation::Orientation]: heading
//!   adapter with the (-180°, 180°] wrap and the delayed start-up zero.
//! - [`vision`] – [`VisionAdapter`][vision::VisionAdapter] around one
//!   fiducial camera, plus the per-cycle [`VisionGate`][vision::VisionGate].
//! - [`estimator`] – [`PoseEstimator`][estimator::PoseEstimator] seam and the
//!   [`ComplementaryEstimator`][estimator::ComplementaryEstimator] used in
//!   simulation.
//! - [`kinematics`] – [`DriveKinematics`][kinematics::DriveKinematics] seam
//!   and the point-mass model used in simulation.

pub mod estimator;
pub mod kinematics;
pub mod orientation;
pub mod vision;

pub use estimator::{ComplementaryEstimator, PoseEstimator};
pub use kinematics::{DriveKinematics, PointKinematics};
pub use orientation::{Orientation, ZeroingHandle, ZeroingStatus, wrap_degrees};
pub use vision::{VisionAdapter, VisionGate};
