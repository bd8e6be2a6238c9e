//! `swerve-drive` – the swerve drive base.
//!
//! # Modules
//!
//! - [`subsystem`] – [`SwerveSubsystem`][subsystem::SwerveSubsystem]: owns
//!   the wheel modules, heading sensor, camera and pose estimator, runs the
//!   per-cycle gate → fuse → odometry → publish loop, and exposes the drive
//!   commands and pose queries the autonomy bridge builds on.

pub mod subsystem;

pub use subsystem::{
    CycleOutcome, DriveHardware, LOOP_PERIOD_S, SwerveSubsystem, pose_array,
};
