//! `swerve-hal` – hardware abstraction for the swerve chassis.
//!
//! The rest of the workspace only talks to the traits defined here, so
//! vendor drivers (CAN gyros, motor controllers, network-table cameras) can
//! be swapped without touching estimation or autonomy code.
//!
//! # Modules
//!
//! - [`gyro`] – [`OrientationSensor`][gyro::OrientationSensor]: yaw source.
//! - [`module`] – [`WheelModule`][module::WheelModule] and the four-corner
//!   [`ModuleSet`][module::ModuleSet].
//! - [`limelight`] – [`LimelightBackend`][limelight::LimelightBackend]:
//!   network-table view of one fiducial camera.
//! - [`pid`] – [`PidController`][pid::PidController] used by the path
//!   follower.
//! - [`sim`] – simulated drivers for CI and headless runs.

pub mod gyro;
pub mod limelight;
pub mod module;
pub mod pid;
pub mod sim;

pub use gyro::OrientationSensor;
pub use limelight::{LimelightBackend, LimelightPoseEstimate, RobotOrientation};
pub use module::{MODULE_NAMES, ModuleSet, WheelModule};
pub use pid::PidController;
