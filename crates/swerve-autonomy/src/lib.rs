//! `swerve-autonomy` – path-following bridge.
//!
//! Trajectory generation and pathfinding belong to the external path
//! planner.  This crate wires the planner's output to the drive base.
//!
//! # Modules
//!
//! - [`bridge`] – [`AutoBridge`][bridge::AutoBridge] and the
//!   [`HolonomicDrive`][bridge::HolonomicDrive] seam implemented by the
//!   swerve subsystem.
//! - [`controller`] – [`HolonomicController`][controller::HolonomicController]:
//!   feed-forward plus translation/rotation PID.
//! - [`path`] – align-path and pathfinding requests.
//! - [`robot_config`] – [`RobotConfig`][robot_config::RobotConfig] read from
//!   the planner GUI's JSON settings.
//! - [`trajectory`] – the [`Trajectory`][trajectory::Trajectory] seam,
//!   alliance flipping and a linear stand-in for simulation.

pub mod bridge;
pub mod controller;
pub mod path;
pub mod robot_config;
pub mod trajectory;

pub use bridge::{Alliance, AllianceSupplier, AutoBridge, HolonomicDrive, PathFollower, fixed_alliance};
pub use controller::{HolonomicController, PidConstants};
pub use path::{GoalEndState, PathRequest, PathfindRequest, approach_heading, create_align_path};
pub use robot_config::RobotConfig;
pub use trajectory::{LinearTrajectory, Trajectory, TrajectoryState, flip_pose};
