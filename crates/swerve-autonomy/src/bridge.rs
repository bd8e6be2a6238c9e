//! [`AutoBridge`] – glue between the drive base and the path follower.
//!
//! The follower needs four things from the drive: the fused pose, a way to
//! reset it, the measured robot-relative velocity, and a sink for
//! robot-relative commands.  [`HolonomicDrive`] bundles them;
//! [`SwerveSubsystem`] implements it.
//!
//! Configuration happens once at startup.  When the robot description
//! cannot be loaded the failure is logged, an operator alert goes out on
//! [`Topic::SystemAlerts`], and the robot runs without autonomy.
//!
//! # Example
//!
//! ```rust,no_run
//! use swerve_autonomy::bridge::{Alliance, AutoBridge};
//! use swerve_middleware::EventBus;
//! use swerve_types::config::AutonomyConfig;
//!
//! let bus = EventBus::default();
//! let bridge = AutoBridge::configure_or_alert(
//!     &AutonomyConfig::default(),
//!     Box::new(|| Some(Alliance::Blue)),
//!     0.02,
//!     &bus,
//! );
//! if bridge.is_none() {
//!     // keep driving; autonomy is off for this match
//! }
//! ```

use swerve_drive::SwerveSubsystem;
use swerve_middleware::{EventBus, Topic};
use swerve_types::config::{AutonomyConfig, PathConstraints};
use swerve_types::{ChassisSpeeds, DriveError, Event, EventPayload, Pose2d};
use tracing::{debug, error, info, warn};

use crate::controller::{HolonomicController, PidConstants};
use crate::path::PathfindRequest;
use crate::robot_config::RobotConfig;
use crate::trajectory::{Trajectory, TrajectoryState};

const EVENT_SOURCE: &str = "swerve-autonomy::bridge";

// ────────────────────────────────────────────────────────────────────────────
// Drive seam
// ────────────────────────────────────────────────────────────────────────────

/// What the path follower needs from a holonomic drive base.
pub trait HolonomicDrive {
    fn pose(&self) -> Pose2d;

    fn reset_pose(&mut self, pose: Pose2d);

    /// Measured velocity in the robot frame.
    fn robot_relative_speeds(&self) -> ChassisSpeeds;

    /// Drive with robot-relative speeds.
    fn drive_robot_relative(&mut self, speeds: ChassisSpeeds) -> Result<(), DriveError>;
}

impl HolonomicDrive for SwerveSubsystem {
    fn pose(&self) -> Pose2d {
        SwerveSubsystem::pose(self)
    }

    fn reset_pose(&mut self, pose: Pose2d) {
        SwerveSubsystem::reset_pose(self, pose);
    }

    fn robot_relative_speeds(&self) -> ChassisSpeeds {
        SwerveSubsystem::robot_relative_speeds(self)
    }

    fn drive_robot_relative(&mut self, speeds: ChassisSpeeds) -> Result<(), DriveError> {
        SwerveSubsystem::drive_robot_relative(self, speeds)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Alliance
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alliance {
    Blue,
    Red,
}

/// Reports the alliance in play, `None` until the field says.
pub type AllianceSupplier = Box<dyn Fn() -> Option<Alliance> + Send + Sync>;

// ────────────────────────────────────────────────────────────────────────────
// AutoBridge
// ────────────────────────────────────────────────────────────────────────────

/// Configured path-following bridge.
pub struct AutoBridge {
    robot: RobotConfig,
    controller: HolonomicController,
    alliance: AllianceSupplier,
    constraints: PathConstraints,
    coral_station: Pose2d,
    bus: EventBus,
}

impl AutoBridge {
    /// Load the robot description and build the holonomic controller.
    ///
    /// `period_s` is the time between [`AutoBridge::follow`] calls, i.e.
    /// the robot loop period.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::AutonomyUnavailable`] when the settings file
    /// named in `config` is missing or invalid.
    pub fn configure(
        config: &AutonomyConfig,
        alliance: AllianceSupplier,
        period_s: f64,
        bus: EventBus,
    ) -> Result<Self, DriveError> {
        let robot = RobotConfig::from_settings_file(&config.settings_path)?;
        info!(
            mass_kg = robot.mass_kg,
            moi_kg_m2 = robot.moi_kg_m2,
            settings = %config.settings_path,
            "path follower configured"
        );
        Ok(Self::with_robot(robot, config, alliance, period_s, bus))
    }

    /// Like [`AutoBridge::configure`], but a failure is reported to the
    /// operator and turned into `None`.
    pub fn configure_or_alert(
        config: &AutonomyConfig,
        alliance: AllianceSupplier,
        period_s: f64,
        bus: &EventBus,
    ) -> Option<Self> {
        match Self::configure(config, alliance, period_s, bus.clone()) {
            Ok(bridge) => Some(bridge),
            Err(e) => {
                error!(error = %e, "failed to load path planner config; autonomy disabled");
                let alert = Event::new(
                    EVENT_SOURCE,
                    EventPayload::OperatorAlert {
                        component: "autonomy".to_string(),
                        message: format!("Failed to load path planner config and configure autonomy: {e}"),
                    },
                );
                if bus.publish_to(Topic::SystemAlerts, alert) == 0 {
                    warn!("no operator console is listening for the autonomy alert");
                }
                None
            }
        }
    }

    /// Build a bridge around an already loaded robot description.
    pub fn with_robot(
        robot: RobotConfig,
        config: &AutonomyConfig,
        alliance: AllianceSupplier,
        period_s: f64,
        bus: EventBus,
    ) -> Self {
        Self {
            robot,
            controller: HolonomicController::new(
                PidConstants::p(config.translation_kp),
                PidConstants::p(config.rotation_kp),
                period_s,
            ),
            alliance,
            constraints: config.constraints,
            coral_station: config.coral_station.into(),
            bus,
        }
    }

    pub fn robot(&self) -> &RobotConfig {
        &self.robot
    }

    /// Control period the holonomic controller was built for.
    pub fn period_s(&self) -> f64 {
        self.controller.period_s()
    }

    /// `true` when paths should be mirrored onto the red half of the field.
    pub fn should_flip(&self) -> bool {
        (self.alliance)() == Some(Alliance::Red)
    }

    /// Pathfinding request to `target` under the configured constraints.
    pub fn pathfind_to_pose(&self, target: Pose2d) -> PathfindRequest {
        PathfindRequest {
            target,
            constraints: self.constraints,
        }
    }

    /// Pathfinding request to the configured coral station.
    pub fn go_to_coral_station(&self) -> PathfindRequest {
        self.pathfind_to_pose(self.coral_station)
    }

    /// Start following `trajectory`.
    ///
    /// Resets the drive's pose to the trajectory's (alliance-corrected)
    /// starting pose.
    pub fn begin(
        &mut self,
        drive: &mut dyn HolonomicDrive,
        trajectory: Box<dyn Trajectory>,
    ) -> PathFollower {
        let flip = self.should_flip();
        let start = if flip {
            trajectory.sample(0.0).flipped().pose
        } else {
            trajectory.initial_pose()
        };
        drive.reset_pose(start);
        self.controller.reset();
        info!(
            duration_s = trajectory.total_time_s(),
            flipped = flip,
            "trajectory started"
        );
        PathFollower {
            trajectory,
            flip,
            elapsed_s: 0.0,
        }
    }

    /// Drive one step of `follower`, `dt_s` after the previous one.
    ///
    /// Returns `Ok(true)` once the trajectory has run its full duration; the
    /// drive is then commanded to stop.
    pub fn follow(
        &mut self,
        drive: &mut dyn HolonomicDrive,
        follower: &mut PathFollower,
        dt_s: f64,
    ) -> Result<bool, DriveError> {
        follower.elapsed_s += dt_s;
        let finished = follower.is_finished();

        let speeds = if finished {
            ChassisSpeeds::default()
        } else {
            let target = follower.sample();
            self.controller.calculate(&drive.pose(), &target)
        };

        drive.drive_robot_relative(speeds)?;
        debug!(
            elapsed_s = follower.elapsed_s,
            vx = speeds.vx_mps,
            vy = speeds.vy_mps,
            omega = speeds.omega_rps,
            "follower step"
        );
        let event = Event::new(EVENT_SOURCE, EventPayload::DriveCommand(speeds));
        self.bus.publish_to(Topic::DriveCommands, event);
        Ok(finished)
    }
}

/// Progress through one trajectory.
pub struct PathFollower {
    trajectory: Box<dyn Trajectory>,
    flip: bool,
    elapsed_s: f64,
}

impl PathFollower {
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_s >= self.trajectory.total_time_s()
    }

    fn sample(&self) -> TrajectoryState {
        let state = self.trajectory.sample(self.elapsed_s);
        if self.flip { state.flipped() } else { state }
    }
}

/// An alliance supplier that always reports `alliance`.
pub fn fixed_alliance(alliance: Option<Alliance>) -> AllianceSupplier {
    Box::new(move || alliance)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
