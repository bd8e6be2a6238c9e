//! [`RobotLoop`] – the fixed-period control loop.
//!
//! One Tokio task owns the drive subsystem and the optional autonomy bridge
//! and runs every cycle to completion:
//!
//! 1. [`SwerveSubsystem::periodic`] – gate, fuse, odometry, publish.
//! 2. If an autonomy routine is active, one follower step.
//!
//! Ticks come from a [`tokio::time::interval`] with
//! [`MissedTickBehavior::Skip`]: a slow cycle drops the ticks it overran
//! instead of bursting to catch up.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use swerve_drive::SwerveSubsystem;
//! use swerve_hal::sim::SimDrivetrain;
//! use swerve_middleware::EventBus;
//! use swerve_runtime::robot_loop::RobotLoop;
//! use swerve_types::config::{EstimatorConfig, LoopConfig, VisionConfig};
//!
//! # async fn demo() {
//! let sim = SimDrivetrain::builder().build();
//! let drive = SwerveSubsystem::simulated(
//!     &sim, &VisionConfig::default(), EstimatorConfig::default(), EventBus::default(),
//! );
//! let mut robot = RobotLoop::new(drive, None, LoopConfig::default());
//! robot.start();
//! let stats = robot.run(Arc::new(AtomicBool::new(false)), Some(50)).await;
//! assert_eq!(stats.cycles, 50);
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use swerve_autonomy::{AutoBridge, PathFollower, Trajectory};
use swerve_drive::{CycleOutcome, SwerveSubsystem};
use swerve_types::DriveError;
use swerve_types::config::LoopConfig;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Counters gathered over one [`RobotLoop::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    /// Cycles in which a vision measurement was fused.
    pub vision_fused: u64,
    /// Autonomy routines that ran to completion.
    pub routines_completed: u64,
}

/// Fixed-period robot loop.
pub struct RobotLoop {
    drive: SwerveSubsystem,
    autonomy: Option<AutoBridge>,
    routine: Option<PathFollower>,
    period: Duration,
    heading_zero_delay: Duration,
    stats: LoopStats,
}

impl RobotLoop {
    pub fn new(drive: SwerveSubsystem, autonomy: Option<AutoBridge>, config: LoopConfig) -> Self {
        if let Some(bridge) = &autonomy
            && (bridge.period_s() - config.period_s()).abs() > 1e-9
        {
            warn!(
                controller_period_s = bridge.period_s(),
                loop_period_s = config.period_s(),
                "autonomy controller period differs from the loop period"
            );
        }
        Self {
            drive,
            autonomy,
            routine: None,
            period: Duration::from_millis(config.period_ms.max(1)),
            heading_zero_delay: Duration::from_millis(config.heading_zero_delay_ms),
            stats: LoopStats::default(),
        }
    }

    /// Robot-init work: schedule the delayed heading zero.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        self.drive.schedule_heading_zero(self.heading_zero_delay);
        info!(
            period_ms = self.period.as_millis() as u64,
            heading_zero_delay_ms = self.heading_zero_delay.as_millis() as u64,
            autonomy = self.autonomy.is_some(),
            "robot loop started"
        );
    }

    pub fn drive(&self) -> &SwerveSubsystem {
        &self.drive
    }

    pub fn drive_mut(&mut self) -> &mut SwerveSubsystem {
        &mut self.drive
    }

    pub fn autonomy_enabled(&self) -> bool {
        self.autonomy.is_some()
    }

    /// Period the autonomy controller integrates over, if autonomy is on.
    pub fn autonomy_period_s(&self) -> Option<f64> {
        self.autonomy.as_ref().map(AutoBridge::period_s)
    }

    pub fn routine_active(&self) -> bool {
        self.routine.is_some()
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Start following `trajectory` on the next cycle.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::AutonomyUnavailable`] when the bridge failed to
    /// configure at startup.
    pub fn begin_routine(&mut self, trajectory: Box<dyn Trajectory>) -> Result<(), DriveError> {
        let bridge = self.autonomy.as_mut().ok_or_else(|| {
            DriveError::AutonomyUnavailable("autonomy disabled at startup".to_string())
        })?;
        self.routine = Some(bridge.begin(&mut self.drive, trajectory));
        Ok(())
    }

    /// Abandon the active routine and stop the modules.
    pub fn cancel_routine(&mut self) {
        if self.routine.take().is_some() {
            self.drive.stop_modules();
            info!("autonomy routine cancelled");
        }
    }

    /// Run one control cycle.
    pub fn cycle(&mut self) -> CycleOutcome {
        let outcome = self.drive.periodic();
        self.stats.cycles += 1;
        if outcome.vision_fused {
            self.stats.vision_fused += 1;
        }

        if let (Some(bridge), Some(routine)) = (self.autonomy.as_mut(), self.routine.as_mut()) {
            match bridge.follow(&mut self.drive, routine, self.period.as_secs_f64()) {
                Ok(true) => {
                    info!(elapsed_s = routine.elapsed_s(), "autonomy routine finished");
                    self.routine = None;
                    self.stats.routines_completed += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "autonomy step failed; routine aborted");
                    self.routine = None;
                    self.drive.stop_modules();
                }
            }
        }

        outcome
    }

    /// Cycle every period until `shutdown` is set or `max_cycles` have run.
    pub async fn run(&mut self, shutdown: Arc<AtomicBool>, max_cycles: Option<u64>) -> LoopStats {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let start = self.stats;

        loop {
            ticker.tick().await;
            if shutdown.load(Ordering::SeqCst) {
                info!("shutdown requested; leaving robot loop");
                break;
            }
            let outcome = self.cycle();
            debug!(
                detecting = outcome.detecting,
                fused = outcome.vision_fused,
                x = outcome.pose.x(),
                y = outcome.pose.y(),
                "cycle"
            );
            if max_cycles.is_some_and(|max| self.stats.cycles - start.cycles >= max) {
                break;
            }
        }

        self.drive.stop_modules();
        LoopStats {
            cycles: self.stats.cycles - start.cycles,
            vision_fused: self.stats.vision_fused - start.vision_fused,
            routines_completed: self.stats.routines_completed - start.routines_completed,
        }
    }
}
