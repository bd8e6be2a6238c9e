//! [`Orientation`] – heading adapter over an [`OrientationSensor`].
//!
//! The sensor reports cumulative yaw; consumers that want a field heading
//! use [`Orientation::heading`], which wraps on every read and stores
//! nothing.
//!
//! Gyros need a warm-up period after power-on before a zero sticks.
//! [`Orientation::spawn_delayed_zero`] runs that zero as a Tokio task and
//! hands back a [`ZeroingHandle`] that the control loop can poll.

use std::sync::Arc;
use std::time::Duration;

use swerve_hal::OrientationSensor;
use swerve_types::Rotation2d;
use tokio::sync::watch;
use tracing::{info, warn};

/// Wrap a cumulative yaw into (-180°, 180°].
pub fn wrap_degrees(yaw_deg: f64) -> f64 {
    let r = yaw_deg.rem_euclid(360.0);
    if r > 180.0 { r - 360.0 } else { r }
}

/// Shared handle to the robot's heading sensor.
#[derive(Clone)]
pub struct Orientation {
    sensor: Arc<dyn OrientationSensor>,
}

impl Orientation {
    pub fn new(sensor: Arc<dyn OrientationSensor>) -> Self {
        Self { sensor }
    }

    /// Zero the yaw baseline.  A rejected request is logged and ignored.
    pub fn reset(&self) {
        if let Err(e) = self.sensor.reset() {
            warn!(sensor = self.sensor.id(), error = %e, "heading reset rejected");
        }
    }

    /// Override the yaw baseline.  A rejected request is logged and ignored.
    pub fn set_yaw(&self, degrees: f64) {
        if let Err(e) = self.sensor.set_yaw(degrees) {
            warn!(sensor = self.sensor.id(), error = %e, "heading override rejected");
        }
    }

    /// Cumulative, unwrapped yaw in degrees.
    pub fn yaw(&self) -> f64 {
        self.sensor.yaw_degrees()
    }

    /// Yaw wrapped into (-180°, 180°].
    pub fn heading(&self) -> f64 {
        wrap_degrees(self.yaw())
    }

    pub fn rotation(&self) -> Rotation2d {
        Rotation2d::from_degrees(self.heading())
    }

    /// Zero the heading once `delay` has elapsed, on a Tokio task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_delayed_zero(&self, delay: Duration) -> ZeroingHandle {
        let (tx, rx) = watch::channel(ZeroingStatus::Pending);
        let sensor = Arc::clone(&self.sensor);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let status = match sensor.reset() {
                Ok(()) => {
                    info!(sensor = sensor.id(), ?delay, "heading zeroed after warm-up");
                    ZeroingStatus::Zeroed
                }
                Err(e) => {
                    warn!(sensor = sensor.id(), error = %e, "delayed heading zero failed");
                    ZeroingStatus::Failed
                }
            };
            let _ = tx.send(status);
        });
        ZeroingHandle { status: rx }
    }
}

/// Progress of the start-up heading zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroingStatus {
    Pending,
    Zeroed,
    Failed,
}

/// Completion signal of [`Orientation::spawn_delayed_zero`].
#[derive(Debug, Clone)]
pub struct ZeroingHandle {
    status: watch::Receiver<ZeroingStatus>,
}

impl ZeroingHandle {
    /// A handle for a heading that needs no zeroing.
    pub fn completed() -> Self {
        let (_tx, rx) = watch::channel(ZeroingStatus::Zeroed);
        Self { status: rx }
    }

    pub fn status(&self) -> ZeroingStatus {
        *self.status.borrow()
    }

    pub fn is_complete(&self) -> bool {
        self.status() == ZeroingStatus::Zeroed
    }

    /// Wait until the task has finished, successfully or not.
    ///
    /// Returns [`ZeroingStatus::Failed`] if the task was dropped before it
    /// reported.
    pub async fn wait(&mut self) -> ZeroingStatus {
        match self
            .status
            .wait_for(|s| *s != ZeroingStatus::Pending)
            .await
        {
            Ok(s) => *s,
            Err(_) => ZeroingStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swerve_hal::sim::SimGyro;

    #[test]
    fn heading_wrap_examples() {
        assert_eq!(wrap_degrees(450.0), 90.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(-720.0), 0.0);
    }

    #[test]
    fn heading_wrap_is_in_range_and_congruent() {
        let mut yaw = -2000.0;
        while yaw <= 2000.0 {
            let h = wrap_degrees(yaw);
            assert!(h > -180.0 && h <= 180.0, "yaw {yaw} wrapped to {h}");
            let turns = (yaw - h) / 360.0;
            assert!((turns - turns.round()).abs() < 1e-9, "yaw {yaw} not congruent to {h}");
            yaw += 7.3;
        }
    }

    #[test]
    fn orientation_reads_raw_and_wrapped() {
        let gyro = SimGyro::new();
        gyro.rotate(450.0);
        let orientation = Orientation::new(Arc::new(gyro.clone()));
        assert_eq!(orientation.yaw(), 450.0);
        assert_eq!(orientation.heading(), 90.0);
        assert!((orientation.rotation().degrees() - 90.0).abs() < 1e-9);

        orientation.set_yaw(-30.0);
        assert_eq!(orientation.yaw(), -30.0);
        orientation.reset();
        assert_eq!(gyro.reset_count(), 1);
    }

    #[tokio::test]
    async fn delayed_zero_signals_completion() {
        let gyro = SimGyro::new();
        gyro.rotate(123.0);
        let orientation = Orientation::new(Arc::new(gyro.clone()));

        let mut handle = orientation.spawn_delayed_zero(Duration::from_millis(20));
        assert_eq!(handle.status(), ZeroingStatus::Pending);
        assert!(!handle.is_complete());

        assert_eq!(handle.wait().await, ZeroingStatus::Zeroed);
        assert!(handle.is_complete());
        assert_eq!(orientation.yaw(), 0.0);
        assert_eq!(gyro.reset_count(), 1);
    }

    #[test]
    fn completed_handle_is_complete() {
        assert!(ZeroingHandle::completed().is_complete());
    }
}
