//! `OrientationSensor` trait for yaw-reporting hardware (IMUs, gyroscopes).
//!
//! The sensor handle is shared: the control loop reads it every cycle while
//! the start-up zeroing task writes it once, so every method takes `&self`
//! and drivers keep their own interior synchronisation (vendor CAN handles
//! already behave this way).

use swerve_types::DriveError;

/// A single heading sensor.
pub trait OrientationSensor: Send + Sync {
    /// Stable identifier, e.g. `"pigeon2"`.
    fn id(&self) -> &str;

    /// Cumulative yaw in degrees, counter-clockwise positive.  Not wrapped:
    /// two full turns read 720.
    fn yaw_degrees(&self) -> f64;

    /// Zero the yaw baseline.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::HardwareFault`] when the device rejects the
    /// request (e.g. it is not yet on the bus).
    fn reset(&self) -> Result<(), DriveError>;

    /// Overwrite the yaw baseline so that the sensor reads `degrees`.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::HardwareFault`] when the device rejects the
    /// request.
    fn set_yaw(&self, degrees: f64) -> Result<(), DriveError>;
}
