//! `WheelModule` trait and the four-corner [`ModuleSet`].
//!
//! A wheel module driver owns one drive motor, one steering motor and an
//! absolute encoder.  Closed-loop control of those motors happens inside the
//! driver; the rest of the stack only exchanges [`SwerveModuleState`] and
//! [`SwerveModulePosition`] values with it.

use swerve_types::{DriveError, ModuleArray, SwerveModulePosition, SwerveModuleState};
use tracing::warn;

/// Identifiers of the module slots, in [`ModuleArray`] order.
pub const MODULE_NAMES: ModuleArray<&str> = ["front_left", "front_right", "back_left", "back_right"];

/// One swerve module (drive + steer).
pub trait WheelModule: Send {
    /// Stable identifier, e.g. `"front_left"`.
    fn id(&self) -> &str;

    /// Most recently measured velocity and steering angle.
    fn state(&self) -> SwerveModuleState;

    /// Cumulative drive distance and steering angle.
    fn position(&self) -> SwerveModulePosition;

    /// Command the module towards `state`.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::HardwareFault`] when the motor controllers
    /// refuse the command.
    fn set_desired_state(&mut self, state: SwerveModuleState) -> Result<(), DriveError>;

    /// Cut drive and steering output.
    fn stop(&mut self);

    /// Zero the drive encoder and re-seed the steering encoder from the
    /// absolute encoder.
    fn reset_encoders(&mut self);
}

/// The four modules of a swerve chassis in front-left, front-right,
/// back-left, back-right order.
pub struct ModuleSet {
    modules: ModuleArray<Box<dyn WheelModule>>,
}

impl ModuleSet {
    pub fn new(modules: ModuleArray<Box<dyn WheelModule>>) -> Self {
        Self { modules }
    }

    pub fn states(&self) -> ModuleArray<SwerveModuleState> {
        std::array::from_fn(|i| self.modules[i].state())
    }

    pub fn positions(&self) -> ModuleArray<SwerveModulePosition> {
        std::array::from_fn(|i| self.modules[i].position())
    }

    /// Forward one desired state to each module.
    ///
    /// Every module is commanded even if an earlier one fails; the first
    /// failure is returned.
    pub fn set_desired_states(
        &mut self,
        states: &ModuleArray<SwerveModuleState>,
    ) -> Result<(), DriveError> {
        let mut first_err = None;
        for (module, state) in self.modules.iter_mut().zip(states) {
            if let Err(e) = module.set_desired_state(*state) {
                warn!(module = module.id(), error = %e, "module rejected desired state");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn stop_all(&mut self) {
        for module in &mut self.modules {
            module.stop();
        }
    }

    pub fn reset_all_encoders(&mut self) {
        for module in &mut self.modules {
            module.reset_encoders();
        }
    }
}
