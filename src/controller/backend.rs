//! Trait abstraction for controller I/O to enable testing without hardware

use super::state::ControllerSnapshot;
use super::trigger::{TriggerEffect, TriggerSide};
use crate::error::Result;

/// Minimal capability set the connection handle needs from a device session
#[cfg_attr(test, mockall::automock)]
pub trait ControllerBackend {
    /// Read the most recent input state.
    ///
    /// Returns the previous state again when the device has nothing new.
    fn read_snapshot(&mut self) -> Result<ControllerSnapshot>;

    /// Write a trigger effect to the device
    fn set_trigger(&mut self, side: TriggerSide, effect: &TriggerEffect) -> Result<()>;

    /// Release the device session. Must tolerate repeated calls.
    fn close(&mut self);
}
