//! # PS5 DualSense Connection Handle
//!
//! Owns one backend session to a DualSense controller, keeps the latest
//! input snapshot and the trigger effects last written to the device.
//!
//! ## Usage
//!
//! ```no_run
//! use ps5ctrl::controller::handle::DualSenseController;
//! use ps5ctrl::controller::trigger::TriggerSide;
//!
//! let mut controller = DualSenseController::open(10)?;
//! controller.poll()?;
//! println!("cross: {}", controller.get_button("cross")?);
//! println!("left x: {}", controller.get_axis("left", "x")?);
//!
//! controller.cycle_trigger_mode(TriggerSide::Right)?;
//! controller.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::{debug, info};

use super::backend::ControllerBackend;
use super::hid::HidBackend;
use super::state::{Axis, Button, ControllerSnapshot, Stick};
use super::trigger::{TriggerEffect, TriggerMode, TriggerSide};
use crate::error::{Ps5CtrlError, Result};

/// Force written by [`DualSenseController::cycle_trigger_mode`] unless configured otherwise
pub const DEFAULT_CYCLE_FORCE: u8 = 255;

/// Connection handle for a single DualSense controller
///
/// Getters are pure reads of the snapshot taken by the last
/// [`poll`](Self::poll). The backend is released by [`close`](Self::close)
/// or, failing that, when the handle is dropped.
pub struct DualSenseController<B: ControllerBackend> {
    backend: B,
    open: bool,
    snapshot: ControllerSnapshot,
    left: TriggerEffect,
    right: TriggerEffect,
    cycle_force: u8,
}

impl DualSenseController<HidBackend> {
    /// Detect and open the first USB-attached DualSense controller
    ///
    /// # Errors
    ///
    /// Returns `Connection` if no controller is found or the HID session
    /// cannot be established.
    pub fn open(read_timeout_ms: i32) -> Result<Self> {
        Ok(Self::with_backend(HidBackend::open(read_timeout_ms)?))
    }
}

impl<B: ControllerBackend> DualSenseController<B> {
    /// Wrap an already opened backend session
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            open: true,
            snapshot: ControllerSnapshot::default(),
            left: TriggerEffect::default(),
            right: TriggerEffect::default(),
            cycle_force: DEFAULT_CYCLE_FORCE,
        }
    }

    /// Set the force used when cycling trigger modes
    #[must_use]
    pub fn with_cycle_force(mut self, force: u8) -> Self {
        self.cycle_force = force;
        self
    }

    /// Whether the backend session is still held
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Read a fresh snapshot from the device
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` after [`close`](Self::close); backend read
    /// failures (e.g. the controller was unplugged) are passed through.
    pub fn poll(&mut self) -> Result<&ControllerSnapshot> {
        self.ensure_open()?;
        self.snapshot = self.backend.read_snapshot()?;
        Ok(&self.snapshot)
    }

    /// The snapshot taken by the last poll
    pub fn snapshot(&self) -> &ControllerSnapshot {
        &self.snapshot
    }

    /// Pressed state of a button by name (e.g. `"cross"`, `"l1"`, `"share"`)
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for unknown names.
    pub fn get_button(&self, name: &str) -> Result<bool> {
        Ok(self.button(name.parse()?))
    }

    /// Stick axis value by name (`"left"`/`"right"`, `"x"`/`"y"`)
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for unknown stick or axis names.
    pub fn get_axis(&self, stick: &str, axis: &str) -> Result<i8> {
        Ok(self.axis(stick.parse()?, axis.parse()?))
    }

    /// Trigger analog value by name (`"left"`/`"l2"`, `"right"`/`"r2"`)
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for unknown trigger names.
    pub fn get_trigger(&self, side: &str) -> Result<u8> {
        Ok(self.trigger(side.parse()?))
    }

    pub fn button(&self, button: Button) -> bool {
        self.snapshot.button(button)
    }

    pub fn axis(&self, stick: Stick, axis: Axis) -> i8 {
        self.snapshot.axis(stick, axis)
    }

    pub fn trigger(&self, side: TriggerSide) -> u8 {
        self.snapshot.trigger(side)
    }

    /// The effect last written to a trigger
    pub fn trigger_effect(&self, side: TriggerSide) -> &TriggerEffect {
        match side {
            TriggerSide::Left => &self.left,
            TriggerSide::Right => &self.right,
        }
    }

    /// Write a resistance mode with `force` in the strength slot
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` after close, or the backend write error. The
    /// recorded effect only changes when the write succeeds.
    pub fn set_trigger_mode(
        &mut self,
        side: TriggerSide,
        mode: TriggerMode,
        force: u8,
    ) -> Result<()> {
        self.apply_effect(side, TriggerEffect::with_strength(mode, force))
    }

    /// Write one raw force slot, keeping the current mode
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `slot` is not in `0..7`, otherwise as
    /// [`set_trigger_mode`](Self::set_trigger_mode).
    pub fn set_trigger_force(
        &mut self,
        side: TriggerSide,
        slot: usize,
        value: u8,
    ) -> Result<()> {
        let effect = self.trigger_effect(side).with_force(slot, value)?;
        self.apply_effect(side, effect)
    }

    /// Advance a trigger to the next mode in [`TriggerMode::CYCLE`]
    ///
    /// # Returns
    ///
    /// The mode now active on the trigger.
    pub fn cycle_trigger_mode(&mut self, side: TriggerSide) -> Result<TriggerMode> {
        let next = self.trigger_effect(side).mode.next();
        self.set_trigger_mode(side, next, self.cycle_force)?;
        info!("{} trigger mode: {}", side, next);
        Ok(next)
    }

    /// Release the backend session. Repeated calls are no-ops.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.backend.close();
        self.open = false;
        self.left = TriggerEffect::default();
        self.right = TriggerEffect::default();
        debug!("Controller handle closed");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Ps5CtrlError::NotConnected)
        }
    }

    fn apply_effect(&mut self, side: TriggerSide, effect: TriggerEffect) -> Result<()> {
        self.ensure_open()?;
        self.backend.set_trigger(side, &effect)?;
        debug!("{} trigger set to {} {:?}", side, effect.mode, effect.forces);
        match side {
            TriggerSide::Left => self.left = effect,
            TriggerSide::Right => self.right = effect,
        }
        Ok(())
    }
}

impl<B: ControllerBackend> Drop for DualSenseController<B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::backend::mocks::FakeBackend;
    use crate::controller::backend::MockControllerBackend;
    use mockall::predicate::{always, eq};
    use std::io;

    fn controller_with(
        snapshot: ControllerSnapshot,
    ) -> (DualSenseController<FakeBackend>, FakeBackend) {
        let backend = FakeBackend::with_snapshot(snapshot);
        let controller = DualSenseController::with_backend(backend.clone());
        (controller, backend)
    }

    #[test]
    fn test_get_button_reflects_every_button() {
        for button in Button::ALL {
            let mut snapshot = ControllerSnapshot::default();
            snapshot.set_button(button, true);
            let (mut controller, _) = controller_with(snapshot);
            controller.poll().unwrap();

            for other in Button::ALL {
                assert_eq!(
                    controller.get_button(other.name()).unwrap(),
                    other == button,
                    "{} while {} pressed",
                    other,
                    button
                );
            }
        }
    }

    #[test]
    fn test_getters_before_poll_return_defaults() {
        let (controller, _) = controller_with(ControllerSnapshot::default());
        assert!(!controller.get_button("cross").unwrap());
        assert_eq!(controller.get_axis("left", "x").unwrap(), 0);
        assert_eq!(controller.get_trigger("r2").unwrap(), 0);
    }

    #[test]
    fn test_axis_boundary_values() {
        let backend = FakeBackend::new();
        let mut controller = DualSenseController::with_backend(backend.clone());

        for raw in [0u8, 1, 127, 128, 254, 255] {
            let value = crate::controller::report::axis_from_raw(raw);
            backend.push_snapshot(ControllerSnapshot {
                left_stick_x: value,
                left_stick_y: value,
                right_stick_x: value,
                right_stick_y: value,
                ..Default::default()
            });
            controller.poll().unwrap();

            for stick in ["left", "right"] {
                for axis in ["x", "y"] {
                    let read = i16::from(controller.get_axis(stick, axis).unwrap());
                    assert!((-128..=127).contains(&read));
                    assert_eq!(read, i16::from(raw) - 128);
                }
            }
        }
    }

    #[test]
    fn test_get_trigger_by_name() {
        let (mut controller, _) = controller_with(ControllerSnapshot {
            trigger_l2: 40,
            trigger_r2: 255,
            ..Default::default()
        });
        controller.poll().unwrap();

        assert_eq!(controller.get_trigger("left").unwrap(), 40);
        assert_eq!(controller.get_trigger("L2").unwrap(), 40);
        assert_eq!(controller.get_trigger("right").unwrap(), 255);
    }

    #[test]
    fn test_unknown_identifiers_are_invalid_arguments() {
        let mut snapshot = ControllerSnapshot::default();
        snapshot.btn_cross = true;
        snapshot.left_stick_x = 10;
        let (mut controller, backend) = controller_with(snapshot.clone());
        controller.poll().unwrap();

        assert!(matches!(controller.get_button("select"), Err(Ps5CtrlError::InvalidArgument(_))));
        assert!(matches!(
            controller.get_axis("centre", "x"),
            Err(Ps5CtrlError::InvalidArgument(_))
        ));
        assert!(matches!(controller.get_axis("left", "z"), Err(Ps5CtrlError::InvalidArgument(_))));
        assert!(matches!(controller.get_trigger("l3"), Err(Ps5CtrlError::InvalidArgument(_))));
        assert!(matches!(
            controller.set_trigger_force(TriggerSide::Left, 9, 1),
            Err(Ps5CtrlError::InvalidArgument(_))
        ));

        // State unchanged, nothing written
        assert_eq!(*controller.snapshot(), snapshot);
        assert_eq!(*controller.trigger_effect(TriggerSide::Left), TriggerEffect::default());
        assert!(backend.get_written().is_empty());
    }

    #[test]
    fn test_set_trigger_mode_writes_effect() {
        let (mut controller, backend) = controller_with(ControllerSnapshot::default());

        controller.set_trigger_mode(TriggerSide::Left, TriggerMode::Rigid, 200).unwrap();

        let expected = TriggerEffect::with_strength(TriggerMode::Rigid, 200);
        assert_eq!(backend.get_written(), vec![(TriggerSide::Left, expected)]);
        assert_eq!(*controller.trigger_effect(TriggerSide::Left), expected);
        assert_eq!(*controller.trigger_effect(TriggerSide::Right), TriggerEffect::default());
    }

    #[test]
    fn test_set_trigger_force_keeps_mode() {
        let (mut controller, backend) = controller_with(ControllerSnapshot::default());
        controller.set_trigger_mode(TriggerSide::Right, TriggerMode::Pulse, 100).unwrap();
        controller.set_trigger_force(TriggerSide::Right, 0, 30).unwrap();

        let effect = *controller.trigger_effect(TriggerSide::Right);
        assert_eq!(effect.mode, TriggerMode::Pulse);
        assert_eq!(effect.forces, [30, 100, 0, 0, 0, 0, 0]);
        assert_eq!(backend.get_written().len(), 2);
    }

    #[test]
    fn test_failed_write_keeps_recorded_effect() {
        let (mut controller, backend) = controller_with(ControllerSnapshot::default());
        backend.set_write_error(io::ErrorKind::BrokenPipe);

        let result = controller.set_trigger_mode(TriggerSide::Left, TriggerMode::Rigid, 255);
        assert!(matches!(result, Err(Ps5CtrlError::Io(_))));
        assert_eq!(*controller.trigger_effect(TriggerSide::Left), TriggerEffect::default());
    }

    #[test]
    fn test_cycle_trigger_mode_sequence() {
        let (mut controller, backend) = controller_with(ControllerSnapshot::default());

        assert_eq!(controller.cycle_trigger_mode(TriggerSide::Right).unwrap(), TriggerMode::Rigid);
        assert_eq!(controller.cycle_trigger_mode(TriggerSide::Right).unwrap(), TriggerMode::Pulse);
        assert_eq!(controller.cycle_trigger_mode(TriggerSide::Right).unwrap(), TriggerMode::Off);

        let modes: Vec<_> = backend.get_written().iter().map(|(_, e)| e.mode).collect();
        assert_eq!(modes, vec![TriggerMode::Rigid, TriggerMode::Pulse, TriggerMode::Off]);
        assert!(backend
            .get_written()
            .iter()
            .all(|(side, e)| *side == TriggerSide::Right && e.forces[1] == DEFAULT_CYCLE_FORCE));
    }

    #[test]
    fn test_cycle_returns_to_start_after_full_cycle() {
        let (mut controller, _) = controller_with(ControllerSnapshot::default());
        let start = controller.trigger_effect(TriggerSide::Left).mode;

        for _ in 0..TriggerMode::CYCLE.len() {
            controller.cycle_trigger_mode(TriggerSide::Left).unwrap();
        }

        assert_eq!(controller.trigger_effect(TriggerSide::Left).mode, start);
    }

    #[test]
    fn test_cycle_uses_configured_force() {
        let backend = FakeBackend::new();
        let mut controller =
            DualSenseController::with_backend(backend.clone()).with_cycle_force(64);

        controller.cycle_trigger_mode(TriggerSide::Left).unwrap();
        assert_eq!(backend.get_written()[0].1.forces[1], 64);
    }

    #[test]
    fn test_close_twice() {
        let (mut controller, backend) = controller_with(ControllerSnapshot::default());

        controller.close();
        assert!(!controller.is_open());
        controller.close();
        assert!(!controller.is_open());

        assert_eq!(backend.close_count(), 1);
    }

    #[test]
    fn test_operations_after_close() {
        let (mut controller, _) = controller_with(ControllerSnapshot::default());
        controller.close();

        assert!(matches!(controller.poll(), Err(Ps5CtrlError::NotConnected)));
        assert!(matches!(
            controller.set_trigger_mode(TriggerSide::Left, TriggerMode::Rigid, 1),
            Err(Ps5CtrlError::NotConnected)
        ));
        assert!(matches!(
            controller.cycle_trigger_mode(TriggerSide::Right),
            Err(Ps5CtrlError::NotConnected)
        ));
    }

    #[test]
    fn test_drop_releases_backend() {
        let backend = FakeBackend::new();
        {
            let _controller = DualSenseController::with_backend(backend.clone());
        }
        assert_eq!(backend.close_count(), 1);
    }

    #[test]
    fn test_poll_propagates_disconnect() {
        let (mut controller, backend) = controller_with(ControllerSnapshot::default());
        backend.set_read_error(io::ErrorKind::NotConnected);

        assert!(controller.poll().is_err());
        assert!(controller.is_open(), "poll failure must not close the handle by itself");
    }

    #[test]
    fn test_mock_backend_interactions() {
        let mut mock = MockControllerBackend::new();
        mock.expect_set_trigger()
            .with(eq(TriggerSide::Right), eq(TriggerEffect::with_strength(TriggerMode::Rigid, 255)))
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_read_snapshot()
            .times(1)
            .returning(|| Ok(ControllerSnapshot { btn_ps: true, ..Default::default() }));
        mock.expect_close().times(1).return_const(());

        let mut controller = DualSenseController::with_backend(mock);
        controller.cycle_trigger_mode(TriggerSide::Right).unwrap();
        assert!(controller.poll().unwrap().btn_ps);
        controller.close();
        controller.close();
    }

    #[test]
    fn test_mock_backend_rejects_write_on_error() {
        let mut mock = MockControllerBackend::new();
        mock.expect_set_trigger()
            .with(eq(TriggerSide::Left), always())
            .returning(|_, _| Err(Ps5CtrlError::Connection("unplugged".to_string())));
        mock.expect_close().return_const(());

        let mut controller = DualSenseController::with_backend(mock);
        assert!(matches!(
            controller.cycle_trigger_mode(TriggerSide::Left),
            Err(Ps5CtrlError::Connection(_))
        ));
        assert_eq!(controller.trigger_effect(TriggerSide::Left).mode, TriggerMode::Off);
    }
}
