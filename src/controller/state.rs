//! # Controller State Snapshot
//!
//! The most recent input sample read from the DualSense controller, plus the
//! identifier types used to address individual buttons, sticks and axes.
//!
//! ## Value Ranges
//!
//! | Input | Type | Range | Notes |
//! |-------|------|-------|-------|
//! | Stick axes | `i8` | -128..=127 | 0 = centre, raw byte minus 128 |
//! | Triggers (L2/R2) | `u8` | 0..=255 | 0 = released |
//! | Buttons | `bool` | | `true` = pressed |
//!
//! ## Usage
//!
//! ```
//! use ps5ctrl::controller::state::{Button, ControllerSnapshot};
//!
//! let mut snapshot = ControllerSnapshot::default();
//! assert!(!snapshot.button(Button::Cross));
//!
//! snapshot.set_button(Button::Cross, true);
//! assert_eq!(snapshot.pressed_buttons(), vec![Button::Cross]);
//! ```

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::trigger::TriggerSide;
use crate::error::Ps5CtrlError;

/// Stick axis value at rest.
pub const AXIS_CENTER: i8 = 0;

/// A physical button on the DualSense controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Cross,
    Circle,
    Square,
    Triangle,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    L1,
    R1,
    L2,
    R2,
    L3,
    R3,
    Create,
    Options,
    Ps,
    Touchpad,
    Mute,
}

impl Button {
    /// Every button, in display order.
    pub const ALL: [Button; 19] = [
        Button::Cross,
        Button::Circle,
        Button::Square,
        Button::Triangle,
        Button::DpadUp,
        Button::DpadDown,
        Button::DpadLeft,
        Button::DpadRight,
        Button::L1,
        Button::R1,
        Button::L2,
        Button::R2,
        Button::L3,
        Button::R3,
        Button::Create,
        Button::Options,
        Button::Ps,
        Button::Touchpad,
        Button::Mute,
    ];

    /// Canonical lowercase name, as printed by the debug loop.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Button::Cross => "cross",
            Button::Circle => "circle",
            Button::Square => "square",
            Button::Triangle => "triangle",
            Button::DpadUp => "dpad_up",
            Button::DpadDown => "dpad_down",
            Button::DpadLeft => "dpad_left",
            Button::DpadRight => "dpad_right",
            Button::L1 => "l1",
            Button::R1 => "r1",
            Button::L2 => "l2",
            Button::R2 => "r2",
            Button::L3 => "l3",
            Button::R3 => "r3",
            Button::Create => "create",
            Button::Options => "options",
            Button::Ps => "ps",
            Button::Touchpad => "touchpad",
            Button::Mute => "mute",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = Ps5CtrlError;

    /// Parses a button name, case-insensitively. `share` is accepted for `create`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "share" {
            return Ok(Button::Create);
        }
        Button::ALL
            .iter()
            .copied()
            .find(|button| button.name() == name)
            .ok_or_else(|| Ps5CtrlError::InvalidArgument(format!("unknown button '{}'", s)))
    }
}

/// Analog stick selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stick {
    Left,
    Right,
}

impl FromStr for Stick {
    type Err = Ps5CtrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Stick::Left),
            "right" | "r" => Ok(Stick::Right),
            _ => Err(Ps5CtrlError::InvalidArgument(format!("unknown stick '{}'", s))),
        }
    }
}

/// Stick axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl FromStr for Axis {
    type Err = Ps5CtrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            _ => Err(Ps5CtrlError::InvalidArgument(format!("unknown axis '{}'", s))),
        }
    }
}

/// The latest input sample reported by the controller.
///
/// Values are passed through from the device without deadzones or scaling.
///
/// # Examples
///
/// ```
/// use ps5ctrl::controller::state::ControllerSnapshot;
///
/// let snapshot = ControllerSnapshot::default();
/// assert_eq!(snapshot.left_stick_x, 0);  // Centered
/// assert!(!snapshot.btn_l1);             // Not pressed
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    // Analog sticks (-128..=127, 0 = center)
    /// Left stick X axis.
    pub left_stick_x: i8,
    /// Left stick Y axis.
    pub left_stick_y: i8,
    /// Right stick X axis.
    pub right_stick_x: i8,
    /// Right stick Y axis.
    pub right_stick_y: i8,

    // Triggers (0-255)
    /// L2 trigger analog value.
    pub trigger_l2: u8,
    /// R2 trigger analog value.
    pub trigger_r2: u8,

    // Face buttons
    pub btn_cross: bool,
    pub btn_circle: bool,
    pub btn_square: bool,
    pub btn_triangle: bool,

    // D-Pad
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,

    // Shoulder buttons
    pub btn_l1: bool,
    pub btn_r1: bool,
    /// L2 digital click.
    pub btn_l2: bool,
    /// R2 digital click.
    pub btn_r2: bool,

    // Stick clicks
    pub btn_l3: bool,
    pub btn_r3: bool,

    // System buttons
    /// Create button (labelled "share" on older pads).
    pub btn_create: bool,
    pub btn_options: bool,
    pub btn_ps: bool,
    pub btn_touchpad: bool,
    pub btn_mute: bool,
}

impl ControllerSnapshot {
    /// Returns the pressed state of `button`.
    #[must_use]
    pub fn button(&self, button: Button) -> bool {
        match button {
            Button::Cross => self.btn_cross,
            Button::Circle => self.btn_circle,
            Button::Square => self.btn_square,
            Button::Triangle => self.btn_triangle,
            Button::DpadUp => self.dpad_up,
            Button::DpadDown => self.dpad_down,
            Button::DpadLeft => self.dpad_left,
            Button::DpadRight => self.dpad_right,
            Button::L1 => self.btn_l1,
            Button::R1 => self.btn_r1,
            Button::L2 => self.btn_l2,
            Button::R2 => self.btn_r2,
            Button::L3 => self.btn_l3,
            Button::R3 => self.btn_r3,
            Button::Create => self.btn_create,
            Button::Options => self.btn_options,
            Button::Ps => self.btn_ps,
            Button::Touchpad => self.btn_touchpad,
            Button::Mute => self.btn_mute,
        }
    }

    /// Sets the pressed state of `button`.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let slot = match button {
            Button::Cross => &mut self.btn_cross,
            Button::Circle => &mut self.btn_circle,
            Button::Square => &mut self.btn_square,
            Button::Triangle => &mut self.btn_triangle,
            Button::DpadUp => &mut self.dpad_up,
            Button::DpadDown => &mut self.dpad_down,
            Button::DpadLeft => &mut self.dpad_left,
            Button::DpadRight => &mut self.dpad_right,
            Button::L1 => &mut self.btn_l1,
            Button::R1 => &mut self.btn_r1,
            Button::L2 => &mut self.btn_l2,
            Button::R2 => &mut self.btn_r2,
            Button::L3 => &mut self.btn_l3,
            Button::R3 => &mut self.btn_r3,
            Button::Create => &mut self.btn_create,
            Button::Options => &mut self.btn_options,
            Button::Ps => &mut self.btn_ps,
            Button::Touchpad => &mut self.btn_touchpad,
            Button::Mute => &mut self.btn_mute,
        };
        *slot = pressed;
    }

    /// Returns one stick axis value.
    #[must_use]
    pub fn axis(&self, stick: Stick, axis: Axis) -> i8 {
        match (stick, axis) {
            (Stick::Left, Axis::X) => self.left_stick_x,
            (Stick::Left, Axis::Y) => self.left_stick_y,
            (Stick::Right, Axis::X) => self.right_stick_x,
            (Stick::Right, Axis::Y) => self.right_stick_y,
        }
    }

    /// Returns one trigger's analog value.
    #[must_use]
    pub fn trigger(&self, side: TriggerSide) -> u8 {
        match side {
            TriggerSide::Left => self.trigger_l2,
            TriggerSide::Right => self.trigger_r2,
        }
    }

    /// All currently pressed buttons, in [`Button::ALL`] order.
    #[must_use]
    pub fn pressed_buttons(&self) -> Vec<Button> {
        Button::ALL
            .iter()
            .copied()
            .filter(|&button| self.button(button))
            .collect()
    }

    /// True when `button` is pressed here but was released in `previous`.
    #[must_use]
    pub fn pressed_since(&self, previous: &ControllerSnapshot, button: Button) -> bool {
        self.button(button) && !previous.button(button)
    }
}
