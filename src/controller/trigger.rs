//! # Adaptive Trigger Effects
//!
//! Resistance modes for the DualSense L2/R2 triggers and the fixed mode cycle
//! used by the convenience helpers.
//!
//! ## Effect Block
//!
//! Each trigger is driven by an 11-byte effect block inside the USB output
//! report:
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | Mode |
//! | 1-6 | Force slots 0-5 |
//! | 7-8 | Unused |
//! | 9 | Force slot 6 |
//! | 10 | Unused |
//!
//! Force values are raw device bytes and are passed through unchanged.
//!
//! ## Usage
//!
//! ```
//! use ps5ctrl::controller::trigger::TriggerMode;
//!
//! let mode = TriggerMode::Off;
//! assert_eq!(mode.next(), TriggerMode::Rigid);
//! assert_eq!(mode.next().next().next(), TriggerMode::Off);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::Ps5CtrlError;

/// Number of force slots in a trigger effect.
pub const TRIGGER_FORCE_SLOTS: usize = 7;

/// Size of one trigger effect block in the output report.
pub const TRIGGER_EFFECT_BLOCK_SIZE: usize = 11;

/// Force slot carrying the resistance strength for rigid and pulse modes.
pub const STRENGTH_SLOT: usize = 1;

/// Trigger selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSide {
    /// L2
    Left,
    /// R2
    Right,
}

impl TriggerSide {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TriggerSide::Left => "left",
            TriggerSide::Right => "right",
        }
    }
}

impl fmt::Display for TriggerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TriggerSide {
    type Err = Ps5CtrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" | "l2" => Ok(TriggerSide::Left),
            "right" | "r" | "r2" => Ok(TriggerSide::Right),
            _ => Err(Ps5CtrlError::InvalidArgument(format!("unknown trigger '{}'", s))),
        }
    }
}

/// Trigger resistance mode, with the raw byte written to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TriggerMode {
    #[default]
    Off = 0x00,
    Rigid = 0x01,
    Pulse = 0x02,
    RigidA = 0x21,
    RigidB = 0x05,
    RigidAB = 0x25,
    PulseA = 0x22,
    PulseB = 0x06,
    PulseAB = 0x26,
    Calibration = 0xFC,
}

impl TriggerMode {
    /// Modes visited by [`TriggerMode::next`], in order.
    pub const CYCLE: [TriggerMode; 3] = [TriggerMode::Off, TriggerMode::Rigid, TriggerMode::Pulse];

    /// Raw mode byte.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Next mode in [`TriggerMode::CYCLE`], wrapping around.
    ///
    /// Modes outside the cycle advance to [`TriggerMode::Off`].
    #[must_use]
    pub fn next(self) -> TriggerMode {
        match Self::CYCLE.iter().position(|&mode| mode == self) {
            Some(index) => Self::CYCLE[(index + 1) % Self::CYCLE.len()],
            None => TriggerMode::Off,
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerMode::Off => "off",
            TriggerMode::Rigid => "rigid",
            TriggerMode::Pulse => "pulse",
            TriggerMode::RigidA => "rigid_a",
            TriggerMode::RigidB => "rigid_b",
            TriggerMode::RigidAB => "rigid_ab",
            TriggerMode::PulseA => "pulse_a",
            TriggerMode::PulseB => "pulse_b",
            TriggerMode::PulseAB => "pulse_ab",
            TriggerMode::Calibration => "calibration",
        };
        f.write_str(name)
    }
}

/// A complete trigger effect: mode plus raw force slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerEffect {
    pub mode: TriggerMode,
    pub forces: [u8; TRIGGER_FORCE_SLOTS],
}

impl TriggerEffect {
    /// Effect with `mode` and all force slots zeroed.
    #[must_use]
    pub fn new(mode: TriggerMode) -> Self {
        Self {
            mode,
            forces: [0; TRIGGER_FORCE_SLOTS],
        }
    }

    /// Effect with `mode` and `force` in the strength slot.
    #[must_use]
    pub fn with_strength(mode: TriggerMode, force: u8) -> Self {
        let mut effect = Self::new(mode);
        effect.forces[STRENGTH_SLOT] = force;
        effect
    }

    /// Returns a copy with one force slot replaced.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `slot` is not in `0..7`.
    pub fn with_force(self, slot: usize, value: u8) -> Result<Self, Ps5CtrlError> {
        if slot >= TRIGGER_FORCE_SLOTS {
            return Err(Ps5CtrlError::InvalidArgument(format!(
                "force slot {} is out of bounds (must be 0-{})",
                slot,
                TRIGGER_FORCE_SLOTS - 1
            )));
        }
        let mut effect = self;
        effect.forces[slot] = value;
        Ok(effect)
    }

    /// Serializes the effect into its output report block.
    #[must_use]
    pub fn to_block(&self) -> [u8; TRIGGER_EFFECT_BLOCK_SIZE] {
        let mut block = [0u8; TRIGGER_EFFECT_BLOCK_SIZE];
        block[0] = self.mode.as_byte();
        block[1..7].copy_from_slice(&self.forces[..6]);
        block[9] = self.forces[6];
        block
    }
}
