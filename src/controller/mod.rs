//! # Controller Module
//!
//! PS5 DualSense controller access.
//!
//! This module handles:
//! - Detecting and opening a USB-attached DualSense via hidapi
//! - Decoding input reports into a state snapshot
//! - Typed and by-name reads of buttons, sticks and triggers
//! - Writing adaptive trigger effects and cycling trigger modes

pub mod backend;
pub mod handle;
pub mod hid;
pub mod report;
pub mod state;
pub mod trigger;

pub use backend::ControllerBackend;
pub use handle::DualSenseController;
pub use state::{Axis, Button, ControllerSnapshot, Stick};
pub use trigger::{TriggerEffect, TriggerMode, TriggerSide};
