//! # PS5 Controller Library
//!
//! Read a USB-attached PS5 DualSense controller and drive its adaptive
//! triggers.
//!
//! This library provides the controller connection handle, the state
//! snapshot model, trigger effects, and the debug loop that prints live
//! controller state.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod monitor;
