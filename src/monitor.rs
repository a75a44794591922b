//! # Debug Loop
//!
//! Samples a [`DualSenseController`] on a fixed tick and prints one line per
//! sample (or per change) until a shutdown signal arrives.
//!
//! ## Output Formats
//!
//! Text (default):
//!
//! ```text
//! LX: 10 LY: -20 RX: 0 RY: 0 L2: 0 R2: 0 Buttons: cross
//! ```
//!
//! JSON Lines: one object per sample with an RFC 3339 `timestamp`, every
//! snapshot field and the list of `pressed` button names.
//!
//! ## Trigger Cycling
//!
//! With `cycle_on_buttons` enabled, pressing circle advances the right
//! trigger mode and pressing square advances the left one. Only the press
//! edge counts, so holding a button cycles once.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use std::str::FromStr;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::controller::backend::ControllerBackend;
use crate::controller::handle::DualSenseController;
use crate::controller::state::{Button, ControllerSnapshot};
use crate::controller::trigger::TriggerSide;
use crate::error::{Ps5CtrlError, Result};

/// Printed once before the first sample
pub const START_BANNER: &str = "Listening for controller input. Press CTRL+C to stop.";

/// Printed when the loop is interrupted
pub const STOP_MESSAGE: &str = "Stopping controller listener...";

/// Number of samples between status log messages
const LOG_INTERVAL_SAMPLES: u64 = 1000;

/// Button presses that cycle a trigger mode
const CYCLE_BINDINGS: [(Button, TriggerSide); 2] = [
    (Button::Circle, TriggerSide::Right),
    (Button::Square, TriggerSide::Left),
];

/// How each sample is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = Ps5CtrlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "jsonl" => Ok(OutputFormat::JsonLines),
            _ => Err(Ps5CtrlError::InvalidArgument(format!("unknown output format '{}'", s))),
        }
    }
}

/// Debug loop settings
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub format: OutputFormat,
    pub changes_only: bool,
    pub cycle_on_buttons: bool,
    pub poll_interval: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            changes_only: false,
            cycle_on_buttons: true,
            poll_interval: Duration::from_millis(20),
        }
    }
}

impl MonitorSettings {
    /// Build settings from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the output format is unknown.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            format: config.output.format.parse()?,
            changes_only: config.output.changes_only,
            cycle_on_buttons: config.controller.cycle_on_buttons,
            poll_interval: Duration::from_millis(config.controller.poll_interval_ms),
        })
    }
}

/// Render a snapshot as a human-readable line (without newline)
///
/// # Examples
///
/// ```
/// use ps5ctrl::controller::state::ControllerSnapshot;
/// use ps5ctrl::monitor::format_text_line;
///
/// let snapshot = ControllerSnapshot {
///     left_stick_x: 10,
///     left_stick_y: -20,
///     btn_cross: true,
///     ..Default::default()
/// };
///
/// assert_eq!(
///     format_text_line(&snapshot),
///     "LX: 10 LY: -20 RX: 0 RY: 0 L2: 0 R2: 0 Buttons: cross"
/// );
/// ```
#[must_use]
pub fn format_text_line(snapshot: &ControllerSnapshot) -> String {
    let pressed = snapshot.pressed_buttons();
    let buttons = if pressed.is_empty() {
        "none".to_string()
    } else {
        pressed.iter().map(|b| b.name()).collect::<Vec<_>>().join(" ")
    };

    format!(
        "LX: {} LY: {} RX: {} RY: {} L2: {} R2: {} Buttons: {}",
        snapshot.left_stick_x,
        snapshot.left_stick_y,
        snapshot.right_stick_x,
        snapshot.right_stick_y,
        snapshot.trigger_l2,
        snapshot.trigger_r2,
        buttons
    )
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    #[serde(flatten)]
    snapshot: &'a ControllerSnapshot,
    pressed: Vec<&'static str>,
}

/// Render a snapshot as one JSON object (without newline)
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn format_json_line(snapshot: &ControllerSnapshot, timestamp: DateTime<Utc>) -> Result<String> {
    let line = JsonLine {
        timestamp: timestamp.to_rfc3339(),
        snapshot,
        pressed: snapshot.pressed_buttons().iter().map(|b| b.name()).collect(),
    };
    Ok(serde_json::to_string(&line)?)
}

/// Read-print loop over a single controller
pub struct Monitor<B: ControllerBackend> {
    controller: DualSenseController<B>,
    settings: MonitorSettings,
    previous: ControllerSnapshot,
    last_printed: Option<ControllerSnapshot>,
    samples: u64,
}

impl<B: ControllerBackend> Monitor<B> {
    pub fn new(controller: DualSenseController<B>, settings: MonitorSettings) -> Self {
        Self {
            controller,
            settings,
            previous: ControllerSnapshot::default(),
            last_printed: None,
            samples: 0,
        }
    }

    pub fn controller(&self) -> &DualSenseController<B> {
        &self.controller
    }

    /// Number of samples taken so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Run one iteration: poll, react to cycle buttons, print
    ///
    /// # Returns
    ///
    /// `true` if a line was written.
    ///
    /// # Errors
    ///
    /// Returns the poll or trigger write error (e.g. controller unplugged),
    /// or an I/O error from `out`.
    pub fn step<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        let snapshot = self.controller.poll()?.clone();
        self.samples += 1;

        if self.settings.cycle_on_buttons {
            for (button, side) in CYCLE_BINDINGS {
                if snapshot.pressed_since(&self.previous, button) {
                    self.controller.cycle_trigger_mode(side)?;
                }
            }
        }

        let unchanged = self.last_printed.as_ref() == Some(&snapshot);
        let printed = if self.settings.changes_only && unchanged {
            false
        } else {
            let line = match self.settings.format {
                OutputFormat::Text => format_text_line(&snapshot),
                OutputFormat::JsonLines => format_json_line(&snapshot, Utc::now())?,
            };
            writeln!(out, "{}", line)?;
            out.flush()?;
            self.last_printed = Some(snapshot.clone());
            true
        };

        if self.samples % LOG_INTERVAL_SAMPLES == 0 {
            debug!("Read {} samples", self.samples);
        }

        self.previous = snapshot;
        Ok(printed)
    }

    /// Loop until `shutdown` completes or the controller fails
    ///
    /// The controller is closed on every exit path.
    ///
    /// # Returns
    ///
    /// Total number of samples taken.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ps5ctrl::controller::handle::DualSenseController;
    /// use ps5ctrl::monitor::{Monitor, MonitorSettings};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let controller = DualSenseController::open(10)?;
    ///     let monitor = Monitor::new(controller, MonitorSettings::default());
    ///     monitor.run(&mut std::io::stdout(), tokio::signal::ctrl_c()).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn run<W, F>(mut self, out: &mut W, shutdown: F) -> Result<u64>
    where
        W: Write,
        F: Future,
    {
        writeln!(out, "{}", START_BANNER)?;
        out.flush()?;

        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Polling controller every {}ms",
            self.settings.poll_interval.as_millis()
        );

        let result = loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Received Ctrl+C, shutting down...");
                    break writeln!(out, "{}", STOP_MESSAGE).map_err(Ps5CtrlError::from);
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.step(out) {
                        warn!("Controller loop stopped: {}", e);
                        break Err(e);
                    }
                }
            }
        };

        self.controller.close();
        info!("Total samples read: {}", self.samples);
        result.map(|()| self.samples)
    }
}
