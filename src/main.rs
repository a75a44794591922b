//! # ps5ctrl
//!
//! Prints live PS5 DualSense controller state to stdout until Ctrl+C.
//! Pressing circle or square cycles the right or left adaptive trigger.

use anyhow::{Context, Result};
use tracing::{error, info};

use ps5ctrl::config::{Config, DEFAULT_CONFIG_FILE};
use ps5ctrl::controller::DualSenseController;
use ps5ctrl::logging;
use ps5ctrl::monitor::{Monitor, MonitorSettings};

/// Main entry point for the controller debug tool
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load `ps5ctrl.toml` if present, else use defaults
///    - Set up logging to stderr (and optionally a log file)
///    - Open the first USB DualSense
///
/// 2. **Main Loop**
///    - Poll the controller on a fixed tick and print one line per sample
///    - Cycle trigger modes on circle/square presses
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C stops the loop and releases the device
///
/// # Errors
///
/// Returns error (non-zero exit) if:
/// - The configuration file is invalid
/// - No controller is found or it cannot be opened
/// - The controller is disconnected while running
///
/// # Examples
///
/// ```text
/// $ ps5ctrl
/// Listening for controller input. Press CTRL+C to stop.
/// LX: 0 LY: 0 RX: 0 RY: 0 L2: 0 R2: 0 Buttons: none
/// LX: 10 LY: -20 RX: 0 RY: 0 L2: 0 R2: 0 Buttons: cross
/// ^CStopping controller listener...
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let (config, found) = Config::load_or_default(DEFAULT_CONFIG_FILE)
        .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?;

    // Keep the file writer alive until exit
    let _log_guard = logging::init(&config.logging);

    info!("ps5ctrl v{} starting...", env!("CARGO_PKG_VERSION"));
    if found {
        info!("Loaded configuration from {}", DEFAULT_CONFIG_FILE);
    }

    let read_timeout_ms = i32::try_from(config.controller.read_timeout_ms)
        .context("read_timeout_ms out of range")?;

    let controller = match DualSenseController::open(read_timeout_ms) {
        Ok(controller) => controller.with_cycle_force(config.controller.cycle_force),
        Err(e) => {
            error!("Could not open controller: {}", e);
            return Err(e.into());
        }
    };

    let settings = MonitorSettings::from_config(&config)?;
    let monitor = Monitor::new(controller, settings);

    let mut stdout = std::io::stdout();
    monitor.run(&mut stdout, tokio::signal::ctrl_c()).await?;

    Ok(())
}
