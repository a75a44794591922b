//! # HID Backend
//!
//! [`ControllerBackend`] implementation talking to a USB-attached DualSense
//! through `hidapi`.
//!
//! ## Controller Detection
//!
//! The DualSense controller is identified by:
//! - Vendor ID: 0x054c (Sony)
//! - Product ID: 0x0ce6 (DualSense) or 0x0df2 (DualSense Edge)
//! - Bus type: USB (Bluetooth sessions are skipped)
//!
//! ## Reading
//!
//! The controller streams input reports faster than the state is polled.
//! Each read waits up to the read timeout for the first report, then drains
//! whatever else is queued so the snapshot reflects the newest report.

use bytes::Bytes;
use hidapi::{BusType, DeviceInfo, HidApi, HidDevice};
use tracing::{debug, info, trace, warn};

use super::backend::ControllerBackend;
use super::report::{decode_input_report, encode_output_report, USB_INPUT_REPORT_SIZE};
use super::state::ControllerSnapshot;
use super::trigger::{TriggerEffect, TriggerSide};
use crate::error::{Ps5CtrlError, Result};

/// PS5 DualSense vendor ID (Sony)
pub const DUALSENSE_VENDOR_ID: u16 = 0x054c;

/// PS5 DualSense product ID
pub const DUALSENSE_PRODUCT_ID: u16 = 0x0ce6;

/// PS5 DualSense Edge product ID (same USB report layout)
pub const DUALSENSE_EDGE_PRODUCT_ID: u16 = 0x0df2;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 10;

/// Upper bound on reports consumed by one read (hidraw queues up to 64)
pub const MAX_DRAINED_REPORTS: usize = 128;

/// Source of raw HID input reports
pub trait ReportSource {
    /// Read one report into `buf`, waiting at most `timeout_ms` (0 = no wait).
    ///
    /// Returns the number of bytes read, 0 when nothing arrived.
    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;
}

impl ReportSource for HidDevice {
    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        Ok(self.read_timeout(buf, timeout_ms)?)
    }
}

/// Read every queued report and return the newest decodable state
///
/// # Arguments
///
/// * `source` - Report source to drain
/// * `timeout_ms` - Wait for the first report; later reads do not block
/// * `last` - State returned when no decodable report arrives
///
/// # Errors
///
/// Returns the source error (usually a disconnect).
pub fn read_latest<S: ReportSource + ?Sized>(
    source: &S,
    timeout_ms: i32,
    last: &ControllerSnapshot,
) -> Result<ControllerSnapshot> {
    let mut buf = [0u8; USB_INPUT_REPORT_SIZE];
    let mut latest = last.clone();
    let mut timeout = timeout_ms;

    for _ in 0..MAX_DRAINED_REPORTS {
        let bytes_read = source.read_report(&mut buf, timeout)?;
        if bytes_read == 0 {
            break;
        }

        match decode_input_report(&buf[..bytes_read]) {
            Ok(snapshot) => latest = snapshot,
            Err(e) => trace!("Skipping report: {}", e),
        }
        timeout = 0;
    }

    Ok(latest)
}

/// HID session to a single DualSense controller
pub struct HidBackend {
    device: Option<HidDevice>,
    read_timeout_ms: i32,
    last: ControllerSnapshot,
    left: TriggerEffect,
    right: TriggerEffect,
    description: String,
}

impl std::fmt::Debug for HidBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidBackend")
            .field("description", &self.description)
            .field("open", &self.device.is_some())
            .finish_non_exhaustive()
    }
}

/// Whether a vendor/product pair is a DualSense or DualSense Edge
fn is_dualsense_id(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == DUALSENSE_VENDOR_ID
        && matches!(product_id, DUALSENSE_PRODUCT_ID | DUALSENSE_EDGE_PRODUCT_ID)
}

/// Whether a HID device entry is a USB-attached DualSense
fn is_usb_dualsense(info: &DeviceInfo) -> bool {
    is_dualsense_id(info.vendor_id(), info.product_id()) && matches!(info.bus_type(), BusType::Usb)
}

impl HidBackend {
    /// Detect and open the first USB-attached DualSense controller
    ///
    /// # Arguments
    ///
    /// * `read_timeout_ms` - Upper bound for a single report read
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the HID API cannot be initialized, no
    /// controller is attached, or the device cannot be opened (commonly a
    /// missing udev rule on Linux).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ps5ctrl::controller::hid::HidBackend;
    ///
    /// let backend = HidBackend::open(10)?;
    /// println!("Connected to: {}", backend.description());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(read_timeout_ms: i32) -> Result<Self> {
        let api = HidApi::new()
            .map_err(|e| Ps5CtrlError::Connection(format!("Failed to initialize HID API: {}", e)))?;

        for info in api.device_list() {
            debug!(
                "Found HID device: {} (vendor: 0x{:04x}, product: 0x{:04x}, bus: {:?})",
                info.path().to_string_lossy(),
                info.vendor_id(),
                info.product_id(),
                info.bus_type()
            );
        }

        let info = api
            .device_list()
            .find(|info| is_usb_dualsense(info))
            .ok_or_else(|| {
                Ps5CtrlError::Connection("No USB DualSense controller found".to_string())
            })?;

        let description = format!(
            "{} (serial: {})",
            info.product_string().unwrap_or("DualSense"),
            info.serial_number().unwrap_or("unknown")
        );

        let device = info.open_device(&api).map_err(|e| {
            Ps5CtrlError::Connection(format!(
                "Failed to open {}: {}",
                info.path().to_string_lossy(),
                e
            ))
        })?;

        info!("Found PS5 DualSense controller: {}", description);

        Ok(Self {
            device: Some(device),
            read_timeout_ms,
            last: ControllerSnapshot::default(),
            left: TriggerEffect::default(),
            right: TriggerEffect::default(),
            description,
        })
    }

    /// Human-readable product name and serial of the opened controller
    pub fn description(&self) -> &str {
        &self.description
    }

    fn device(&self) -> Result<&HidDevice> {
        self.device.as_ref().ok_or(Ps5CtrlError::NotConnected)
    }

    fn write_output(&self, report: &Bytes) -> Result<()> {
        let written = self.device()?.write(report)?;
        debug!("Sent output report ({} of {} bytes)", written, report.len());
        Ok(())
    }
}

impl ControllerBackend for HidBackend {
    fn read_snapshot(&mut self) -> Result<ControllerSnapshot> {
        self.last = read_latest(self.device()?, self.read_timeout_ms, &self.last)?;
        Ok(self.last.clone())
    }

    fn set_trigger(&mut self, side: TriggerSide, effect: &TriggerEffect) -> Result<()> {
        let (left, right) = match side {
            TriggerSide::Left => (*effect, self.right),
            TriggerSide::Right => (self.left, *effect),
        };
        self.write_output(&encode_output_report(&left, &right))?;
        self.left = left;
        self.right = right;
        Ok(())
    }

    fn close(&mut self) {
        if self.device.is_none() {
            return;
        }
        let off = TriggerEffect::default();
        if self.left != off || self.right != off {
            if let Err(e) = self.write_output(&encode_output_report(&off, &off)) {
                warn!("Failed to reset trigger effects: {}", e);
            }
        }
        // HidDevice closes its handle on drop
        self.device = None;
        info!("Released {}", self.description);
    }
}

impl Drop for HidBackend {
    fn drop(&mut self) {
        self.close();
    }
}
