//! # DualSense USB Reports
//!
//! Decodes the USB input report into a [`ControllerSnapshot`] and builds the
//! USB output report carrying the adaptive trigger effects.
//!
//! Only the fields this tool reads or writes are handled. Everything else in
//! the reports (motion sensors, touch points, lightbar, audio) is ignored on
//! input and left zeroed with its valid-flag cleared on output, so the
//! controller keeps its current settings for those features.
//!
//! ## Input Report (ID 0x01, 64 bytes)
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | Report ID |
//! | 1-4 | LX, LY, RX, RY (0-255) |
//! | 5-6 | L2, R2 (0-255) |
//! | 7 | Sequence counter |
//! | 8 | Hat (low nibble) + face buttons |
//! | 9 | Shoulders, create, options, stick clicks |
//! | 10 | PS, touchpad, mute |
//!
//! ## Output Report (ID 0x02, 48 bytes)
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | Report ID |
//! | 1 | Valid flag 0 (0x04 right trigger, 0x08 left trigger) |
//! | 11-21 | Right trigger effect block |
//! | 22-32 | Left trigger effect block |

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::state::{Button, ControllerSnapshot};
use super::trigger::{TriggerEffect, TRIGGER_EFFECT_BLOCK_SIZE};
use crate::error::{Ps5CtrlError, Result};

/// USB input report ID.
pub const USB_INPUT_REPORT_ID: u8 = 0x01;
/// Full USB input report size.
pub const USB_INPUT_REPORT_SIZE: usize = 64;
/// Bytes needed to decode sticks, triggers and buttons.
pub const USB_INPUT_REPORT_MIN_SIZE: usize = 11;

/// USB output report ID.
pub const USB_OUTPUT_REPORT_ID: u8 = 0x02;
/// USB output report size.
pub const USB_OUTPUT_REPORT_SIZE: usize = 48;

/// Valid flag 0 bit enabling the right trigger effect.
pub const VALID_FLAG0_RIGHT_TRIGGER: u8 = 0x04;
/// Valid flag 0 bit enabling the left trigger effect.
pub const VALID_FLAG0_LEFT_TRIGGER: u8 = 0x08;

/// Offset of the right trigger effect block.
pub const RIGHT_TRIGGER_OFFSET: usize = 11;
/// Offset of the left trigger effect block.
pub const LEFT_TRIGGER_OFFSET: usize = 22;

/// Hat switch value reported when no direction is pressed.
pub const HAT_NEUTRAL: u8 = 0x08;

const FACE_BUTTONS: [(u8, Button); 4] = [
    (0x10, Button::Square),
    (0x20, Button::Cross),
    (0x40, Button::Circle),
    (0x80, Button::Triangle),
];

const MISC_BUTTONS: [(u8, Button); 8] = [
    (0x01, Button::L1),
    (0x02, Button::R1),
    (0x04, Button::L2),
    (0x08, Button::R2),
    (0x10, Button::Create),
    (0x20, Button::Options),
    (0x40, Button::L3),
    (0x80, Button::R3),
];

const SYSTEM_BUTTONS: [(u8, Button); 3] = [
    (0x01, Button::Ps),
    (0x02, Button::Touchpad),
    (0x04, Button::Mute),
];

/// Converts a raw stick byte (0-255, 128 = center) to a signed axis value.
#[inline]
#[must_use]
pub fn axis_from_raw(raw: u8) -> i8 {
    (i16::from(raw) - 128) as i8
}

/// Decode a USB input report into a snapshot
///
/// # Arguments
///
/// * `data` - Raw report as returned by the HID read, starting with the report ID
///
/// # Errors
///
/// Returns `InvalidReport` if the report is too short or is not an input report.
///
/// # Examples
///
/// ```
/// use ps5ctrl::controller::report::decode_input_report;
///
/// let mut report = [0u8; 64];
/// report[0] = 0x01;
/// report[1] = 138;   // LX
/// report[8] = 0x28;  // Hat neutral + cross
///
/// let snapshot = decode_input_report(&report)?;
/// assert_eq!(snapshot.left_stick_x, 10);
/// assert!(snapshot.btn_cross);
/// # Ok::<(), ps5ctrl::error::Ps5CtrlError>(())
/// ```
pub fn decode_input_report(data: &[u8]) -> Result<ControllerSnapshot> {
    if data.len() < USB_INPUT_REPORT_MIN_SIZE {
        return Err(Ps5CtrlError::InvalidReport(format!(
            "input report too short: {} bytes",
            data.len()
        )));
    }

    let mut buf = data;
    let report_id = buf.get_u8();
    if report_id != USB_INPUT_REPORT_ID {
        return Err(Ps5CtrlError::InvalidReport(format!(
            "unexpected report id 0x{:02x}",
            report_id
        )));
    }

    let mut snapshot = ControllerSnapshot {
        left_stick_x: axis_from_raw(buf.get_u8()),
        left_stick_y: axis_from_raw(buf.get_u8()),
        right_stick_x: axis_from_raw(buf.get_u8()),
        right_stick_y: axis_from_raw(buf.get_u8()),
        trigger_l2: buf.get_u8(),
        trigger_r2: buf.get_u8(),
        ..Default::default()
    };

    // Sequence counter
    buf.advance(1);

    let face = buf.get_u8();
    let misc = buf.get_u8();
    let system = buf.get_u8();

    apply_hat(&mut snapshot, face & 0x0F);
    apply_bits(&mut snapshot, face, &FACE_BUTTONS);
    apply_bits(&mut snapshot, misc, &MISC_BUTTONS);
    apply_bits(&mut snapshot, system, &SYSTEM_BUTTONS);

    Ok(snapshot)
}

/// Hat values run clockwise from 0 (up) to 7 (up-left).
fn apply_hat(snapshot: &mut ControllerSnapshot, hat: u8) {
    snapshot.dpad_up = matches!(hat, 0 | 1 | 7);
    snapshot.dpad_right = matches!(hat, 1..=3);
    snapshot.dpad_down = matches!(hat, 3..=5);
    snapshot.dpad_left = matches!(hat, 5..=7);
}

fn apply_bits(snapshot: &mut ControllerSnapshot, byte: u8, table: &[(u8, Button)]) {
    for &(mask, button) in table {
        snapshot.set_button(button, byte & mask != 0);
    }
}

/// Encode the USB output report carrying both trigger effects
///
/// Both effects are always written; the controller has no per-trigger
/// "keep current" state once the valid flag is set.
///
/// # Returns
///
/// * `Bytes` - 48-byte report starting with the report ID
///
/// # Examples
///
/// ```
/// use ps5ctrl::controller::report::{encode_output_report, USB_OUTPUT_REPORT_SIZE};
/// use ps5ctrl::controller::trigger::{TriggerEffect, TriggerMode};
///
/// let left = TriggerEffect::default();
/// let right = TriggerEffect::with_strength(TriggerMode::Rigid, 255);
///
/// let report = encode_output_report(&left, &right);
/// assert_eq!(report.len(), USB_OUTPUT_REPORT_SIZE);
/// assert_eq!(report[11], 0x01);
/// ```
#[must_use]
pub fn encode_output_report(left: &TriggerEffect, right: &TriggerEffect) -> Bytes {
    let mut report = BytesMut::with_capacity(USB_OUTPUT_REPORT_SIZE);
    report.put_u8(USB_OUTPUT_REPORT_ID);
    report.put_u8(VALID_FLAG0_RIGHT_TRIGGER | VALID_FLAG0_LEFT_TRIGGER);

    // Valid flag 1, rumble, audio, mute LED and power save stay untouched
    report.put_bytes(0, RIGHT_TRIGGER_OFFSET - report.len());
    report.put_slice(&right.to_block());
    report.put_slice(&left.to_block());
    report.put_bytes(0, USB_OUTPUT_REPORT_SIZE - report.len());

    debug_assert_eq!(LEFT_TRIGGER_OFFSET, RIGHT_TRIGGER_OFFSET + TRIGGER_EFFECT_BLOCK_SIZE);
    report.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::trigger::TriggerMode;

    /// Input report with all sticks centered and nothing pressed.
    fn neutral_report() -> [u8; USB_INPUT_REPORT_SIZE] {
        let mut report = [0u8; USB_INPUT_REPORT_SIZE];
        report[0] = USB_INPUT_REPORT_ID;
        report[1..5].copy_from_slice(&[128, 128, 128, 128]);
        report[8] = HAT_NEUTRAL;
        report
    }

    #[test]
    fn test_axis_from_raw_boundaries() {
        assert_eq!(axis_from_raw(0), -128);
        assert_eq!(axis_from_raw(128), 0);
        assert_eq!(axis_from_raw(255), 127);
    }

    #[test]
    fn test_decode_neutral_report() {
        let snapshot = decode_input_report(&neutral_report()).unwrap();
        assert_eq!(snapshot, ControllerSnapshot::default());
    }

    #[test]
    fn test_decode_sticks_and_triggers() {
        let mut report = neutral_report();
        report[1..7].copy_from_slice(&[138, 108, 0, 255, 17, 200]);

        let snapshot = decode_input_report(&report).unwrap();
        assert_eq!(snapshot.left_stick_x, 10);
        assert_eq!(snapshot.left_stick_y, -20);
        assert_eq!(snapshot.right_stick_x, -128);
        assert_eq!(snapshot.right_stick_y, 127);
        assert_eq!(snapshot.trigger_l2, 17);
        assert_eq!(snapshot.trigger_r2, 200);
    }

    #[test]
    fn test_decode_face_buttons() {
        let mut report = neutral_report();
        report[8] = HAT_NEUTRAL | 0x10 | 0x40;

        let snapshot = decode_input_report(&report).unwrap();
        assert_eq!(snapshot.pressed_buttons(), vec![Button::Circle, Button::Square]);
    }

    #[test]
    fn test_decode_misc_and_system_buttons() {
        let mut report = neutral_report();
        report[9] = 0xFF;
        report[10] = 0x07;

        let snapshot = decode_input_report(&report).unwrap();
        for button in [
            Button::L1,
            Button::R1,
            Button::L2,
            Button::R2,
            Button::Create,
            Button::Options,
            Button::L3,
            Button::R3,
            Button::Ps,
            Button::Touchpad,
            Button::Mute,
        ] {
            assert!(snapshot.button(button), "{} should be pressed", button);
        }
        assert!(!snapshot.btn_cross);
    }

    #[test]
    fn test_decode_hat_directions() {
        let cases: [(u8, [bool; 4]); 9] = [
            // (hat, [up, right, down, left])
            (0, [true, false, false, false]),
            (1, [true, true, false, false]),
            (2, [false, true, false, false]),
            (3, [false, true, true, false]),
            (4, [false, false, true, false]),
            (5, [false, false, true, true]),
            (6, [false, false, false, true]),
            (7, [true, false, false, true]),
            (HAT_NEUTRAL, [false, false, false, false]),
        ];

        for (hat, [up, right, down, left]) in cases {
            let mut report = neutral_report();
            report[8] = hat;
            let snapshot = decode_input_report(&report).unwrap();
            assert_eq!(
                [snapshot.dpad_up, snapshot.dpad_right, snapshot.dpad_down, snapshot.dpad_left],
                [up, right, down, left],
                "hat value {}",
                hat
            );
        }
    }

    #[test]
    fn test_decode_short_report() {
        let result = decode_input_report(&[USB_INPUT_REPORT_ID, 128, 128]);
        match result {
            Err(Ps5CtrlError::InvalidReport(msg)) => assert!(msg.contains("too short")),
            other => panic!("Expected InvalidReport, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_report_id() {
        let mut report = neutral_report();
        report[0] = 0x31;
        assert!(matches!(
            decode_input_report(&report),
            Err(Ps5CtrlError::InvalidReport(_))
        ));
    }

    #[test]
    fn test_encode_output_report_layout() {
        let left = TriggerEffect {
            mode: TriggerMode::Pulse,
            forces: [1, 2, 3, 4, 5, 6, 7],
        };
        let right = TriggerEffect::with_strength(TriggerMode::Rigid, 255);

        let report = encode_output_report(&left, &right);

        assert_eq!(report.len(), USB_OUTPUT_REPORT_SIZE);
        assert_eq!(report[0], USB_OUTPUT_REPORT_ID);
        assert_eq!(report[1], VALID_FLAG0_RIGHT_TRIGGER | VALID_FLAG0_LEFT_TRIGGER);
        assert!(report[2..RIGHT_TRIGGER_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(
            &report[RIGHT_TRIGGER_OFFSET..LEFT_TRIGGER_OFFSET],
            &[0x01, 0, 255, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            &report[LEFT_TRIGGER_OFFSET..LEFT_TRIGGER_OFFSET + TRIGGER_EFFECT_BLOCK_SIZE],
            &[0x02, 1, 2, 3, 4, 5, 6, 0, 0, 7, 0]
        );
        assert!(report[LEFT_TRIGGER_OFFSET + TRIGGER_EFFECT_BLOCK_SIZE..]
            .iter()
            .all(|&b| b == 0));
    }
}
