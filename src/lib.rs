//! HID Keyboard Indicator Layout Parser
//!
//! This crate walks a raw HID report descriptor to find where a device keeps its Num Lock, Caps Lock and Scroll Lock
//! indicator bits, and encodes output reports that set those indicators.
//!
//! Only one field shape is recognized: an Output item on the LED usage page (0x08) with data `0x02`
//! (Data, Variable, Absolute), Report Size 1, Report Count 3 and usages 1 through 3. An Output item that matches the
//! page and flags but not the shape is rejected rather than guessed at.
//!
//! Refer to the USB Device Class Definition for Human Interface Devices (HID) Version 1.11
//! <https://www.usb.org/sites/default/files/hid1_11.pdf>
//!
//! ## Example
//! ```
//! # use hidleds::{decode_led_layout, encode_output_report, LedState, ReportId};
//!
//!   let KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
//!     0x05, 0x01, // USAGE_PAGE (Generic Desktop)
//!     0x09, 0x06, // USAGE (Keyboard)
//!     0xa1, 0x01, // COLLECTION (Application)
//!     0x85, 0x01, //    REPORT_ID (1)
//!     0x75, 0x01, //    REPORT_SIZE (1)
//!     0x95, 0x08, //    REPORT_COUNT (8)
//!     0x05, 0x07, //    USAGE_PAGE (Key Codes)
//!     0x19, 0xE0, //    USAGE_MINIMUM (224)
//!     0x29, 0xE7, //    USAGE_MAXIMUM (231)
//!     0x81, 0x02, //    INPUT (Data, Var, Abs) (Modifier Byte)
//!     0x95, 0x03, //    REPORT_COUNT (3)
//!     0x05, 0x08, //    USAGE_PAGE (LEDs)
//!     0x19, 0x01, //    USAGE_MINIMUM (1)
//!     0x29, 0x03, //    USAGE_MAXIMUM (3)
//!     0x91, 0x02, //    OUTPUT (Data, Var, Abs) (LED report)
//!     0x95, 0x01, //    REPORT_COUNT (1)
//!     0x75, 0x05, //    REPORT_SIZE (5)
//!     0x91, 0x01, //    OUTPUT (Constant) (LED report padding)
//!     0xc0, // END_COLLECTION
//!   ];
//!
//!   let layout = decode_led_layout(KEYBOARD_REPORT_DESCRIPTOR).unwrap().expect("keyboard has LEDs");
//!   assert_eq!(layout.report_id(), ReportId::from(1));
//!   assert_eq!((layout.num_lock_bit(), layout.caps_lock_bit(), layout.scroll_lock_bit()), (0, 1, 2));
//!   assert_eq!(layout.total_size(), 1);
//!
//!   // Report id first, then Num Lock and Scroll Lock in bits 0 and 2.
//!   let report = encode_output_report(&layout, LedState::new(true, false, true));
//!   assert_eq!(report, [0x01, 0x05]);
//!
//! ```
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

#![no_std]
pub mod animation;
mod item_tokenizer;
pub mod led_layout;
pub mod led_layout_parser;
pub mod output_report;
pub mod report_data_types;
pub mod transport;
mod utils;

extern crate alloc;

pub use led_layout::{LedIndicator, LedLayout, LedState};
pub use led_layout_parser::{LedDescriptorError, LedFieldViolation, LedLayoutParser, MAX_OUTPUT_REPORT_SIZE};
pub use output_report::{encode_output_report, encode_output_report_into, led_state_from_report, OutputReportError};
pub use report_data_types::ReportId;

/// Locate the keyboard indicator field in the raw report descriptor in the given byte slice.
///
/// Returns `Ok(None)` when the descriptor declares no LED output field; many HID interfaces have none.
pub fn decode_led_layout(report_descriptor: &[u8]) -> Result<Option<LedLayout>, LedDescriptorError> {
  LedLayoutParser::parse(report_descriptor)
}

#[cfg(test)]
mod tests {
  use crate::{decode_led_layout, encode_output_report, LedLayout, LedState, ReportId};

  #[test]
  fn decode_then_encode_should_produce_led_byte() {
    let descriptor = [0x05, 0x08, 0x19, 0x01, 0x29, 0x03, 0x75, 0x01, 0x95, 0x03, 0x91, 0x02];
    let layout = decode_led_layout(&descriptor).unwrap().unwrap();
    assert_eq!(Some(layout), LedLayout::new(ReportId::NONE, 0, 1));
    assert_eq!(encode_output_report(&layout, LedState::new(true, false, true)), [0x05]);
  }

  #[test]
  fn public_types_should_be_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LedLayout>();
    assert_send_sync::<LedState>();
    assert_send_sync::<crate::LedDescriptorError>();
    assert_send_sync::<crate::transport::ControlSetup>();
  }
}
