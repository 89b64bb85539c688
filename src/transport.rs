//! USB HID Transport Boundary
//!
//! Control request parameters for reading a report descriptor and writing an output report (HID spec 1.11 sections
//! 7.1.1 and 7.2.2), and [`LedController`], which encodes indicator states for one interface and hands them to an
//! [`OutputReportSink`]. Performing the transfers is up to the sink.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{vec, vec::Vec};
use core::{fmt, time::Duration};

use tracing::{debug, warn};

use crate::{
  animation::Frame,
  led_layout::{LedLayout, LedState},
  output_report::write_report,
  report_data_types::ReportId,
};

/// Standard GET_DESCRIPTOR request.
pub const HID_REQUEST_GET_DESCRIPTOR: u8 = 0x06;
/// HID class SET_REPORT request.
pub const HID_REQUEST_SET_REPORT: u8 = 0x09;
/// Descriptor type of a HID report descriptor.
pub const HID_DESCRIPTOR_TYPE_REPORT: u8 = 0x22;
/// Report type of an output report in SET_REPORT.
pub const HID_REPORT_TYPE_OUTPUT: u8 = 0x02;
/// Device-to-host, standard, interface recipient.
pub const REQUEST_TYPE_IN_STANDARD_INTERFACE: u8 = 0x81;
/// Host-to-device, class, interface recipient.
pub const REQUEST_TYPE_OUT_CLASS_INTERFACE: u8 = 0x21;
/// Number of descriptor bytes requested from the device.
pub const REPORT_DESCRIPTOR_READ_LEN: u16 = 256;

/// Setup stage of a control transfer addressed at a HID interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSetup {
  pub request_type: u8,
  pub request: u8,
  pub value: u16,
  pub index: u16,
  pub length: u16,
}

impl ControlSetup {
  /// GET_DESCRIPTOR for the first report descriptor of `interface`.
  pub fn get_report_descriptor(interface: u8) -> Self {
    ControlSetup {
      request_type: REQUEST_TYPE_IN_STANDARD_INTERFACE,
      request: HID_REQUEST_GET_DESCRIPTOR,
      value: u16::from(HID_DESCRIPTOR_TYPE_REPORT) << 8,
      index: u16::from(interface),
      length: REPORT_DESCRIPTOR_READ_LEN,
    }
  }

  /// SET_REPORT carrying an output report of `length` bytes.
  pub fn set_output_report(interface: u8, report_id: ReportId, length: u16) -> Self {
    ControlSetup {
      request_type: REQUEST_TYPE_OUT_CLASS_INTERFACE,
      request: HID_REQUEST_SET_REPORT,
      value: u16::from(HID_REPORT_TYPE_OUTPUT) << 8 | u16::from(u8::from(report_id)),
      index: u16::from(interface),
      length,
    }
  }
}

impl fmt::Display for ControlSetup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "bmRequestType {:#04x} bRequest {:#04x} wValue {:#06x} wIndex {} wLength {}",
      self.request_type, self.request, self.value, self.index, self.length
    )
  }
}

/// Destination for encoded output reports, typically a control endpoint.
pub trait OutputReportSink {
  type Error: fmt::Display;

  /// Sends `report` using the given setup stage.
  fn set_output_report(&mut self, setup: &ControlSetup, report: &[u8]) -> Result<(), Self::Error>;
}

impl<S: OutputReportSink + ?Sized> OutputReportSink for &mut S {
  type Error = S::Error;

  fn set_output_report(&mut self, setup: &ControlSetup, report: &[u8]) -> Result<(), Self::Error> {
    (**self).set_output_report(setup, report)
  }
}

/// Drives the keyboard indicators of one HID interface.
pub struct LedController<S> {
  sink: S,
  interface: u8,
  layout: LedLayout,
  buffer: Vec<u8>,
}

impl<S: OutputReportSink> LedController<S> {
  pub fn new(sink: S, interface: u8, layout: LedLayout) -> Self {
    LedController { sink, interface, layout, buffer: vec![0u8; layout.report_len()] }
  }

  pub fn layout(&self) -> &LedLayout {
    &self.layout
  }

  pub fn interface(&self) -> u8 {
    self.interface
  }

  pub fn into_sink(self) -> S {
    self.sink
  }

  /// Encodes `state` and sends it as an output report.
  pub fn set_leds(&mut self, state: LedState) -> Result<(), S::Error> {
    // buffer is exactly layout.report_len() bytes and neither changes after construction.
    write_report(&self.layout, state, &mut self.buffer);
    let setup = ControlSetup::set_output_report(self.interface, self.layout.report_id(), self.layout.wire_len());
    self.sink.set_output_report(&setup, &self.buffer)
  }

  /// Sends each frame and then calls `sleep` with its hold time. Failed writes are logged and skipped; the number of
  /// failures is returned.
  pub fn play<I, F>(&mut self, frames: I, mut sleep: F) -> usize
  where
    I: IntoIterator<Item = Frame>,
    F: FnMut(Duration),
  {
    let mut failures = 0;
    for frame in frames {
      if let Err(error) = self.set_leds(frame.state) {
        warn!(interface = self.interface, %error, "cannot write output report");
        failures += 1;
      }
      sleep(frame.hold);
    }
    debug!(interface = self.interface, failures, "animation finished");
    failures
  }
}

#[cfg(test)]
mod tests {
  use super::{ControlSetup, LedController, OutputReportSink};
  use crate::{
    animation::{bounce, AnimationConfig, Frame},
    led_layout::{LedIndicator, LedLayout, LedState},
    led_layout_parser::MAX_OUTPUT_REPORT_SIZE,
    report_data_types::ReportId,
  };
  use alloc::{vec, vec::Vec};
  use core::time::Duration;

  #[derive(Default)]
  struct RecordingSink {
    sent: Vec<(ControlSetup, Vec<u8>)>,
    fail_every: Option<usize>,
  }

  impl OutputReportSink for RecordingSink {
    type Error = &'static str;

    fn set_output_report(&mut self, setup: &ControlSetup, report: &[u8]) -> Result<(), Self::Error> {
      self.sent.push((*setup, report.to_vec()));
      match self.fail_every {
        Some(n) if self.sent.len() % n == 0 => Err("stall"),
        _ => Ok(()),
      }
    }
  }

  fn numbered_layout() -> LedLayout {
    LedLayout::new(ReportId::from(1), 8, 2).unwrap()
  }

  #[test]
  fn setup_packets_should_match_hid_class_requests() {
    let get = ControlSetup::get_report_descriptor(2);
    assert_eq!(get, ControlSetup { request_type: 0x81, request: 0x06, value: 0x2200, index: 2, length: 256 });

    let set = ControlSetup::set_output_report(1, ReportId::from(5), 3);
    assert_eq!(set, ControlSetup { request_type: 0x21, request: 0x09, value: 0x0205, index: 1, length: 3 });
    assert_eq!(ControlSetup::set_output_report(0, ReportId::NONE, 1).value, 0x0200);
  }

  #[test]
  fn set_leds_should_send_encoded_report() {
    let mut controller = LedController::new(RecordingSink::default(), 1, numbered_layout());
    controller.set_leds(LedState::new(true, false, true)).unwrap();

    let sink = controller.into_sink();
    assert_eq!(sink.sent.len(), 1);
    let (setup, report) = &sink.sent[0];
    assert_eq!(*setup, ControlSetup::set_output_report(1, ReportId::from(1), 3));
    assert_eq!(report, &vec![0x01, 0x00, 0x05]);
  }

  #[test]
  fn set_leds_should_send_the_whole_largest_report() {
    let layout = LedLayout::new(ReportId::from(7), 0, MAX_OUTPUT_REPORT_SIZE).unwrap();
    let mut controller = LedController::new(RecordingSink::default(), 0, layout);
    controller.set_leds(LedState::only(LedIndicator::ScrollLock)).unwrap();
    controller.set_leds(LedState::ALL_OFF).unwrap();

    let sink = controller.into_sink();
    for (setup, report) in &sink.sent {
      assert_eq!(setup.length, 1025);
      assert_eq!(report.len(), 1025);
      assert_eq!(report[0], 0x07);
    }
    assert_eq!(sink.sent[0].1[1], 0x04);
    assert!(sink.sent[1].1[1..].iter().all(|byte| *byte == 0));
  }

  #[test]
  fn play_should_sleep_after_each_frame_and_count_failures() {
    let mut sink = RecordingSink { fail_every: Some(3), ..Default::default() };
    let mut slept = Vec::new();
    let failures = LedController::new(&mut sink, 0, numbered_layout())
      .play(bounce(&AnimationConfig::default(), 2), |hold| slept.push(hold));

    assert_eq!(failures, 2);
    assert_eq!(sink.sent.len(), 8);
    assert_eq!(slept.len(), 8);
    assert_eq!(slept[0], Duration::from_millis(300));
    assert_eq!(sink.sent[2].1, vec![0x01, 0x00, 0x04]);
  }

  #[test]
  fn play_should_accept_plain_frame_lists() {
    let mut sink = RecordingSink::default();
    let frames = [Frame::new(LedState::ALL_ON, Duration::ZERO), Frame::new(LedState::ALL_OFF, Duration::ZERO)];
    assert_eq!(LedController::new(&mut sink, 0, numbered_layout()).play(frames, |_| ()), 0);
    let reports: Vec<_> = sink.sent.iter().map(|(_, report)| report.clone()).collect();
    assert_eq!(reports, [vec![0x01, 0x00, 0x07], vec![0x01, 0x00, 0x00]]);
  }
}
