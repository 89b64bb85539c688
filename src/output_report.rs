//! LED Output Report Encoding
//!
//! Packs an [`LedState`] into the output report described by an [`LedLayout`], and reads it back.
//!
//! Every bit outside the three indicator bits is written as zero.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{vec, vec::Vec};

use thiserror::Error;

use crate::{
  led_layout::{LedIndicator, LedLayout, LedState},
  report_data_types::ReportId,
  utils::bit_position,
};

/// Defines errors generated while encoding into a caller supplied buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputReportError {
  #[error("output buffer holds {actual} bytes but the report needs {required}")]
  BufferTooSmall { required: usize, actual: usize },
}

// Zero fills the report, writes the report id prefix and sets the lit indicator bits. `report` must be exactly
// layout.report_len() bytes long; every indicator bit of a layout lies inside that length.
pub(crate) fn write_report(layout: &LedLayout, state: LedState, report: &mut [u8]) {
  report.fill(0);
  let body = if layout.report_id().is_numbered() {
    report[0] = u8::from(layout.report_id());
    &mut report[1..]
  } else {
    report
  };

  for indicator in LedIndicator::ALL {
    if state.get(indicator) {
      let (byte_index, bit_mask) = bit_position(layout.bit(indicator));
      body[byte_index] |= bit_mask;
    }
  }
}

/// Returns the output report that sets the keyboard indicators to `state`.
///
/// The report is [`LedLayout::report_len`] bytes long and starts with the report id when reports are numbered.
pub fn encode_output_report(layout: &LedLayout, state: LedState) -> Vec<u8> {
  let mut report = vec![0u8; layout.report_len()];
  write_report(layout, state, &mut report);
  report
}

/// Encodes the output report for `state` into the start of `buffer` and returns its length.
///
/// Bytes of `buffer` past the report are left untouched.
pub fn encode_output_report_into(
  layout: &LedLayout,
  state: LedState,
  buffer: &mut [u8],
) -> Result<usize, OutputReportError> {
  let (required, actual) = (layout.report_len(), buffer.len());
  let report = buffer.get_mut(..required).ok_or(OutputReportError::BufferTooSmall { required, actual })?;
  write_report(layout, state, report);
  Ok(required)
}

/// Reads the indicator values back out of an output report.
///
/// Returns `None` if `report` is shorter than the layout's report, or if it does not start with the layout's report id.
pub fn led_state_from_report(layout: &LedLayout, report: &[u8]) -> Option<LedState> {
  let report = report.get(..layout.report_len())?;
  let body = if layout.report_id().is_numbered() {
    let (&report_id, body) = report.split_first()?;
    if ReportId::from(report_id) != layout.report_id() {
      return None;
    }
    body
  } else {
    report
  };

  let mut state = LedState::ALL_OFF;
  for indicator in LedIndicator::ALL {
    let (byte_index, bit_mask) = bit_position(layout.bit(indicator));
    state.set(indicator, body.get(byte_index)? & bit_mask != 0);
  }
  Some(state)
}
