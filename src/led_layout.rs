//! Keyboard Indicator Layout Types
//!
//! [`LedLayout`] records where the Num Lock, Caps Lock and Scroll Lock bits sit inside a device's output report.
//! [`LedState`] is the set of indicator values written into such a report.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

use crate::{led_layout_parser::MAX_OUTPUT_REPORT_SIZE, report_data_types::ReportId};

/// The three keyboard indicators, numbered by their usage id on the LED usage page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LedIndicator {
  NumLock = 1,
  CapsLock = 2,
  ScrollLock = 3,
}

impl LedIndicator {
  pub const ALL: [LedIndicator; 3] = [LedIndicator::NumLock, LedIndicator::CapsLock, LedIndicator::ScrollLock];
}

/// On/off value for each indicator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedState {
  pub num_lock: bool,
  pub caps_lock: bool,
  pub scroll_lock: bool,
}

impl LedState {
  pub const ALL_OFF: LedState = LedState { num_lock: false, caps_lock: false, scroll_lock: false };
  pub const ALL_ON: LedState = LedState { num_lock: true, caps_lock: true, scroll_lock: true };

  pub fn new(num_lock: bool, caps_lock: bool, scroll_lock: bool) -> Self {
    LedState { num_lock, caps_lock, scroll_lock }
  }

  /// A state with only the given indicator lit.
  pub fn only(indicator: LedIndicator) -> Self {
    let mut state = Self::ALL_OFF;
    state.set(indicator, true);
    state
  }

  pub fn get(&self, indicator: LedIndicator) -> bool {
    match indicator {
      LedIndicator::NumLock => self.num_lock,
      LedIndicator::CapsLock => self.caps_lock,
      LedIndicator::ScrollLock => self.scroll_lock,
    }
  }

  pub fn set(&mut self, indicator: LedIndicator, on: bool) {
    match indicator {
      LedIndicator::NumLock => self.num_lock = on,
      LedIndicator::CapsLock => self.caps_lock = on,
      LedIndicator::ScrollLock => self.scroll_lock = on,
    }
  }
}

impl fmt::Display for LedState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let flag = |on: bool, name: &'static str| if on { name } else { "-" };
    write!(
      f,
      "[{} {} {}]",
      flag(self.num_lock, "num"),
      flag(self.caps_lock, "caps"),
      flag(self.scroll_lock, "scroll")
    )
  }
}

/// Location of the keyboard indicators in an output report.
///
/// Bit offsets count from the first bit after the report id byte (if any). The three indicators occupy consecutive
/// bits, all of which fall inside the `total_size` byte body, and the body never exceeds [`MAX_OUTPUT_REPORT_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(try_from = "LedLayoutFields"))]
pub struct LedLayout {
  report_id: ReportId,
  num_lock_bit: u32,
  caps_lock_bit: u32,
  scroll_lock_bit: u32,
  total_size: u16,
}

impl LedLayout {
  /// Builds a layout whose indicators start at `num_lock_bit` inside a `total_size` byte report body.
  ///
  /// Returns `None` if the body is larger than [`MAX_OUTPUT_REPORT_SIZE`] or the three indicator bits do not fit in
  /// it.
  pub fn new(report_id: ReportId, num_lock_bit: u32, total_size: usize) -> Option<Self> {
    if total_size > MAX_OUTPUT_REPORT_SIZE {
      return None;
    }
    let scroll_lock_bit = num_lock_bit.checked_add(2)?;
    if u64::from(scroll_lock_bit) >= total_size as u64 * 8 {
      return None;
    }
    Some(LedLayout {
      report_id,
      num_lock_bit,
      caps_lock_bit: num_lock_bit + 1,
      scroll_lock_bit,
      total_size: u16::try_from(total_size).ok()?,
    })
  }

  /// Report id prefixed to each output report, or [`ReportId::NONE`].
  pub fn report_id(&self) -> ReportId {
    self.report_id
  }

  pub fn num_lock_bit(&self) -> u32 {
    self.num_lock_bit
  }

  pub fn caps_lock_bit(&self) -> u32 {
    self.caps_lock_bit
  }

  pub fn scroll_lock_bit(&self) -> u32 {
    self.scroll_lock_bit
  }

  /// Size in bytes of the output report body, excluding the report id byte.
  pub fn total_size(&self) -> usize {
    usize::from(self.total_size)
  }

  /// Returns the bit offset assigned to `indicator`.
  pub fn bit(&self, indicator: LedIndicator) -> u32 {
    match indicator {
      LedIndicator::NumLock => self.num_lock_bit,
      LedIndicator::CapsLock => self.caps_lock_bit,
      LedIndicator::ScrollLock => self.scroll_lock_bit,
    }
  }

  /// Number of bytes transmitted per output report, including the report id prefix when reports are numbered.
  pub fn report_len(&self) -> usize {
    usize::from(self.wire_len())
  }

  /// [`LedLayout::report_len`] as carried in the wLength field of a SET_REPORT request.
  pub fn wire_len(&self) -> u16 {
    self.total_size + u16::from(self.report_id.is_numbered())
  }
}

/// Raw form of a deserialized [`LedLayout`], checked before use.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LedLayoutFields {
  report_id: ReportId,
  num_lock_bit: u32,
  caps_lock_bit: u32,
  scroll_lock_bit: u32,
  total_size: usize,
}

/// Returned when deserialized layout fields do not describe a usable output report.
#[cfg(feature = "serde")]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("indicator bits {num_lock_bit}/{caps_lock_bit}/{scroll_lock_bit} do not fit a {total_size} byte output report")]
pub struct InvalidLedLayout {
  pub num_lock_bit: u32,
  pub caps_lock_bit: u32,
  pub scroll_lock_bit: u32,
  pub total_size: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<LedLayoutFields> for LedLayout {
  type Error = InvalidLedLayout;

  fn try_from(fields: LedLayoutFields) -> Result<Self, Self::Error> {
    LedLayout::new(fields.report_id, fields.num_lock_bit, fields.total_size)
      .filter(|layout| layout.caps_lock_bit == fields.caps_lock_bit && layout.scroll_lock_bit == fields.scroll_lock_bit)
      .ok_or(InvalidLedLayout {
        num_lock_bit: fields.num_lock_bit,
        caps_lock_bit: fields.caps_lock_bit,
        scroll_lock_bit: fields.scroll_lock_bit,
        total_size: fields.total_size,
      })
  }
}

impl fmt::Display for LedLayout {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "report id {} num lock bit {} caps lock bit {} scroll lock bit {} ({} bytes)",
      self.report_id,
      self.num_lock_bit,
      self.caps_lock_bit,
      self.scroll_lock_bit,
      self.total_size
    )
  }
}
