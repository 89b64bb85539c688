//! Report Descriptor Data Types
//!
//! This module contains the item data types the LED layout parser tracks while walking a descriptor.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

use crate::utils::u32_from_bytes;

/// Usage page global item data type.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsagePage(u32);

impl UsagePage {
  /// The LED usage page (HID Usage Tables section 11).
  pub const LED: UsagePage = UsagePage(0x08);

  pub fn is_led(&self) -> bool {
    *self == Self::LED
  }
}
impl From<&[u8]> for UsagePage {
  fn from(bytes: &[u8]) -> Self {
    UsagePage(u32_from_bytes(bytes))
  }
}

/// Usage id as carried by Usage Minimum / Usage Maximum local items.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Usage(u32);
impl From<&[u8]> for Usage {
  fn from(bytes: &[u8]) -> Self {
    Usage(u32_from_bytes(bytes))
  }
}
impl From<Usage> for u32 {
  fn from(val: Usage) -> Self {
    val.0
  }
}

/// Report Size global item data type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSize(u32);
impl From<&[u8]> for ReportSize {
  fn from(bytes: &[u8]) -> Self {
    ReportSize(u32_from_bytes(bytes))
  }
}
impl From<ReportSize> for u32 {
  fn from(val: ReportSize) -> Self {
    val.0
  }
}

/// Report count global item data type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportCount(u32);
impl From<&[u8]> for ReportCount {
  fn from(bytes: &[u8]) -> Self {
    ReportCount(u32_from_bytes(bytes))
  }
}
impl From<ReportCount> for u32 {
  fn from(val: ReportCount) -> Self {
    val.0
  }
}

/// Report Id global item data type.
///
/// Report ids occupy a single byte on the wire; wider item values are truncated to their low byte. Zero means the
/// device does not number its reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct ReportId(u8);

impl ReportId {
  /// Unnumbered reports carry no report id prefix.
  pub const NONE: ReportId = ReportId(0);

  pub fn is_numbered(&self) -> bool {
    self.0 != 0
  }
}
impl From<&[u8]> for ReportId {
  fn from(bytes: &[u8]) -> Self {
    ReportId(u32_from_bytes(bytes) as u8)
  }
}
impl From<u8> for ReportId {
  fn from(val: u8) -> Self {
    ReportId(val)
  }
}
impl From<ReportId> for u8 {
  fn from(val: ReportId) -> Self {
    val.0
  }
}
impl fmt::Display for ReportId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:#04x}", self.0)
  }
}

/// Raw data of an Input/Output/Feature main item.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MainItemFlags(u32);

impl MainItemFlags {
  /// Data, Variable, Absolute, No Wrap, Linear, Preferred State, No Null Position, Non Volatile, Bit Field.
  pub const LED_BITFIELD: MainItemFlags = MainItemFlags(0x02);
}
impl From<&[u8]> for MainItemFlags {
  fn from(bytes: &[u8]) -> Self {
    MainItemFlags(u32_from_bytes(bytes))
  }
}
