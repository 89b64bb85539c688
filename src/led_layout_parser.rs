//! LED Layout Parser Core
//!
//! This module walks a report descriptor given as a byte slice and locates the keyboard indicator field: an Output
//! item on the LED usage page declaring three one-bit variable fields for usages Num Lock through Scroll Lock. All
//! other fields only contribute their size to the running output report bit offset.
//!
//! Global items are not scoped to collections and Push/Pop are ignored, so a Global value set inside a collection
//! remains in effect after the collection ends.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
  item_tokenizer::{DescriptorItemTokenizer, ReportItem, ReportItemType},
  led_layout::LedLayout,
  report_data_types::{MainItemFlags, ReportCount, ReportId, ReportSize, Usage, UsagePage},
};

/// Largest output report body, in bytes, a layout may describe.
pub const MAX_OUTPUT_REPORT_SIZE: usize = 1024;

// Item prefixes with the size selector masked off.
const INPUT: u8 = 0x80;
const OUTPUT: u8 = 0x90;
const COLLECTION: u8 = 0xA0;
const FEATURE: u8 = 0xB0;
const END_COLLECTION: u8 = 0xC0;
const USAGE_PAGE: u8 = 0x04;
const REPORT_SIZE: u8 = 0x74;
const REPORT_ID: u8 = 0x84;
const REPORT_COUNT: u8 = 0x94;
const USAGE_MINIMUM: u8 = 0x18;
const USAGE_MAXIMUM: u8 = 0x28;

const LED_REPORT_SIZE: u32 = 1;
const LED_REPORT_COUNT: u32 = 3;
const LED_USAGE_MINIMUM: u32 = 1;
const LED_USAGE_MAXIMUM: u32 = 3;

/// The structural rule an LED output field broke.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedFieldViolation {
  #[error("report size is {0}, expected 1")]
  ReportSize(u32),
  #[error("report count is {0}, expected 3")]
  ReportCount(u32),
  #[error("usage minimum is {0}, expected 1")]
  UsageMinimum(u32),
  #[error("usage maximum is {0}, expected 3")]
  UsageMaximum(u32),
}

/// Defines errors generated while locating the LED field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedDescriptorError {
  #[error("long item at offset {offset} is not supported")]
  UnsupportedLongItem { offset: usize },
  #[error("item at offset {offset} declares {declared} data bytes but only {available} remain")]
  TruncatedItem { offset: usize, declared: usize, available: usize },
  #[error("LED output field at offset {offset} is malformed: {violation}")]
  MalformedLedField { offset: usize, violation: LedFieldViolation },
  #[error("output report is {size} bytes, larger than the {max} byte limit")]
  ReportTooLarge { size: usize, max: usize },
}

// Tracks Global State as parsing proceeds. Never reset.
#[derive(Debug, Clone, Default)]
struct GlobalItemStateTable {
  usage_page: UsagePage,
  report_size: ReportSize,
  report_id: ReportId,
  report_count: ReportCount,
}

// Tracks Local State as parsing proceeds. Reset to defaults after each main item.
#[derive(Debug, Clone, Default)]
struct LocalItemStateTable {
  usage_minimum: Usage,
  usage_maximum: Usage,
}

// Position of the LED field found so far.
#[derive(Debug, Clone, Copy)]
struct LedField {
  report_id: ReportId,
  first_bit: u64,
}

/// Walks a report descriptor and produces the [`LedLayout`] it describes, if any.
pub struct LedLayoutParser {
  global_state: GlobalItemStateTable,
  local_state: LocalItemStateTable,
  // Running size of all output fields seen so far, in bits.
  total_bits: u64,
  led_field: Option<LedField>,
}

impl LedLayoutParser {
  // Instantiates a new LED layout parser.
  fn new() -> Self {
    LedLayoutParser {
      global_state: Default::default(),
      local_state: Default::default(),
      total_bits: 0,
      led_field: None,
    }
  }

  // handles parsing for "main" items (Input/Output/Feature/Collection/End Collection)
  fn parse_main(&mut self, item: &ReportItem) -> Result<(), LedDescriptorError> {
    match item.tag_and_type {
      OUTPUT => self.parse_output(item)?,
      INPUT | COLLECTION | FEATURE | END_COLLECTION => (),
      _ => {
        trace!(offset = item.offset, tag = item.tag, "ignoring unknown main item");
        return Ok(());
      }
    }
    //reset local state after processing a main item.
    self.local_state = Default::default();
    Ok(())
  }

  fn parse_output(&mut self, item: &ReportItem) -> Result<(), LedDescriptorError> {
    let flags = MainItemFlags::from(item.data);
    if self.global_state.usage_page.is_led() && flags == MainItemFlags::LED_BITFIELD {
      self.check_led_field().map_err(|violation| {
        warn!(offset = item.offset, %violation, "rejecting LED output field");
        LedDescriptorError::MalformedLedField { offset: item.offset, violation }
      })?;

      if let Some(previous) = self.led_field {
        debug!(previous_bit = previous.first_bit, "LED output field replaces an earlier one");
      }
      debug!(
        offset = item.offset,
        report_id = u8::from(self.global_state.report_id),
        first_bit = self.total_bits,
        "found LED output field"
      );
      self.led_field = Some(LedField { report_id: self.global_state.report_id, first_bit: self.total_bits });
    }

    let report_size = u64::from(u32::from(self.global_state.report_size));
    let report_count = u64::from(u32::from(self.global_state.report_count));
    self.total_bits = self.total_bits.saturating_add(report_size * report_count);
    Ok(())
  }

  // Validates the current state against the only LED field shape this parser understands.
  fn check_led_field(&self) -> Result<(), LedFieldViolation> {
    let report_size = u32::from(self.global_state.report_size);
    let report_count = u32::from(self.global_state.report_count);
    let usage_minimum = u32::from(self.local_state.usage_minimum);
    let usage_maximum = u32::from(self.local_state.usage_maximum);

    if report_size != LED_REPORT_SIZE {
      Err(LedFieldViolation::ReportSize(report_size))
    } else if report_count != LED_REPORT_COUNT {
      Err(LedFieldViolation::ReportCount(report_count))
    } else if usage_minimum != LED_USAGE_MINIMUM {
      Err(LedFieldViolation::UsageMinimum(usage_minimum))
    } else if usage_maximum != LED_USAGE_MAXIMUM {
      Err(LedFieldViolation::UsageMaximum(usage_maximum))
    } else {
      Ok(())
    }
  }

  // handles parsing for "global" items
  fn parse_global(&mut self, item: &ReportItem) {
    match item.tag_and_type {
      USAGE_PAGE => self.global_state.usage_page = UsagePage::from(item.data),
      REPORT_SIZE => self.global_state.report_size = ReportSize::from(item.data),
      REPORT_ID => self.global_state.report_id = ReportId::from(item.data),
      REPORT_COUNT => self.global_state.report_count = ReportCount::from(item.data),
      _ => trace!(offset = item.offset, tag = item.tag, "ignoring global item"),
    }
  }

  // handles parsing for "local" items
  fn parse_local(&mut self, item: &ReportItem) {
    match item.tag_and_type {
      USAGE_MINIMUM => self.local_state.usage_minimum = Usage::from(item.data),
      USAGE_MAXIMUM => self.local_state.usage_maximum = Usage::from(item.data),
      _ => trace!(offset = item.offset, tag = item.tag, "ignoring local item"),
    }
  }

  // Processes the given item in the parser and updates parser state.
  fn parse_item(&mut self, item: &ReportItem) -> Result<(), LedDescriptorError> {
    match item.item_type {
      ReportItemType::Main => self.parse_main(item)?,
      ReportItemType::Global => self.parse_global(item),
      ReportItemType::Local => self.parse_local(item),
      ReportItemType::Reserved => trace!(offset = item.offset, "ignoring reserved item"),
    }
    Ok(())
  }

  // Converts the accumulated state into a layout once every item has been processed.
  fn finish(self) -> Result<Option<LedLayout>, LedDescriptorError> {
    let Some(led_field) = self.led_field else {
      debug!("descriptor has no LED output field");
      return Ok(None);
    };

    let total_size = self.total_bits.div_ceil(8);
    let too_large = || LedDescriptorError::ReportTooLarge {
      size: usize::try_from(total_size).unwrap_or(usize::MAX),
      max: MAX_OUTPUT_REPORT_SIZE,
    };
    let total_size = usize::try_from(total_size).map_err(|_| too_large())?;

    // The LED field lies within total_bits, so the layout only fails to build when the report is too large.
    let first_bit = u32::try_from(led_field.first_bit).map_err(|_| too_large())?;
    let layout = LedLayout::new(led_field.report_id, first_bit, total_size).ok_or_else(too_large)?;
    debug!(%layout, "decoded LED layout");
    Ok(Some(layout))
  }

  /// Parses the given report_descriptor byte slice and returns the LED layout it declares, `None` if it declares no
  /// LED output field, or an error if the descriptor cannot be walked or the LED field has an unexpected shape.
  pub fn parse(report_descriptor: &[u8]) -> Result<Option<LedLayout>, LedDescriptorError> {
    let mut parser = Self::new();
    for item in DescriptorItemTokenizer::new(report_descriptor) {
      parser.parse_item(&item?)?;
    }
    parser.finish()
  }
}
