//! HID Report Descriptor Item Tokenization Support
//!
//! This module handles tokenizing a report descriptor given as a byte slice into short items as described in HID spec
//! 1.11 sections 6.2.2.1 through 6.2.2.3. Long items are rejected rather than skipped.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::led_layout_parser::LedDescriptorError;

/// Prefix byte that introduces a long item. See HID spec 1.11 section 6.2.2.3.
pub const LONG_ITEM_PREFIX: u8 = 0xFE;

/// Identifies the type for descriptor report items. See HID spec 1.11 section 6.2.2.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportItemType {
  Main,
  Global,
  Local,
  Reserved,
}

/// Parsed short item.
#[derive(Debug, PartialEq, Eq)]
pub struct ReportItem<'a> {
  /// Byte offset of the item prefix within the descriptor.
  pub offset: usize,
  /// The prefix byte with the size selector masked off.
  pub tag_and_type: u8,
  pub item_type: ReportItemType,
  pub tag: u8,
  pub data: &'a [u8],
}

/// Item tokenizer - produces an iterator over a byte slice that returns ReportItems.
///
/// Once an error is produced the tokenizer is exhausted.
pub struct DescriptorItemTokenizer<'a> {
  descriptor: &'a [u8],
  position: usize,
}

impl<'a> DescriptorItemTokenizer<'a> {
  /// Instantiates a new HID Report Descriptor Item Tokenizer.
  pub fn new(descriptor: &'a [u8]) -> Self {
    DescriptorItemTokenizer { descriptor, position: 0 }
  }

  fn fail(&mut self, error: LedDescriptorError) -> Option<Result<ReportItem<'a>, LedDescriptorError>> {
    self.position = self.descriptor.len();
    Some(Err(error))
  }
}

impl<'a> Iterator for DescriptorItemTokenizer<'a> {
  type Item = Result<ReportItem<'a>, LedDescriptorError>;
  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.position;
    let item_header = *self.descriptor.get(offset)?;

    if item_header == LONG_ITEM_PREFIX {
      return self.fail(LedDescriptorError::UnsupportedLongItem { offset });
    }

    let size = match item_header & 0x3 {
      //short item size of 4 bytes is encoded as "3"
      3 => 4,
      size => size as usize,
    };
    let item_type = match (item_header & 0xC) >> 2 {
      0 => ReportItemType::Main,
      1 => ReportItemType::Global,
      2 => ReportItemType::Local,
      _ => ReportItemType::Reserved,
    };

    let available = self.descriptor.len() - offset - 1;
    if size > available {
      return self.fail(LedDescriptorError::TruncatedItem { offset, declared: size, available });
    }

    let data = &self.descriptor[offset + 1..offset + 1 + size];
    self.position = offset + 1 + size;

    Some(Ok(ReportItem { offset, tag_and_type: item_header & 0xFC, item_type, tag: (item_header & 0xF0) >> 4, data }))
  }
}
