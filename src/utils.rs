//! Parser Utility Functions
//!
//! Conversions of variable length item data into integer values, and bit addressing helpers shared by the encoder and
//! the report decoding routines.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Decodes up to four bytes of item data as an unsigned little-endian value. Empty data decodes as zero.
pub fn u32_from_bytes(bytes: &[u8]) -> u32 {
  let mut u32_bytes: [u8; 4] = [0; 4];
  let len = bytes.len().min(4);
  u32_bytes[..len].copy_from_slice(&bytes[..len]);
  u32::from_le_bytes(u32_bytes)
}

/// Splits an absolute bit offset into the index of the byte holding it and the mask selecting it within that byte.
pub fn bit_position(bit: u32) -> (usize, u8) {
  ((bit / 8) as usize, 1u8 << (bit % 8))
}
