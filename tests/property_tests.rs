//! Property-based tests for LED layout decoding and output report encoding.
//!
//! Descriptors are generated as an arbitrary run of non-LED output fields followed by the LED field, optionally
//! numbered, so the expected bit offsets are known up front.

use hidleds::{
  decode_led_layout, encode_output_report, encode_output_report_into, led_state_from_report, LedDescriptorError,
  LedFieldViolation, LedState, ReportId, MAX_OUTPUT_REPORT_SIZE,
};
use proptest::prelude::*;

const LED_FIELD: [u8; 12] = [
  0x05, 0x08, // USAGE_PAGE (LEDs)
  0x19, 0x01, // USAGE_MINIMUM (Num Lock)
  0x29, 0x03, // USAGE_MAXIMUM (Scroll Lock)
  0x75, 0x01, // REPORT_SIZE (1)
  0x95, 0x03, // REPORT_COUNT (3)
  0x91, 0x02, // OUTPUT (Data,Var,Abs)
];

// Builds a vendor page output field of `size` x `count` bits.
fn vendor_output(size: u8, count: u8) -> Vec<u8> {
  vec![
    0x06, 0x00, 0xff, // USAGE_PAGE (Vendor Defined)
    0x75, size, // REPORT_SIZE
    0x95, count, // REPORT_COUNT
    0x91, 0x02, // OUTPUT (Data,Var,Abs)
  ]
}

fn descriptor(report_id: u8, leading: &[(u8, u8)], trailing: &[(u8, u8)]) -> Vec<u8> {
  let mut descriptor = Vec::new();
  if report_id != 0 {
    descriptor.extend_from_slice(&[0x85, report_id]);
  }
  for &(size, count) in leading {
    descriptor.extend(vendor_output(size, count));
  }
  descriptor.extend_from_slice(&LED_FIELD);
  for &(size, count) in trailing {
    descriptor.extend(vendor_output(size, count));
  }
  descriptor
}

fn field_bits(fields: &[(u8, u8)]) -> usize {
  fields.iter().map(|&(size, count)| usize::from(size) * usize::from(count)).sum()
}

fn led_state() -> impl Strategy<Value = LedState> {
  (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(num, caps, scroll)| LedState::new(num, caps, scroll))
}

proptest! {
  #![proptest_config(proptest::test_runner::Config::with_cases(500))]

  /// The LED bits start right after all preceding output fields, and the report covers every output bit.
  #[test]
  fn prop_decode_locates_led_bits(
    report_id in any::<u8>(),
    leading in proptest::collection::vec((1u8..=16, 0u8..=8), 0..6),
    trailing in proptest::collection::vec((1u8..=16, 0u8..=8), 0..6),
  ) {
    let layout = decode_led_layout(&descriptor(report_id, &leading, &trailing))
      .map_err(|e| TestCaseError::fail(e.to_string()))?
      .ok_or_else(|| TestCaseError::fail("no LEDs found"))?;

    let first_bit = field_bits(&leading) as u32;
    prop_assert_eq!(layout.report_id(), ReportId::from(report_id));
    prop_assert_eq!(layout.num_lock_bit(), first_bit);
    prop_assert_eq!(layout.caps_lock_bit(), first_bit + 1);
    prop_assert_eq!(layout.scroll_lock_bit(), first_bit + 2);
    prop_assert_eq!(layout.total_size(), (field_bits(&leading) + 3 + field_bits(&trailing)).div_ceil(8));
    prop_assert!((layout.scroll_lock_bit() as usize) < layout.total_size() * 8);
  }

  /// Encoded reports have the layout's length and read back to the state that produced them.
  #[test]
  fn prop_encode_round_trips(
    report_id in any::<u8>(),
    leading in proptest::collection::vec((1u8..=16, 0u8..=8), 0..6),
    trailing in proptest::collection::vec((1u8..=16, 0u8..=8), 0..6),
    state in led_state(),
  ) {
    let layout = decode_led_layout(&descriptor(report_id, &leading, &trailing))
      .map_err(|e| TestCaseError::fail(e.to_string()))?
      .ok_or_else(|| TestCaseError::fail("no LEDs found"))?;

    let report = encode_output_report(&layout, state);
    prop_assert_eq!(report.len(), layout.total_size() + usize::from(report_id != 0));
    if report_id != 0 {
      prop_assert_eq!(report[0], report_id);
    }
    prop_assert_eq!(led_state_from_report(&layout, &report), Some(state));

    let lit = [state.num_lock, state.caps_lock, state.scroll_lock].iter().filter(|on| **on).count() as u32;
    let body_bits: u32 = report[usize::from(report_id != 0)..].iter().map(|byte| byte.count_ones()).sum();
    prop_assert_eq!(body_bits, lit, "only indicator bits may be set");
  }

  /// Encoding into a caller buffer matches the allocating encoder and leaves the tail alone.
  #[test]
  fn prop_encode_into_matches_encode(
    report_id in any::<u8>(),
    leading in proptest::collection::vec((1u8..=16, 0u8..=8), 0..4),
    state in led_state(),
    slack in 0usize..8,
  ) {
    let layout = decode_led_layout(&descriptor(report_id, &leading, &[]))
      .map_err(|e| TestCaseError::fail(e.to_string()))?
      .ok_or_else(|| TestCaseError::fail("no LEDs found"))?;

    let mut buffer = vec![0x5a; layout.report_len() + slack];
    let len = encode_output_report_into(&layout, state, &mut buffer)
      .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let expected = encode_output_report(&layout, state);
    prop_assert_eq!(&buffer[..len], expected.as_slice());
    prop_assert!(buffer[len..].iter().all(|byte| *byte == 0x5a));
  }

  /// Any LED field report count other than 3 is rejected.
  #[test]
  fn prop_wrong_report_count_is_malformed(count in any::<u8>().prop_filter("count must not be 3", |c| *c != 3)) {
    let mut descriptor = LED_FIELD.to_vec();
    descriptor[9] = count;
    prop_assert_eq!(
      decode_led_layout(&descriptor),
      Err(LedDescriptorError::MalformedLedField {
        offset: 10,
        violation: LedFieldViolation::ReportCount(u32::from(count)),
      })
    );
  }

  /// Arbitrary bytes never panic, and any layout produced satisfies the size invariants.
  #[test]
  fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
    if let Ok(Some(layout)) = decode_led_layout(&bytes) {
      prop_assert!(layout.total_size() <= MAX_OUTPUT_REPORT_SIZE);
      prop_assert!((layout.scroll_lock_bit() as usize) < layout.total_size() * 8);
      prop_assert_eq!(layout.caps_lock_bit(), layout.num_lock_bit() + 1);
      prop_assert_eq!(layout.scroll_lock_bit(), layout.num_lock_bit() + 2);
    }
  }

  /// Descriptors that never mention the LED page decode to no layout.
  #[test]
  fn prop_no_led_page_means_no_layout(fields in proptest::collection::vec((1u8..=16, 0u8..=8), 0..8)) {
    let mut descriptor = Vec::new();
    for (size, count) in fields {
      descriptor.extend(vendor_output(size, count));
    }
    prop_assert_eq!(decode_led_layout(&descriptor), Ok(None));
  }
}

#[test]
fn long_item_at_start_is_unsupported() {
  assert_eq!(
    decode_led_layout(&[0xfe, 0x02, 0x10, 0x00, 0x00]),
    Err(LedDescriptorError::UnsupportedLongItem { offset: 0 })
  );
}

#[test]
fn four_byte_item_with_two_bytes_left_is_truncated() {
  let mut descriptor = LED_FIELD.to_vec();
  descriptor.extend_from_slice(&[0x27, 0xff, 0xff]);
  assert_eq!(
    decode_led_layout(&descriptor),
    Err(LedDescriptorError::TruncatedItem { offset: 12, declared: 4, available: 2 })
  );
}
