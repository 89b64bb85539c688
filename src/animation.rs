//! Indicator Animations
//!
//! Bounce, glow and random blink patterns expressed as sequences of [`Frame`]s. Frames carry the indicator state and
//! how long to hold it; they are turned into output reports by [`crate::transport::LedController::play`].
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::boxed::Box;
use core::{fmt, iter, time::Duration};

use rand::{Rng, RngCore};

use crate::led_layout::{LedIndicator, LedState};

/// A single step of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
  pub state: LedState,
  pub hold: Duration,
}

impl Frame {
  pub fn new(state: LedState, hold: Duration) -> Self {
    Frame { state, hold }
  }
}

/// Animation timing. Durations are in microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct AnimationConfig {
  /// Hold time for Num Lock and Scroll Lock, the ends of a bounce.
  pub bounce_end_hold_us: u64,
  /// Hold time for Caps Lock, the middle of a bounce.
  pub bounce_middle_hold_us: u64,
  /// Length of one glow PWM period.
  pub glow_period_us: u64,
  /// Number of brightness steps from off to fully on.
  pub glow_steps: u32,
  pub random_blink_hold_us: u64,
}

impl Default for AnimationConfig {
  fn default() -> Self {
    AnimationConfig {
      bounce_end_hold_us: 300_000,
      bounce_middle_hold_us: 100_000,
      glow_period_us: 10_000,
      glow_steps: 70,
      random_blink_hold_us: 100_000,
    }
  }
}

/// Lights Num, Caps, Scroll, Caps in turn, `rounds` times.
pub fn bounce(config: &AnimationConfig, rounds: u32) -> impl Iterator<Item = Frame> {
  let end = Duration::from_micros(config.bounce_end_hold_us);
  let middle = Duration::from_micros(config.bounce_middle_hold_us);
  let round = [
    Frame::new(LedState::only(LedIndicator::NumLock), end),
    Frame::new(LedState::only(LedIndicator::CapsLock), middle),
    Frame::new(LedState::only(LedIndicator::ScrollLock), end),
    Frame::new(LedState::only(LedIndicator::CapsLock), middle),
  ];
  (0..rounds).flat_map(move |_| round)
}

/// Fades all indicators up and back down `rounds` times using software PWM.
///
/// Each step emits an all-on frame held for the duty cycle and an all-off frame for the remainder of the period.
pub fn glow(config: &AnimationConfig, rounds: u32) -> impl Iterator<Item = Frame> {
  let period = Duration::from_micros(config.glow_period_us);
  let steps = config.glow_steps;
  (0..rounds).flat_map(move |_| (0..steps.saturating_mul(2)).flat_map(move |step| glow_step(period, steps, step)))
}

fn glow_step(period: Duration, steps: u32, step: u32) -> [Frame; 2] {
  let level = if step >= steps { steps.saturating_mul(2) - step } else { step };
  let on = period * level / steps;
  [Frame::new(LedState::ALL_ON, on), Frame::new(LedState::ALL_OFF, period.saturating_sub(on))]
}

/// Sets each indicator to a coin flip `rounds` times.
pub fn random_blink<'a, R: RngCore>(
  rng: &'a mut R,
  config: &AnimationConfig,
  rounds: u32,
) -> impl Iterator<Item = Frame> + 'a {
  let hold = Duration::from_micros(config.random_blink_hold_us);
  iter::repeat_with(move || Frame::new(LedState::new(rng.gen(), rng.gen(), rng.gen()), hold)).take(rounds as usize)
}

/// Selects one of the animation patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
  Bounce,
  Glow,
  RandomBlink,
}

impl Animation {
  /// The full show: three bounces, three glows, thirty random blinks.
  pub const DEFAULT_SEQUENCE: [(Animation, u32); 3] =
    [(Animation::Bounce, 3), (Animation::Glow, 3), (Animation::RandomBlink, 30)];

  /// Returns the frames of this animation.
  pub fn frames<'a, R: RngCore>(
    &self,
    rng: &'a mut R,
    config: &AnimationConfig,
    rounds: u32,
  ) -> Box<dyn Iterator<Item = Frame> + 'a> {
    match self {
      Animation::Bounce => Box::new(bounce(config, rounds)),
      Animation::Glow => Box::new(glow(config, rounds)),
      Animation::RandomBlink => Box::new(random_blink(rng, config, rounds)),
    }
  }
}

impl fmt::Display for Animation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Animation::Bounce => write!(f, "bounce"),
      Animation::Glow => write!(f, "glow"),
      Animation::RandomBlink => write!(f, "random blink"),
    }
  }
}
