//! Keyboard LED Blinker
//!
//! Command line utility that locates the keyboard indicators in one or more report descriptor files, prints the
//! layout, and replays LED animations as the SET_REPORT requests a device would receive.
//!
//! Demonstrates the usage of the [`hidleds`] crate.
//!
//! # Usage
//!
//! `cargo run --features cli --bin ledblink -- --path ./keyboard.bin --animation bounce`
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

use std::{
  convert::Infallible,
  error::Error,
  fmt::Write as _,
  fs::{self, File},
  io::BufReader,
  path::{Path, PathBuf},
  thread,
  time::Duration,
};

use clap::{Parser, ValueEnum};
use hidleds::{
  animation::{Animation, AnimationConfig},
  decode_led_layout,
  transport::{ControlSetup, LedController, OutputReportSink},
  LedLayout,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnimationChoice {
  Bounce,
  Glow,
  RandomBlink,
  All,
  None,
}

impl AnimationChoice {
  fn sequence(self, rounds: Option<u32>) -> Vec<(Animation, u32)> {
    let single = |animation: Animation| {
      let default_rounds = Animation::DEFAULT_SEQUENCE
        .iter()
        .find_map(|(candidate, rounds)| (*candidate == animation).then_some(*rounds))
        .unwrap_or(1);
      vec![(animation, rounds.unwrap_or(default_rounds))]
    };
    match self {
      AnimationChoice::Bounce => single(Animation::Bounce),
      AnimationChoice::Glow => single(Animation::Glow),
      AnimationChoice::RandomBlink => single(Animation::RandomBlink),
      AnimationChoice::All => Animation::DEFAULT_SEQUENCE
        .iter()
        .map(|(animation, default_rounds)| (*animation, rounds.unwrap_or(*default_rounds)))
        .collect(),
      AnimationChoice::None => Vec::new(),
    }
  }
}

/// Locates keyboard indicator LEDs in HID report descriptors and replays LED animations.
///
/// Copyright (c) Microsoft Corporation. All rights reserved.
///
/// SPDX-License-Identifier: BSD-2-Clause-Patent
#[derive(Parser, Debug)]
struct Arguments {
  /// Report descriptor binary files, one per interface. Interface numbers follow argument order.
  #[arg(short, long, required = true)]
  path: Vec<PathBuf>,

  /// Print layouts as JSON.
  #[arg(short, long)]
  json: bool,

  /// Animation to replay on each interface with LEDs.
  #[arg(short, long, value_enum, default_value_t = AnimationChoice::None)]
  animation: AnimationChoice,

  /// Rounds per animation. Defaults to 3 bounces, 3 glows and 30 random blinks.
  #[arg(short, long)]
  rounds: Option<u32>,

  /// JSON file with animation timings; missing fields keep their defaults.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Sleep for each frame's hold time instead of printing frames back to back.
  #[arg(long)]
  realtime: bool,
}

/// Prints each SET_REPORT request instead of sending it to a device.
struct DryRunSink;

impl OutputReportSink for DryRunSink {
  type Error = Infallible;

  fn set_output_report(&mut self, setup: &ControlSetup, report: &[u8]) -> Result<(), Self::Error> {
    let payload = report.iter().fold(String::new(), |mut hex, byte| {
      let _ = write!(hex, "{byte:02x}");
      hex
    });
    println!("\tSET_REPORT {setup}\tdata: {payload}");
    Ok(())
  }
}

fn animation_config(path: Option<&Path>) -> Result<AnimationConfig, Box<dyn Error>> {
  match path {
    Some(path) => {
      let config = serde_json::from_reader(BufReader::new(File::open(path)?))?;
      Ok(config)
    }
    None => Ok(AnimationConfig::default()),
  }
}

fn print_layout(interface: u8, layout: &LedLayout, json: bool) -> Result<(), Box<dyn Error>> {
  if json {
    println!("{}", serde_json::to_string(layout)?);
  } else {
    println!("Interface #{interface}: {layout}");
  }
  Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let args = Arguments::parse();
  let config = animation_config(args.config.as_deref())?;
  let sequence = args.animation.sequence(args.rounds);
  let mut rng = rand::thread_rng();

  for (interface, path) in args.path.iter().enumerate() {
    let interface = u8::try_from(interface).map_err(|_| "too many interfaces")?;
    let raw_descriptor = match fs::read(path) {
      Ok(raw_descriptor) => raw_descriptor,
      Err(error) => {
        warn!(interface, path = %path.display(), %error, "cannot read report descriptor");
        continue;
      }
    };

    let layout = match decode_led_layout(&raw_descriptor) {
      Ok(Some(layout)) => layout,
      Ok(None) => {
        info!(interface, path = %path.display(), "found no LEDs in report descriptor");
        continue;
      }
      Err(error) => {
        warn!(interface, path = %path.display(), %error, "skipping interface");
        continue;
      }
    };
    print_layout(interface, &layout, args.json)?;

    let mut controller = LedController::new(DryRunSink, interface, layout);
    for (animation, rounds) in &sequence {
      info!(interface, %animation, rounds, "playing animation");
      let frames = animation.frames(&mut rng, &config, *rounds);
      controller.play(frames, |hold: Duration| {
        if args.realtime {
          thread::sleep(hold);
        }
      });
    }
  }

  Ok(())
}
