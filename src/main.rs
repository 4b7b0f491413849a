// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! chip8vm: runs a Chip-8 program, drawing the screen on the terminal

use chip8vm::{error::Result, *};
use gumdrop::*;
use owo_colors::OwoColorize;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

pub fn main() {
    let options = Arguments::parse_args_default_or_exit();
    if let Err(e) = run(options) {
        eprintln!("{}", e.bold().red());
        std::process::exit(1);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Load a ROM to run on chip8vm.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Trace every instruction as it runs.")]
    pub debug: bool,
    #[options(help = "Stop after this many instructions.", meta = "N")]
    pub steps: Option<usize>,
    #[options(help = "Set the instructions-per-frame rate.", default = "10", meta = "IPF")]
    pub speed: usize,
    #[options(help = "Set the target framerate.", default = "60", meta = "FR")]
    pub frame_rate: u64,
    #[options(short = "w", help = "Wrap sprites around the edges of the screen.")]
    pub wrap: bool,
    #[options(help = "Seed the random number generator.", meta = "SEED")]
    pub seed: Option<u64>,
}

fn run(options: Arguments) -> Result<()> {
    let flags = Flags {
        debug: options.debug,
        quirks: options.wrap.into(),
        ..Default::default()
    };
    let mut cpu = match options.seed {
        Some(seed) => CPU::with_rng(flags, StdRng::seed_from_u64(seed)),
        None => CPU::new(flags),
    };
    cpu.load_program(&options.file)?;

    let speed = options.speed.max(1);
    let rate = Duration::from_nanos(1_000_000_000 / options.frame_rate.max(1));
    let mut remaining = options.steps;
    let mut ft = Instant::now();
    print!("\x1b[2J");
    loop {
        let steps = match remaining {
            Some(0) => break,
            Some(left) => speed.min(left),
            None => speed,
        };
        cpu.multistep(steps)?;
        remaining = remaining.map(|left| left - steps);

        if cpu.take_redraw() {
            // Home the cursor, then paint over the last frame
            print!("\x1b[H{}", cpu.screen());
        }
        std::thread::sleep(rate.saturating_sub(ft.elapsed()));
        ft += rate;
    }
    if options.debug {
        cpu.dump();
    }
    Ok(())
}
