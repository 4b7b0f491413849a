// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! chip8vm-minifb: runs a Chip-8 program in a window

use chip8vm::{error::Result, prelude::*};
use gumdrop::*;
use owo_colors::OwoColorize;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

pub fn main() -> Result<()> {
    let options = Arguments::parse_args_default_or_exit();
    let state = State::new(options)?;
    for result in state {
        if let Err(e) = result {
            eprintln!("{}", e.bold().red());
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Load a ROM to run on chip8vm.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Enable debug mode at startup.")]
    pub debug: bool,
    #[options(help = "Enable pause mode at startup.")]
    pub pause: bool,
    #[options(help = "Set the instructions-per-frame rate.", default = "10", meta = "IPF")]
    pub speed: usize,
    #[options(help = "Set the target framerate.", default = "60", meta = "FR")]
    pub frame_rate: u64,
    #[options(short = "w", help = "Wrap sprites around the edges of the screen.")]
    pub wrap: bool,
    #[options(help = "Seed the random number generator.", meta = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Debug)]
struct State {
    pub speed: usize,
    pub rate: u64,
    pub cpu: CPU,
    pub ui: UI,
    pub ft: Instant,
}

impl State {
    fn new(options: Arguments) -> Result<Self> {
        let flags = Flags {
            debug: options.debug,
            pause: options.pause,
            quirks: options.wrap.into(),
            ..Default::default()
        };
        let mut cpu = match options.seed {
            Some(seed) => CPU::with_rng(flags, StdRng::seed_from_u64(seed)),
            None => CPU::new(flags),
        };
        cpu.load_program(&options.file)?;
        Ok(State {
            speed: options.speed,
            rate: options.frame_rate.max(1),
            cpu,
            ui: UIBuilder::new(128, 64, &options.file).build()?,
            ft: Instant::now(),
        })
    }
    fn wait_for_next_frame(&mut self) {
        let rate = Duration::from_nanos(1_000_000_000 / self.rate + 1);
        std::thread::sleep(rate.saturating_sub(self.ft.elapsed()));
        self.ft += rate;
    }
}

impl Iterator for State {
    type Item = Result<()>;

    fn next(&mut self) -> Option<Self::Item> {
        self.wait_for_next_frame();
        match self.ui.keys(&mut self.cpu) {
            Ok(false) => return None,
            Err(e) => return Some(Err(e)),
            _ => (),
        }
        if let Err(e) = self.cpu.multistep(self.speed) {
            return Some(Err(e));
        }
        match self.ui.frame(&mut self.cpu) {
            Ok(false) => return None,
            Err(e) => return Some(Err(e)),
            _ => (),
        }
        Some(Ok(()))
    }
}
