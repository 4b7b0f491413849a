// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! This crate implements a Chip-8 interpreter as a small, exact state machine:
//! 4 KiB of memory, sixteen byte registers, a call stack, a 64x32 monochrome
//! screen, sixteen keys and two countdown timers, advanced one instruction at
//! a time.
//!
//! The interpreter does no I/O of its own. A driver loads a program, feeds in
//! key state, calls [CPU::tick], and reads back the [Screen] whenever
//! [CPU::take_redraw] says it changed.
//!
//! ```rust
//! # use chip8vm::*;
//! # fn main() -> Result<()> {
//! let mut cpu = CPU::default();
//! cpu.load_program_bytes(&[
//!     0x00, 0xe0, // cls
//!     0x12, 0x02, // jmp 202
//! ])?;
//! cpu.tick()?;
//! assert!(cpu.take_redraw());
//! assert_eq!(0x202, cpu.pc());
//! # Ok(())
//! # }
//! ```

pub mod cpu;
pub mod error;
#[cfg(feature = "minifb")]
pub mod io;
pub mod screen;

pub use cpu::{
    flags::Flags,
    instruction::Insn,
    mem::{Mem, FONT},
    quirks::Quirks,
    CPU,
};
pub use error::{Error, Result};
pub use screen::Screen;

/// Common imports for chip8vm
pub mod prelude {
    pub use super::*;
    #[cfg(feature = "minifb")]
    pub use super::io::*;
}
