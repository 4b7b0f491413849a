// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions


pub mod behavior;
pub mod flags;
pub mod instruction;
pub mod mem;
pub mod quirks;

use self::{flags::Flags, instruction::Insn, mem::Mem, quirks::Quirks};
use crate::{
    error::{Error, Result},
    screen::Screen,
};
use imperative_rs::InstructionSet;
use owo_colors::OwoColorize;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::fmt::Debug;

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// Depth of the call stack
pub const STACK_DEPTH: usize = 16;

/// Represents the internal state of the CPU interpreter
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to the
    /// chip-8. Includes [Quirks], debug tracing, and pause state.
    pub flags: Flags,
    // memory
    mem: Mem,
    screen: Screen,
    stack: [Adr; STACK_DEPTH],
    sp: usize,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    delay: u8,
    sound: u8,
    // I/O
    keys: [bool; 16],
    redraw: bool,
    // Execution data
    cycle: usize,
    unrecognized: usize,
    rng: Box<dyn RngCore + Send>,
}

// public interface
impl CPU {
    /// Constructs a new CPU with the given [Flags], and a random source seeded from the OS
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::new(Flags {
    ///     quirks: Quirks { screen_wrap: true },
    ///     ..Default::default()
    /// });
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn new(flags: Flags) -> Self {
        Self::with_rng(flags, StdRng::from_entropy())
    }

    /// Constructs a new CPU which draws random bytes (for `Cxbb`) from `rng`
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let cpu = CPU::with_rng(Flags::default(), StdRng::seed_from_u64(8));
    /// ```
    pub fn with_rng(flags: Flags, rng: impl RngCore + Send + 'static) -> Self {
        CPU {
            flags,
            mem: Mem::new(),
            screen: Screen::new(),
            stack: [0; STACK_DEPTH],
            sp: 0,
            pc: mem::PROGRAM as Adr,
            i: 0,
            v: [0; 16],
            delay: 0,
            sound: 0,
            keys: [false; 16],
            redraw: false,
            cycle: 0,
            unrecognized: 0,
            rng: Box::new(rng),
        }
    }

    /// Loads a program from a file into the CPU's program space.
    ///
    /// See [CPU::load_program_bytes]
    pub fn load_program(&mut self, rom: impl AsRef<std::path::Path>) -> Result<&mut Self> {
        self.load_program_bytes(&std::fs::read(rom)?)
    }

    /// Resets the CPU, then loads bytes into the CPU's program space.
    ///
    /// Returns [Error::ProgramTooLarge] if `rom` doesn't fit in the 3584 bytes
    /// starting at `0x200`. The CPU is still reset when this happens.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0x12, 0x00]).unwrap();
    /// assert_eq!(0x1200, cpu.mem().read_word(0x200usize));
    /// assert!(cpu.load_program_bytes(&[0; 3585]).is_err());
    /// assert_eq!(0, cpu.mem().read_word(0x200usize));
    /// ```
    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.reset();
        self.mem.load_program(rom)?;
        Ok(self)
    }

    /// Resets the emulator.
    ///
    /// Zeroes memory, registers, stack, timers, keys, and the screen;
    /// then reloads the font and sets the program counter to 0x200.
    ///
    /// Does not touch [Quirks], the debug and pause flags, or the random source.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// cpu.press(0x7).unwrap();
    /// cpu.reset();
    /// assert_eq!(0, cpu.v()[4]);
    /// assert_eq!(false, cpu.keys()[7]);
    /// assert_eq!(&FONT[..], &cpu.mem().as_slice()[..80]);
    /// ```
    pub fn reset(&mut self) {
        self.flags.keypause = false;
        self.mem.reset();
        self.screen.clear();
        // clear the stack
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        // Reset the program counter
        self.pc = mem::PROGRAM as Adr;
        // Zero the registers
        self.i = 0;
        self.v = [0; 16];
        self.delay = 0;
        self.sound = 0;
        // I/O
        self.keys = [false; 16];
        self.redraw = false;
        // Execution data
        self.cycle = 0;
        self.unrecognized = 0;
    }

    /// Presses a key, and reports whether the key's state changed.
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    ///
    /// // press key `7`
    /// let did_press = cpu.press(0x7).unwrap();
    /// assert!(did_press);
    ///
    /// // press key `7` again, even though it's already pressed
    /// let did_press = cpu.press(0x7).unwrap();
    /// // it was already pressed, so nothing's changed.
    /// assert!(!did_press);
    /// ```
    pub fn press(&mut self, key: usize) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        Ok(!std::mem::replace(keyref, true))
    }

    /// Releases a key, and reports whether the key's state changed.
    /// If key is outside range `0..=0xF`, returns [Error::InvalidKey].
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// // press key `7`
    /// cpu.press(0x7).unwrap();
    /// // release key `7`
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(changed); // key released
    /// // try releasing `7` again
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(!changed); // key was not held
    /// ```
    pub fn release(&mut self, key: usize) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        Ok(std::mem::replace(keyref, false))
    }

    /// Replaces the state of all 16 keys at once
    pub fn set_keys(&mut self, keys: &[bool; 16]) {
        self.keys = *keys;
    }

    /// Gets the state of all 16 keys
    pub fn keys(&self) -> &[bool; 16] {
        &self.keys
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// // Create a new CPU, and set v4 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// assert!(cpu.set_v(0x10, 0x41).is_err());
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        let gpr = self.v.get_mut(reg).ok_or(Error::InvalidRegister { reg })?;
        *gpr = value;
        Ok(())
    }

    /// Gets a slice of the entire general purpose registers
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x0, 0x41).unwrap();
    /// assert_eq!(
    ///     cpu.v(),
    ///     [0x41, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    /// )
    /// ```
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Gets the stack pointer (the number of return addresses on the stack)
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Gets the value in the Sound Timer register.
    ///
    /// While this is nonzero, the driver should be playing a tone.
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Gets the value in the Delay Timer register
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Gets the number of cycles the CPU has executed since the last reset
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Gets the number of unrecognized words skipped over since the last reset
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0xff, 0xff, 0xff, 0xff, 0x12, 0x04]).unwrap();
    /// cpu.multistep(3).unwrap();
    /// assert_eq!(2, cpu.unrecognized());
    /// ```
    pub fn unrecognized(&self) -> usize {
        self.unrecognized
    }

    /// Gets the CPU's memory
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Gets the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Reports whether the screen has changed since the redraw flag was last taken
    pub fn redraw(&self) -> bool {
        self.redraw
    }

    /// Clears the redraw flag, returning its previous value
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0x00, 0xe0]).unwrap();
    /// cpu.tick().unwrap();
    /// assert!(cpu.take_redraw());
    /// assert!(!cpu.take_redraw());
    /// ```
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Unpauses the emulator for a single tick,
    /// even if cpu.flags.pause is set.
    ///
    /// Like with [CPU::tick], this returns [Error::UnimplementedInstruction]
    /// if the instruction is unimplemented.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.flags.pause = true;
    /// cpu.singlestep().unwrap();
    /// assert_eq!(0x202, cpu.pc());
    /// assert!(cpu.flags.pause);
    /// ```
    pub fn singlestep(&mut self) -> Result<&mut Self> {
        self.flags.pause = false;
        let res = self.tick().map(|_| ());
        self.flags.pause = true;
        res?;
        Ok(self)
    }

    /// Runs the emulator for `steps` ticks.
    ///
    /// Unimplemented instructions are skipped over, and reported on stderr.
    /// Stops at, and returns, the first fatal error.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.multistep(0x20)
    ///     .expect("The program should only have valid opcodes.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(0x20, cpu.cycle());
    /// ```
    pub fn multistep(&mut self, steps: usize) -> Result<&mut Self> {
        for _ in 0..steps {
            match self.tick() {
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => std::eprintln!("{}", e.bold().red()),
                Ok(_) => (),
            }
        }
        Ok(self)
    }

    /// Executes a single instruction, then counts down the timers
    ///
    /// Returns [Error::UnimplementedInstruction] if the instruction at `pc` is unimplemented.
    /// The instruction is skipped, so execution can continue with the next tick.
    ///
    /// Returns [Error::StackOverflow] or [Error::StackUnderflow] if a call or return
    /// breaks stack discipline. The faulting instruction has no effect.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x22, 0x02, // call 0x202 (pc)
    /// ]).unwrap();
    /// cpu.tick()
    ///     .expect("0x00e0 (cls) should be a valid opcode.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// ```
    /// Returns [Error::UnimplementedInstruction] if the instruction is not implemented.
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0xff, 0xff, // invalid!
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.tick()
    ///     .expect_err("Should return Error::UnimplementedInstruction { 0xffff }");
    /// assert_eq!(0x202, cpu.pc());
    /// ```
    pub fn tick(&mut self) -> Result<&mut Self> {
        // Do nothing if paused
        if self.flags.pause {
            return Ok(self);
        }
        self.cycle += 1;
        // fetch opcode
        let word = self.mem.read_word(self.pc);

        // decode opcode
        let insn = match Insn::decode(&word.to_be_bytes()) {
            Ok((_, insn)) => insn,
            Err(_) => {
                if self.flags.debug {
                    self.trace(format_args!("{:04x} {}", word, "unrecognized".red()));
                }
                self.unrecognized += 1;
                self.pc = self.pc.wrapping_add(2);
                self.tick_timers();
                return Err(Error::UnimplementedInstruction { word });
            }
        };

        // Print instruction trace:
        if self.flags.debug {
            self.trace(format_args!("{insn}"));
        }

        self.execute(insn)?;
        self.tick_timers();
        Ok(self)
    }

    /// Dumps the current state of all CPU registers, and the cycle count
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::default();
    /// cpu.dump();
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP: 0000, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// ```
    pub fn dump(&self) {
        std::println!(
            "PC: {:04x}, SP: {:04x}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}",
            self.pc,
            self.sp,
            self.i,
            self.v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.delay,
            self.sound,
            self.cycle,
        );
    }
}

// internals
impl CPU {
    /// Counts the delay and sound timers down by one, stopping at zero
    #[inline(always)]
    fn tick_timers(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Prints one line of the live instruction trace
    fn trace(&self, what: std::fmt::Arguments) {
        std::println!("{:3} {:03x}: {}", self.cycle.bright_black(), self.pc, what);
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("stack", &&self.stack[..self.sp])
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("delay", &self.delay)
            .field("sound", &self.sound)
            .field("keys", &self.keys)
            .field("redraw", &self.redraw)
            .field("cycle", &self.cycle)
            .field("unrecognized", &self.unrecognized)
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a new CPU with default [Flags]
    ///
    /// # Examples
    /// ```rust
    /// use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// ```
    fn default() -> Self {
        Self::new(Flags::default())
    }
}
