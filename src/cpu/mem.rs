// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The Mem represents the CPU's memory
//!
//! Every address is reduced to 12 bits before use, so reads and writes
//! wrap around the top of memory instead of running off the end.

use crate::error::{Error, Result};
use std::fmt::{Display, Formatter};

/// Total size of addressable memory
pub const MEM_SIZE: usize = 0x1000;
/// Start of program memory. Everything below is reserved for the interpreter.
pub const PROGRAM: usize = 0x200;
/// Largest program image that fits in program memory
pub const PROGRAM_SIZE: usize = MEM_SIZE - PROGRAM;
/// Address of the built-in font
pub const FONT_ADDR: usize = 0x000;
/// Size of one font glyph, in bytes
pub const GLYPH_SIZE: u16 = 5;

/// The built-in hexadecimal font: 16 glyphs, 4 pixels wide and 5 pixels tall
#[rustfmt::skip]
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Stores the 4 KiB of Chip-8 memory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mem {
    memory: [u8; MEM_SIZE],
}

impl Mem {
    /// Constructs a new mem, with the font loaded and everything else zeroed
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mem = Mem::new();
    /// assert_eq!(&FONT[..], &mem.as_slice()[0..80]);
    /// assert_eq!(0, mem.read(0x200usize));
    /// ```
    pub fn new() -> Self {
        let mut mem = Mem {
            memory: [0; MEM_SIZE],
        };
        mem.reset();
        mem
    }

    /// Zeroes all of memory, then reloads the font
    pub fn reset(&mut self) {
        self.memory.fill(0);
        self.memory[FONT_ADDR..FONT_ADDR + FONT.len()].copy_from_slice(&FONT);
    }

    /// Copies a program image into program memory.
    ///
    /// Returns [Error::ProgramTooLarge] without touching memory if the
    /// image is larger than [PROGRAM_SIZE].
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut mem = Mem::new();
    /// mem.load_program(&[0x00, 0xe0]).unwrap();
    /// assert_eq!(0x00e0, mem.read_word(0x200usize));
    /// assert!(mem.load_program(&[0; 0x1000]).is_err());
    /// ```
    pub fn load_program(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: rom.len(),
                max: PROGRAM_SIZE,
            });
        }
        self.memory[PROGRAM..PROGRAM + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Reads the byte at `addr` (mod 4096)
    #[inline(always)]
    pub fn read(&self, addr: impl Into<usize>) -> u8 {
        self.memory[wrap(addr.into())]
    }

    /// Writes `data` to `addr` (mod 4096)
    #[inline(always)]
    pub fn write(&mut self, addr: impl Into<usize>, data: u8) {
        self.memory[wrap(addr.into())] = data;
    }

    /// Reads a big-endian word at `addr`. The second byte wraps independently.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut mem = Mem::new();
    /// mem.write(0xfffusize, 0x12);
    /// mem.write(0x000usize, 0x34);
    /// assert_eq!(0x1234, mem.read_word(0xfffusize));
    /// ```
    #[inline(always)]
    pub fn read_word(&self, addr: impl Into<usize>) -> u16 {
        let addr = addr.into();
        u16::from_be_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Gets the whole of memory as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }
}

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduces an address to 12 bits
#[inline(always)]
fn wrap(addr: usize) -> usize {
    addr % MEM_SIZE
}

impl Display for Mem {
    /// Formats memory as a hexdump, skipping rows that are entirely zero
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (row, chunk) in self.memory.chunks(16).enumerate() {
            if chunk.iter().all(|&byte| byte == 0) {
                continue;
            }
            write!(f, "{:03x}:", row * 16)?;
            for (idx, byte) in chunk.iter().enumerate() {
                if idx % 2 == 0 {
                    write!(f, " ")?;
                }
                if idx % 8 == 0 {
                    write!(f, " ")?;
                }
                write!(f, "{byte:02x}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
