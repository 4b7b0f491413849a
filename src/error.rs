// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for chip8vm

use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for chip8vm.
#[derive(Debug, Error)]
pub enum Error {
    /// The program image does not fit in program memory
    #[error("program is {size} bytes, but only {max} bytes of program space exist")]
    ProgramTooLarge {
        /// The size of the offending program
        size: usize,
        /// The size of program memory
        max: usize,
    },
    /// Represents an unimplemented operation
    #[error("opcode {word:04x} not recognized")]
    UnimplementedInstruction {
        /// The offending word
        word: u16,
    },
    /// A subroutine call was made with all 16 stack slots in use
    #[error("stack overflow: call at {pc:03x} exceeds 16 nested subroutines")]
    StackOverflow {
        /// The address of the offending call
        pc: u16,
    },
    /// A return was made with nothing on the stack
    #[error("stack underflow: return at {pc:03x} with an empty stack")]
    StackUnderflow {
        /// The address of the offending return
        pc: u16,
    },
    /// Tried to press a key that doesn't exist
    #[error("tried to press key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "minifb")]
    /// Error originated in [minifb]
    #[error(transparent)]
    MinifbError(#[from] minifb::Error),
}

impl Error {
    /// Reports whether the interpreter can keep running after this error.
    ///
    /// Unrecognized opcodes are skipped over, so they are not fatal.
    /// Stack violations mean the program is malformed, and execution must stop.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// assert!(!Error::UnimplementedInstruction { word: 0xffff }.is_fatal());
    /// assert!(Error::StackUnderflow { pc: 0x200 }.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::UnimplementedInstruction { .. })
    }
}
