//! EVE co-processor wire encoding
//!
//! This crate defines everything that crosses the SPI link to an
//! FT800/FT810 graphics controller, independent of how the bytes are moved:
//!
//! ```text
//! ┌──────────────┬────────────────────────────────────────────────┐
//! │ registers    │ memory maps and register addresses per chip    │
//! │ dl           │ display-list words (BEGIN, VERTEX2F, TAG, ...) │
//! │ commands     │ co-processor commands (CMD_BUTTON, CMD_TRACK)  │
//! │ sound        │ synthesizer effects and MIDI note numbers      │
//! └──────────────┴────────────────────────────────────────────────┘
//! ```
//!
//! Every word is 32 bits little-endian. Co-processor commands are an
//! opcode word `0xFFFF_FFxx` followed by packed arguments. Whatever is
//! written into the command ring is padded with zeros to a multiple of
//! 4 bytes, see [`align4`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod commands;
pub mod dl;
pub mod registers;
pub mod sound;

pub use commands::{opt, Command, CommandBuf, MAX_COMMAND_SIZE};
pub use dl::Primitive;
pub use registers::{ChipModel, MemoryMap, CMD_FIFO_SIZE, DEVICE_ID};
pub use sound::{note, Effect};

/// Round a byte count up to the next multiple of 4
#[inline]
pub const fn align4(len: usize) -> usize {
    ((len + 3) >> 2) << 2
}

/// Number of zero bytes needed to pad `len` to a multiple of 4
#[inline]
pub const fn padding_for(len: usize) -> usize {
    align4(len) - len
}
