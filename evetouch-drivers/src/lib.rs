//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in evetouch-core:
//!
//! - SPI register link with host commands and power-down reset

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod spi;

pub use spi::{LinkError, SpiLink};
