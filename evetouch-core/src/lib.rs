//! Board-agnostic core of the EVE touchscreen toolkit
//!
//! This crate contains all logic that does not depend on a specific bus or
//! board:
//!
//! - Register link contract consumed by everything that talks to the chip
//! - Command FIFO engine (host-managed ring and flow-controlled stream)
//! - Command processor for box-constrained widget layout
//! - Screen registry with a bounded back-navigation stack
//! - Debounced touch event loop driven from an idle tick
//! - Tiny wraparound timers and the sound sequencer
//! - Configuration type definitions and parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod boot;
pub mod config;
pub mod fifo;
pub mod link;
pub mod processor;
pub mod screen;
pub mod session;
pub mod sound;
pub mod timer;
pub mod touch;

#[cfg(test)]
pub(crate) mod sim;

pub use boot::{boot, BootError};
pub use config::{parse_config, UiConfig};
pub use fifo::{AnyFifo, CommandFifo, FifoError};
pub use link::{Payload, RegisterLink, Text};
pub use processor::{CommandProcessor, Grid, Rect};
pub use screen::{Screen, ScreenContext, ScreenHandlers, ScreenId, ScreenStack};
pub use session::{DisplaySession, TrackerReading};
pub use sound::{Note, SoundPlayer};
pub use timer::{Clock, TinyTimer};
pub use touch::{TouchSink, TouchSound, TouchState, TouchTracker};
