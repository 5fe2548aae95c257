//! UI configuration
//!
//! Types describing every tunable of the display session, plus a reader
//! for the `ui.toml` file the firmware embeds.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
