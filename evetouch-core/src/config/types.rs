//! Configuration type definitions
//!
//! Every tunable of the UI loop. Defaults match the stock touchscreen
//! behavior; a `ui.toml` only needs to name what differs.

use evetouch_protocol::{ChipModel, Effect};

use crate::fifo::default_wait_limit;
use crate::processor::Grid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Touch handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TouchConfig {
    /// Key repeat rate while a press is held
    pub repeats_per_second: u8,
    /// Quiet period after a release before the next press is accepted
    pub debounce_ms: u16,
    /// Play press/repeat/unpress effects
    pub sound: bool,
}

impl TouchConfig {
    /// Interval between repeats, in milliseconds
    pub fn repeat_interval_ms(&self) -> u32 {
        1000 / self.repeats_per_second.max(1) as u32
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            repeats_per_second: 4,
            debounce_ms: 100,
            sound: true,
        }
    }
}

/// Synthesizer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoundConfig {
    pub volume: u8,
    pub press: Effect,
    pub repeat: Effect,
    pub unpress: Effect,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            volume: 255,
            press: Effect::Chack,
            repeat: Effect::Chack,
            unpress: Effect::Pop,
        }
    }
}

/// Command FIFO diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FifoConfig {
    /// Polls before a flow-control wait gives up (`None` waits forever)
    pub wait_limit: Option<u32>,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            wait_limit: default_wait_limit(),
        }
    }
}

/// Screen geometry and the layout grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutConfig {
    pub width: u16,
    pub height: u16,
    pub cols: u8,
    pub rows: u8,
    /// Gap around each grid cell, in pixels
    pub margin: i16,
}

impl LayoutConfig {
    pub const fn grid(&self) -> Grid {
        Grid::new(self.width, self.height, self.cols, self.rows, self.margin)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 272,
            cols: 4,
            rows: 4,
            margin: 5,
        }
    }
}

/// Complete UI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiConfig {
    pub chip: ChipModel,
    /// Idle refresh interval
    pub refresh_ms: u32,
    /// Refresh interval while a widget is being tracked
    pub tracking_refresh_ms: u32,
    /// Clear color behind every screen, `0xRRGGBB`
    pub background: u32,
    pub touch: TouchConfig,
    pub sound: SoundConfig,
    pub fifo: FifoConfig,
    pub layout: LayoutConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            chip: ChipModel::Ft800,
            refresh_ms: 1000,
            tracking_refresh_ms: 50,
            background: 0x44_44_33,
            touch: TouchConfig::default(),
            sound: SoundConfig::default(),
            fifo: FifoConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}
