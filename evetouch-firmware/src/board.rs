//! Board wiring
//!
//! Concrete types for an RP2040 with the display on SPI0:
//! SCK=GPIO18, MOSI=GPIO19, MISO=GPIO16, CS=GPIO17, PD=GPIO20.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Delay, Instant};
use embedded_hal_bus::spi::ExclusiveDevice;
use evetouch_core::{Clock, DisplaySession};
use evetouch_drivers::SpiLink;

use crate::screens::App;

/// SPI clock during bring-up; the controller runs from its internal
/// oscillator until the host commands start the PLL
pub const BOOT_SPI_HZ: u32 = 7_000_000;
/// SPI clock once the controller is active
pub const RUN_SPI_HZ: u32 = 20_000_000;

pub type EveSpi = ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, Delay>;
pub type EveLink = SpiLink<EveSpi, Output<'static>>;
pub type Session = DisplaySession<EveLink, UptimeClock, App>;

/// Milliseconds since boot
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
