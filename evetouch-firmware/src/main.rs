//! EveTouch - touchscreen piano demo
//!
//! Main firmware binary for an RP2040 driving an FT800/FT810 display
//! over SPI. Brings the controller up, then hands the display session
//! to the UI task, which re-enters the cooperative UI loop every tick.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use {defmt_rtt as _, panic_probe as _};

use evetouch_core::boot::DEFAULT_ID_POLLS;
use evetouch_core::{parse_config, DisplaySession, ScreenHandlers, UiConfig};
use evetouch_drivers::SpiLink;

use crate::board::{Session, UptimeClock, BOOT_SPI_HZ, RUN_SPI_HZ};
use crate::screens::{App, Piano, Settings, PIANO};

mod board;
mod screens;
mod tasks;

/// Embedded UI configuration (compiled into firmware)
/// Edit ui.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../ui.toml");

/// Indexed by `ScreenId`
static SCREENS: [ScreenHandlers<Session>; 2] = [
    ScreenHandlers::of::<Piano>(),
    ScreenHandlers::of::<Settings>(),
];

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("EveTouch firmware starting...");

    let p = embassy_rp::init(Default::default());

    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid ui.toml ({}), using defaults", e);
            UiConfig::default()
        }
    };
    info!("Configuration loaded: {}", config.chip);

    // Display on SPI0; pin assignments are board-specific
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = BOOT_SPI_HZ;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let pd = Output::new(p.PIN_20, Level::Low);
    let device = ExclusiveDevice::new(spi, cs, Delay).unwrap();
    let mut link = SpiLink::new(device, pd);

    let mut delay = Delay;
    if let Err(e) = link.power_up(&mut delay, false) {
        error!("Display power-up failed: {}", Debug2Format(&e));
        return;
    }

    let app = App::new(&config);
    let mut session = DisplaySession::new(link, UptimeClock, &SCREENS, PIANO, config, app);

    if let Err(e) = session.boot(&mut delay, DEFAULT_ID_POLLS) {
        error!("Display did not respond: {}", Debug2Format(&e));
        return;
    }
    session
        .link_mut()
        .spi_mut()
        .bus_mut()
        .set_frequency(RUN_SPI_HZ);
    info!("Display controller ready");

    if let Err(e) = session.on_startup() {
        error!("UI startup failed: {}", Debug2Format(&e));
        return;
    }

    spawner.spawn(tasks::ui_task(session)).unwrap();

    info!("All tasks spawned, UI running");
}
