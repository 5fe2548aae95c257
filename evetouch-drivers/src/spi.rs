//! SPI register link
//!
//! The controller exposes a 22-bit address space over SPI. Each access
//! is one chip-select transaction starting with a 3-byte big-endian
//! address: bit 23 set for writes, clear for reads. Reads clock one dummy
//! byte before the data. Register values are little-endian.
//!
//! Host commands use the same framing but never touch memory; they start
//! the clock and change power modes before the registers respond.

use core::ops::Range;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};
use evetouch_core::link::{Payload, RegisterLink};
use evetouch_protocol::registers::HostCommand;

/// Minimum time PD must be held low
const POWER_DOWN_MS: u32 = 6;
/// Minimum time from PD rising to the first SPI access
const WAKE_MS: u32 = 21;

const WRITE_FLAG: u8 = 0x80;
const ADDR_MASK: u32 = 0x3F_FF_FF;

/// Alignment padding never exceeds one word
const ZEROS: [u8; 4] = [0; 4];

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<S, P> {
    /// SPI transaction failed
    Spi(S),
    /// PD pin could not be driven
    Pin(P),
}

/// Register link over an `embedded-hal` SPI device
///
/// The device owns chip select. `PD` is the controller's power-down
/// line, driven only by [`SpiLink::reset`].
pub struct SpiLink<SPI, PD> {
    spi: SPI,
    pd: PD,
}

type Error<SPI, PD> = LinkError<
    <SPI as embedded_hal::spi::ErrorType>::Error,
    <PD as embedded_hal::digital::ErrorType>::Error,
>;

impl<SPI, PD> SpiLink<SPI, PD>
where
    SPI: SpiDevice<u8>,
    PD: OutputPin,
{
    pub fn new(spi: SPI, pd: PD) -> Self {
        Self { spi, pd }
    }

    /// The SPI device, e.g. to raise the clock after power-up
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Releases the SPI device and PD pin
    pub fn release(self) -> (SPI, PD) {
        (self.spi, self.pd)
    }

    /// Power-cycle the controller through its PD pin
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<SPI, PD>> {
        self.pd.set_low().map_err(LinkError::Pin)?;
        delay.delay_ms(POWER_DOWN_MS);
        self.pd.set_high().map_err(LinkError::Pin)?;
        delay.delay_ms(WAKE_MS);
        Ok(())
    }

    /// Send a 3-byte host command frame
    pub fn host_command(&mut self, command: HostCommand) -> Result<(), Error<SPI, PD>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("host command {}", command);
        self.spi.write(&command.frame()).map_err(LinkError::Spi)
    }

    /// Reset, select the clock source and wake the controller
    ///
    /// Registers answer once the clock is running; `evetouch_core::boot`
    /// polls for that.
    pub fn power_up<D: DelayNs>(
        &mut self,
        delay: &mut D,
        external_clock: bool,
    ) -> Result<(), Error<SPI, PD>> {
        self.reset(delay)?;
        let clock = if external_clock {
            HostCommand::ClkExt
        } else {
            HostCommand::ClkInt
        };
        self.host_command(clock)?;
        self.host_command(HostCommand::Active)
    }

    fn read<const N: usize>(&mut self, addr: u32) -> Result<[u8; N], Error<SPI, PD>> {
        let header = read_header(addr);
        let mut data = [0u8; N];
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(&mut data)])
            .map_err(LinkError::Spi)?;
        Ok(data)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), Error<SPI, PD>> {
        let header = write_header(addr);
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Write(data)])
            .map_err(LinkError::Spi)
    }
}

fn read_header(addr: u32) -> [u8; 4] {
    let addr = addr & ADDR_MASK;
    [(addr >> 16) as u8, (addr >> 8) as u8, addr as u8, 0x00]
}

fn write_header(addr: u32) -> [u8; 3] {
    let addr = addr & ADDR_MASK;
    [(addr >> 16) as u8 | WRITE_FLAG, (addr >> 8) as u8, addr as u8]
}

impl<SPI, PD> RegisterLink for SpiLink<SPI, PD>
where
    SPI: SpiDevice<u8>,
    PD: OutputPin,
{
    type Error = Error<SPI, PD>;

    fn read8(&mut self, addr: u32) -> Result<u8, Self::Error> {
        let [b] = self.read::<1>(addr)?;
        Ok(b)
    }

    fn read16(&mut self, addr: u32) -> Result<u16, Self::Error> {
        self.read::<2>(addr).map(u16::from_le_bytes)
    }

    fn read32(&mut self, addr: u32) -> Result<u32, Self::Error> {
        self.read::<4>(addr).map(u32::from_le_bytes)
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Self::Error> {
        self.write(addr, &[value])
    }

    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Self::Error> {
        self.write(addr, &value.to_le_bytes())
    }

    fn write32(&mut self, addr: u32, value: u32) -> Result<(), Self::Error> {
        self.write(addr, &value.to_le_bytes())
    }

    fn write_bulk<P: Payload + ?Sized>(
        &mut self,
        addr: u32,
        payload: &P,
        range: Range<usize>,
        padding: usize,
    ) -> Result<(), Self::Error> {
        let header = write_header(addr);
        let (body, tail) = payload.segments(range);
        let zeros = &ZEROS[..padding.min(ZEROS.len())];
        self.spi
            .transaction(&mut [
                Operation::Write(&header),
                Operation::Write(body),
                Operation::Write(tail),
                Operation::Write(zeros),
            ])
            .map_err(LinkError::Spi)
    }
}
