//! Bring-up preconditions for the command FIFO
//!
//! After power-up (and the host commands that start its clock) the
//! controller needs a moment before its registers respond. [`boot`] waits
//! for the device id, mutes the synthesizer and zeroes the command ring
//! pointers so the first batch of commands starts from a known state.
//! Panel timing registers are left to the board.

use embedded_hal::delay::DelayNs;
use evetouch_protocol::DEVICE_ID;

use crate::fifo::{CommandFifo, FifoError};
use crate::link::RegisterLink;

/// Device id polls before giving up, 1 ms apart
pub const DEFAULT_ID_POLLS: u32 = 250;

/// Boot errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError<E> {
    /// Register link failure
    Link(E),
    /// `REG_ID` never read back 0x7C; holds the last value seen
    DeviceId(u8),
    /// The command FIFO could not be reset
    Fifo(FifoError<E>),
}

impl<E> From<FifoError<E>> for BootError<E> {
    fn from(err: FifoError<E>) -> Self {
        match err {
            FifoError::Link(e) => BootError::Link(e),
            other => BootError::Fifo(other),
        }
    }
}

/// Wait for the controller to answer, then reset the command FIFO
pub fn boot<L, F, D>(
    link: &mut L,
    fifo: &mut F,
    delay: &mut D,
    max_polls: u32,
) -> Result<(), BootError<L::Error>>
where
    L: RegisterLink,
    F: CommandFifo,
    D: DelayNs,
{
    let map = fifo.map();
    let mut id = 0;
    for _ in 0..max_polls.max(1) {
        id = link.read8(map.reg_id).map_err(BootError::Link)?;
        if id == DEVICE_ID {
            break;
        }
        delay.delay_ms(1);
    }

    if id != DEVICE_ID {
        #[cfg(feature = "defmt")]
        defmt::warn!("incorrect device id, expected 0x7C, got {=u8:#x}", id);
        return Err(BootError::DeviceId(id));
    }
    #[cfg(feature = "defmt")]
    defmt::debug!("device id ok");

    link.write8(map.reg_vol_sound, 0).map_err(BootError::Link)?;
    fifo.reset(link)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo::AnyFifo;
    use crate::sim::SimulatedEve;
    use evetouch_protocol::ChipModel;

    #[derive(Default)]
    struct CountingDelay {
        ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += ns as u64;
        }
    }

    #[test]
    fn test_boot_resets_fifo() {
        let mut eve = SimulatedEve::new(ChipModel::Ft800);
        eve.set_write_pointer(100);
        eve.set_read_pointer(100);
        let mut fifo = AnyFifo::for_chip(ChipModel::Ft800, None);
        let mut delay = CountingDelay::default();

        boot(&mut eve, &mut fifo, &mut delay, DEFAULT_ID_POLLS).unwrap();
        let map = ChipModel::Ft800.map();
        assert_eq!(eve.register(map.reg_cmd_write), 0);
        assert_eq!(eve.register(map.reg_cmd_read), 0);
        assert_eq!(eve.writes_to(map.reg_vol_sound), [0]);
        assert_eq!(delay.ns, 0);
    }

    #[test]
    fn test_boot_gives_up_on_wrong_id() {
        let mut eve = SimulatedEve::new(ChipModel::Ft810);
        let map = ChipModel::Ft810.map();
        eve.set_register(map.reg_id, 0x00);
        let mut fifo = AnyFifo::for_chip(ChipModel::Ft810, None);
        let mut delay = CountingDelay::default();

        assert_eq!(
            boot(&mut eve, &mut fifo, &mut delay, 10),
            Err(BootError::DeviceId(0))
        );
        assert_eq!(delay.ns, 10 * 1_000_000);
        assert!(eve.writes_to(map.reg_cmd_write).is_empty());
    }

    #[test]
    fn test_fifo_error_conversion() {
        assert_eq!(
            BootError::from(FifoError::Link(3u8)),
            BootError::Link(3u8)
        );
        assert_eq!(
            BootError::<u8>::from(FifoError::Timeout),
            BootError::Fifo(FifoError::Timeout)
        );
    }
}
