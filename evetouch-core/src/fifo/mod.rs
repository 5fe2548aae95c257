//! Co-processor command FIFO
//!
//! Commands are serialized into a 4096-byte ring in chip memory which the
//! co-processor drains. Two chip generations manage the ring differently:
//!
//! - [`RingFifo`] (FT800): the host tracks its own write cursor, waits on
//!   the hardware read pointer for free space, splits writes across the
//!   ring boundary and publishes the cursor on [`CommandFifo::execute`].
//! - [`StreamFifo`] (FT810): the chip reports free space and accepts data
//!   through a single streaming register; start and execute are no-ops.
//!
//! Every write is padded with zeros to a multiple of 4 bytes.
//!
//! Flow-control waits spin until the co-processor makes room. With a wait
//! limit configured (debug builds by default) a stalled chip surfaces as
//! [`FifoError::Timeout`] instead of hanging, leaving the ring in whatever
//! partial state the abandoned write reached.

mod ring;
mod stream;

pub use ring::RingFifo;
pub use stream::StreamFifo;

use evetouch_protocol::{ChipModel, Command, MemoryMap};

use crate::link::{Payload, RegisterLink, Text};

/// Poll budget used for waits in debug builds
pub const DEBUG_WAIT_POLLS: u32 = 2_000;

/// Default wait limit: bounded in debug builds, unbounded in release
pub const fn default_wait_limit() -> Option<u32> {
    if cfg!(debug_assertions) {
        Some(DEBUG_WAIT_POLLS)
    } else {
        None
    }
}

/// Command FIFO errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoError<E> {
    /// Register link failure
    Link(E),
    /// The co-processor did not drain within the configured wait limit
    Timeout,
}

/// Counts polls against an optional limit
#[derive(Debug, Clone, Copy)]
pub(crate) struct Spin {
    limit: Option<u32>,
    polls: u32,
}

impl Spin {
    pub(crate) fn new(limit: Option<u32>) -> Self {
        Self { limit, polls: 0 }
    }

    /// Account for one more poll; errors once the limit is exhausted
    pub(crate) fn poll<E>(&mut self) -> Result<(), FifoError<E>> {
        self.polls = self.polls.saturating_add(1);
        match self.limit {
            Some(limit) if self.polls > limit => {
                #[cfg(feature = "defmt")]
                defmt::warn!("command FIFO wait gave up after {} polls", self.polls);
                Err(FifoError::Timeout)
            }
            _ => Ok(()),
        }
    }
}

/// Serializes commands into the co-processor ring
pub trait CommandFifo {
    /// Register addresses for the chip behind this FIFO
    fn map(&self) -> &'static MemoryMap;

    /// Poll limit for flow-control waits (`None` spins forever)
    fn wait_limit(&self) -> Option<u32>;

    /// Begin a batch of writes
    fn start<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>>;

    /// Write a payload, zero-padded to a multiple of 4 bytes
    fn write<L: RegisterLink, P: Payload + ?Sized>(
        &mut self,
        link: &mut L,
        payload: &P,
    ) -> Result<(), FifoError<L::Error>>;

    /// Hand everything written so far to the co-processor
    fn execute<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>>;

    /// Zero the hardware pointers and forget the local cursor
    fn reset<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>>;

    /// Write a single 32-bit word
    fn cmd<L: RegisterLink>(&mut self, link: &mut L, word: u32) -> Result<(), FifoError<L::Error>> {
        self.write(link, &word.to_le_bytes()[..])
    }

    /// Write an encoded co-processor command
    fn command<L: RegisterLink>(
        &mut self,
        link: &mut L,
        command: &Command,
    ) -> Result<(), FifoError<L::Error>> {
        self.write(link, command.encode().as_bytes())
    }

    /// Write a NUL-terminated string argument
    fn str<L: RegisterLink>(&mut self, link: &mut L, s: &str) -> Result<(), FifoError<L::Error>> {
        self.write(link, &Text(s))
    }

    /// Whether the co-processor has consumed everything published
    fn is_idle<L: RegisterLink>(&self, link: &mut L) -> Result<bool, FifoError<L::Error>> {
        let map = self.map();
        let read = link.read32(map.reg_cmd_read).map_err(FifoError::Link)?;
        let write = link.read32(map.reg_cmd_write).map_err(FifoError::Link)?;
        Ok(read == write)
    }

    /// Spin until the co-processor drains the ring
    fn wait_until_idle<L: RegisterLink>(&self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        let mut spin = Spin::new(self.wait_limit());
        while !self.is_idle(link)? {
            spin.poll()?;
        }
        Ok(())
    }
}

/// FIFO strategy selected from the chip model at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyFifo {
    Ring(RingFifo),
    Stream(StreamFifo),
}

impl AnyFifo {
    pub fn for_chip(chip: ChipModel, wait_limit: Option<u32>) -> Self {
        match chip {
            ChipModel::Ft800 => AnyFifo::Ring(RingFifo::new(chip.map(), wait_limit)),
            ChipModel::Ft810 => AnyFifo::Stream(StreamFifo::new(wait_limit)),
        }
    }
}

impl CommandFifo for AnyFifo {
    fn map(&self) -> &'static MemoryMap {
        match self {
            AnyFifo::Ring(f) => f.map(),
            AnyFifo::Stream(f) => f.map(),
        }
    }

    fn wait_limit(&self) -> Option<u32> {
        match self {
            AnyFifo::Ring(f) => f.wait_limit(),
            AnyFifo::Stream(f) => f.wait_limit(),
        }
    }

    fn start<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        match self {
            AnyFifo::Ring(f) => f.start(link),
            AnyFifo::Stream(f) => f.start(link),
        }
    }

    fn write<L: RegisterLink, P: Payload + ?Sized>(
        &mut self,
        link: &mut L,
        payload: &P,
    ) -> Result<(), FifoError<L::Error>> {
        match self {
            AnyFifo::Ring(f) => f.write(link, payload),
            AnyFifo::Stream(f) => f.write(link, payload),
        }
    }

    fn execute<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        match self {
            AnyFifo::Ring(f) => f.execute(link),
            AnyFifo::Stream(f) => f.execute(link),
        }
    }

    fn reset<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        match self {
            AnyFifo::Ring(f) => f.reset(link),
            AnyFifo::Stream(f) => f.reset(link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedEve;

    #[test]
    fn test_for_chip_selects_strategy() {
        assert!(matches!(AnyFifo::for_chip(ChipModel::Ft800, None), AnyFifo::Ring(_)));
        assert!(matches!(AnyFifo::for_chip(ChipModel::Ft810, None), AnyFifo::Stream(_)));
    }

    #[test]
    fn test_spin_limit() {
        let mut spin = Spin::new(Some(2));
        assert_eq!(spin.poll::<()>(), Ok(()));
        assert_eq!(spin.poll::<()>(), Ok(()));
        assert_eq!(spin.poll::<()>(), Err(FifoError::Timeout));

        let mut forever = Spin::new(None);
        for _ in 0..10_000 {
            assert_eq!(forever.poll::<()>(), Ok(()));
        }
    }

    #[test]
    fn test_wait_until_idle_times_out_on_stalled_chip() {
        let mut eve = SimulatedEve::new(ChipModel::Ft800);
        eve.stall();
        let mut fifo = AnyFifo::for_chip(ChipModel::Ft800, Some(5));
        fifo.start(&mut eve).unwrap();
        fifo.cmd(&mut eve, 0xFFFF_FF01).unwrap();
        fifo.execute(&mut eve).unwrap();
        assert_eq!(fifo.wait_until_idle(&mut eve), Err(FifoError::Timeout));

        eve.resume();
        assert_eq!(fifo.wait_until_idle(&mut eve), Ok(()));
    }

    #[test]
    fn test_cmd_and_str_padding() {
        let mut eve = SimulatedEve::new(ChipModel::Ft800);
        let mut fifo = AnyFifo::for_chip(ChipModel::Ft800, None);
        fifo.start(&mut eve).unwrap();
        fifo.cmd(&mut eve, 0x1122_3344).unwrap();
        fifo.str(&mut eve, "Hi").unwrap();
        fifo.execute(&mut eve).unwrap();
        assert_eq!(
            eve.consumed(),
            &[0x44, 0x33, 0x22, 0x11, b'H', b'i', 0, 0][..]
        );
    }
}
