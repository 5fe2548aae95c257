//! Flow-controlled command stream (FT810)

use evetouch_protocol::registers::ft810;
use evetouch_protocol::{padding_for, ChipModel, MemoryMap};

use super::{CommandFifo, FifoError, Spin};
use crate::link::{Payload, RegisterLink};

/// Largest piece streamed per space check; a multiple of 4
const CHUNK: usize = 2048;

/// `REG_CMDB_SPACE` is 12 bits wide
const SPACE_MASK: u32 = 0xFFF;

/// Command stream through `REG_CMDB_WRITE`
///
/// The chip advances its own write pointer for every word received, so
/// there is no local cursor and nothing to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFifo {
    wait_limit: Option<u32>,
}

impl StreamFifo {
    pub const fn new(wait_limit: Option<u32>) -> Self {
        Self { wait_limit }
    }

    fn wait_for_space<L: RegisterLink>(
        &self,
        link: &mut L,
        needed: u32,
    ) -> Result<(), FifoError<L::Error>> {
        let mut spin = Spin::new(self.wait_limit);
        loop {
            let space = link.read32(ft810::REG_CMDB_SPACE).map_err(FifoError::Link)? & SPACE_MASK;
            if space >= needed {
                return Ok(());
            }
            spin.poll()?;
        }
    }
}

impl CommandFifo for StreamFifo {
    fn map(&self) -> &'static MemoryMap {
        ChipModel::Ft810.map()
    }

    fn wait_limit(&self) -> Option<u32> {
        self.wait_limit
    }

    fn start<L: RegisterLink>(&mut self, _link: &mut L) -> Result<(), FifoError<L::Error>> {
        Ok(())
    }

    fn write<L: RegisterLink, P: Payload + ?Sized>(
        &mut self,
        link: &mut L,
        payload: &P,
    ) -> Result<(), FifoError<L::Error>> {
        let len = payload.len();
        let padding = padding_for(len);
        if len == 0 {
            return Ok(());
        }

        let mut offset = 0;
        while offset < len {
            let n = (len - offset).min(CHUNK);
            let pad = if offset + n == len { padding } else { 0 };
            self.wait_for_space(link, (n + pad) as u32)?;
            link.write_bulk(ft810::REG_CMDB_WRITE, payload, offset..offset + n, pad)
                .map_err(FifoError::Link)?;
            offset += n;
        }
        Ok(())
    }

    fn execute<L: RegisterLink>(&mut self, _link: &mut L) -> Result<(), FifoError<L::Error>> {
        Ok(())
    }

    fn reset<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        link.write32(ft810::REG_CMD_WRITE, 0).map_err(FifoError::Link)?;
        link.write32(ft810::REG_CMD_READ, 0).map_err(FifoError::Link)?;
        Ok(())
    }
}
