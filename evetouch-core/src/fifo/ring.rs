//! Host-managed command ring (FT800)

use evetouch_protocol::registers::{CMD_FIFO_MASK, CMD_FIFO_SIZE};
use evetouch_protocol::{padding_for, MemoryMap};

use core::ops::Range;

use super::{CommandFifo, FifoError, Spin};
use crate::link::{Payload, RegisterLink};

/// Largest piece of one payload written between space checks
///
/// The cursor never catches up to the read pointer, so a full ring
/// always keeps one word free.
const MAX_PIECE: usize = (CMD_FIFO_SIZE - 4) as usize;

/// Command ring with a host-side write cursor
///
/// The cursor is loaded from `REG_CMD_WRITE` on the first [`start`] of a
/// batch and published back on [`execute`]. Until then the co-processor
/// does not see anything written.
///
/// [`start`]: CommandFifo::start
/// [`execute`]: CommandFifo::execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingFifo {
    map: &'static MemoryMap,
    cursor: Option<u32>,
    wait_limit: Option<u32>,
}

impl RingFifo {
    pub const fn new(map: &'static MemoryMap, wait_limit: Option<u32>) -> Self {
        Self {
            map,
            cursor: None,
            wait_limit,
        }
    }

    /// Local write cursor, if a batch has been started
    pub fn cursor(&self) -> Option<u32> {
        self.cursor
    }

    /// Free bytes between the cursor and the hardware read pointer
    ///
    /// A read pointer equal to the cursor means the ring is empty.
    pub fn free_space(read: u32, cursor: u32) -> u32 {
        if read <= cursor {
            (CMD_FIFO_SIZE - cursor) + read
        } else {
            read - cursor
        }
    }

    /// Copy `range` of the payload and its padding at `cursor`
    ///
    /// At most two segments: the tail up to the ring boundary, then the
    /// head continuing from offset 0. Returns the advanced cursor.
    fn write_piece<L: RegisterLink, P: Payload + ?Sized>(
        &self,
        link: &mut L,
        mut cursor: u32,
        payload: &P,
        range: Range<usize>,
        mut padding: usize,
    ) -> Result<u32, FifoError<L::Error>> {
        let mut offset = range.start;
        while offset < range.end {
            let room = (CMD_FIFO_SIZE - cursor) as usize;
            let n = (range.end - offset).min(room);
            let pad = if offset + n == range.end { padding.min(room - n) } else { 0 };
            link.write_bulk(self.map.ram_cmd + cursor, payload, offset..offset + n, pad)
                .map_err(FifoError::Link)?;
            cursor = (cursor + (n + pad) as u32) & CMD_FIFO_MASK;
            offset += n;
            padding -= pad;
        }
        if padding > 0 {
            link.write_bulk(self.map.ram_cmd + cursor, payload, range.end..range.end, padding)
                .map_err(FifoError::Link)?;
            cursor = (cursor + padding as u32) & CMD_FIFO_MASK;
        }
        Ok(cursor)
    }

    /// Spin until `needed` bytes fit without the cursor catching up to the
    /// read pointer
    fn wait_for_space<L: RegisterLink>(
        &mut self,
        link: &mut L,
        cursor: u32,
        needed: u32,
    ) -> Result<(), FifoError<L::Error>> {
        let mut spin = Spin::new(self.wait_limit);
        let mut published = false;
        loop {
            let read = link.read32(self.map.reg_cmd_read).map_err(FifoError::Link)? & CMD_FIFO_MASK;
            if Self::free_space(read, cursor) > needed {
                return Ok(());
            }
            // The co-processor only drains up to the published pointer
            if !published {
                link.write32(self.map.reg_cmd_write, cursor)
                    .map_err(FifoError::Link)?;
                published = true;
            }
            spin.poll()?;
        }
    }
}

impl CommandFifo for RingFifo {
    fn map(&self) -> &'static MemoryMap {
        self.map
    }

    fn wait_limit(&self) -> Option<u32> {
        self.wait_limit
    }

    fn start<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        if self.cursor.is_none() {
            let write = link.read32(self.map.reg_cmd_write).map_err(FifoError::Link)?;
            self.cursor = Some(write & CMD_FIFO_MASK);
        }
        Ok(())
    }

    fn write<L: RegisterLink, P: Payload + ?Sized>(
        &mut self,
        link: &mut L,
        payload: &P,
    ) -> Result<(), FifoError<L::Error>> {
        if self.cursor.is_none() {
            #[cfg(feature = "defmt")]
            defmt::debug!("command FIFO write before start");
            self.start(link)?;
        }
        let mut cursor = self.cursor.unwrap_or(0);

        // A payload larger than the ring goes in pieces; waiting for each
        // piece publishes the ones before it.
        let len = payload.len();
        let mut start = 0;
        loop {
            let end = (start + MAX_PIECE).min(len);
            let padding = if end == len { padding_for(len) } else { 0 };
            self.wait_for_space(link, cursor, (end - start + padding) as u32)?;
            cursor = self.write_piece(link, cursor, payload, start..end, padding)?;
            start = end;
            if start >= len {
                break;
            }
        }

        self.cursor = Some(cursor);
        Ok(())
    }

    fn execute<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        if let Some(cursor) = self.cursor {
            link.write32(self.map.reg_cmd_write, cursor)
                .map_err(FifoError::Link)?;
        }
        Ok(())
    }

    fn reset<L: RegisterLink>(&mut self, link: &mut L) -> Result<(), FifoError<L::Error>> {
        link.write32(self.map.reg_cmd_write, 0).map_err(FifoError::Link)?;
        link.write32(self.map.reg_cmd_read, 0).map_err(FifoError::Link)?;
        self.cursor = None;
        Ok(())
    }
}
