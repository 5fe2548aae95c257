//! Register-level controller simulator for host tests
//!
//! Models the command ring with a hardware read pointer that the simulated
//! co-processor advances to the published write pointer, the FT810
//! streaming registers, and plain registers for touch and sound. A stalled
//! simulator stops draining so flow-control waits can be exercised.

use core::convert::Infallible;
use core::ops::Range;
use std::collections::HashMap;
use std::vec::Vec;

use evetouch_protocol::registers::{ft810, CMD_FIFO_MASK, CMD_FIFO_SIZE, DEVICE_ID, TOUCH_XY_NOT_TOUCHING};
use evetouch_protocol::{ChipModel, MemoryMap};

use crate::link::{Payload, RegisterLink};

pub struct SimulatedEve {
    chip: ChipModel,
    map: &'static MemoryMap,
    ring: Vec<u8>,
    regs: HashMap<u32, u32>,
    log: Vec<(u32, u32)>,
    consumed: Vec<u8>,
    stalled: bool,
    bulk_writes: usize,
}

impl SimulatedEve {
    pub fn new(chip: ChipModel) -> Self {
        let map = chip.map();
        let mut regs = HashMap::new();
        regs.insert(map.reg_id, DEVICE_ID as u32);
        regs.insert(map.reg_touch_direct_xy, TOUCH_XY_NOT_TOUCHING);
        Self {
            chip,
            map,
            ring: vec![0; CMD_FIFO_SIZE as usize],
            regs,
            log: Vec::new(),
            consumed: Vec::new(),
            stalled: false,
            bulk_writes: 0,
        }
    }

    /// Stop the co-processor from draining the ring
    pub fn stall(&mut self) {
        self.stalled = true;
    }

    /// Let the co-processor catch up with everything published
    pub fn resume(&mut self) {
        self.stalled = false;
        self.drain();
    }

    pub fn set_write_pointer(&mut self, value: u32) {
        self.regs.insert(self.map.reg_cmd_write, value);
    }

    pub fn set_read_pointer(&mut self, value: u32) {
        self.regs.insert(self.map.reg_cmd_read, value);
    }

    /// Raw register value, without side effects
    pub fn register(&self, addr: u32) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    pub fn set_register(&mut self, addr: u32, value: u32) {
        self.regs.insert(addr, value);
    }

    pub fn set_touch_tag(&mut self, tag: u8) {
        self.regs.insert(self.map.reg_touch_tag, tag as u32);
    }

    pub fn set_touching(&mut self, touching: bool) {
        let xy = if touching { 0x0064_0032 } else { TOUCH_XY_NOT_TOUCHING };
        self.regs.insert(self.map.reg_touch_direct_xy, xy);
    }

    /// Mark the current sound sample as finished
    pub fn finish_sound(&mut self) {
        self.regs.insert(self.map.reg_play, 0);
    }

    /// Bytes the co-processor has consumed, in order
    pub fn consumed(&self) -> &[u8] {
        &self.consumed
    }

    /// Consumed bytes as little-endian words
    pub fn consumed_words(&self) -> Vec<u32> {
        self.consumed
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect()
    }

    pub fn clear_consumed(&mut self) {
        self.consumed.clear();
    }

    pub fn ring(&self) -> &[u8] {
        &self.ring
    }

    pub fn bulk_writes(&self) -> usize {
        self.bulk_writes
    }

    /// Every value written to `addr` through single-register writes
    pub fn writes_to(&self, addr: u32) -> Vec<u32> {
        self.log
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    fn drain(&mut self) {
        if self.stalled {
            return;
        }
        let write = self.register(self.map.reg_cmd_write) & CMD_FIFO_MASK;
        let mut read = self.register(self.map.reg_cmd_read) & CMD_FIFO_MASK;
        while read != write {
            self.consumed.push(self.ring[read as usize]);
            read = (read + 1) & CMD_FIFO_MASK;
        }
        self.regs.insert(self.map.reg_cmd_read, read);
    }

    fn stream_space(&self) -> u32 {
        let write = self.register(self.map.reg_cmd_write);
        let read = self.register(self.map.reg_cmd_read);
        (CMD_FIFO_SIZE - 4) - (write.wrapping_sub(read) & CMD_FIFO_MASK)
    }

    fn read_register(&mut self, addr: u32) -> u32 {
        if addr == self.map.reg_cmd_read {
            self.drain();
        }
        if self.chip == ChipModel::Ft810 && addr == ft810::REG_CMDB_SPACE {
            self.drain();
            return self.stream_space();
        }
        self.register(addr)
    }

    fn write_register(&mut self, addr: u32, value: u32) {
        self.log.push((addr, value));
        self.regs.insert(addr, value);
        if addr == self.map.reg_cmd_write {
            self.drain();
        }
    }
}

impl RegisterLink for SimulatedEve {
    type Error = Infallible;

    fn read8(&mut self, addr: u32) -> Result<u8, Infallible> {
        Ok(self.read_register(addr) as u8)
    }

    fn read16(&mut self, addr: u32) -> Result<u16, Infallible> {
        Ok(self.read_register(addr) as u16)
    }

    fn read32(&mut self, addr: u32) -> Result<u32, Infallible> {
        Ok(self.read_register(addr))
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Infallible> {
        self.write_register(addr, value as u32);
        Ok(())
    }

    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Infallible> {
        self.write_register(addr, value as u32);
        Ok(())
    }

    fn write32(&mut self, addr: u32, value: u32) -> Result<(), Infallible> {
        self.write_register(addr, value);
        Ok(())
    }

    fn write_bulk<P: Payload + ?Sized>(
        &mut self,
        addr: u32,
        payload: &P,
        range: Range<usize>,
        padding: usize,
    ) -> Result<(), Infallible> {
        self.bulk_writes += 1;
        let mut bytes = vec![0u8; range.len() + padding];
        payload.copy_to(range.start, &mut bytes[..range.len()]);

        if self.chip == ChipModel::Ft810 && addr == ft810::REG_CMDB_WRITE {
            let mut write = self.register(self.map.reg_cmd_write) & CMD_FIFO_MASK;
            for b in bytes {
                self.ring[write as usize] = b;
                write = (write + 1) & CMD_FIFO_MASK;
            }
            self.regs.insert(self.map.reg_cmd_write, write);
            self.drain();
        } else if (self.map.ram_cmd..self.map.ram_cmd + CMD_FIFO_SIZE).contains(&addr) {
            let offset = (addr - self.map.ram_cmd) as usize;
            assert!(
                offset + bytes.len() <= CMD_FIFO_SIZE as usize,
                "bulk write crosses the ring boundary"
            );
            self.ring[offset..offset + bytes.len()].copy_from_slice(&bytes);
        }
        Ok(())
    }
}
