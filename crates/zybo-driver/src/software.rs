//! Software bus: an in-memory stand-in for the accelerator.
//!
//! Backs every region with plain host memory and emulates the two pieces of
//! hardware behavior the protocol depends on:
//!
//! - a write of 1 to frame-buffer slot 0 is consumed immediately (the slot
//!   reads back 0), as an infinitely fast accelerator would, so the trigger
//!   handshake completes without spinning;
//! - rising edges on the reset line are counted.
//!
//! This is what makes the streaming engine, decoder and orchestrator
//! testable without a board: tests preload result regions through the bus
//! trait and inspect the trigger/reset counters afterwards.

use crate::bus::{ensure_bounds, ensure_width, OrbBus};
use crate::error::Result;
use std::collections::HashMap;
use zybo_chip::{Region, WordWidth};

/// In-memory [`OrbBus`] implementation.
#[derive(Debug)]
pub struct SoftwareBus {
    mem: HashMap<Region, Vec<u8>>,
    triggers: u32,
    reset_edges: u32,
}

impl SoftwareBus {
    /// A bus with every region allocated and zeroed.
    pub fn new() -> Self {
        let mem = Region::ALL
            .iter()
            .map(|&r| (r, vec![0u8; r.descriptor().byte_len()]))
            .collect();
        Self {
            mem,
            triggers: 0,
            reset_edges: 0,
        }
    }

    /// Trigger handshakes consumed so far.
    pub const fn trigger_count(&self) -> u32 {
        self.triggers
    }

    /// Low-to-high transitions seen on the reset line.
    pub const fn reset_edges(&self) -> u32 {
        self.reset_edges
    }

    fn load(&self, region: Region, index: usize, width: usize) -> u64 {
        let bytes = &self.mem[&region][index * width..(index + 1) * width];
        let mut value = [0u8; 8];
        value[..width].copy_from_slice(bytes);
        u64::from_le_bytes(value)
    }

    fn store(&mut self, region: Region, index: usize, width: usize, value: u64) {
        let bytes = self
            .mem
            .get_mut(&region)
            .expect("all regions allocated in new()");
        bytes[index * width..(index + 1) * width].copy_from_slice(&value.to_le_bytes()[..width]);
    }
}

impl Default for SoftwareBus {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbBus for SoftwareBus {
    fn read_u32(&self, region: Region, index: usize) -> Result<u32> {
        ensure_width(region, WordWidth::W32)?;
        ensure_bounds(region, index)?;
        Ok(self.load(region, index, 4) as u32)
    }

    fn write_u32(&mut self, region: Region, index: usize, value: u32) -> Result<()> {
        ensure_width(region, WordWidth::W32)?;
        ensure_bounds(region, index)?;
        self.store(region, index, 4, u64::from(value));
        Ok(())
    }

    fn read_u64(&self, region: Region, index: usize) -> Result<u64> {
        ensure_width(region, WordWidth::W64)?;
        ensure_bounds(region, index)?;
        Ok(self.load(region, index, 8))
    }

    fn write_u64(&mut self, region: Region, index: usize, value: u64) -> Result<()> {
        ensure_width(region, WordWidth::W64)?;
        ensure_bounds(region, index)?;

        // Emulated accelerator: the trigger flag is consumed instantly, and
        // reset rising edges are counted.
        if region == Region::FrameBuffer && index == 0 && value == 1 {
            self.triggers += 1;
            self.store(region, 0, 8, 0);
            return Ok(());
        }
        if region == Region::Reset && index == 0 {
            let previous = self.load(region, 0, 8);
            if previous == 0 && value == 1 {
                self.reset_edges += 1;
            }
        }

        self.store(region, index, 8, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_round_trip_per_region() {
        let mut bus = SoftwareBus::new();
        bus.write_u32(Region::DescriptorPos, 7, 0x1234_5678).unwrap();
        assert_eq!(bus.read_u32(Region::DescriptorPos, 7).unwrap(), 0x1234_5678);
        bus.write_u64(Region::InputStaging, 3, 0xDEAD_BEEF_0BAD_F00D).unwrap();
        assert_eq!(
            bus.read_u64(Region::InputStaging, 3).unwrap(),
            0xDEAD_BEEF_0BAD_F00D
        );
        // Untouched regions stay zero.
        assert_eq!(bus.read_u32(Region::ScoreAngle, 0).unwrap(), 0);
    }

    #[test]
    fn trigger_flag_is_consumed() {
        let mut bus = SoftwareBus::new();
        bus.write_u64(Region::FrameBuffer, 0, 1).unwrap();
        assert_eq!(bus.read_u64(Region::FrameBuffer, 0).unwrap(), 0);
        assert_eq!(bus.trigger_count(), 1);
        // Ordinary data writes do not count as triggers.
        bus.write_u64(Region::FrameBuffer, 1, 1).unwrap();
        assert_eq!(bus.trigger_count(), 1);
    }

    #[test]
    fn reset_edges_are_counted() {
        let mut bus = SoftwareBus::new();
        bus.write_u64(Region::Reset, 0, 0).unwrap();
        bus.write_u64(Region::Reset, 0, 1).unwrap();
        bus.write_u64(Region::Reset, 0, 1).unwrap(); // level, not an edge
        bus.write_u64(Region::Reset, 0, 0).unwrap();
        bus.write_u64(Region::Reset, 0, 1).unwrap();
        assert_eq!(bus.reset_edges(), 2);
    }

    #[test]
    fn width_misuse_is_rejected() {
        let mut bus = SoftwareBus::new();
        assert!(bus.read_u32(Region::FrameBuffer, 0).is_err());
        assert!(bus.write_u64(Region::DescriptorPos, 0, 0).is_err());
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let bus = SoftwareBus::new();
        let words = Region::ScoreAngle.descriptor().words();
        assert!(bus.read_u32(Region::ScoreAngle, words).is_err());
    }
}
