//! The owned device session over all accelerator regions.

use crate::bus::OrbBus;
use crate::error::Result;
use crate::mmio::MappedRegion;
use zybo_chip::{check_no_overlap, Region};

/// One open session against the accelerator: every region of the static
/// table mapped and owned in a single value.
///
/// The session is the only hardware handle in the driver; components borrow
/// it through [`OrbBus`], so nothing touches device memory behind its back
/// and tests can substitute [`crate::SoftwareBus`]. Dropping the session
/// unmaps every region and closes the `/dev/mem` handles.
#[derive(Debug)]
pub struct DeviceSession {
    // Indexed by Region discriminant, in Region::ALL order.
    regions: Vec<MappedRegion>,
}

impl DeviceSession {
    /// Validate the region table and map every region.
    ///
    /// # Errors
    ///
    /// Fails fast on a region-table overlap, on `/dev/mem` open failure,
    /// or on any single mapping failure; there is no partially opened
    /// session (already-mapped regions are unmapped on the error path by
    /// normal drop order).
    pub fn open() -> Result<Self> {
        check_no_overlap()?;

        let mut regions = Vec::with_capacity(Region::ALL.len());
        for region in Region::ALL {
            regions.push(MappedRegion::map(region)?);
        }

        tracing::info!("device session open ({} regions mapped)", regions.len());
        Ok(Self { regions })
    }

    fn region(&self, region: Region) -> &MappedRegion {
        &self.regions[region as usize]
    }

    fn region_mut(&mut self, region: Region) -> &mut MappedRegion {
        &mut self.regions[region as usize]
    }
}

impl OrbBus for DeviceSession {
    fn read_u32(&self, region: Region, index: usize) -> Result<u32> {
        self.region(region).read_u32(index)
    }

    fn write_u32(&mut self, region: Region, index: usize, value: u32) -> Result<()> {
        self.region_mut(region).write_u32(index, value)
    }

    fn read_u64(&self, region: Region, index: usize) -> Result<u64> {
        self.region(region).read_u64(index)
    }

    fn write_u64(&mut self, region: Region, index: usize, value: u64) -> Result<()> {
        self.region_mut(region).write_u64(index, value)
    }
}
