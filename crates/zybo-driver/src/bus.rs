//! Bus abstraction over the accelerator's memory-mapped regions.
//!
//! Everything above the device access layer (streaming, decoding, the
//! orchestrator) talks to this trait instead of raw pointers, so the same
//! code runs against real hardware ([`crate::DeviceSession`]) and the
//! in-memory simulator ([`crate::SoftwareBus`]).

use crate::error::{OrbError, Result};
use zybo_chip::{Region, WordWidth};

/// Word-indexed read/write access to the accelerator regions.
///
/// Indices are in words of the region's declared width, not bytes; using
/// the wrong width accessor for a region is an [`OrbError::AccessWidth`]
/// error in every implementation.
pub trait OrbBus {
    /// Read a 32-bit word from a result region.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch, out-of-bounds index, or bus failure.
    fn read_u32(&self, region: Region, index: usize) -> Result<u32>;

    /// Write a 32-bit word to a result region.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch, out-of-bounds index, or bus failure.
    fn write_u32(&mut self, region: Region, index: usize, value: u32) -> Result<()>;

    /// Read a 64-bit word from a buffer or GPIO region.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch, out-of-bounds index, or bus failure.
    fn read_u64(&self, region: Region, index: usize) -> Result<u64>;

    /// Write a 64-bit word to a buffer or GPIO region.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch, out-of-bounds index, or bus failure.
    fn write_u64(&mut self, region: Region, index: usize, value: u64) -> Result<()>;
}

/// Reject accesses that do not match the region's declared word width.
pub(crate) fn ensure_width(region: Region, want: WordWidth) -> Result<()> {
    let desc = region.descriptor();
    if desc.width == want {
        Ok(())
    } else {
        Err(OrbError::AccessWidth {
            region: desc.name,
            expected: desc.width.bytes() as u32 * 8,
            got: want.bytes() as u32 * 8,
        })
    }
}

/// Reject word indices outside the region's mapped window.
pub(crate) fn ensure_bounds(region: Region, index: usize) -> Result<()> {
    let desc = region.descriptor();
    if index < desc.words() {
        Ok(())
    } else {
        Err(OrbError::OutOfBounds {
            region: desc.name,
            index,
            words: desc.words(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_checks() {
        assert!(ensure_width(Region::FrameBuffer, WordWidth::W64).is_ok());
        assert!(matches!(
            ensure_width(Region::FrameBuffer, WordWidth::W32),
            Err(OrbError::AccessWidth {
                expected: 64,
                got: 32,
                ..
            })
        ));
        assert!(ensure_width(Region::DescriptorPos, WordWidth::W32).is_ok());
        assert!(ensure_width(Region::DescriptorPos, WordWidth::W64).is_err());
    }

    #[test]
    fn bounds_checks() {
        let words = Region::DescriptorPos.descriptor().words();
        assert!(ensure_bounds(Region::DescriptorPos, words - 1).is_ok());
        assert!(matches!(
            ensure_bounds(Region::DescriptorPos, words),
            Err(OrbError::OutOfBounds { .. })
        ));
    }
}
