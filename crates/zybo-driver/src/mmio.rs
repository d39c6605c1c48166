//! Volatile memory-mapped access to one accelerator region.
//!
//! Each region is mapped from `/dev/mem` at its physical base address with
//! `O_SYNC`, shared with the hardware. All register traffic goes through
//! `read_volatile`/`write_volatile`: the accelerator mutates these words
//! asynchronously, so the compiler must not reorder, cache, or elide any
//! access.

// MMIO words are naturally aligned by the hardware address map.
#![allow(clippy::cast_ptr_alignment)]

use crate::bus::{ensure_bounds, ensure_width};
use crate::error::{OrbError, Result};
use rustix::fs::OFlags;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsFd;
use std::ptr::NonNull;
use zybo_chip::{Region, RegionDesc, WordWidth};

const MEM_PATH: &str = "/dev/mem";

/// One mapped accelerator region.
///
/// Owns the `/dev/mem` handle and the mapping; `Drop` unmaps. The mapping
/// is shared with any other mapper of the same physical range, which is
/// exactly the hardware handshake contract.
pub struct MappedRegion {
    ptr: NonNull<u8>,
    region: Region,
    desc: RegionDesc,
    _file: File,
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion")
            .field("region", &self.desc.name)
            .field("base", &format_args!("{:#x}", self.desc.base))
            .field("len", &self.desc.byte_len())
            .finish()
    }
}

// SAFETY: Send - MappedRegion owns its mapping exclusively; mmap'd memory is
// process-wide, so moving the owner between threads does not invalidate it.
unsafe impl Send for MappedRegion {}

// SAFETY: Sync - writes require &mut self (exclusive by the borrow checker);
// reads are bounds-checked volatile loads, which are safe concurrently.
unsafe impl Sync for MappedRegion {}

impl MappedRegion {
    /// Map one region from `/dev/mem`.
    ///
    /// # Errors
    ///
    /// Returns [`OrbError::DeviceOpen`] if `/dev/mem` cannot be opened and
    /// [`OrbError::MemoryMap`] (with the errno subcode) if the mapping
    /// fails; on mapping failure the file handle is closed before
    /// returning.
    pub fn map(region: Region) -> Result<Self> {
        let desc = region.descriptor();

        // O_SYNC keeps accesses uncached; register writes must reach the
        // fabric immediately, not on some later flush.
        #[allow(clippy::cast_possible_wrap)]
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlags::SYNC.bits() as i32)
            .open(MEM_PATH)
            .map_err(|e| OrbError::device_open(MEM_PATH, e))?;

        // SAFETY: mmap of a freshly opened /dev/mem fd. Length is the
        // region's declared byte length (positive, word-multiple by the
        // table invariant); offset is the physical base. rustix returns
        // Err on MAP_FAILED, so a failed mapping is never dereferenced and
        // `file` is dropped (closed) on the error path.
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                desc.byte_len(),
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                desc.base as u64,
            )
            .map_err(|errno| OrbError::MemoryMap {
                region: desc.name,
                base: desc.base,
                kind: errno.into(),
            })?
        };
        let ptr =
            NonNull::new(ptr.cast::<u8>()).expect("mmap returns a non-null pointer on success");

        tracing::debug!(
            region = desc.name,
            base = format_args!("{:#x}", desc.base),
            len = desc.byte_len(),
            "mapped region"
        );

        Ok(Self {
            ptr,
            region,
            desc,
            _file: file,
        })
    }

    /// Read a 32-bit word.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch or out-of-bounds index.
    pub fn read_u32(&self, index: usize) -> Result<u32> {
        ensure_width(self.region, WordWidth::W32)?;
        ensure_bounds(self.region, index)?;
        // SAFETY: bounds checked against the mapped length; index * 4 + 4
        // <= byte_len. Volatile load because the hardware writes this word.
        let value = unsafe { self.ptr.as_ptr().add(index * 4).cast::<u32>().read_volatile() };
        tracing::trace!(region = self.desc.name, index, value = format_args!("{value:#x}"), "rd32");
        Ok(value)
    }

    /// Write a 32-bit word.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch or out-of-bounds index.
    pub fn write_u32(&mut self, index: usize, value: u32) -> Result<()> {
        ensure_width(self.region, WordWidth::W32)?;
        ensure_bounds(self.region, index)?;
        tracing::trace!(region = self.desc.name, index, value = format_args!("{value:#x}"), "wr32");
        // SAFETY: bounds checked as in read_u32. Volatile store because the
        // write has hardware side effects.
        unsafe {
            self.ptr
                .as_ptr()
                .add(index * 4)
                .cast::<u32>()
                .write_volatile(value);
        }
        Ok(())
    }

    /// Read a 64-bit word.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch or out-of-bounds index.
    pub fn read_u64(&self, index: usize) -> Result<u64> {
        ensure_width(self.region, WordWidth::W64)?;
        ensure_bounds(self.region, index)?;
        // SAFETY: bounds checked; index * 8 + 8 <= byte_len. Volatile load.
        let value = unsafe { self.ptr.as_ptr().add(index * 8).cast::<u64>().read_volatile() };
        tracing::trace!(region = self.desc.name, index, value = format_args!("{value:#x}"), "rd64");
        Ok(value)
    }

    /// Write a 64-bit word.
    ///
    /// # Errors
    ///
    /// Fails on width mismatch or out-of-bounds index.
    pub fn write_u64(&mut self, index: usize, value: u64) -> Result<()> {
        ensure_width(self.region, WordWidth::W64)?;
        ensure_bounds(self.region, index)?;
        tracing::trace!(region = self.desc.name, index, value = format_args!("{value:#x}"), "wr64");
        // SAFETY: bounds checked as in read_u64. Volatile store.
        unsafe {
            self.ptr
                .as_ptr()
                .add(index * 8)
                .cast::<u64>()
                .write_volatile(value);
        }
        Ok(())
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: ptr/len are exactly what mmap returned in map(); Drop
        // runs at most once and no views outlive self.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.desc.byte_len()) {
                tracing::error!(region = self.desc.name, "munmap failed during drop: {e}");
            }
        }
        tracing::debug!(region = self.desc.name, "unmapped region");
    }
}
