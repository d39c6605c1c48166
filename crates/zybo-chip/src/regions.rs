//! Memory-mapped region map for the ORB accelerator.
//!
//! The addresses below come from the Vivado block design of the accelerator
//! build and must match it exactly — there is no discovery protocol, no
//! version register, and no software-visible error when they drift. Each
//! region is a BRAM or AXI GPIO window exposed to the host over `/dev/mem`.

// ── Frame buffer geometry ────────────────────────────────────────────────────

/// Usable frame-buffer capacity in pixels (slot 0 is the trigger word).
pub const MEM_SIZE_PIX: usize = 65528;

/// Pixels packed into one 64-bit frame-buffer word.
pub const MEM_LINE_SIZE_PIX: usize = 8;

/// Pixel words per streamed chunk (`MEM_SIZE_PIX / MEM_LINE_SIZE_PIX`).
pub const FRAME_WORDS: usize = MEM_SIZE_PIX / MEM_LINE_SIZE_PIX;

/// Cursor value at which a chunk is full and must be handed to the
/// accelerator. Index 0 is reserved for the trigger handshake, so data
/// occupies slots `1..CHUNK_CAPACITY`.
pub const CHUNK_CAPACITY: usize = FRAME_WORDS + 1;

// ── Region table ─────────────────────────────────────────────────────────────

/// Access width of a mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordWidth {
    /// 32-bit word access (result BRAMs).
    W32,
    /// 64-bit word access (pixel buffers and GPIO registers).
    W64,
}

impl WordWidth {
    /// Width in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }
}

/// Static description of one memory-mapped region.
#[derive(Debug, Clone, Copy)]
pub struct RegionDesc {
    /// Region name, used in logs and errors.
    pub name: &'static str,
    /// Physical base address.
    pub base: usize,
    /// Last byte address of the region (inclusive).
    pub addr_high: usize,
    /// Access width the hardware expects.
    pub width: WordWidth,
}

impl RegionDesc {
    /// Mapped length in bytes.
    pub const fn byte_len(&self) -> usize {
        self.addr_high + 1 - self.base
    }

    /// Number of addressable words.
    pub const fn words(&self) -> usize {
        self.byte_len() / self.width.bytes()
    }
}

/// Every memory-mapped region the accelerator exposes.
///
/// Discriminant order is the mapping order at session open and the index
/// into the driver's region table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Pixel BRAM; slot 0 doubles as the trigger/busy flag.
    FrameBuffer,
    /// DRAM-side staging buffer mirroring the pixel words.
    InputStaging,
    /// DRAM-side result staging buffer (burst path only).
    OutputStaging,
    /// BRIEF descriptor bits, section 0 (low 128 bits).
    DescriptorBits0,
    /// BRIEF descriptor bits, section 1 (high 128 bits).
    DescriptorBits1,
    /// Packed (row, col) per feature slot; 0 terminates the result list.
    DescriptorPos,
    /// Packed score / angle / theta / quadrant / scale per feature slot.
    ScoreAngle,
    /// Edge-triggered reset GPIO.
    Reset,
    /// FAST corner thresholds: slot 0 positive, slot 1 negative.
    CornerThresh,
}

impl Region {
    /// All regions in mapping order.
    pub const ALL: [Region; 9] = [
        Region::FrameBuffer,
        Region::InputStaging,
        Region::OutputStaging,
        Region::DescriptorBits0,
        Region::DescriptorBits1,
        Region::DescriptorPos,
        Region::ScoreAngle,
        Region::Reset,
        Region::CornerThresh,
    ];

    /// Static descriptor for this region.
    pub const fn descriptor(self) -> RegionDesc {
        match self {
            Region::FrameBuffer => RegionDesc {
                name: "frame-buffer",
                base: 0x4200_0000,
                addr_high: 0x4200_FFFF,
                width: WordWidth::W64,
            },
            Region::InputStaging => RegionDesc {
                name: "input-staging",
                base: 0x2001_0000,
                addr_high: 0x2001_FFFF,
                width: WordWidth::W64,
            },
            Region::OutputStaging => RegionDesc {
                name: "output-staging",
                base: 0x3001_0000,
                addr_high: 0x3001_FFFF,
                width: WordWidth::W64,
            },
            Region::DescriptorBits0 => RegionDesc {
                name: "descriptor-bits0",
                base: 0x4600_0000,
                addr_high: 0x4600_1FFF,
                width: WordWidth::W32,
            },
            Region::DescriptorBits1 => RegionDesc {
                name: "descriptor-bits1",
                base: 0x4400_0000,
                addr_high: 0x4400_1FFF,
                width: WordWidth::W32,
            },
            Region::DescriptorPos => RegionDesc {
                name: "descriptor-pos",
                base: 0x4800_0000,
                addr_high: 0x4800_1FFF,
                width: WordWidth::W32,
            },
            Region::ScoreAngle => RegionDesc {
                name: "score-angle",
                base: 0x4000_0000,
                addr_high: 0x4000_7FFF,
                width: WordWidth::W32,
            },
            Region::Reset => RegionDesc {
                name: "reset",
                base: 0x4122_0000,
                addr_high: 0x4122_FFFF,
                width: WordWidth::W64,
            },
            Region::CornerThresh => RegionDesc {
                name: "corner-thresh",
                base: 0x4123_0000,
                addr_high: 0x4123_FFFF,
                width: WordWidth::W64,
            },
        }
    }

    /// Descriptor-bits region holding the given 128-bit section.
    ///
    /// The hardware splits each 256-bit BRIEF descriptor across two BRAMs;
    /// section 1 holds the high half and is read out first.
    pub const fn descriptor_bits(section: usize) -> Region {
        if section == 1 {
            Region::DescriptorBits1
        } else {
            Region::DescriptorBits0
        }
    }
}

/// Two declared regions overlap in physical address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("memory-mapped regions {a} and {b} overlap")]
pub struct RegionOverlap {
    /// First region name.
    pub a: &'static str,
    /// Second region name.
    pub b: &'static str,
}

/// Verify that no two declared regions intersect.
///
/// The table is hand-maintained against the hardware build; a bad edit
/// would otherwise alias two BRAMs silently. Run at session open.
///
/// # Errors
///
/// Returns the first overlapping pair found.
pub fn check_no_overlap() -> Result<(), RegionOverlap> {
    for (i, a) in Region::ALL.iter().enumerate() {
        for b in &Region::ALL[i + 1..] {
            let (da, db) = (a.descriptor(), b.descriptor());
            if da.base <= db.addr_high && db.base <= da.addr_high {
                return Err(RegionOverlap {
                    a: da.name,
                    b: db.name,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_regions_do_not_overlap() {
        check_no_overlap().expect("region table must be disjoint");
    }

    #[test]
    fn region_lengths_are_word_multiples() {
        for region in Region::ALL {
            let d = region.descriptor();
            assert!(d.byte_len() > 0, "{} is empty", d.name);
            assert_eq!(
                d.byte_len() % d.width.bytes(),
                0,
                "{} length is not a multiple of its word width",
                d.name
            );
        }
    }

    #[test]
    fn frame_buffer_capacity() {
        assert_eq!(FRAME_WORDS, 8191);
        assert_eq!(CHUNK_CAPACITY, 8192);
        // The chunk (plus trigger slot 0) must fit in the mapped window.
        assert!(CHUNK_CAPACITY <= Region::FrameBuffer.descriptor().words());
    }

    #[test]
    fn descriptor_bits_section_lookup() {
        assert_eq!(Region::descriptor_bits(0), Region::DescriptorBits0);
        assert_eq!(Region::descriptor_bits(1), Region::DescriptorBits1);
    }
}
