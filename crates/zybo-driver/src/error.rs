//! Error types for driver operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use zybo_chip::{FrameSizeError, RegionOverlap};

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, OrbError>;

/// OS error subcode of a failed region mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapErrorKind {
    /// EACCES — caller lacks access to physical memory.
    PermissionDenied,
    /// EBADF — descriptor was invalid at map time.
    BadDescriptor,
    /// EINVAL — bad length, offset or flags.
    InvalidArgument,
    /// ENODEV — the target does not support mapping.
    NoSuchDevice,
    /// ENXIO — the address range is not backed by the device.
    DeviceNotConfigured,
    /// EOVERFLOW — the range exceeds the addressable offset.
    RangeOverflow,
    /// Any other errno.
    Other(i32),
}

impl From<rustix::io::Errno> for MapErrorKind {
    fn from(errno: rustix::io::Errno) -> Self {
        use rustix::io::Errno;
        match errno {
            Errno::ACCESS => Self::PermissionDenied,
            Errno::BADF => Self::BadDescriptor,
            Errno::INVAL => Self::InvalidArgument,
            Errno::NODEV => Self::NoSuchDevice,
            Errno::NXIO => Self::DeviceNotConfigured,
            Errno::OVERFLOW => Self::RangeOverflow,
            other => Self::Other(other.raw_os_error()),
        }
    }
}

impl fmt::Display for MapErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied (EACCES)"),
            Self::BadDescriptor => write!(f, "bad descriptor (EBADF)"),
            Self::InvalidArgument => write!(f, "invalid argument (EINVAL)"),
            Self::NoSuchDevice => write!(f, "no such device (ENODEV)"),
            Self::DeviceNotConfigured => write!(f, "device not configured (ENXIO)"),
            Self::RangeOverflow => write!(f, "range overflow (EOVERFLOW)"),
            Self::Other(errno) => write!(f, "errno {errno}"),
        }
    }
}

/// Errors that can occur while driving the accelerator.
#[derive(Debug, Error)]
pub enum OrbError {
    /// The privileged physical-memory target could not be opened.
    #[error("cannot open {path}: {source}")]
    DeviceOpen {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Mapping one region into process memory failed.
    #[error("cannot map {region} at {base:#x}: {kind}")]
    MemoryMap {
        /// Region name from the static table.
        region: &'static str,
        /// Physical base address of the region.
        base: usize,
        /// OS error subcode.
        kind: MapErrorKind,
    },

    /// The static region table declares intersecting address ranges.
    #[error(transparent)]
    RegionOverlap(#[from] RegionOverlap),

    /// A region was accessed with the wrong word width.
    #[error("{region} is a {expected}-bit region, accessed as {got}-bit")]
    AccessWidth {
        /// Region name.
        region: &'static str,
        /// Declared width in bits.
        expected: u32,
        /// Width of the attempted access in bits.
        got: u32,
    },

    /// A word index fell outside a region's mapped window.
    #[error("index {index} out of bounds for {region} ({words} words)")]
    OutOfBounds {
        /// Region name.
        region: &'static str,
        /// Rejected word index.
        index: usize,
        /// Words the region holds.
        words: usize,
    },

    /// The accelerator never cleared the trigger flag.
    #[error("accelerator did not clear the trigger flag within {timeout_ms} ms")]
    ProtocolHang {
        /// Poll bound that expired, in milliseconds.
        timeout_ms: u64,
    },

    /// The input frame has the wrong geometry.
    #[error(transparent)]
    Frame(#[from] FrameSizeError),
}

impl OrbError {
    /// Build a [`OrbError::DeviceOpen`].
    pub fn device_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DeviceOpen {
            path: path.into(),
            source,
        }
    }
}
