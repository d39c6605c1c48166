//! Host driver for the Zybo ORB feature-detection accelerator.
//!
//! The accelerator computes FAST corners and rotated BRIEF descriptors
//! entirely in programmable logic; this crate is the host side of that
//! contract. It maps the fixed set of BRAM/GPIO regions from `/dev/mem`,
//! streams a 480x640 grayscale frame into the pixel buffer eight packed
//! pixels per 64-bit word, drives the write-1/poll-until-0 trigger
//! handshake per chunk, and decodes the result slots written back by the
//! fabric.
//!
//! Hardware access goes through the [`OrbBus`] trait with two
//! implementations: [`DeviceSession`] over real mapped memory, and
//! [`SoftwareBus`], an in-memory accelerator stand-in used by the tests.
//!
//! # Quick start
//!
//! ```no_run
//! use zybo_chip::Frame;
//! use zybo_driver::{DeviceSession, EngineConfig, OrbEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = DeviceSession::open()?;
//! let mut engine = OrbEngine::new(session, EngineConfig::default());
//!
//! let report = engine.process(&Frame::solid(128))?;
//! for feature in &report.features {
//!     println!("{feature}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)] // timing/width fields narrow intentionally

mod bus;
mod decode;
mod engine;
mod error;
pub mod mmio;
mod session;
mod software;
mod stream;

pub use bus::OrbBus;
pub use decode::read_features;
pub use engine::{EngineConfig, FrameReport, OrbEngine};
pub use error::{MapErrorKind, OrbError, Result};
pub use session::DeviceSession;
pub use software::SoftwareBus;
pub use stream::{
    stream_frame, PollMode, StreamReport, CHUNK_SETTLE, DEFAULT_POLL_TIMEOUT, DRAIN_INTERVAL,
};
