//! Hardware description for the Zybo ORB feature-detection accelerator.
//!
//! The accelerator runs FAST corner scoring, orientation assignment and
//! BRIEF descriptor computation entirely in programmable logic. The host
//! only sees a fixed set of memory-mapped BRAM regions and GPIO registers;
//! this crate is the pure-data description of that contract:
//!
//! - [`regions`] — the address map (base, high, access width) of every region
//! - [`frame`] — input frame geometry and the owned grayscale frame buffer
//! - [`pack`] — the 8-pixels-per-64-bit-word packing the frame BRAM expects
//! - [`feature`] — bit-field decoding of the result words written back by
//!   the hardware, including the quadrant/theta orientation table
//!
//! Nothing in here touches a device. The `zybo-driver` crate maps the
//! regions and moves data; everything bit-exact lives here so it can be
//! tested without hardware.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod feature;
pub mod frame;
pub mod pack;
pub mod regions;

pub use feature::{
    orientation, split_position, split_score_angle, FeatureRecord, ScoreAngle,
    DESCRIPTOR_SECTIONS, DESCRIPTOR_WORDS, FEAT_MEM_LINES, MAX_FEATURES, WORDS_PER_SECTION,
};
pub use frame::{Frame, FrameSizeError, FRAME_PIXELS, LINE_SIZE, NUM_LINES};
pub use pack::PixelPacker;
pub use regions::{
    check_no_overlap, Region, RegionDesc, RegionOverlap, WordWidth, CHUNK_CAPACITY, FRAME_WORDS,
    MEM_LINE_SIZE_PIX, MEM_SIZE_PIX,
};
