//! Result-word bit fields and the decoded feature record.
//!
//! The hardware writes each detected feature into a fixed slot across four
//! result BRAMs: a packed position word, a packed score/angle word, and two
//! 128-bit descriptor sections. The field layouts here must match the RTL
//! bit for bit.

// Field extraction casts truncate by construction: every mask narrows the
// word to the target width first.
#![allow(clippy::cast_possible_truncation)]

use std::fmt;

/// Feature slots per result BRAM (the last slot is never written).
pub const FEAT_MEM_LINES: usize = 512;

/// Maximum decodable features per frame.
pub const MAX_FEATURES: usize = FEAT_MEM_LINES - 1;

/// Number of 128-bit descriptor sections.
pub const DESCRIPTOR_SECTIONS: usize = 2;

/// 32-bit words per descriptor section.
pub const WORDS_PER_SECTION: usize = 4;

/// 32-bit words per full 256-bit descriptor.
pub const DESCRIPTOR_WORDS: usize = DESCRIPTOR_SECTIONS * WORDS_PER_SECTION;

/// Split a position word into `(row, col)`.
///
/// Returns `None` for the all-zero end-of-data sentinel. A feature
/// legitimately at (0, 0) encodes to the same word and is therefore
/// indistinguishable from the terminator; the hardware interface offers no
/// valid-count register to disambiguate.
pub fn split_position(word: u32) -> Option<(u16, u16)> {
    if word == 0 {
        return None;
    }
    let row = ((word & 0xFFFF_0000) >> 16) as u16;
    let col = (word & 0x0000_FFFF) as u16;
    Some((row, col))
}

/// Fields of the packed score/angle word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAngle {
    /// FAST corner score, 12 bits.
    pub score: u16,
    /// Raw 16-bit angle word (theta and quadrant live in its low bits).
    pub angle: u16,
    /// Angle step within the quadrant, 2 bits.
    pub theta: u8,
    /// Orientation quadrant, 2 bits.
    pub quadrant: u8,
    /// Pyramid scale, 2 bits.
    pub scale: u8,
}

/// Split a score/angle word into its packed fields.
pub fn split_score_angle(word: u32) -> ScoreAngle {
    ScoreAngle {
        score: ((word & 0x0FFF_0000) >> 16) as u16,
        angle: (word & 0x0000_FFFF) as u16,
        theta: (word & 0x0000_0003) as u8,
        quadrant: ((word & 0x0000_000C) >> 2) as u8,
        scale: ((word & 0xC000_0000) >> 30) as u8,
    }
}

/// Resolve the hardware's (quadrant, theta) encoding to degrees.
///
/// The degree term is computed in integer arithmetic with truncating
/// division, matching the accelerator's host contract: theta 0..3 maps to
/// -11, 11, 34, 56 degrees before the quadrant transform. Quadrant values
/// outside 0..3 cannot occur in the 2-bit field; the fallthrough arm keeps
/// the function total.
#[allow(clippy::cast_precision_loss)]
pub fn orientation(quadrant: u8, theta: u8) -> f32 {
    let (offset, invert) = match quadrant {
        1 => (180.0_f32, -1.0_f32),
        2 => (180.0, 1.0),
        3 => (360.0, -1.0),
        _ => (0.0, 1.0),
    };
    let degree = (i32::from(theta) * 90) / 4 - (90 / 4) / 2;
    degree as f32 * invert + offset
}

/// One decoded feature, valid until the next frame clears the result BRAMs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Pixel row of the corner.
    pub row: u16,
    /// Pixel column of the corner.
    pub col: u16,
    /// FAST corner score (12 significant bits).
    pub score: u16,
    /// Raw angle word as written by the hardware.
    pub angle: u16,
    /// Orientation quadrant (2 bits).
    pub quadrant: u8,
    /// Angle step within the quadrant (2 bits).
    pub theta: u8,
    /// Pyramid scale (2 bits).
    pub scale: u8,
    /// Orientation in degrees, derived from quadrant and theta.
    pub orientation: f32,
    /// 256-bit BRIEF descriptor in hardware read-back order:
    /// section 1 components 3..0, then section 0 components 3..0.
    pub descriptor: [u32; DESCRIPTOR_WORDS],
}

impl FeatureRecord {
    /// Descriptor as 8 zero-padded hex groups, section 1 first.
    pub fn descriptor_hex(&self) -> String {
        self.descriptor.iter().map(|w| format!("{w:08x}")).collect()
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}) score:{} orientation:{}\u{b0} quadrant: {} theta: {} scale: {}",
            self.row, self.col, self.score, self.orientation, self.quadrant, self.theta, self.scale
        )
    }
}
