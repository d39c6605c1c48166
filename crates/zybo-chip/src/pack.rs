//! Pixel-to-word packing for the frame BRAM.
//!
//! The frame buffer is 64 bits wide and holds 8 pixels per word, pixel `n`
//! of a word at bit offset `8 * n` (first pixel in the least significant
//! byte). A wrong bit offset here corrupts every corner the hardware finds
//! without any software-visible error, so the packing is kept as a tiny
//! pure state machine and property-tested.

use crate::regions::MEM_LINE_SIZE_PIX;

/// Accumulates pixels into 64-bit frame-buffer words.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelPacker {
    word: u64,
    pos: u32,
}

impl PixelPacker {
    /// Fresh packer with an empty accumulator.
    pub const fn new() -> Self {
        Self { word: 0, pos: 0 }
    }

    /// Add one pixel; returns the completed word every eighth call.
    pub fn push(&mut self, pix: u8) -> Option<u64> {
        self.word |= u64::from(pix) << (8 * self.pos);
        if self.pos < MEM_LINE_SIZE_PIX as u32 - 1 {
            self.pos += 1;
            None
        } else {
            let word = self.word;
            self.word = 0;
            self.pos = 0;
            Some(word)
        }
    }

    /// True when no partial word is pending.
    pub const fn is_empty(&self) -> bool {
        self.pos == 0 && self.word == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn emits_on_every_eighth_pixel() {
        let mut packer = PixelPacker::new();
        for i in 0..7 {
            assert_eq!(packer.push(i), None);
            assert!(!packer.is_empty());
        }
        let word = packer.push(7).expect("eighth pixel completes the word");
        assert_eq!(word, 0x0706_0504_0302_0100);
        assert!(packer.is_empty());
    }

    #[test]
    fn accumulator_clears_between_words() {
        let mut packer = PixelPacker::new();
        for _ in 0..7 {
            packer.push(0xFF);
        }
        assert_eq!(packer.push(0xFF), Some(u64::MAX));
        for _ in 0..7 {
            packer.push(0);
        }
        assert_eq!(packer.push(0), Some(0));
    }

    proptest! {
        #[test]
        fn packing_round_trips(bytes in prop::array::uniform8(any::<u8>())) {
            let mut packer = PixelPacker::new();
            let mut word = None;
            for &b in &bytes {
                word = packer.push(b);
            }
            let word = word.expect("eight pushes complete one word");
            for (i, &b) in bytes.iter().enumerate() {
                prop_assert_eq!(((word >> (8 * i)) & 0xFF) as u8, b);
            }
        }
    }
}
