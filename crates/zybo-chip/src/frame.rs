//! Input frame geometry and the owned grayscale frame.

use thiserror::Error;

/// Pixels per line the accelerator build is synthesized for.
pub const LINE_SIZE: usize = 640;

/// Lines per frame.
pub const NUM_LINES: usize = 480;

/// Total pixels per frame.
pub const FRAME_PIXELS: usize = LINE_SIZE * NUM_LINES;

/// The input buffer does not hold a full 640x480 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame must be {NUM_LINES}x{LINE_SIZE} grayscale ({FRAME_PIXELS} bytes), got {got} bytes")]
pub struct FrameSizeError {
    /// Length of the rejected buffer.
    pub got: usize,
}

/// One 8-bit grayscale frame in row-major order.
///
/// The streaming engine walks this row by row, so the layout matches what
/// the hardware sees; no stride or padding is allowed.
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: Vec<u8>,
}

impl Frame {
    /// Wrap a row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// Fails unless the buffer is exactly [`FRAME_PIXELS`] bytes.
    pub fn from_raw(pixels: Vec<u8>) -> Result<Self, FrameSizeError> {
        if pixels.len() == FRAME_PIXELS {
            Ok(Self { pixels })
        } else {
            Err(FrameSizeError { got: pixels.len() })
        }
    }

    /// A frame filled with a single gray value.
    pub fn solid(value: u8) -> Self {
        Self {
            pixels: vec![value; FRAME_PIXELS],
        }
    }

    /// Pixel at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= NUM_LINES` or `col >= LINE_SIZE`.
    pub fn pixel(&self, row: usize, col: usize) -> u8 {
        assert!(row < NUM_LINES && col < LINE_SIZE, "pixel out of frame");
        self.pixels[row * LINE_SIZE + col]
    }

    /// Raw row-major bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = Frame::from_raw(vec![0; 100]).unwrap_err();
        assert_eq!(err.got, 100);
        assert!(Frame::from_raw(vec![0; FRAME_PIXELS]).is_ok());
    }

    #[test]
    fn pixel_addressing_is_row_major() {
        let mut raw = vec![0u8; FRAME_PIXELS];
        raw[3 * LINE_SIZE + 17] = 0xAB;
        let frame = Frame::from_raw(raw).unwrap();
        assert_eq!(frame.pixel(3, 17), 0xAB);
        assert_eq!(frame.pixel(0, 0), 0);
    }
}
