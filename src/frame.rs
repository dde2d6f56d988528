//! Decoded image frames.
//!
//! A `Frame` is one decoded RGB8 image, produced by an `ImageSource` and
//! consumed by a `Detector` within a single sampling cycle. Frames are not
//! retained across cycles and are never written back to disk.

/// One decoded RGB8 image.
///
/// Pixel data is row-major, three bytes per pixel, no padding between rows.
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB8 bytes, `width * height * 3` long for a well-formed frame.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}
