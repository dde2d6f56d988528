//! Still-image frame source.
//!
//! Re-reads an image file on every acquisition so an external process may
//! overwrite the file between samples (a webcam snapshot job, for example).
//! Decoded frames stay in memory and are never written back to disk.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::GenericImageView;

use super::ImageSource;
use crate::frame::Frame;

/// Frame source backed by a single image file on disk.
pub struct StillImageSource {
    path: PathBuf,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for StillImageSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn acquire(&mut self) -> Result<Frame> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("failed to read image {}", self.path.display()))?;
        let decoded = image::load_from_memory(&bytes)
            .with_context(|| format!("failed to decode image {}", self.path.display()))?;
        let (width, height) = decoded.dimensions();
        Ok(Frame::new(decoded.into_rgb8().into_raw(), width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_source_decodes_image_into_rgb_frame() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lot.png");
        image::RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30])).save(&path)?;

        let mut source = StillImageSource::new(&path);
        let frame = source.acquire()?;
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.pixels().len(), 4 * 3 * 3);
        assert_eq!(&frame.pixels()[..3], &[10, 20, 30]);

        Ok(())
    }

    #[test]
    fn still_source_picks_up_replaced_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lot.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0])).save(&path)?;

        let mut source = StillImageSource::new(&path);
        source.acquire()?;

        image::RgbImage::from_pixel(5, 4, image::Rgb([1, 2, 3])).save(&path)?;
        let frame = source.acquire()?;
        assert_eq!(frame.width(), 5);
        assert_eq!(frame.height(), 4);

        Ok(())
    }

    #[test]
    fn still_source_reports_missing_file() {
        let mut source = StillImageSource::new("/nonexistent/lot.jpg");
        let err = source.acquire().err().unwrap();
        assert!(err.to_string().contains("failed to read image"));
    }
}
