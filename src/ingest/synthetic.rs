//! Synthetic frame source for `stub://` paths.

use anyhow::Result;

use super::ImageSource;
use crate::frame::Frame;

const SYNTHETIC_WIDTH: u32 = 640;
const SYNTHETIC_HEIGHT: u32 = 480;

/// Deterministic in-memory source used for tests and dry runs.
///
/// Produces a fixed-size pattern that varies per frame, with an occasional
/// "scene change" so downstream code sees non-identical input over time.
pub struct SyntheticSource {
    path: String,
    frame_count: u64,
    /// Simulated scene state, bumped every 50th frame.
    scene_state: u8,
}

impl SyntheticSource {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        log::info!("SyntheticSource: serving {} (synthetic)", path);
        Self {
            path,
            frame_count: 0,
            scene_state: 0,
        }
    }

    fn generate_synthetic_pixels(&mut self) -> Vec<u8> {
        let pixel_count = (SYNTHETIC_WIDTH * SYNTHETIC_HEIGHT * 3) as usize;

        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }

        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count + self.scene_state as u64) % 256) as u8;
        }

        pixels
    }
}

impl ImageSource for SyntheticSource {
    fn describe(&self) -> String {
        format!("{} (synthetic)", self.path)
    }

    fn acquire(&mut self) -> Result<Frame> {
        self.frame_count += 1;
        let pixels = self.generate_synthetic_pixels();
        Ok(Frame::new(pixels, SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT))
    }
}
