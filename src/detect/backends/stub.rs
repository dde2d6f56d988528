use anyhow::Result;

use crate::detect::detector::Detector;
use crate::detect::result::Detection;
use crate::frame::Frame;

/// Stub detector for tests and dry runs. Returns a fixed detection list.
pub struct StubDetector {
    detections: Vec<Detection>,
}

impl StubDetector {
    /// A stub that detects nothing.
    pub fn new() -> Self {
        Self {
            detections: Vec::new(),
        }
    }

    /// A stub that reports the given detections for every frame.
    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::BoundingBox;

    #[test]
    fn stub_detector_replays_canned_detections() -> Result<()> {
        let canned = vec![Detection::new(
            BoundingBox::new(10.0, 20.0, 50.0, 80.0),
            0.9,
            2,
        )];
        let mut detector = StubDetector::with_detections(canned.clone());

        let frame = Frame::new(vec![0u8; 8 * 8 * 3], 8, 8);
        let detections = detector.detect(&frame)?;
        assert_eq!(detections, canned);

        // Output does not decay across calls.
        let detections = detector.detect(&frame)?;
        assert_eq!(detections.len(), 1);

        Ok(())
    }

    #[test]
    fn default_stub_detects_nothing() -> Result<()> {
        let mut detector = StubDetector::new();
        let frame = Frame::new(vec![0u8; 8 * 8 * 3], 8, 8);
        assert!(detector.detect(&frame)?.is_empty());
        Ok(())
    }
}
