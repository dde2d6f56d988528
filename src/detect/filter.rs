//! Detection filtering.
//!
//! Reduces a detector's raw output to a single vehicle count. The filter is
//! fixed at startup and applied identically every cycle: a detection is
//! counted when its confidence strictly exceeds the threshold AND its class
//! id equals the target class. Boundary confidence (exactly equal to the
//! threshold) is excluded.

use crate::detect::result::Detection;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.50;
/// COCO class id for "car".
pub const DEFAULT_TARGET_CLASS_ID: u32 = 2;

/// Counting policy: confidence threshold plus target class.
#[derive(Clone, Copy, Debug)]
pub struct DetectionFilter {
    pub confidence_threshold: f32,
    pub target_class_id: u32,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            target_class_id: DEFAULT_TARGET_CLASS_ID,
        }
    }
}

impl DetectionFilter {
    pub fn new(confidence_threshold: f32, target_class_id: u32) -> Self {
        Self {
            confidence_threshold,
            target_class_id,
        }
    }

    /// True when a detection counts toward the total.
    pub fn matches(&self, detection: &Detection) -> bool {
        detection.confidence > self.confidence_threshold
            && detection.class_id == self.target_class_id
    }

    /// Count matching detections. Order-independent; empty input yields 0.
    pub fn count(&self, detections: &[Detection]) -> u32 {
        detections.iter().filter(|d| self.matches(d)).count() as u32
    }
}
