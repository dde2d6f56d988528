//! Vehicle detection.
//!
//! A [`Detector`] turns a decoded frame into candidate detections; the
//! [`DetectionFilter`] decides which of those count as vehicles. Backends
//! live under [`backends`] and are selected by name at startup.

pub mod backends;
pub mod detector;
pub mod filter;
pub mod result;

use anyhow::{anyhow, Result};

use crate::config::DetectorSettings;

pub use backends::StubDetector;
#[cfg(feature = "backend-tract")]
pub use backends::TractDetector;
pub use detector::Detector;
pub use filter::{DetectionFilter, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TARGET_CLASS_ID};
pub use result::{non_max_suppression, BoundingBox, Detection};

/// Ceiling for backend-side candidate pruning.
///
/// Backends may drop candidates below this floor before the counting filter
/// runs. [`open_detector`] lowers the floor further when the counting
/// threshold sits below it, so the filter always sees every detection it
/// could count.
pub const CANDIDATE_CONFIDENCE_FLOOR: f32 = 0.25;

/// Construct the detector named by `settings`.
///
/// `counting_threshold` is the downstream filter's confidence threshold; it
/// caps how aggressively a backend may prune candidates.
pub fn open_detector(
    settings: &DetectorSettings,
    counting_threshold: f32,
) -> Result<Box<dyn Detector>> {
    match settings.kind.as_str() {
        "stub" => Ok(Box::new(StubDetector::new())),
        "tract" => open_tract(settings, counting_threshold),
        other => Err(anyhow!("unknown detector kind: {}", other)),
    }
}

#[cfg(feature = "backend-tract")]
fn open_tract(settings: &DetectorSettings, counting_threshold: f32) -> Result<Box<dyn Detector>> {
    let model_path = settings
        .model_path
        .as_ref()
        .ok_or_else(|| anyhow!("tract detector requires a model path"))?;
    let detector = TractDetector::new(model_path, settings.input_width, settings.input_height)?
        .with_min_confidence(CANDIDATE_CONFIDENCE_FLOOR.min(counting_threshold));
    Ok(Box::new(detector))
}

#[cfg(not(feature = "backend-tract"))]
fn open_tract(_settings: &DetectorSettings, _counting_threshold: f32) -> Result<Box<dyn Detector>> {
    Err(anyhow!(
        "tract detector support requires the backend-tract feature"
    ))
}
