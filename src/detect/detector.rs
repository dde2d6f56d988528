use anyhow::Result;

use crate::detect::result::Detection;
use crate::frame::Frame;

/// Detector capability consumed by the sampling loop.
///
/// A detector is constructed once during startup and is immutable after
/// initialization: there is no reconfiguration API, and the handle is passed
/// explicitly into the loop rather than held as process-global state.
/// `detect` takes `&mut self` only for inference scratch state.
pub trait Detector: Send {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Run detection on one frame.
    ///
    /// Always returns the full detection list (possibly empty); thresholding
    /// and class selection happen downstream in `DetectionFilter`.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;

    /// Optional warm-up hook, run once before the first cycle.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
