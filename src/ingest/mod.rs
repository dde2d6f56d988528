//! Frame acquisition sources.
//!
//! This module provides the sources a sampling cycle can pull frames from:
//! - Still image files, re-read on every cycle
//! - USB/V4L2 capture devices (feature: ingest-v4l2), addressed as `camera:<index>`
//! - Stub source (`stub://...`, testing)
//!
//! All sources produce in-memory [`Frame`] instances. The acquisition layer
//! is local-only: source paths with URL schemes are rejected and nothing is
//! ever fetched over the network. Acquired frames are handed to the caller
//! and not retained.

pub mod still;
pub mod synthetic;
#[cfg(feature = "ingest-v4l2")]
pub mod v4l2;

use anyhow::{anyhow, Result};

use crate::config::SourceSettings;
use crate::frame::Frame;

pub use still::StillImageSource;
pub use synthetic::SyntheticSource;
#[cfg(feature = "ingest-v4l2")]
pub use v4l2::CameraSource;

/// A place frames come from.
///
/// Sources are stateful (a synthetic source advances its pattern, a camera
/// owns its device index) and produce one frame per [`acquire`] call. A
/// failed acquisition affects only that call; the source stays usable.
///
/// [`acquire`]: ImageSource::acquire
pub trait ImageSource: Send {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Capture or load the next frame.
    fn acquire(&mut self) -> Result<Frame>;
}

/// Construct the source named by `settings`.
///
/// Recognized path forms:
/// - `stub://<name>`: synthetic frames
/// - `camera:<index>`: V4L2 device (requires the ingest-v4l2 feature)
/// - anything else without a URL scheme: still image file on disk
pub fn open_source(settings: &SourceSettings) -> Result<Box<dyn ImageSource>> {
    let path = settings.path.as_str();
    if path.trim().is_empty() {
        return Err(anyhow!("image source path must not be empty"));
    }

    if path.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(path)));
    }

    if let Some(index) = path.strip_prefix("camera:") {
        let index: u32 = index
            .parse()
            .map_err(|_| anyhow!("camera index must be an integer, got {:?}", index))?;
        return open_camera(index, settings.width, settings.height);
    }

    if path.contains("://") {
        return Err(anyhow!(
            "image acquisition only supports local paths (no URL schemes)"
        ));
    }

    Ok(Box::new(StillImageSource::new(path)))
}

#[cfg(feature = "ingest-v4l2")]
fn open_camera(index: u32, width: u32, height: u32) -> Result<Box<dyn ImageSource>> {
    Ok(Box::new(CameraSource::new(index, width, height)))
}

#[cfg(not(feature = "ingest-v4l2"))]
fn open_camera(_index: u32, _width: u32, _height: u32) -> Result<Box<dyn ImageSource>> {
    Err(anyhow!("camera capture requires the ingest-v4l2 feature"))
}
