//! Periodic parking-lot occupancy sampling.
//!
//! A long-running monitor acquires one frame per sampling period, runs a
//! vehicle detector over it, filters detections down to the target class,
//! and appends a timestamped count to an append-only CSV file. Counts are
//! the only thing persisted; frames live in memory for one cycle and are
//! dropped.
//!
//! Module map:
//! - [`config`]: file and environment configuration
//! - [`frame`]: decoded RGB frames
//! - [`ingest`]: frame sources (still image, V4L2 camera, synthetic)
//! - [`detect`]: detector backends and the counting filter
//! - [`store`]: durable count records
//! - [`monitor`]: the sampling loop

pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod monitor;
pub mod store;

pub use config::{DetectorSettings, LotwatchConfig, SamplingSettings, SourceSettings};
#[cfg(feature = "backend-tract")]
pub use detect::TractDetector;
pub use detect::{
    non_max_suppression, open_detector, BoundingBox, Detection, DetectionFilter, Detector,
    StubDetector, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TARGET_CLASS_ID,
};
pub use frame::Frame;
#[cfg(feature = "ingest-v4l2")]
pub use ingest::CameraSource;
pub use ingest::{open_source, ImageSource, StillImageSource, SyntheticSource};
pub use monitor::{CycleError, Monitor, Ticker};
pub use store::{
    CountRecord, CountStore, CsvCountStore, InMemoryCountStore, CSV_HEADER, TIMESTAMP_FORMAT,
};
