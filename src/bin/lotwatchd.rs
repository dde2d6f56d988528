//! lotwatchd - parking lot occupancy sampling daemon
//!
//! This daemon:
//! 1. Loads configuration from an optional JSON file plus LOTWATCH_* env vars
//! 2. Opens the configured frame source and detector backend
//! 3. Samples one frame per interval and counts target-class detections
//! 4. Appends one timestamped count row per sample to the CSV output
//! 5. Runs until Ctrl-C, finishing any in-flight cycle before exiting

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lotwatch::{
    open_detector, open_source, CsvCountStore, DetectionFilter, LotwatchConfig, Monitor,
};

fn main() -> Result<()> {
    // Initialize logging (simple stderr for MVP)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = LotwatchConfig::load()?;

    let mut detector = open_detector(&cfg.detector, cfg.sampling.confidence_threshold)?;
    detector.warm_up().context("detector warm-up failed")?;

    let source = open_source(&cfg.source)?;
    let store = CsvCountStore::new(&cfg.output_path);
    let filter = DetectionFilter::new(
        cfg.sampling.confidence_threshold,
        cfg.sampling.target_class_id,
    );
    let mut monitor = Monitor::new(source, detector, filter, Box::new(store));

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .expect("error setting Ctrl-C handler");

    log::info!(
        "lotwatchd {} running. writing to {}",
        env!("CARGO_PKG_VERSION"),
        cfg.output_path.display()
    );
    log::info!(
        "source={}, detector={}, interval={}m, threshold={:.2}, class_id={}",
        cfg.source.path,
        cfg.detector.kind,
        cfg.sampling.interval.as_secs() / 60,
        cfg.sampling.confidence_threshold,
        cfg.sampling.target_class_id
    );

    monitor.run(cfg.sampling.interval, &shutdown)?;

    log::info!("lotwatchd shut down cleanly");
    Ok(())
}
