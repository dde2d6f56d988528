//! End-to-end sampling tests over the public API.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use lotwatch::{
    open_detector, open_source, BoundingBox, CountStore, CsvCountStore, Detection,
    DetectionFilter, DetectorSettings, Monitor, SourceSettings, StillImageSource, StubDetector,
};

fn car(confidence: f32, x: f32) -> Detection {
    Detection::new(BoundingBox::new(x, 40.0, 60.0, 40.0), confidence, 2)
}

fn bus(confidence: f32) -> Detection {
    Detection::new(BoundingBox::new(300.0, 20.0, 120.0, 80.0), confidence, 5)
}

#[test]
fn counts_cars_from_a_still_image() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let image_path = dir.path().join("lot.png");
    image::RgbImage::from_pixel(64, 48, image::Rgb([90, 90, 90])).save(&image_path)?;

    let output_path = dir.path().join("car_counts.csv");
    let mut store = CsvCountStore::new(&output_path);
    store.ensure_initialized()?;

    // Two confident cars, one bus, one car below the counting threshold.
    let detector = StubDetector::with_detections(vec![
        car(0.91, 10.0),
        car(0.74, 120.0),
        bus(0.88),
        car(0.42, 230.0),
    ]);

    let mut monitor = Monitor::new(
        Box::new(StillImageSource::new(&image_path)),
        Box::new(detector),
        DetectionFilter::default(),
        Box::new(store),
    );

    let record = monitor.run_cycle()?;
    assert_eq!(record.count, 2);

    let contents = fs::read_to_string(&output_path)?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Timestamp,Car Count");
    assert!(lines[1].ends_with(",2"));
    Ok(())
}

#[test]
fn unreadable_image_skips_the_sample_and_recovers() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let image_path = dir.path().join("lot.png");
    let output_path = dir.path().join("car_counts.csv");

    let mut store = CsvCountStore::new(&output_path);
    store.ensure_initialized()?;

    let mut monitor = Monitor::new(
        Box::new(StillImageSource::new(&image_path)),
        Box::new(StubDetector::with_detections(vec![car(0.9, 10.0)])),
        DetectionFilter::default(),
        Box::new(store),
    );

    // The image does not exist yet: the cycle fails and no row is written.
    let err = monitor.run_cycle().unwrap_err();
    assert_eq!(err.stage(), "acquisition");
    assert_eq!(fs::read_to_string(&output_path)?, "Timestamp,Car Count\n");

    // Once the snapshot job catches up, sampling resumes.
    image::RgbImage::from_pixel(32, 24, image::Rgb([10, 10, 10])).save(&image_path)?;
    let record = monitor.run_cycle()?;
    assert_eq!(record.count, 1);

    let contents = fs::read_to_string(&output_path)?;
    assert_eq!(contents.lines().count(), 2);
    Ok(())
}

#[test]
fn daemon_loop_samples_on_period_until_shutdown() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output_path = dir.path().join("car_counts.csv");

    // Factory-built components, as the daemon wires them.
    let source = open_source(&SourceSettings {
        path: "stub://integration_lot".to_string(),
        width: 640,
        height: 480,
    })?;
    let detector = open_detector(
        &DetectorSettings {
            kind: "stub".to_string(),
            model_path: None,
            input_width: 640,
            input_height: 640,
        },
        0.50,
    )?;

    let mut monitor = Monitor::new(
        source,
        detector,
        DetectionFilter::default(),
        Box::new(CsvCountStore::new(&output_path)),
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let stopper = Arc::clone(&shutdown);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(80));
        stopper.store(true, Ordering::SeqCst);
    });

    monitor.run(Duration::from_millis(10), &shutdown)?;
    handle.join().unwrap();

    // The factory stub detector reports no vehicles; every sampled row is 0.
    let contents = fs::read_to_string(&output_path)?;
    let rows: Vec<&str> = contents.lines().skip(1).collect();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| row.ends_with(",0")));
    Ok(())
}
