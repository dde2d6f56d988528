//! lotscan - run one sampling cycle against a single image and print the count

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use lotwatch::{
    open_detector, open_source, CountStore, CsvCountStore, DetectionFilter, DetectorSettings,
    InMemoryCountStore, Monitor, SourceSettings, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_TARGET_CLASS_ID,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image to sample: a file path, stub://<name>, or camera:<index>.
    #[arg(long)]
    image: String,
    /// Confidence threshold; detections at or below it are not counted.
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    threshold: f32,
    /// Class id to count (COCO id 2 is "car").
    #[arg(long, default_value_t = DEFAULT_TARGET_CLASS_ID)]
    class_id: u32,
    /// Detector backend (stub|tract).
    #[arg(long, default_value = "stub")]
    detector: String,
    /// ONNX model path for the tract detector.
    #[arg(long, env = "LOTWATCH_MODEL_PATH")]
    model: Option<PathBuf>,
    /// Model input width for the tract detector.
    #[arg(long, default_value_t = 640)]
    input_width: u32,
    /// Model input height for the tract detector.
    #[arg(long, default_value_t = 640)]
    input_height: u32,
    /// Also append the count to this CSV file.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let detector_settings = DetectorSettings {
        kind: args.detector,
        model_path: args.model,
        input_width: args.input_width,
        input_height: args.input_height,
    };
    let source_settings = SourceSettings {
        path: args.image,
        width: 640,
        height: 480,
    };

    let detector = open_detector(&detector_settings, args.threshold)?;
    let source = open_source(&source_settings)?;
    let filter = DetectionFilter::new(args.threshold, args.class_id);

    let store: Box<dyn CountStore> = match &args.output {
        Some(path) => {
            let mut store = CsvCountStore::new(path);
            store.ensure_initialized()?;
            Box::new(store)
        }
        None => Box::new(InMemoryCountStore::new()),
    };

    let mut monitor = Monitor::new(source, detector, filter, store);
    let record = monitor.run_cycle()?;

    println!("{} vehicle(s) at {}", record.count, record.timestamp());
    if let Some(path) = &args.output {
        println!("count appended to {}", path.display());
    }
    Ok(())
}
