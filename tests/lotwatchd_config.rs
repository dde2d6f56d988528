use std::sync::Mutex;

use tempfile::NamedTempFile;

use lotwatch::config::LotwatchConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "LOTWATCH_CONFIG",
        "LOTWATCH_OUTPUT_PATH",
        "LOTWATCH_SOURCE",
        "LOTWATCH_DETECTOR",
        "LOTWATCH_MODEL_PATH",
        "LOTWATCH_INTERVAL_MINUTES",
        "LOTWATCH_CONFIDENCE_THRESHOLD",
        "LOTWATCH_TARGET_CLASS_ID",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = LotwatchConfig::load().expect("load config");

    assert_eq!(
        cfg.output_path.to_string_lossy(),
        "runs/parking_counts/car_counts.csv"
    );
    assert_eq!(cfg.source.path, "stub://parking_lot");
    assert_eq!(cfg.source.width, 640);
    assert_eq!(cfg.source.height, 480);
    assert_eq!(cfg.detector.kind, "stub");
    assert!(cfg.detector.model_path.is_none());
    assert_eq!(cfg.detector.input_width, 640);
    assert_eq!(cfg.detector.input_height, 640);
    assert_eq!(cfg.sampling.interval.as_secs(), 600);
    assert_eq!(cfg.sampling.confidence_threshold, 0.50);
    assert_eq!(cfg.sampling.target_class_id, 2);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "output_path": "/var/lib/lotwatch/lot_a.csv",
        "source": {
            "path": "/var/lib/lotwatch/latest.jpg",
            "width": 1280,
            "height": 720
        },
        "detector": {
            "kind": "tract",
            "model_path": "models/yolov5s.onnx",
            "input_width": 416,
            "input_height": 416
        },
        "sampling": {
            "interval_minutes": 5,
            "confidence_threshold": 0.6,
            "target_class_id": 2
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("LOTWATCH_CONFIG", file.path());
    std::env::set_var("LOTWATCH_SOURCE", "stub://override_lot");
    std::env::set_var("LOTWATCH_INTERVAL_MINUTES", "15");
    std::env::set_var("LOTWATCH_TARGET_CLASS_ID", "7");

    let cfg = LotwatchConfig::load().expect("load config");

    assert_eq!(cfg.output_path.to_string_lossy(), "/var/lib/lotwatch/lot_a.csv");
    assert_eq!(cfg.source.path, "stub://override_lot");
    assert_eq!(cfg.source.width, 1280);
    assert_eq!(cfg.source.height, 720);
    assert_eq!(cfg.detector.kind, "tract");
    assert_eq!(
        cfg.detector.model_path.as_deref().unwrap().to_string_lossy(),
        "models/yolov5s.onnx"
    );
    assert_eq!(cfg.detector.input_width, 416);
    assert_eq!(cfg.detector.input_height, 416);
    assert_eq!(cfg.sampling.interval.as_secs(), 900);
    assert_eq!(cfg.sampling.confidence_threshold, 0.6);
    assert_eq!(cfg.sampling.target_class_id, 7);

    clear_env();
}

#[test]
fn rejects_out_of_range_threshold() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOTWATCH_CONFIDENCE_THRESHOLD", "1.5");

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("between 0.0 and 1.0"));

    clear_env();
}

#[test]
fn rejects_malformed_interval() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOTWATCH_INTERVAL_MINUTES", "soon");

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("must be an integer"));

    clear_env();
}

#[test]
fn rejects_zero_interval() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOTWATCH_INTERVAL_MINUTES", "0");

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("greater than zero"));

    clear_env();
}

#[test]
fn rejects_overflowing_interval() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    // u64::MAX minutes cannot be expressed in seconds; the conversion must
    // fail cleanly rather than wrap.
    std::env::set_var("LOTWATCH_INTERVAL_MINUTES", u64::MAX.to_string());

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("out of range"));

    clear_env();
}

#[test]
fn rejects_overflowing_interval_in_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "sampling": {
            "interval_minutes": 18446744073709551615
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("LOTWATCH_CONFIG", file.path());

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("out of range"));

    clear_env();
}

#[test]
fn rejects_interval_beyond_one_year() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOTWATCH_INTERVAL_MINUTES", "525601");

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("must not exceed one year"));

    clear_env();
}

#[test]
fn rejects_unknown_detector_kind() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOTWATCH_DETECTOR", "opencv");

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("unknown detector kind"));

    clear_env();
}

#[test]
fn rejects_tract_detector_without_model_path() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOTWATCH_DETECTOR", "tract");

    let err = LotwatchConfig::load().unwrap_err();
    assert!(err.to_string().contains("requires a model path"));

    clear_env();
}
