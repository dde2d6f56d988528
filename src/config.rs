use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detect::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TARGET_CLASS_ID};

const DEFAULT_OUTPUT_PATH: &str = "runs/parking_counts/car_counts.csv";
const DEFAULT_SOURCE_PATH: &str = "stub://parking_lot";
const DEFAULT_SOURCE_WIDTH: u32 = 640;
const DEFAULT_SOURCE_HEIGHT: u32 = 480;
const DEFAULT_DETECTOR_KIND: &str = "stub";
const DEFAULT_MODEL_INPUT_WIDTH: u32 = 640;
const DEFAULT_MODEL_INPUT_HEIGHT: u32 = 640;
const DEFAULT_INTERVAL_MINUTES: u64 = 10;
const MAX_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

#[derive(Debug, Deserialize, Default)]
struct LotwatchConfigFile {
    output_path: Option<String>,
    source: Option<SourceConfigFile>,
    detector: Option<DetectorConfigFile>,
    sampling: Option<SamplingConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    path: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    kind: Option<String>,
    model_path: Option<PathBuf>,
    input_width: Option<u32>,
    input_height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct SamplingConfigFile {
    interval_minutes: Option<u64>,
    confidence_threshold: Option<f32>,
    target_class_id: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct LotwatchConfig {
    pub output_path: PathBuf,
    pub source: SourceSettings,
    pub detector: DetectorSettings,
    pub sampling: SamplingSettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub path: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub kind: String,
    pub model_path: Option<PathBuf>,
    pub input_width: u32,
    pub input_height: u32,
}

#[derive(Debug, Clone)]
pub struct SamplingSettings {
    pub interval: Duration,
    pub confidence_threshold: f32,
    pub target_class_id: u32,
}

impl LotwatchConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("LOTWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: LotwatchConfigFile) -> Result<Self> {
        let output_path = PathBuf::from(
            file.output_path
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
        );
        let source = SourceSettings {
            path: file
                .source
                .as_ref()
                .and_then(|source| source.path.clone())
                .unwrap_or_else(|| DEFAULT_SOURCE_PATH.to_string()),
            width: file
                .source
                .as_ref()
                .and_then(|source| source.width)
                .unwrap_or(DEFAULT_SOURCE_WIDTH),
            height: file
                .source
                .and_then(|source| source.height)
                .unwrap_or(DEFAULT_SOURCE_HEIGHT),
        };
        let detector = DetectorSettings {
            kind: file
                .detector
                .as_ref()
                .and_then(|detector| detector.kind.clone())
                .unwrap_or_else(|| DEFAULT_DETECTOR_KIND.to_string()),
            model_path: file
                .detector
                .as_ref()
                .and_then(|detector| detector.model_path.clone()),
            input_width: file
                .detector
                .as_ref()
                .and_then(|detector| detector.input_width)
                .unwrap_or(DEFAULT_MODEL_INPUT_WIDTH),
            input_height: file
                .detector
                .and_then(|detector| detector.input_height)
                .unwrap_or(DEFAULT_MODEL_INPUT_HEIGHT),
        };
        let sampling = SamplingSettings {
            interval: interval_from_minutes(
                file.sampling
                    .as_ref()
                    .and_then(|sampling| sampling.interval_minutes)
                    .unwrap_or(DEFAULT_INTERVAL_MINUTES),
            )?,
            confidence_threshold: file
                .sampling
                .as_ref()
                .and_then(|sampling| sampling.confidence_threshold)
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            target_class_id: file
                .sampling
                .and_then(|sampling| sampling.target_class_id)
                .unwrap_or(DEFAULT_TARGET_CLASS_ID),
        };
        Ok(Self {
            output_path,
            source,
            detector,
            sampling,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("LOTWATCH_OUTPUT_PATH") {
            if !path.trim().is_empty() {
                self.output_path = PathBuf::from(path);
            }
        }
        if let Ok(path) = std::env::var("LOTWATCH_SOURCE") {
            if !path.trim().is_empty() {
                self.source.path = path;
            }
        }
        if let Ok(kind) = std::env::var("LOTWATCH_DETECTOR") {
            if !kind.trim().is_empty() {
                self.detector.kind = kind;
            }
        }
        if let Ok(path) = std::env::var("LOTWATCH_MODEL_PATH") {
            if !path.trim().is_empty() {
                self.detector.model_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(minutes) = std::env::var("LOTWATCH_INTERVAL_MINUTES") {
            let minutes: u64 = minutes.parse().map_err(|_| {
                anyhow!("LOTWATCH_INTERVAL_MINUTES must be an integer number of minutes")
            })?;
            self.sampling.interval = interval_from_minutes(minutes)?;
        }
        if let Ok(threshold) = std::env::var("LOTWATCH_CONFIDENCE_THRESHOLD") {
            let threshold: f32 = threshold
                .parse()
                .map_err(|_| anyhow!("LOTWATCH_CONFIDENCE_THRESHOLD must be a number"))?;
            self.sampling.confidence_threshold = threshold;
        }
        if let Ok(class_id) = std::env::var("LOTWATCH_TARGET_CLASS_ID") {
            let class_id: u32 = class_id
                .parse()
                .map_err(|_| anyhow!("LOTWATCH_TARGET_CLASS_ID must be an integer class id"))?;
            self.sampling.target_class_id = class_id;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(anyhow!("output path must not be empty"));
        }
        if self.source.path.trim().is_empty() {
            return Err(anyhow!("image source path must not be empty"));
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!("source dimensions must be greater than zero"));
        }
        match self.detector.kind.as_str() {
            "stub" | "tract" => {}
            other => return Err(anyhow!("unknown detector kind: {}", other)),
        }
        if self.detector.kind == "tract" && self.detector.model_path.is_none() {
            return Err(anyhow!("tract detector requires a model path"));
        }
        if self.detector.input_width == 0 || self.detector.input_height == 0 {
            return Err(anyhow!("model input dimensions must be greater than zero"));
        }
        if self.sampling.interval.as_secs() == 0 {
            return Err(anyhow!("sampling interval must be greater than zero"));
        }
        if self.sampling.interval > MAX_INTERVAL {
            return Err(anyhow!("sampling interval must not exceed one year"));
        }
        if !(0.0..=1.0).contains(&self.sampling.confidence_threshold) {
            return Err(anyhow!(
                "confidence threshold must be between 0.0 and 1.0"
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<LotwatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn interval_from_minutes(minutes: u64) -> Result<Duration> {
    let seconds = minutes
        .checked_mul(60)
        .ok_or_else(|| anyhow!("sampling interval out of range: {} minutes", minutes))?;
    Ok(Duration::from_secs(seconds))
}
