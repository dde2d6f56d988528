#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::detector::Detector;
use crate::detect::result::{non_max_suppression, BoundingBox, Detection};
use crate::frame::Frame;

/// Default IoU threshold for non-maximum suppression.
const DEFAULT_NMS_IOU: f32 = 0.45;

/// Tract-based detector for local ONNX object-detection models.
///
/// The model is loaded and optimized once at construction and never reloaded.
/// Frames are resized to the model input when needed; reported boxes are
/// mapped back to source-frame coordinates.
///
/// Expected model head: one output of shape `[1, rows, 5 + classes]` where
/// each row is `[cx, cy, w, h, objectness, class scores...]` in model-input
/// pixel coordinates (the YOLOv5-family export layout).
pub struct TractDetector {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    input_width: u32,
    input_height: u32,
    min_confidence: f32,
    nms_iou: f32,
}

impl TractDetector {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, input_width: u32, input_height: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, input_height as usize, input_width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            input_width,
            input_height,
            min_confidence: crate::detect::CANDIDATE_CONFIDENCE_FLOOR,
            nms_iou: DEFAULT_NMS_IOU,
        })
    }

    /// Override the candidate confidence floor.
    ///
    /// Callers must keep the floor at or below the downstream counting
    /// threshold; rows pruned here are invisible to the counting filter.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Override the NMS IoU threshold.
    pub fn with_nms_iou(mut self, nms_iou: f32) -> Self {
        self.nms_iou = nms_iou;
        self
    }

    fn build_input(&self, pixels: &[u8]) -> Result<Tensor> {
        let width = self.input_width as usize;
        let height = self.input_height as usize;

        let expected_len = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("model input dimensions overflow"))?;
        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        let input =
            tract_ndarray::Array4::from_shape_fn((1, 3, height, width), |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                pixels[idx] as f32 / 255.0
            });

        Ok(input.into_tensor())
    }
}

impl Detector for TractDetector {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let (pixels, scale_x, scale_y) =
            resize_for_input(frame, self.input_width, self.input_height)?;
        let input = self.build_input(&pixels)?;

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let view = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let view = view
            .into_dimensionality::<tract_ndarray::Ix3>()
            .context("model output was not rank 3")?;

        let detections = decode_rows(view, self.min_confidence, scale_x, scale_y)?;
        Ok(non_max_suppression(detections, self.nms_iou))
    }

    fn warm_up(&mut self) -> Result<()> {
        let len = (self.input_width as usize) * (self.input_height as usize) * 3;
        let input = self.build_input(&vec![0u8; len])?;
        self.model
            .run(tvec!(input.into()))
            .context("warm-up inference failed")?;
        Ok(())
    }
}

/// Resize a frame's RGB bytes to the model input size.
///
/// Returns the (possibly resized) pixel buffer plus the horizontal and
/// vertical factors that map model-input coordinates back to the source
/// frame.
fn resize_for_input(frame: &Frame, input_width: u32, input_height: u32) -> Result<(Vec<u8>, f32, f32)> {
    if frame.width() == input_width && frame.height() == input_height {
        return Ok((frame.pixels().to_vec(), 1.0, 1.0));
    }

    let buffer =
        image::RgbImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
            .ok_or_else(|| {
                anyhow!(
                    "frame buffer does not match {}x{} RGB",
                    frame.width(),
                    frame.height()
                )
            })?;
    let resized = image::imageops::resize(
        &buffer,
        input_width,
        input_height,
        image::imageops::FilterType::Triangle,
    );

    let scale_x = frame.width() as f32 / input_width as f32;
    let scale_y = frame.height() as f32 / input_height as f32;
    Ok((resized.into_raw(), scale_x, scale_y))
}

/// Decode `[1, rows, 5 + classes]` output rows into detections.
///
/// Rows whose objectness or combined confidence falls below `min_confidence`
/// are dropped. Box centers are converted to top-left form and scaled back to
/// source-frame coordinates.
fn decode_rows(
    view: tract_ndarray::ArrayView3<f32>,
    min_confidence: f32,
    scale_x: f32,
    scale_y: f32,
) -> Result<Vec<Detection>> {
    let shape = view.shape();
    if shape[0] != 1 || shape[2] < 6 {
        return Err(anyhow!("unexpected model output shape {:?}", shape));
    }

    let rows = view.index_axis(tract_ndarray::Axis(0), 0);
    let mut detections = Vec::new();
    for row in rows.outer_iter() {
        let objectness = row[4];
        if objectness < min_confidence {
            continue;
        }

        let mut best_class = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for (i, &score) in row.iter().skip(5).enumerate() {
            if score > best_score {
                best_class = i;
                best_score = score;
            }
        }

        let confidence = objectness * best_score;
        if confidence < min_confidence {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        detections.push(Detection::new(
            BoundingBox::new(
                (cx - w / 2.0) * scale_x,
                (cy - h / 2.0) * scale_y,
                w * scale_x,
                h * scale_y,
            ),
            confidence,
            best_class as u32,
        ));
    }

    Ok(detections)
}
