use std::cmp::Ordering;

/// Axis-aligned bounding box in source-frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection over union with another box. Returns 0.0 when the union
    /// is degenerate.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// One object instance reported by a detector.
///
/// `class_id` follows the detector's own taxonomy; this crate does not
/// interpret it beyond equality against the configured target class.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub region: BoundingBox,
    pub confidence: f32,
    pub class_id: u32,
}

impl Detection {
    pub fn new(region: BoundingBox, confidence: f32, class_id: u32) -> Self {
        Self {
            region,
            confidence,
            class_id,
        }
    }
}

/// Greedy non-maximum suppression.
///
/// Detections are visited in descending confidence order; a detection is kept
/// when its IoU with every already-kept detection is at most `iou_threshold`.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut keep: Vec<Detection> = Vec::new();
    for det in detections {
        if keep
            .iter()
            .all(|kept| det.region.iou(&kept.region) <= iou_threshold)
        {
            keep.push(det);
        }
    }
    keep
}
