//! YOLO-pose face detector on ONNX Runtime.
//!
//! Tuned for the surveillance loop rather than for localization quality:
//! a small fixed input (320) and a low score threshold (0.3) keep
//! marginal detections, because a false positive costs one noisy tick
//! while a missed face feeds the no-face streak.

use std::path::Path;

use crate::detection::domain::detection::{BoundingBox, Detection};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::constants::{DETECTION_SCORE_THRESHOLD, MODEL_INPUT_SIZE};
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;

/// Greedy-NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Keypoint layout: 5 landmarks × (x, y, confidence).
const KEYPOINT_VALUES: usize = 15;
const LEFT_EYE_KP: usize = 0;
const RIGHT_EYE_KP: usize = 1;

/// Minimum keypoint confidence to treat an eye as visible.
const KEYPOINT_CONF_THRESH: f64 = 0.5;

pub struct OnnxFaceDetector {
    session: ort::session::Session,
    score_threshold: f64,
    input_size: u32,
}

impl OnnxFaceDetector {
    /// Loads a YOLO-pose face model. A failure here is fatal to the
    /// session; the scheduler must never start without a detector.
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        Ok(Self {
            session,
            score_threshold: DETECTION_SCORE_THRESHOLD,
            input_size: MODEL_INPUT_SIZE,
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let (tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        let input = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let output = outputs[0].try_extract_array::<f32>()?;
        let shape = output.shape();

        // YOLO emits [1, features, candidates] or [1, candidates, features].
        let (candidates, features, transposed) = match shape {
            [_, a, b] if a < b => (*b, *a, true),
            [_, a, b] => (*a, *b, false),
            _ => return Err(format!("unexpected model output shape: {shape:?}").into()),
        };
        let data = output.as_slice().ok_or("model output not contiguous")?;

        let mut candidates_kept = Vec::new();
        for i in 0..candidates {
            let row: Vec<f32> = if transposed {
                (0..features).map(|f| data[f * candidates + i]).collect()
            } else {
                data[i * features..(i + 1) * features].to_vec()
            };
            if let Some(candidate) = parse_candidate(&row, self.score_threshold, scale, pad_x, pad_y)
            {
                candidates_kept.push(candidate);
            }
        }

        let kept = nms(&mut candidates_kept, NMS_IOU_THRESH);
        Ok(kept.into_iter().map(into_detection).collect())
    }
}

#[derive(Clone, Debug)]
struct Candidate {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    score: f64,
    left_eye: Option<(f64, f64)>,
    right_eye: Option<(f64, f64)>,
}

/// Parses one output row: `[cx, cy, w, h, score, kp0...]` in letterbox
/// coordinates. Returns `None` for rows under the score threshold or
/// too short to describe a box.
fn parse_candidate(
    row: &[f32],
    score_threshold: f64,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
) -> Option<Candidate> {
    if row.len() < 5 {
        return None;
    }
    let score = row[4] as f64;
    if score < score_threshold {
        return None;
    }

    let unpad = |x: f64, y: f64| ((x - pad_x as f64) / scale, (y - pad_y as f64) / scale);

    let cx = row[0] as f64;
    let cy = row[1] as f64;
    let w = row[2] as f64;
    let h = row[3] as f64;
    let (x1, y1) = unpad(cx - w / 2.0, cy - h / 2.0);
    let (x2, y2) = unpad(cx + w / 2.0, cy + h / 2.0);

    let keypoint = |index: usize| -> Option<(f64, f64)> {
        if row.len() < 5 + KEYPOINT_VALUES {
            return None;
        }
        let base = 5 + index * 3;
        let conf = row[base + 2] as f64;
        if conf < KEYPOINT_CONF_THRESH {
            return None;
        }
        Some(unpad(row[base] as f64, row[base + 1] as f64))
    };

    Some(Candidate {
        x1,
        y1,
        x2,
        y2,
        score,
        left_eye: keypoint(LEFT_EYE_KP),
        right_eye: keypoint(RIGHT_EYE_KP),
    })
}

fn into_detection(c: Candidate) -> Detection {
    let landmarks = FaceLandmarks::new(
        c.left_eye.map(|p| vec![p]).unwrap_or_default(),
        c.right_eye.map(|p| vec![p]).unwrap_or_default(),
        // YOLO-pose carries no jaw outline; the tilt diagnostic stays silent.
        Vec::new(),
    );
    Detection::new(
        BoundingBox {
            x: c.x1,
            y: c.y1,
            width: c.x2 - c.x1,
            height: c.y2 - c.y1,
        },
        landmarks,
        c.score,
    )
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target × target` NCHW float32.
///
/// Returns `(tensor, scale, pad_x, pad_y)` so detections can be mapped
/// back to frame coordinates.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Pad with 114/255 gray, the YOLO training convention.
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray();
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;

    // Nearest-neighbor resize into the padded region.
    for y in 0..new_h as usize {
        let sy = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let sx = ((x as f64 / scale) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, pad_y as usize + y, pad_x as usize + x]] =
                    src[[sy, sx, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

/// Greedy NMS: sort by score descending, suppress overlapping boxes.
fn nms(candidates: &mut [Candidate], iou_thresh: f64) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Candidate> = Vec::new();
    for c in candidates.iter() {
        let overlaps = kept.iter().any(|k| {
            box_iou(
                &[c.x1, c.y1, c.x2, c.y2],
                &[k.x1, k.y1, k.x2, k.y2],
            ) > iou_thresh
        });
        if !overlaps {
            kept.push(c.clone());
        }
    }
    kept
}

fn box_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}
