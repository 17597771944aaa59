use crate::detection::domain::face_landmarks::FaceLandmarks;

/// Axis-aligned face box in frame pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One face found by the inference engine in a single frame.
///
/// Created fresh per inference call and never retained beyond the tick
/// that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    pub landmarks: FaceLandmarks,
    pub score: f64,
}

impl Detection {
    pub fn new(bounding_box: BoundingBox, landmarks: FaceLandmarks, score: f64) -> Self {
        Self {
            bounding_box,
            landmarks,
            score,
        }
    }
}
