//! Facial landmark point groups and the geometry derived from them.
//!
//! Only the eye groups participate in classification; the jaw outline
//! feeds a diagnostic tilt angle that is logged but never acted on.

/// A 2D point in frame pixel coordinates.
pub type Point = (f64, f64);

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    left_eye: Vec<Point>,
    right_eye: Vec<Point>,
    jaw_outline: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(left_eye: Vec<Point>, right_eye: Vec<Point>, jaw_outline: Vec<Point>) -> Self {
        Self {
            left_eye,
            right_eye,
            jaw_outline,
        }
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.left_eye
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.right_eye
    }

    pub fn jaw_outline(&self) -> &[Point] {
        &self.jaw_outline
    }

    /// Arithmetic-mean centroids of the left and right eye groups.
    ///
    /// Returns `None` when either group is empty; a detection without
    /// both eyes carries no usable orientation signal.
    pub fn eye_centroids(&self) -> Option<(Point, Point)> {
        Some((centroid(&self.left_eye)?, centroid(&self.right_eye)?))
    }

    /// Euclidean distance between the two eye centroids.
    pub fn eye_distance(&self) -> Option<f64> {
        let (left, right) = self.eye_centroids()?;
        Some(((right.0 - left.0).powi(2) + (right.1 - left.1).powi(2)).sqrt())
    }

    /// Head-tilt diagnostic: angle in degrees of the line from the first
    /// to the last jaw-outline point. `None` without at least two points.
    pub fn jaw_tilt_degrees(&self) -> Option<f64> {
        let first = self.jaw_outline.first()?;
        let last = self.jaw_outline.last()?;
        if self.jaw_outline.len() < 2 {
            return None;
        }
        Some((last.1 - first.1).atan2(last.0 - first.0).to_degrees())
    }
}

fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    Some((sx / n, sy / n))
}
