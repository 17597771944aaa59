/// The Signal Extractor's reduction of one frame's detections.
///
/// An eye ratio exists only when exactly one face is present; the enum
/// makes the "count 1 with no ratio" combination unrepresentable, so the
/// classifier is total over its input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickSignal {
    /// Zero faces in frame.
    NoFaces,
    /// Exactly one face, with its orientation proxy.
    SingleFace { eye_ratio: f64 },
    /// Two or more faces. `count` is always >= 2.
    MultipleFaces { count: usize },
}

impl TickSignal {
    pub fn detection_count(&self) -> usize {
        match self {
            TickSignal::NoFaces => 0,
            TickSignal::SingleFace { .. } => 1,
            TickSignal::MultipleFaces { count } => *count,
        }
    }

    pub fn eye_ratio(&self) -> Option<f64> {
        match self {
            TickSignal::SingleFace { eye_ratio } => Some(*eye_ratio),
            _ => None,
        }
    }
}

/// Orientation geometry derived from a single detection.
///
/// `eye_ratio` is the sole orientation signal: a frontal face yields a
/// materially larger ratio than a turned or profile face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationMeasurement {
    /// Euclidean distance between the left and right eye centroids.
    pub eye_distance: f64,
    /// Width of the detection's bounding box.
    pub face_width: f64,
    /// `eye_distance / face_width`.
    pub eye_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_count_per_variant() {
        assert_eq!(TickSignal::NoFaces.detection_count(), 0);
        assert_eq!(TickSignal::SingleFace { eye_ratio: 0.4 }.detection_count(), 1);
        assert_eq!(TickSignal::MultipleFaces { count: 3 }.detection_count(), 3);
    }

    #[test]
    fn test_eye_ratio_only_for_single_face() {
        assert_eq!(TickSignal::NoFaces.eye_ratio(), None);
        assert_eq!(TickSignal::SingleFace { eye_ratio: 0.4 }.eye_ratio(), Some(0.4));
        assert_eq!(TickSignal::MultipleFaces { count: 2 }.eye_ratio(), None);
    }
}
