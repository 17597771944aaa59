//! Reduces one frame's detections to the classifier's input signal.

use crate::detection::domain::detection::Detection;
use crate::surveillance::domain::tick_signal::{OrientationMeasurement, TickSignal};

/// Derives the orientation proxy from a single detection.
///
/// Returns `None` when the geometry is degenerate: either eye group
/// empty, or a non-positive box width. Such a detection carries no
/// usable orientation signal and the tick is skipped.
pub fn measure_orientation(detection: &Detection) -> Option<OrientationMeasurement> {
    let eye_distance = detection.landmarks.eye_distance()?;
    let face_width = detection.bounding_box.width;
    if face_width <= 0.0 {
        return None;
    }
    Some(OrientationMeasurement {
        eye_distance,
        face_width,
        eye_ratio: eye_distance / face_width,
    })
}

/// Converts a detection list into the per-tick signal.
///
/// `None` means "no sample": exactly one face was found but its
/// landmarks are unusable. The caller treats that the same as an
/// inference failure, leaving streaks and state untouched.
pub fn extract(detections: &[Detection]) -> Option<TickSignal> {
    match detections {
        [] => Some(TickSignal::NoFaces),
        [single] => {
            let measurement = measure_orientation(single)?;
            Some(TickSignal::SingleFace {
                eye_ratio: measurement.eye_ratio,
            })
        }
        many => Some(TickSignal::MultipleFaces { count: many.len() }),
    }
}
