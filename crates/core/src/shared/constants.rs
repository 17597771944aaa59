use std::time::Duration;

/// Minimum wall-clock spacing between fraud checks.
pub const FRAUD_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Coarser retry spacing while the frame source or models are not ready,
/// so the scheduler does not spin during startup.
pub const NOT_READY_RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Consecutive no-face ticks before a `NoFace` fraud event is raised.
pub const NO_FACE_THRESHOLD: u32 = 3;

/// Consecutive turned-face ticks before a `FaceTurned` fraud event is raised.
pub const FACE_TURNED_THRESHOLD: u32 = 3;

/// Eye-distance / face-width ratio below which a face counts as turned.
/// A frontal face typically measures 0.3-0.5; a profile face well under 0.25.
pub const EYE_RATIO_THRESHOLD: f64 = 0.25;

/// Detector input resolution. Small on purpose: the surveillance loop
/// favors speed over localization accuracy.
pub const MODEL_INPUT_SIZE: u32 = 320;

/// Detector confidence threshold. Low on purpose: a marginal detection
/// kept is better than a present face missed.
pub const DETECTION_SCORE_THRESHOLD: f64 = 0.3;

/// Preferred capture resolution requested from the frame source.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;
