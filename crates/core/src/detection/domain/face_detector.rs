use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for face/landmark inference.
///
/// Implementations may be stateful (e.g., an ONNX session), hence
/// `&mut self`. A failed call is recovered by the caller as a skipped
/// tick; implementations must not panic on malformed model output.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
