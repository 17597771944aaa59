use crate::shared::frame::Frame;

/// Preferred capture resolution, passed to the source as a hint.
///
/// Sources that cannot honor it deliver their native size; consumers
/// must not assume the hint was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: crate::shared::constants::CAPTURE_WIDTH,
            height: crate::shared::constants::CAPTURE_HEIGHT,
        }
    }
}

/// A live producer of decoded frames (camera, capture device, or a
/// video file standing in for one).
///
/// Readiness is explicit: the scheduler polls `is_ready` and backs off
/// instead of treating a source that is still starting up as "no face
/// in frame".
pub trait FrameSource: Send {
    /// True once the source is producing decodable frames.
    fn is_ready(&self) -> bool;

    /// The most recent frame, or `None` when nothing is decodable right
    /// now (still starting up, or the stream ended).
    fn current_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the underlying stream. Must be idempotent; after close,
    /// `is_ready` returns false and `current_frame` returns `Ok(None)`.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capture_config_is_vga() {
        let config = CaptureConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
    }
}
