use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

/// In-memory frame source producing solid-gray frames on demand.
///
/// Backs the scripted demo mode and the session tests, where the frames
/// themselves are irrelevant and only the tick cadence matters. The
/// shared readiness flag lets tests simulate a camera that has not
/// started producing yet.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    ready: Arc<AtomicBool>,
    closed: bool,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ready: Arc::new(AtomicBool::new(true)),
            closed: false,
        }
    }

    /// Handle for toggling readiness from outside the session worker.
    pub fn ready_flag(&self) -> Arc<AtomicBool> {
        self.ready.clone()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn is_ready(&self) -> bool {
        !self.closed && self.ready.load(Ordering::Relaxed)
    }

    fn current_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if !self.is_ready() {
            return Ok(None);
        }
        let data = vec![127u8; (self.width * self.height * 3) as usize];
        Ok(Some(Frame::captured_now(data, self.width, self.height, 3)))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
