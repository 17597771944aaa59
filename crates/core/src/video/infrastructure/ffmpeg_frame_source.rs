use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{CaptureConfig, FrameSource};

/// Frame source backed by ffmpeg-next (libavformat + libavcodec).
///
/// Decodes one frame per `current_frame` call, scaled to the capture
/// hint and converted to RGB24. In production the input is a capture
/// device; in development and tests it is usually a recorded video
/// standing in for the exam camera.
pub struct FfmpegFrameSource {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    video_stream_index: usize,
    out_width: u32,
    out_height: u32,
    ended: bool,
}

// Safety: FfmpegFrameSource is only used from a single thread at a time
// (the session worker owns it). The raw pointers inside ffmpeg types are
// not shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    /// Opens the input and prepares decoding at the hinted resolution.
    ///
    /// Fails when the path has no video stream or the codec cannot be
    /// opened; the session layer surfaces that as a camera error.
    pub fn open(path: &Path, capture: CaptureConfig) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let video_stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let out_width = if capture.width > 0 {
            capture.width
        } else {
            decoder.width()
        };
        let out_height = if capture.height > 0 {
            capture.height
        } else {
            decoder.height()
        };

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            out_width,
            out_height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            input_ctx: Some(ictx),
            decoder: Some(decoder),
            scaler: Some(scaler),
            video_stream_index,
            out_width,
            out_height,
            ended: false,
        })
    }

    fn receive_decoded(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let decoder = match self.decoder.as_mut() {
            Some(d) => d,
            None => return Ok(None),
        };
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let scaler = self.scaler.as_mut().ok_or("scaler missing")?;
        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&decoded, &mut rgb)?;

        let pixels = packed_rgb(&rgb, self.out_width, self.out_height);
        Ok(Some(Frame::captured_now(
            pixels,
            self.out_width,
            self.out_height,
            3,
        )))
    }
}

impl FrameSource for FfmpegFrameSource {
    fn is_ready(&self) -> bool {
        !self.ended && self.input_ctx.is_some() && self.out_width > 0 && self.out_height > 0
    }

    fn current_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.ended || self.input_ctx.is_none() {
            return Ok(None);
        }

        // Drain anything the decoder already holds.
        if let Some(frame) = self.receive_decoded()? {
            return Ok(Some(frame));
        }

        loop {
            // Detach the packet from the iterator's stream borrow so the
            // decoder can be borrowed below.
            let next = {
                let ictx = self.input_ctx.as_mut().ok_or("source not open")?;
                ictx.packets()
                    .next()
                    .map(|(stream, packet)| (stream.index(), packet))
            };

            let Some((stream_index, packet)) = next else {
                // End of input: flush the decoder once, then report the
                // stream as ended.
                if let Some(decoder) = self.decoder.as_mut() {
                    let _ = decoder.send_eof();
                }
                let flushed = self.receive_decoded()?;
                if flushed.is_none() {
                    self.ended = true;
                }
                return Ok(flushed);
            };

            if stream_index != self.video_stream_index {
                continue;
            }

            let decoder = self.decoder.as_mut().ok_or("decoder missing")?;
            if decoder.send_packet(&packet).is_err() {
                // Corrupt packet: skip it rather than fail the tick.
                continue;
            }

            if let Some(frame) = self.receive_decoded()? {
                return Ok(Some(frame));
            }
        }
    }

    fn close(&mut self) {
        self.input_ctx = None;
        self.decoder = None;
        self.scaler = None;
        self.ended = true;
    }
}

/// Copies pixel data from an ffmpeg frame into a tightly-packed RGB
/// buffer, stripping the per-row stride padding ffmpeg may add.
fn packed_rgb(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + w * 3]);
    }
    pixels
}
