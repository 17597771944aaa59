use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use examguard_core::detection::domain::face_detector::FaceDetector;
use examguard_core::detection::infrastructure::onnx_face_detector::OnnxFaceDetector;
use examguard_core::detection::infrastructure::scripted_detector::ScriptedDetector;
use examguard_core::surveillance::infrastructure::channel_tick_scheduler::SchedulerConfig;
use examguard_core::surveillance::session::{SessionError, SurveillanceSession};
use examguard_core::video::domain::frame_source::{CaptureConfig, FrameSource};
use examguard_core::video::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use examguard_core::video::infrastructure::synthetic_frame_source::SyntheticFrameSource;

/// Exam-proctoring surveillance: watches a camera feed and reports
/// fraud events (no face, multiple faces, face turned away).
#[derive(Parser)]
#[command(name = "examguard")]
struct Cli {
    /// Video input standing in for the exam camera (file or device).
    #[arg(long, required_unless_present = "scripted")]
    input: Option<PathBuf>,

    /// YOLO-pose face model (ONNX).
    #[arg(long, required_unless_present = "scripted")]
    model: Option<PathBuf>,

    /// Replay a built-in detection script instead of running inference.
    #[arg(long)]
    scripted: bool,

    /// How long to keep the session running.
    #[arg(long, default_value = "30")]
    duration_secs: u64,

    /// Milliseconds between fraud checks.
    #[arg(long, default_value = "500")]
    interval_ms: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (source, detector) = build_components(&cli)?;

    let scheduler = SchedulerConfig {
        check_interval: Duration::from_millis(cli.interval_ms),
        ..SchedulerConfig::default()
    };

    let mut handle = SurveillanceSession::new()
        .with_scheduler_config(scheduler)
        .with_warning_callback(Box::new(|streaks| {
            if streaks.no_face > 0 && streaks.no_face < streaks.no_face_threshold {
                log::info!(
                    "warning: face not detected ({}/{})",
                    streaks.no_face,
                    streaks.no_face_threshold
                );
            }
            if streaks.face_turned > 0 && streaks.face_turned < streaks.face_turned_threshold {
                log::info!(
                    "warning: face turned ({}/{})",
                    streaks.face_turned,
                    streaks.face_turned_threshold
                );
            }
        }))
        .start(
            source,
            detector,
            Box::new(|event| {
                println!("[FRAUD] {} at {}", event, event.timestamp_ms);
            }),
        );

    log::info!("session running for {}s", cli.duration_secs);
    std::thread::sleep(Duration::from_secs(cli.duration_secs));
    handle.stop();

    Ok(())
}

/// Wires the frame source and detector, mapping construction failures
/// to the session error taxonomy (camera vs. model).
fn build_components(
    cli: &Cli,
) -> Result<(Box<dyn FrameSource>, Box<dyn FaceDetector>), Box<dyn std::error::Error>> {
    if cli.scripted {
        let source = SyntheticFrameSource::new(640, 480);
        // Absence, recovery flicker, a turned stretch, then a second person.
        let detector = ScriptedDetector::new(vec![
            Vec::new(),
            Vec::new(),
            ScriptedDetector::frontal_face(),
            ScriptedDetector::turned_face(),
            ScriptedDetector::turned_face(),
            ScriptedDetector::turned_face(),
            ScriptedDetector::frontal_face(),
            ScriptedDetector::two_faces(),
        ])
        .looping();
        return Ok((Box::new(source), Box::new(detector)));
    }

    // clap enforces presence of both when not scripted.
    let (Some(input), Some(model)) = (cli.input.as_ref(), cli.model.as_ref()) else {
        return Err("--input and --model are required unless --scripted is set".into());
    };

    let source =
        FfmpegFrameSource::open(input, CaptureConfig::default()).map_err(SessionError::camera)?;
    let detector = OnnxFaceDetector::new(model).map_err(SessionError::model_load)?;
    Ok((Box::new(source), Box::new(detector)))
}
