//! The frame-sampling loop, run on the session's worker thread.
//!
//! One iteration per wakeup: check liveness, check source readiness,
//! gate on the minimum check interval, then sample → detect → extract →
//! classify. Ticks are strictly sequential; the timer is re-armed only
//! after the previous tick has fully completed, so at most one
//! extraction is ever in flight.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{after, select, Receiver};

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{FRAUD_CHECK_INTERVAL, NOT_READY_RETRY_INTERVAL};
use crate::surveillance::domain::fraud_classifier::{FraudClassifier, StreakSnapshot};
use crate::surveillance::domain::fraud_event::FraudEvent;
use crate::surveillance::domain::signal_extractor;
use crate::surveillance::surveillance_logger::SurveillanceLogger;
use crate::video::domain::frame_source::FrameSource;

/// Host callback for confirmed fraud events.
pub type FraudCallback = Box<dyn Fn(FraudEvent) + Send>;

/// Optional host callback for pre-threshold streak warnings.
pub type WarningCallback = Box<dyn Fn(StreakSnapshot) + Send>;

/// Loop timing. Defaults mirror the shared constants; tests shrink them.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    /// Minimum spacing between fraud checks.
    pub check_interval: Duration,
    /// Spacing while the source is not ready.
    pub retry_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: FRAUD_CHECK_INTERVAL,
            retry_interval: NOT_READY_RETRY_INTERVAL,
        }
    }
}

/// Everything the worker thread owns for the lifetime of a session.
pub(crate) struct TickLoop {
    pub source: Box<dyn FrameSource>,
    pub detector: Box<dyn FaceDetector>,
    pub classifier: FraudClassifier,
    pub logger: Box<dyn SurveillanceLogger>,
    pub on_fraud: FraudCallback,
    pub on_warning: Option<WarningCallback>,
    pub config: SchedulerConfig,
}

impl TickLoop {
    /// Runs until the liveness flag flips or the stop channel
    /// disconnects. Always closes the frame source before returning, so
    /// a `join` on the worker doubles as "stream released".
    pub(crate) fn run(mut self, alive: Arc<AtomicBool>, stop_rx: Receiver<()>) {
        self.logger.info("surveillance loop started");

        // First tick is allowed immediately.
        let mut last_check = Instant::now() - self.config.check_interval;

        loop {
            if !alive.load(Ordering::Relaxed) {
                break;
            }

            let wait = if self.source.is_ready() {
                self.config
                    .check_interval
                    .saturating_sub(last_check.elapsed())
            } else {
                self.config.retry_interval
            };

            select! {
                recv(stop_rx) -> _ => break,
                recv(after(wait)) -> _ => {}
            }

            if !alive.load(Ordering::Relaxed) {
                break;
            }
            if !self.source.is_ready() {
                continue;
            }
            // Early wakeups reschedule without doing work.
            if last_check.elapsed() < self.config.check_interval {
                continue;
            }
            last_check = Instant::now();

            self.tick();
        }

        self.source.close();
        self.logger.info("surveillance loop stopped");
    }

    /// One sampling-and-classification step. Failures never escape:
    /// they are logged and the tick becomes a no-op that leaves the
    /// classifier untouched.
    fn tick(&mut self) {
        let frame = match self.source.current_frame() {
            Ok(Some(frame)) if frame.has_dimensions() => frame,
            Ok(_) => {
                self.logger.skipped("no decodable frame");
                return;
            }
            Err(e) => {
                self.logger.skipped(&format!("frame source error: {e}"));
                return;
            }
        };

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                self.logger.skipped(&format!("inference error: {e}"));
                return;
            }
        };

        if let [single] = detections.as_slice() {
            if let Some(tilt) = single.landmarks.jaw_tilt_degrees() {
                log::debug!("jaw tilt diagnostic: {tilt:.1} degrees");
            }
        }

        let Some(signal) = signal_extractor::extract(&detections) else {
            self.logger.skipped("detection with unusable landmarks");
            return;
        };

        if let Some(event) = self.classifier.observe(signal, frame.timestamp_ms()) {
            self.logger.fraud(&event);
            guarded_call(|| (self.on_fraud)(event), "fraud callback");
        }

        let streaks = self.classifier.streaks();
        self.logger.tick(&signal, &streaks);
        if let Some(on_warning) = &self.on_warning {
            guarded_call(|| on_warning(streaks), "warning callback");
        }
    }
}

/// Invokes a host callback, absorbing panics so an unreachable host
/// cannot stall or corrupt the state machine.
fn guarded_call<F: FnOnce()>(f: F, what: &str) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        log::error!("{what} panicked; surveillance continues");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection::Detection;
    use crate::detection::infrastructure::scripted_detector::ScriptedDetector;
    use crate::shared::frame::Frame;
    use crate::surveillance::domain::fraud_classifier::ClassifierConfig;
    use crate::surveillance::surveillance_logger::NullSurveillanceLogger;
    use crate::video::infrastructure::synthetic_frame_source::SyntheticFrameSource;
    use crossbeam_channel::{unbounded, Sender};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            check_interval: Duration::from_millis(5),
            retry_interval: Duration::from_millis(5),
        }
    }

    fn spawn_loop(
        detector: Box<dyn FaceDetector>,
        source: Box<dyn FrameSource>,
        on_fraud: FraudCallback,
    ) -> (Arc<AtomicBool>, Sender<()>, std::thread::JoinHandle<()>) {
        let alive = Arc::new(AtomicBool::new(true));
        let (stop_tx, stop_rx) = unbounded::<()>();
        let tick_loop = TickLoop {
            source,
            detector,
            classifier: FraudClassifier::new(ClassifierConfig::default()),
            logger: Box::new(NullSurveillanceLogger),
            on_fraud,
            on_warning: None,
            config: fast_config(),
        };
        let alive_for_loop = alive.clone();
        let handle = std::thread::spawn(move || tick_loop.run(alive_for_loop, stop_rx));
        (alive, stop_tx, handle)
    }

    struct CountingDetector {
        calls: Arc<AtomicUsize>,
    }

    impl FaceDetector for CountingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Err("model exploded".into())
        }
    }

    #[test]
    fn test_sustained_absence_emits_one_no_face_event() {
        let (event_tx, event_rx) = unbounded::<FraudEvent>();
        let detector = ScriptedDetector::new(vec![Vec::new()]);
        let source = SyntheticFrameSource::new(8, 8);
        let (alive, _stop_tx, handle) = spawn_loop(
            Box::new(detector),
            Box::new(source),
            Box::new(move |e| {
                let _ = event_tx.send(e);
            }),
        );

        let event = event_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("NO_FACE event within three fast ticks");
        assert_eq!(
            event.fraud_type,
            crate::surveillance::domain::fraud_event::FraudType::NoFace
        );

        // Debounced: absence continues but no second event arrives.
        assert!(event_rx.recv_timeout(Duration::from_millis(100)).is_err());

        alive.store(false, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn test_multiple_faces_re_emits_every_tick() {
        let (event_tx, event_rx) = unbounded::<FraudEvent>();
        let detector = ScriptedDetector::new(vec![ScriptedDetector::two_faces()]);
        let source = SyntheticFrameSource::new(8, 8);
        let (alive, _stop_tx, handle) = spawn_loop(
            Box::new(detector),
            Box::new(source),
            Box::new(move |e| {
                let _ = event_tx.send(e);
            }),
        );

        for _ in 0..3 {
            let event = event_rx
                .recv_timeout(Duration::from_secs(2))
                .expect("MULTIPLE_FACES re-emitted each tick");
            assert_eq!(
                event.fraud_type,
                crate::surveillance::domain::fraud_event::FraudType::MultipleFaces
            );
        }

        alive.store(false, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn test_detector_errors_freeze_the_classifier() {
        let (event_tx, event_rx) = unbounded::<FraudEvent>();
        let (alive, _stop_tx, handle) = spawn_loop(
            Box::new(FailingDetector),
            Box::new(SyntheticFrameSource::new(8, 8)),
            Box::new(move |e| {
                let _ = event_tx.send(e);
            }),
        );

        // Plenty of failing ticks; had they counted as "no face", the
        // threshold would have fired well within this window.
        assert!(event_rx.recv_timeout(Duration::from_millis(200)).is_err());

        alive.store(false, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn test_not_ready_source_runs_no_ticks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = SyntheticFrameSource::new(8, 8);
        source.ready_flag().store(false, Ordering::Relaxed);
        let (alive, _stop_tx, handle) = spawn_loop(
            Box::new(CountingDetector {
                calls: calls.clone(),
            }),
            Box::new(source),
            Box::new(|_| {}),
        );

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        alive.store(false, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn test_stop_channel_disconnect_ends_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (alive, stop_tx, handle) = spawn_loop(
            Box::new(CountingDetector {
                calls: calls.clone(),
            }),
            Box::new(SyntheticFrameSource::new(8, 8)),
            Box::new(|_| {}),
        );

        alive.store(false, Ordering::Relaxed);
        drop(stop_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_panicking_callback_does_not_stall_classification() {
        let fraud_count = Arc::new(AtomicUsize::new(0));
        let seen = fraud_count.clone();
        let detector = ScriptedDetector::new(vec![ScriptedDetector::two_faces()]);
        let (alive, _stop_tx, handle) = spawn_loop(
            Box::new(detector),
            Box::new(SyntheticFrameSource::new(8, 8)),
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                panic!("host is broken");
            }),
        );

        // The callback panics on every event, yet events keep flowing.
        let deadline = Instant::now() + Duration::from_secs(2);
        while fraud_count.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(fraud_count.load(Ordering::SeqCst) >= 3);

        alive.store(false, Ordering::Relaxed);
        handle.join().unwrap();
    }

    #[test]
    fn test_warning_callback_sees_streak_progress() {
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let sink = snapshots.clone();
        let alive = Arc::new(AtomicBool::new(true));
        let (_stop_tx, stop_rx) = unbounded::<()>();
        let tick_loop = TickLoop {
            source: Box::new(SyntheticFrameSource::new(8, 8)),
            detector: Box::new(ScriptedDetector::new(vec![Vec::new()])),
            classifier: FraudClassifier::new(ClassifierConfig::default()),
            logger: Box::new(NullSurveillanceLogger),
            on_fraud: Box::new(|_| {}),
            on_warning: Some(Box::new(move |s| {
                sink.lock().unwrap().push(s);
            })),
            config: fast_config(),
        };
        let alive_for_loop = alive.clone();
        let handle = std::thread::spawn(move || tick_loop.run(alive_for_loop, stop_rx));

        let deadline = Instant::now() + Duration::from_secs(2);
        while snapshots.lock().unwrap().len() < 2 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        alive.store(false, Ordering::Relaxed);
        handle.join().unwrap();

        let seen = snapshots.lock().unwrap();
        assert!(seen.len() >= 2);
        assert_eq!(seen[0].no_face, 1);
        assert_eq!(seen[1].no_face, 2);
    }
}
