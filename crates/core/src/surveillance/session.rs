//! Session lifecycle: one camera, one worker thread, one classifier.
//!
//! The worker owns the frame source and all mutable classification
//! state; the handle owns only the means to stop it. Joining on stop
//! makes teardown synchronous: when `stop` returns, the stream is
//! closed and no further tick can run, so a successor session can
//! safely claim the camera.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Sender};
use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::surveillance::domain::fraud_classifier::{ClassifierConfig, FraudClassifier};
use crate::surveillance::infrastructure::channel_tick_scheduler::{
    FraudCallback, SchedulerConfig, TickLoop, WarningCallback,
};
use crate::surveillance::surveillance_logger::SurveillanceLogger;
use crate::video::domain::frame_source::FrameSource;

/// Failures that prevent a session from ever starting. Neither is a
/// fraud type: they are surfaced to the host as an error state, and the
/// scheduler never runs.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("camera unavailable: {0}")]
    Camera(String),
    #[error("failed to load detection model: {0}")]
    ModelLoad(String),
}

impl SessionError {
    pub fn camera(e: impl std::fmt::Display) -> Self {
        Self::Camera(e.to_string())
    }

    pub fn model_load(e: impl std::fmt::Display) -> Self {
        Self::ModelLoad(e.to_string())
    }
}

/// Builder for a surveillance session.
pub struct SurveillanceSession {
    scheduler: SchedulerConfig,
    classifier: ClassifierConfig,
    logger: Box<dyn SurveillanceLogger>,
    on_warning: Option<WarningCallback>,
}

impl SurveillanceSession {
    pub fn new() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            classifier: ClassifierConfig::default(),
            logger: Box::new(crate::surveillance::surveillance_logger::LogSurveillanceLogger),
            on_warning: None,
        }
    }

    pub fn with_scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    pub fn with_classifier_config(mut self, config: ClassifierConfig) -> Self {
        self.classifier = config;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn SurveillanceLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Diagnostic callback for pre-threshold streak counts.
    pub fn with_warning_callback(mut self, on_warning: WarningCallback) -> Self {
        self.on_warning = Some(on_warning);
        self
    }

    /// Spawns the worker thread and starts sampling.
    ///
    /// The source and detector must already be constructed; their
    /// construction errors map to [`SessionError::Camera`] and
    /// [`SessionError::ModelLoad`] at the call site, which keeps a
    /// failed camera or model from ever reaching the scheduler.
    pub fn start(
        self,
        source: Box<dyn FrameSource>,
        detector: Box<dyn FaceDetector>,
        on_fraud: FraudCallback,
    ) -> SessionHandle {
        let alive = Arc::new(AtomicBool::new(true));
        let (stop_tx, stop_rx) = unbounded::<()>();

        let tick_loop = TickLoop {
            source,
            detector,
            classifier: FraudClassifier::new(self.classifier),
            logger: self.logger,
            on_fraud,
            on_warning: self.on_warning,
            config: self.scheduler,
        };

        let alive_for_loop = alive.clone();
        let worker = std::thread::spawn(move || tick_loop.run(alive_for_loop, stop_rx));

        SessionHandle {
            alive,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        }
    }
}

impl Default for SurveillanceSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of a running session. Dropping the handle stops the session.
pub struct SessionHandle {
    alive: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// True until `stop` has been observed by the worker.
    pub fn is_active(&self) -> bool {
        self.worker.is_some() && self.alive.load(Ordering::Relaxed)
    }

    /// Stops the session and waits for the worker to release the
    /// stream. Idempotent: safe to call repeatedly, including after an
    /// error path already stopped the session.
    ///
    /// Ordering matters: flip the liveness flag first so an in-flight
    /// tick exits without touching the camera again, then wake the
    /// worker by dropping the stop channel, then join.
    pub fn stop(&mut self) {
        self.alive.store(false, Ordering::Relaxed);
        self.stop_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("surveillance worker panicked during shutdown");
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::infrastructure::scripted_detector::ScriptedDetector;
    use crate::surveillance::domain::fraud_event::{FraudEvent, FraudType};
    use crate::surveillance::surveillance_logger::NullSurveillanceLogger;
    use crate::video::infrastructure::synthetic_frame_source::SyntheticFrameSource;
    use std::time::Duration;

    fn fast_session() -> SurveillanceSession {
        SurveillanceSession::new()
            .with_logger(Box::new(NullSurveillanceLogger))
            .with_scheduler_config(SchedulerConfig {
                check_interval: Duration::from_millis(5),
                retry_interval: Duration::from_millis(5),
            })
    }

    #[test]
    fn test_session_error_messages() {
        let e = SessionError::camera("permission denied");
        assert_eq!(e.to_string(), "camera unavailable: permission denied");
        let e = SessionError::model_load("no such file");
        assert_eq!(e.to_string(), "failed to load detection model: no such file");
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut handle = fast_session().start(
            Box::new(SyntheticFrameSource::new(8, 8)),
            Box::new(ScriptedDetector::new(vec![ScriptedDetector::frontal_face()])),
            Box::new(|_| {}),
        );
        assert!(handle.is_active());

        handle.stop();
        assert!(!handle.is_active());
        handle.stop();
        assert!(!handle.is_active());
    }

    #[test]
    fn test_drop_stops_the_worker() {
        let handle = fast_session().start(
            Box::new(SyntheticFrameSource::new(8, 8)),
            Box::new(ScriptedDetector::new(vec![ScriptedDetector::frontal_face()])),
            Box::new(|_| {}),
        );
        // Dropping must not hang or leak the worker.
        drop(handle);
    }

    #[test]
    fn test_no_events_after_stop() {
        let (event_tx, event_rx) = crossbeam_channel::unbounded::<FraudEvent>();
        let mut handle = fast_session().start(
            Box::new(SyntheticFrameSource::new(8, 8)),
            Box::new(ScriptedDetector::new(vec![ScriptedDetector::two_faces()])),
            Box::new(move |e| {
                let _ = event_tx.send(e);
            }),
        );

        // Wait for the first immediate event, then stop.
        let first = event_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.fraud_type, FraudType::MultipleFaces);
        handle.stop();

        // stop() joined the worker, so no tick can run anymore. Drain
        // anything emitted before the join, then confirm silence.
        while event_rx.try_recv().is_ok() {}
        assert!(event_rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_turned_face_scenario_end_to_end() {
        let (event_tx, event_rx) = crossbeam_channel::unbounded::<FraudEvent>();
        let mut handle = fast_session().start(
            Box::new(SyntheticFrameSource::new(8, 8)),
            Box::new(ScriptedDetector::new(vec![ScriptedDetector::turned_face()])),
            Box::new(move |e| {
                let _ = event_tx.send(e);
            }),
        );

        let event = event_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event.fraud_type, FraudType::FaceTurned);
        assert!(event.details.contains("0.10"));
        // Debounced: no second FACE_TURNED while the face stays turned.
        assert!(event_rx.recv_timeout(Duration::from_millis(100)).is_err());

        handle.stop();
    }

    #[test]
    fn test_warning_callback_is_wired_through() {
        let (warn_tx, warn_rx) = crossbeam_channel::unbounded();
        let mut handle = fast_session()
            .with_warning_callback(Box::new(move |s| {
                let _ = warn_tx.send(s);
            }))
            .start(
                Box::new(SyntheticFrameSource::new(8, 8)),
                Box::new(ScriptedDetector::new(vec![Vec::new()])),
                Box::new(|_| {}),
            );

        let snapshot = warn_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(snapshot.no_face_threshold, 3);
        handle.stop();
    }
}
