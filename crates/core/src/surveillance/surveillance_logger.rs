use crate::surveillance::domain::fraud_classifier::StreakSnapshot;
use crate::surveillance::domain::fraud_event::FraudEvent;
use crate::surveillance::domain::tick_signal::TickSignal;

/// Cross-cutting observer for surveillance loop events.
///
/// Decouples the scheduler from specific output mechanisms (log crate,
/// GUI signals, test recorders) so the loop can be observed without
/// changing its orchestration code.
pub trait SurveillanceLogger: Send {
    /// One classified tick: the extracted signal and the streaks after it.
    fn tick(&mut self, signal: &TickSignal, streaks: &StreakSnapshot);

    /// A tick that produced no sample and was skipped.
    fn skipped(&mut self, reason: &str);

    /// A fraud event about to be delivered to the host.
    fn fraud(&mut self, event: &FraudEvent);

    /// A human-readable status message.
    fn info(&mut self, message: &str);
}

/// Silent logger that discards all events. Used by tests where loop
/// output is irrelevant.
pub struct NullSurveillanceLogger;

impl SurveillanceLogger for NullSurveillanceLogger {
    fn tick(&mut self, _signal: &TickSignal, _streaks: &StreakSnapshot) {}
    fn skipped(&mut self, _reason: &str) {}
    fn fraud(&mut self, _event: &FraudEvent) {}
    fn info(&mut self, _message: &str) {}
}

/// Routes loop events to the `log` crate: per-tick detail at debug,
/// skipped ticks at warn, fraud events at warn.
pub struct LogSurveillanceLogger;

impl SurveillanceLogger for LogSurveillanceLogger {
    fn tick(&mut self, signal: &TickSignal, streaks: &StreakSnapshot) {
        log::debug!(
            "tick: {} face(s), eye ratio {:?}, streaks no-face {}/{} turned {}/{}",
            signal.detection_count(),
            signal.eye_ratio(),
            streaks.no_face,
            streaks.no_face_threshold,
            streaks.face_turned,
            streaks.face_turned_threshold,
        );
    }

    fn skipped(&mut self, reason: &str) {
        log::warn!("tick skipped: {reason}");
    }

    fn fraud(&mut self, event: &FraudEvent) {
        log::warn!("fraud detected: {event}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }
}
