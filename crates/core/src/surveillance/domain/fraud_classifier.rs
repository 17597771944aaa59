//! Per-tick hysteresis state machine over the extracted signals.
//!
//! Noisy per-frame observations become a stable fraud determination:
//! no-face and turned-face conditions must hold for a full streak of
//! consecutive ticks before an event fires, while multiple faces fire
//! immediately and on every tick they persist. A single clear frame
//! fully resets both streaks; there is no decay.

use crate::shared::constants::{EYE_RATIO_THRESHOLD, FACE_TURNED_THRESHOLD, NO_FACE_THRESHOLD};
use crate::surveillance::domain::fraud_event::FraudEvent;
use crate::surveillance::domain::tick_signal::TickSignal;

/// Debounce thresholds. Defaults mirror the shared constants; tests
/// construct tighter configurations.
#[derive(Clone, Copy, Debug)]
pub struct ClassifierConfig {
    pub no_face_threshold: u32,
    pub face_turned_threshold: u32,
    pub eye_ratio_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            no_face_threshold: NO_FACE_THRESHOLD,
            face_turned_threshold: FACE_TURNED_THRESHOLD,
            eye_ratio_threshold: EYE_RATIO_THRESHOLD,
        }
    }
}

/// Consecutive-tick counters. Reset to zero the moment their condition
/// fails; a single good frame clears a streak entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FraudCounters {
    pub no_face_streak: u32,
    pub turned_streak: u32,
}

/// The debounced determination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FraudState {
    Clear,
    NoFace,
    MultipleFaces,
    FaceTurned,
}

/// Pre-threshold streak counts, surfaced so a host UI can warn before a
/// fraud event fires. Not part of the fraud contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakSnapshot {
    pub no_face: u32,
    pub no_face_threshold: u32,
    pub face_turned: u32,
    pub face_turned_threshold: u32,
}

/// The fraud classifier: owns the counters and state, consumes one
/// signal per tick, and emits at most one event per tick.
///
/// Never errors. Skipped ticks (inference failure, unreadable frame,
/// degenerate landmarks) are expressed by not calling [`observe`] at
/// all, which freezes counters and state.
///
/// [`observe`]: FraudClassifier::observe
pub struct FraudClassifier {
    config: ClassifierConfig,
    counters: FraudCounters,
    state: FraudState,
}

impl FraudClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            counters: FraudCounters::default(),
            state: FraudState::Clear,
        }
    }

    pub fn state(&self) -> FraudState {
        self.state
    }

    pub fn counters(&self) -> FraudCounters {
        self.counters
    }

    pub fn streaks(&self) -> StreakSnapshot {
        StreakSnapshot {
            no_face: self.counters.no_face_streak,
            no_face_threshold: self.config.no_face_threshold,
            face_turned: self.counters.turned_streak,
            face_turned_threshold: self.config.face_turned_threshold,
        }
    }

    /// Advances the state machine by one tick.
    ///
    /// Debounced events fire exactly once, on the tick where the streak
    /// first reaches its threshold. `MultipleFaces` fires on every
    /// qualifying tick. Known quirks, pinned by tests:
    ///
    /// - a clear frame recovers `FaceTurned` to `Clear`, but `NoFace`
    ///   and `MultipleFaces` latch until another fraud state supersedes
    ///   them;
    /// - a multi-face tick resets the no-face streak but leaves the
    ///   turned streak untouched.
    pub fn observe(&mut self, signal: TickSignal, timestamp_ms: u64) -> Option<FraudEvent> {
        match signal {
            TickSignal::NoFaces => {
                self.counters.no_face_streak += 1;
                self.counters.turned_streak = 0;
                if self.counters.no_face_streak >= self.config.no_face_threshold {
                    let crossing = self.counters.no_face_streak == self.config.no_face_threshold;
                    self.state = FraudState::NoFace;
                    crossing.then(|| FraudEvent::no_face(timestamp_ms))
                } else {
                    None
                }
            }
            TickSignal::MultipleFaces { count } => {
                self.counters.no_face_streak = 0;
                self.state = FraudState::MultipleFaces;
                Some(FraudEvent::multiple_faces(count, timestamp_ms))
            }
            TickSignal::SingleFace { eye_ratio } => {
                self.counters.no_face_streak = 0;
                if eye_ratio < self.config.eye_ratio_threshold {
                    self.counters.turned_streak += 1;
                    if self.counters.turned_streak >= self.config.face_turned_threshold {
                        let crossing =
                            self.counters.turned_streak == self.config.face_turned_threshold;
                        self.state = FraudState::FaceTurned;
                        crossing.then(|| FraudEvent::face_turned(eye_ratio, timestamp_ms))
                    } else {
                        None
                    }
                } else {
                    self.counters.turned_streak = 0;
                    if self.state == FraudState::FaceTurned {
                        self.state = FraudState::Clear;
                    }
                    None
                }
            }
        }
    }
}

impl Default for FraudClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
