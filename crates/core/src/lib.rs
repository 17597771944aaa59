//! Exam-proctoring surveillance core.
//!
//! Consumes a live frame source and a face/landmark inference engine,
//! samples frames on a fixed interval, reduces detections to scalar
//! signals, and debounces those signals into fraud events delivered to
//! the host application.

pub mod detection;
pub mod shared;
pub mod surveillance;
pub mod video;
