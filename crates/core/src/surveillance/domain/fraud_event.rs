use std::fmt;

/// The three confirmed fraud conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FraudType {
    NoFace,
    MultipleFaces,
    FaceTurned,
}

impl fmt::Display for FraudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FraudType::NoFace => write!(f, "NO_FACE"),
            FraudType::MultipleFaces => write!(f, "MULTIPLE_FACES"),
            FraudType::FaceTurned => write!(f, "FACE_TURNED"),
        }
    }
}

/// A typed fraud notification delivered to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct FraudEvent {
    pub fraud_type: FraudType,
    /// Human-readable context (face count, eye ratio).
    pub details: String,
    /// Epoch milliseconds of the tick that confirmed the condition.
    pub timestamp_ms: u64,
}

impl FraudEvent {
    pub fn no_face(timestamp_ms: u64) -> Self {
        Self {
            fraud_type: FraudType::NoFace,
            details: "no face detected in frame".to_string(),
            timestamp_ms,
        }
    }

    pub fn multiple_faces(count: usize, timestamp_ms: u64) -> Self {
        Self {
            fraud_type: FraudType::MultipleFaces,
            details: format!("{count} faces detected"),
            timestamp_ms,
        }
    }

    pub fn face_turned(eye_ratio: f64, timestamp_ms: u64) -> Self {
        Self {
            fraud_type: FraudType::FaceTurned,
            details: format!("face turned or out of frame (eye ratio: {eye_ratio:.2})"),
            timestamp_ms,
        }
    }
}

impl fmt::Display for FraudEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.fraud_type, self.details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display_matches_wire_names() {
        assert_eq!(FraudType::NoFace.to_string(), "NO_FACE");
        assert_eq!(FraudType::MultipleFaces.to_string(), "MULTIPLE_FACES");
        assert_eq!(FraudType::FaceTurned.to_string(), "FACE_TURNED");
    }

    #[test]
    fn test_constructors_fill_details() {
        let e = FraudEvent::multiple_faces(3, 42);
        assert_eq!(e.fraud_type, FraudType::MultipleFaces);
        assert_eq!(e.details, "3 faces detected");
        assert_eq!(e.timestamp_ms, 42);

        let e = FraudEvent::face_turned(0.137, 7);
        assert_eq!(e.details, "face turned or out of frame (eye ratio: 0.14)");
    }
}
