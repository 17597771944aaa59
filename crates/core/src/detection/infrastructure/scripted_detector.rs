use crate::detection::domain::detection::{BoundingBox, Detection};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;

/// Replays a pre-defined per-tick detection sequence.
///
/// Stands in for live inference in tests and in the CLI demo mode: each
/// `detect` call returns the next step of the script. Past the end the
/// script either loops or keeps returning the final step.
pub struct ScriptedDetector {
    script: Vec<Vec<Detection>>,
    cursor: usize,
    looping: bool,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<Detection>>) -> Self {
        Self {
            script,
            cursor: 0,
            looping: false,
        }
    }

    /// Restart from the first step after the last, instead of holding it.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// A frontal single-face step: eye centroids 40% of the box apart.
    pub fn frontal_face() -> Vec<Detection> {
        Self::face_with_ratio(0.4)
    }

    /// A turned single-face step: eye centroids 10% of the box apart.
    pub fn turned_face() -> Vec<Detection> {
        Self::face_with_ratio(0.1)
    }

    pub fn face_with_ratio(eye_ratio: f64) -> Vec<Detection> {
        let width = 200.0;
        let spread = width * eye_ratio;
        vec![Detection::new(
            BoundingBox {
                x: 220.0,
                y: 140.0,
                width,
                height: 240.0,
            },
            FaceLandmarks::new(
                vec![(300.0 - spread / 2.0, 220.0)],
                vec![(300.0 + spread / 2.0, 220.0)],
                vec![(240.0, 200.0), (320.0, 360.0), (400.0, 200.0)],
            ),
            0.9,
        )]
    }

    /// A two-face step built from the frontal face shifted apart.
    pub fn two_faces() -> Vec<Detection> {
        let mut faces = Self::frontal_face();
        let mut second = faces[0].clone();
        second.bounding_box.x += 250.0;
        faces.push(second);
        faces
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        let step = self.script[self.cursor.min(self.script.len() - 1)].clone();
        if self.cursor + 1 < self.script.len() {
            self.cursor += 1;
        } else if self.looping {
            self.cursor = 0;
        }
        Ok(step)
    }
}
