use serde::{Serialize, Serializer};
use crate::error::DetectError;

pub const LABEL_NORMAL: &str = "normal";
pub const LABEL_NONE_DETECTED: &str = "none-detected";
pub const LABEL_PERSON_DOWN: &str = "person-down";
pub const LABEL_UNUSUAL_POSTURE: &str = "unusual-posture";
pub const LABEL_RAPID_MOVEMENT: &str = "rapid-movement";
pub const LABEL_INVALID_FRAME: &str = "invalid-frame";
pub const LABEL_DECODE_ERROR: &str = "decode-error";
pub const LABEL_INFERENCE_UNAVAILABLE: &str = "inference-unavailable";

/// What a verdict is about. Serialized as its label string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// Primary subject seen, no rule fired.
    Normal,
    NoneDetected,
    PersonDown,
    UnusualPosture,
    RapidMovement,
    /// Confirmed escalatable class, carrying the configured category label.
    Escalation(String),
    InvalidFrame,
    DecodeError,
    InferenceUnavailable,
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Category::Normal => LABEL_NORMAL,
            Category::NoneDetected => LABEL_NONE_DETECTED,
            Category::PersonDown => LABEL_PERSON_DOWN,
            Category::UnusualPosture => LABEL_UNUSUAL_POSTURE,
            Category::RapidMovement => LABEL_RAPID_MOVEMENT,
            Category::Escalation(label) => label.as_str(),
            Category::InvalidFrame => LABEL_INVALID_FRAME,
            Category::DecodeError => LABEL_DECODE_ERROR,
            Category::InferenceUnavailable => LABEL_INFERENCE_UNAVAILABLE,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Category::InvalidFrame | Category::DecodeError | Category::InferenceUnavailable)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The single per-frame output handed to the alert layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionVerdict {
    pub is_anomalous: bool,
    pub confidence: f32,
    pub category: Category,
}

impl DetectionVerdict {
    pub fn anomaly(confidence: f32, category: Category) -> Self {
        Self {
            is_anomalous: true,
            confidence: confidence.clamp(0., 1.),
            category,
        }
    }

    pub fn normal(confidence: f32) -> Self {
        Self {
            is_anomalous: false,
            confidence: confidence.clamp(0., 1.),
            category: Category::Normal,
        }
    }

    pub fn none_detected(best_seen: f32) -> Self {
        Self {
            is_anomalous: false,
            confidence: best_seen.clamp(0., 1.),
            category: Category::NoneDetected,
        }
    }

    /// Safe verdict for a frame that could not be processed.
    pub fn from_error(err: &DetectError) -> Self {
        let category = match err {
            DetectError::InvalidFrame { .. } => Category::InvalidFrame,
            DetectError::InferenceUnavailable(_) => Category::InferenceUnavailable,
            DetectError::Decode { .. }
            | DetectError::NonFiniteBox { .. }
            | DetectError::Tensor(_) | DetectError::Config(_) => Category::DecodeError,
        };
        Self {
            is_anomalous: false,
            confidence: 0.,
            category,
        }
    }
}
