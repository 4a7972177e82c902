use thiserror::Error;

/// Per-frame failures. None of these are fatal: each one degrades to a safe
/// non-anomalous verdict through [`crate::AnomalyScorer::fail`].
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("invalid frame dimensions: {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },

    #[error("raw output length {actual} does not match configured layout (expected {expected})")]
    Decode { expected: usize, actual: usize },

    #[error("non-finite box coordinates at anchor {anchor}")]
    NonFiniteBox { anchor: usize },

    #[error("inference unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("tensor shape error")]
    Tensor(#[from] ndarray::ShapeError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = DetectError> = std::result::Result<T, E>;
