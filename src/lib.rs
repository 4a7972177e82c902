//! Per-frame anomaly detection on top of a YOLO-family person detector.
//!
//! A frame is preprocessed into the detector's input tensor, run through an
//! external [`InferenceBackend`], and the raw output is decoded and scored
//! into a single [`DetectionVerdict`]. Scoring is stateful (box history and
//! debounce counters), so one [`AnomalyScorer`] serves one monitoring session.

mod utils;
mod detectors;
mod error;
pub mod alerts;
pub mod anomaly_scorer;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod send_channels;

pub use crate::anomaly_scorer::AnomalyScorer;
pub use crate::common::{Category, DetectionVerdict, RawFrame, ScorerConfig};
pub use crate::detection_runners::image_ops::preprocess;
pub use crate::detection_runners::inference_process::{AnomalyPipeline, InferenceBackend};
pub use crate::detection_runners::input_wrapper::InputTensor;
pub use crate::detectors::{spawn_monitor, MonitorHandle, MonitorStats};
pub use crate::error::{DetectError, Result};

/// Builds a scorer from the config file at the default location (or defaults).
pub fn init_scorer() -> anyhow::Result<AnomalyScorer> {
    let config = data::load_default_config()?;
    log::info!("Initializing scorer\n{}", config.to_string());
    Ok(AnomalyScorer::new(config)?)
}

/// Builds a pipeline and starts its monitor worker.
pub fn start_session<B: InferenceBackend + 'static>(backend: B, config: ScorerConfig) -> anyhow::Result<MonitorHandle<B>> {
    let mut pipeline = AnomalyPipeline::new(backend, config)?;
    pipeline.warm_up()?;
    spawn_monitor(pipeline)
}
