use std::time::Instant;
use crate::common::{DetectionVerdict, RawFrame, ScorerConfig};
use crate::anomaly_scorer::AnomalyScorer;
use crate::data::TimeCalc;
use crate::detection_runners::image_ops;
use crate::detection_runners::input_wrapper::InputTensor;
use crate::error::{DetectError, Result};
use crate::utils;

/// The detector itself. Takes a `[1, 3, S, S]` tensor and returns the flat
/// raw output. Failures should be reported as
/// [`DetectError::InferenceUnavailable`].
pub trait InferenceBackend: Send {
    fn name(&self) -> &'static str;

    fn infer(&mut self, x: &InputTensor) -> Result<Vec<f32>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self, _input_size: u32) -> Result<()> {
        Ok(())
    }
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn infer(&mut self, x: &InputTensor) -> Result<Vec<f32>> {
        (**self).infer(x)
    }

    fn warm_up(&mut self, input_size: u32) -> Result<()> {
        (**self).warm_up(input_size)
    }
}

const STAGE_PREPROCESS: usize = 0;
const STAGE_INFERENCE: usize = 1;
const STAGE_SCORING: usize = 2;

/// Preprocess, infer and score for one frame at a time.
pub struct AnomalyPipeline<B: InferenceBackend> {
    backend: B,
    scorer: AnomalyScorer,
    timing: TimeCalc,
}

impl<B: InferenceBackend> AnomalyPipeline<B> {
    pub fn new(backend: B, config: ScorerConfig) -> Result<Self> {
        let scorer = AnomalyScorer::new(config)?;
        log::info!("Pipeline using '{}' backend\n{}", backend.name(), scorer.config().to_string());
        Ok(Self {
            backend,
            scorer,
            timing: TimeCalc::default(),
        })
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    pub fn timing(&self) -> &TimeCalc {
        &self.timing
    }

    pub fn warm_up(&mut self) -> Result<()> {
        self.backend.warm_up(self.scorer.config().input_size)
    }

    /// Starts a new session: clears scorer state and timings.
    pub fn reset(&mut self) {
        self.scorer.reset();
        self.timing.clear();
    }

    /// Runs one frame through the pipeline. Never fails: any error becomes a
    /// degraded verdict and the scorer's counters decay.
    pub fn process_frame(&mut self, frame: &RawFrame) -> DetectionVerdict {
        let start = Instant::now();
        let config = self.scorer.config();

        let x = match image_ops::preprocess(frame, config.input_size, config.resize) {
            Ok(x) => x,
            Err(err) => return self.scorer.fail(&err),
        };
        let mut elapsed = utils::trace("TIME", "Preprocessing input", start, Default::default());
        self.timing.add_or_push(STAGE_PREPROCESS, elapsed);

        let raw = match self.backend.infer(&x) {
            Ok(raw) => raw,
            Err(err) => {
                let err = match err {
                    DetectError::InferenceUnavailable(_) => err,
                    other => DetectError::InferenceUnavailable(other.to_string()),
                };
                return self.scorer.fail(&err);
            }
        };
        drop(x);
        let prev = elapsed;
        elapsed = utils::trace("TIME", "Inference", start, prev);
        self.timing.add_or_push(STAGE_INFERENCE, elapsed - prev);

        let verdict = self.scorer.score(&raw);
        let prev = elapsed;
        elapsed = utils::trace("TIME", "Scoring", start, prev);
        self.timing.add_or_push(STAGE_SCORING, elapsed - prev);
        self.timing.tick();

        verdict
    }
}
