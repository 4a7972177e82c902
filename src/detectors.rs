use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use crossbeam_channel::{select, RecvTimeoutError};
use parking_lot::Mutex;
use crate::common::{DetectionVerdict, RawFrame};
use crate::detection_runners::inference_process::{AnomalyPipeline, InferenceBackend};
use crate::send_channels::{channels, Admission, Control, DetectionState, SendState};

/// Diagnostic counters shared between the caller and the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub submitted: u64,
    pub dropped: u64,
    pub scored: u64,
    pub degraded: u64,
    pub anomalies: u64,
}

/// A running monitoring session. Frames go in through [`MonitorHandle::submit`],
/// verdicts come out in frame order on [`MonitorHandle::verdicts`].
pub struct MonitorHandle<B: InferenceBackend + 'static> {
    send: SendState,
    stats: Arc<Mutex<MonitorStats>>,
    worker: Option<JoinHandle<AnomalyPipeline<B>>>,
}

/// Moves the pipeline onto its own thread. That thread is the only caller of
/// the scorer for the lifetime of the session.
pub fn spawn_monitor<B: InferenceBackend + 'static>(pipeline: AnomalyPipeline<B>) -> anyhow::Result<MonitorHandle<B>> {
    let (send, state) = channels();
    let stats = Arc::new(Mutex::new(MonitorStats::default()));

    let worker_stats = Arc::clone(&stats);
    let worker = std::thread::Builder::new()
        .name("vigil-monitor".to_string())
        .spawn(move || detector_loop(pipeline, state, worker_stats))?;

    log::info!("Monitor session started");
    Ok(MonitorHandle {
        send,
        stats,
        worker: Some(worker),
    })
}

fn detector_loop<B: InferenceBackend>(
    mut pipeline: AnomalyPipeline<B>,
    state: DetectionState,
    stats: Arc<Mutex<MonitorStats>>,
) -> AnomalyPipeline<B> {
    loop {
        if !apply_controls(&mut pipeline, &state) {
            return pipeline;
        }

        select! {
            recv(state.control_rx) -> msg => match msg {
                Ok(Control::Reset) => pipeline.reset(),
                Ok(Control::Stop) | Err(_) => return pipeline,
            },
            recv(state.frame_rx) -> msg => {
                let Ok(frame) = msg else {
                    return pipeline;
                };
                // a reset sent before this frame must apply to it
                if !apply_controls(&mut pipeline, &state) {
                    return pipeline;
                }
                let verdict = pipeline.process_frame(&frame);
                {
                    let mut s = stats.lock();
                    s.scored += 1;
                    if verdict.category.is_error() {
                        s.degraded += 1;
                    }
                    if verdict.is_anomalous {
                        s.anomalies += 1;
                    }
                }
                if state.verdict_tx.send(verdict).is_err() {
                    log::warn!("vigil_detect: verdict receiver dropped, stopping monitor");
                    return pipeline;
                }
            },
        }
    }
}

/// Drains pending control messages. Returns `false` on stop.
fn apply_controls<B: InferenceBackend>(pipeline: &mut AnomalyPipeline<B>, state: &DetectionState) -> bool {
    while let Ok(control) = state.control_rx.try_recv() {
        match control {
            Control::Reset => pipeline.reset(),
            Control::Stop => return false,
        }
    }
    true
}

impl<B: InferenceBackend + 'static> MonitorHandle<B> {
    /// Offers a frame. A frame still waiting from an earlier call is
    /// discarded in favour of this one.
    pub fn submit(&self, frame: RawFrame) -> Admission {
        let admission = self.send.submit(frame);
        let mut s = self.stats.lock();
        s.submitted += 1;
        if admission == Admission::ReplacedStale {
            s.dropped += 1;
        }
        admission
    }

    pub fn verdicts(&self) -> &crossbeam_channel::Receiver<DetectionVerdict> {
        &self.send.verdict_rx
    }

    pub fn next_verdict(&self, timeout: Duration) -> Option<DetectionVerdict> {
        match self.send.verdict_rx.recv_timeout(timeout) {
            Ok(v) => Some(v),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Session restart: history and debounce counters are cleared before the
    /// next frame is scored.
    pub fn reset(&self) {
        if self.send.control_tx.send(Control::Reset).is_err() {
            log::warn!("Monitor worker is gone, reset dropped");
        }
    }

    pub fn stats(&self) -> MonitorStats {
        *self.stats.lock()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stops the worker and hands the pipeline back.
    pub fn stop(mut self) -> anyhow::Result<AnomalyPipeline<B>> {
        self.shutdown()
            .ok_or_else(|| anyhow::anyhow!("monitor already stopped"))?
    }

    fn shutdown(&mut self) -> Option<anyhow::Result<AnomalyPipeline<B>>> {
        let worker = self.worker.take()?;
        let _ = self.send.control_tx.send(Control::Stop);
        let joined = worker
            .join()
            .map_err(|_| anyhow::anyhow!("monitor worker panicked"));
        log::info!("Monitor session stopped: {:?}", self.stats());
        Some(joined)
    }
}

impl<B: InferenceBackend + 'static> Drop for MonitorHandle<B> {
    fn drop(&mut self) {
        if let Some(Err(err)) = self.shutdown() {
            log::error!("{err}");
        }
    }
}
