use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use crate::common::{DetectionVerdict, RawFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Clear scorer history and counters.
    Reset,
    Stop,
}

/// Outcome of offering a frame to the single admission slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    /// Queued after discarding the stale frame that was waiting.
    ReplacedStale,
}

/// Worker side.
#[derive(Debug)]
pub struct DetectionState {
    pub frame_rx: Receiver<RawFrame>,
    pub control_rx: Receiver<Control>,
    pub verdict_tx: Sender<DetectionVerdict>,
}

/// Caller side.
#[derive(Debug)]
pub struct SendState {
    frame_tx: Sender<RawFrame>,
    /// Second handle on the frame slot, used only to evict a stale frame.
    stale_rx: Receiver<RawFrame>,
    pub control_tx: Sender<Control>,
    pub verdict_rx: Receiver<DetectionVerdict>,
}

pub fn channels() -> (SendState, DetectionState) {
    let (frame_tx, frame_rx) = bounded(1);
    let (control_tx, control_rx) = unbounded();
    let (verdict_tx, verdict_rx) = unbounded();
    (
        SendState {
            frame_tx,
            stale_rx: frame_rx.clone(),
            control_tx,
            verdict_rx,
        },
        DetectionState {
            frame_rx,
            control_rx,
            verdict_tx,
        },
    )
}

impl SendState {
    /// Keep-latest admission: at most one frame waits for the worker, and a
    /// newer frame replaces it.
    pub fn submit(&self, frame: RawFrame) -> Admission {
        let mut frame = frame;
        let mut replaced = false;
        loop {
            match self.frame_tx.try_send(frame) {
                Ok(()) if replaced => return Admission::ReplacedStale,
                Ok(()) => return Admission::Queued,
                // `stale_rx` keeps the slot connected, so this is always Full
                Err(err) => {
                    if self.stale_rx.try_recv().is_ok() {
                        replaced = true;
                    }
                    frame = err.into_inner();
                }
            }
        }
    }
}
