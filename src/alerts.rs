//! Operator confirmation and hand-off to the alert transport.
//!
//! Anomalous verdicts are held until a human confirms or dismisses them. Only
//! confirmed alerts reach an [`AlertSink`].

use std::time::{SystemTime, UNIX_EPOCH};
use crossbeam_channel::Sender;
use serde::Serialize;
use crate::common::DetectionVerdict;

/// Payload handed to the transport for a confirmed alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRequest {
    pub verdict: DetectionVerdict,
    pub device_id: String,
    /// JPEG bytes of the frame, when the operator attached one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_jpeg: Option<Vec<u8>>,
    pub timestamp_ms: u64,
}

impl AlertRequest {
    pub fn new(verdict: DetectionVerdict, device_id: &str, image_jpeg: Option<Vec<u8>>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            verdict,
            device_id: device_id.to_string(),
            image_jpeg,
            timestamp_ms,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Outbound alert transport. Fire-and-forget: implementations deal with
/// their own failures and never report back.
pub trait AlertSink {
    fn send(&self, alert: AlertRequest);
}

/// Writes alerts to the log.
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn send(&self, alert: AlertRequest) {
        match alert.to_json() {
            Ok(json) => log::info!("ALERT {}", json),
            Err(err) => log::warn!("Failed to serialize alert: {err}"),
        }
    }
}

/// Forwards alerts to a channel, for a transport running elsewhere.
#[derive(Debug, Clone)]
pub struct ChannelAlertSink {
    tx: Sender<AlertRequest>,
}

impl ChannelAlertSink {
    pub fn new(tx: Sender<AlertRequest>) -> Self {
        Self { tx }
    }
}

impl AlertSink for ChannelAlertSink {
    fn send(&self, alert: AlertRequest) {
        if self.tx.send(alert).is_err() {
            log::warn!("Alert transport is gone, alert dropped");
        }
    }
}

/// Holds at most one anomalous verdict awaiting an operator decision.
#[derive(Debug, Default)]
pub struct AlertGate {
    pending: Option<DetectionVerdict>,
}

impl AlertGate {
    pub fn new() -> Self {
        Default::default()
    }

    /// Queues an anomalous verdict for review. Returns `false` when the
    /// verdict is not anomalous or another one is already pending.
    pub fn offer(&mut self, verdict: &DetectionVerdict) -> bool {
        if !verdict.is_anomalous || self.pending.is_some() {
            return false;
        }
        log::info!("Alert pending review: {} ({:.2})", verdict.category, verdict.confidence);
        self.pending = Some(verdict.clone());
        true
    }

    pub fn pending(&self) -> Option<&DetectionVerdict> {
        self.pending.as_ref()
    }

    /// Sends the pending alert. Returns `false` when nothing was pending.
    pub fn confirm(&mut self, sink: &dyn AlertSink, device_id: &str, image_jpeg: Option<Vec<u8>>) -> bool {
        match self.pending.take() {
            Some(verdict) => {
                sink.send(AlertRequest::new(verdict, device_id, image_jpeg));
                true
            }
            None => false,
        }
    }

    pub fn dismiss(&mut self) -> Option<DetectionVerdict> {
        let dismissed = self.pending.take();
        if let Some(v) = &dismissed {
            log::info!("Alert dismissed: {}", v.category);
        }
        dismissed
    }
}
