#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use parking_lot::Mutex;
use vigil_detect::common::{BoxField, OutputLayout};
use vigil_detect::{DetectError, InferenceBackend, InputTensor};

pub const PERSON: usize = 0;
pub const KNIFE: usize = 43;

/// Raw detector output with a single populated anchor.
pub fn raw_output(layout: &OutputLayout, anchor: usize, bbox: (f32, f32, f32, f32), confs: &[(usize, f32)]) -> Vec<f32> {
    let mut raw = vec![0.0f32; layout.expected_len()];
    raw[layout.box_offset(BoxField::Cx, anchor)] = bbox.0;
    raw[layout.box_offset(BoxField::Cy, anchor)] = bbox.1;
    raw[layout.box_offset(BoxField::W, anchor)] = bbox.2;
    raw[layout.box_offset(BoxField::H, anchor)] = bbox.3;
    for &(class_id, conf) in confs {
        raw[layout.class_offset(class_id, anchor)] = conf;
    }
    raw
}

/// Backend that replays queued outputs, one per call. An empty queue means
/// the model is unavailable.
#[derive(Clone, Default)]
pub struct Scripted {
    outputs: Arc<Mutex<VecDeque<Vec<f32>>>>,
    pub calls: Arc<Mutex<usize>>,
}

impl Scripted {
    pub fn push(&self, raw: Vec<f32>) {
        self.outputs.lock().push_back(raw);
    }
}

impl InferenceBackend for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn infer(&mut self, _x: &InputTensor) -> vigil_detect::Result<Vec<f32>> {
        *self.calls.lock() += 1;
        self.outputs
            .lock()
            .pop_front()
            .ok_or_else(|| DetectError::InferenceUnavailable("no output queued".to_string()))
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
