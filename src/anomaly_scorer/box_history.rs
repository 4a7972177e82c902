use std::collections::VecDeque;
use crate::common::DetectionBox;

/// Most recent accepted primary-subject boxes, oldest evicted first.
#[derive(Debug, Clone)]
pub struct BoxHistory {
    boxes: VecDeque<DetectionBox>,
    capacity: usize,
}

impl BoxHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            boxes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, bbox: DetectionBox) {
        while self.boxes.len() >= self.capacity {
            self.boxes.pop_front();
        }
        self.boxes.push_back(bbox);
    }

    pub fn latest(&self) -> Option<&DetectionBox> {
        self.boxes.back()
    }

    /// Top-left displacement from the latest stored box, 0 when empty.
    pub fn displacement_from_latest(&self, bbox: &DetectionBox) -> f32 {
        self.latest().map_or(0., |prev| prev.displacement(bbox))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionBox> {
        self.boxes.iter()
    }
}
