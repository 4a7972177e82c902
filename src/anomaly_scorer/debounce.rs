use crate::common::DebounceConfig;

/// Saturating hit counter for one escalatable class.
///
/// Each frame moves the counter one step: up on a hit (capped at
/// `max_hits`), down otherwise (floored at 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceCounter {
    hits: u8,
    max_hits: u8,
    confirm_hits: u8,
}

impl DebounceCounter {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            hits: 0,
            max_hits: config.max_hits,
            confirm_hits: config.confirm_hits,
        }
    }

    /// Records one frame and returns whether the class is now confirmed:
    /// the counter reached `confirm_hits` and this frame was itself a hit.
    pub fn observe(&mut self, hit: bool) -> bool {
        if hit {
            self.hits = (self.hits + 1).min(self.max_hits);
        } else {
            self.decay();
        }
        hit && self.hits >= self.confirm_hits
    }

    pub fn decay(&mut self) {
        self.hits = self.hits.saturating_sub(1);
    }

    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn reset(&mut self) {
        self.hits = 0;
    }
}
