//! File/code adapted from https://github.com/jamjamjon/usls

use std::time::Duration;

/// Accumulated per-stage durations over a number of frames.
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    frames: usize,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Average time per frame across all stages.
    pub fn avg(&self) -> Option<Duration> {
        (self.frames > 0).then(|| self.total() / self.frames as u32)
    }

    /// Average time per frame for stage `i`.
    pub fn avg_i(&self, i: usize) -> Option<Duration> {
        if self.frames == 0 {
            return None;
        }
        self.duration.get(i).map(|d| *d / self.frames as u32)
    }

    pub fn ts(&self) -> &Vec<Duration> {
        &self.duration
    }

    pub fn add_or_push(&mut self, i: usize, x: Duration) {
        match self.duration.get_mut(i) {
            Some(elem) => *elem += x,
            None => {
                self.duration.resize(i, Duration::ZERO);
                self.duration.push(x);
            }
        }
    }

    /// Marks the end of one frame.
    pub fn tick(&mut self) {
        self.frames += 1;
    }

    pub fn clear(&mut self) {
        self.frames = Default::default();
        self.duration = Default::default();
    }
}
