use serde::{Deserialize, Serialize};

/// Box in model input-pixel space (`0..S`), stored the way the detector emits
/// it: centre plus size.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct DetectionBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl DetectionBox {
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self { cx, cy, w, h }
    }

    /// Returns the minimum x-coordinate of the bounding box.
    pub fn x_min(&self) -> f32 {
        self.cx - self.w / 2.
    }

    /// Returns the minimum y-coordinate of the bounding box.
    pub fn y_min(&self) -> f32 {
        self.cy - self.h / 2.
    }

    /// Returns the top-left corner as `(x, y)`.
    pub fn top_left(&self) -> (f32, f32) {
        (self.x_min(), self.y_min())
    }

    /// All four fields are finite.
    pub fn is_finite(&self) -> bool {
        [self.cx, self.cy, self.w, self.h].iter().all(|v| v.is_finite())
    }

    /// Width over height. `None` for a box with no height.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.h > 0. {
            Some(self.w / self.h)
        } else {
            None
        }
    }

    /// Vertical centre as a fraction of the square input size.
    pub fn normalized_cy(&self, input_size: u32) -> f32 {
        self.cy / input_size as f32
    }

    /// Euclidean distance between the top-left corners of two boxes.
    pub fn displacement(&self, other: &DetectionBox) -> f32 {
        let (x0, y0) = self.top_left();
        let (x1, y1) = other.top_left();
        ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
    }
}
