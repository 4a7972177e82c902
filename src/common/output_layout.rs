//! Raw detector output layout.
//!
//! The detector exports a single `[1, 4 + nc, na]` tensor (anchors last, the
//! YOLOv8/YOLO11 export family). Flattened, that is:
//!
//! ```text
//! [ cx_0 .. cx_na | cy_0 .. cy_na | w_0 .. w_na | h_0 .. h_na |
//!   cls0_0 .. cls0_na | cls1_0 .. cls1_na | ... ]
//! ```
//!
//! Box fields are in model input pixels. Nothing here infers the layout from
//! the data; anchor and class counts always come from configuration.

use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use crate::common::DetectionBox;
use crate::error::{DetectError, Result};

/// Number of box rows ahead of the class rows.
pub const BOX_FIELDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxField {
    Cx = 0,
    Cy = 1,
    W = 2,
    H = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    pub num_anchors: usize,
    pub num_classes: usize,
}

impl Default for OutputLayout {
    fn default() -> Self {
        // 640x640 input: 80*80 + 40*40 + 20*20 anchors, COCO vocabulary
        Self {
            num_anchors: 8400,
            num_classes: 80,
        }
    }
}

impl OutputLayout {
    pub fn new(num_anchors: usize, num_classes: usize) -> Self {
        Self { num_anchors, num_classes }
    }

    pub fn rows(&self) -> usize {
        BOX_FIELDS.saturating_add(self.num_classes)
    }

    /// `num_anchors * (4 + num_classes)`, or `None` if that overflows.
    pub fn checked_len(&self) -> Option<usize> {
        BOX_FIELDS
            .checked_add(self.num_classes)
            .and_then(|rows| rows.checked_mul(self.num_anchors))
    }

    /// Like [`OutputLayout::checked_len`], saturating at `usize::MAX`.
    pub fn expected_len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    pub fn box_offset(&self, field: BoxField, anchor: usize) -> usize {
        field as usize * self.num_anchors + anchor
    }

    pub fn class_offset(&self, class_id: usize, anchor: usize) -> usize {
        self.num_anchors * BOX_FIELDS + class_id * self.num_anchors + anchor
    }

    /// Checks the buffer length against the layout and returns it as a
    /// `(4 + nc, na)` view. Any mismatch is a decode error.
    pub fn view<'a>(&self, raw: &'a [f32]) -> Result<OutputView<'a>> {
        match self.checked_len() {
            Some(len) if len == raw.len() && self.num_anchors > 0 => {}
            other => {
                return Err(DetectError::Decode {
                    expected: other.unwrap_or(usize::MAX),
                    actual: raw.len(),
                })
            }
        }
        let rows = ArrayView2::from_shape((self.rows(), self.num_anchors), raw)?;
        Ok(OutputView { rows })
    }
}

/// Validated view over one frame's raw output.
#[derive(Debug, Clone)]
pub struct OutputView<'a> {
    rows: ArrayView2<'a, f32>,
}

impl<'a> OutputView<'a> {
    pub fn num_anchors(&self) -> usize {
        self.rows.len_of(Axis(1))
    }

    pub fn num_classes(&self) -> usize {
        self.rows.len_of(Axis(0)) - BOX_FIELDS
    }

    /// Confidences of one class across all anchors.
    pub fn class_row(&self, class_id: usize) -> Option<ArrayView1<'_, f32>> {
        if class_id >= self.num_classes() {
            return None;
        }
        Some(self.rows.row(BOX_FIELDS + class_id))
    }

    pub fn bbox(&self, anchor: usize) -> DetectionBox {
        let col = self.rows.column(anchor);
        DetectionBox::new(
            col[BoxField::Cx as usize],
            col[BoxField::Cy as usize],
            col[BoxField::W as usize],
            col[BoxField::H as usize],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_anchor_major_transpose() {
        let layout = OutputLayout::new(8400, 80);
        assert_eq!(layout.box_offset(BoxField::Cx, 7), 7);
        assert_eq!(layout.box_offset(BoxField::Cy, 7), 8407);
        assert_eq!(layout.box_offset(BoxField::W, 7), 16807);
        assert_eq!(layout.box_offset(BoxField::H, 7), 25207);
        assert_eq!(layout.class_offset(0, 7), 33607);
        assert_eq!(layout.class_offset(79, 8399), layout.expected_len() - 1);
    }

    #[test]
    fn view_reads_the_same_cells_as_offsets() {
        let layout = OutputLayout::new(3, 2);
        let raw: Vec<f32> = (0..layout.expected_len()).map(|v| v as f32).collect();
        let view = layout.view(&raw).unwrap();

        let b = view.bbox(2);
        assert_eq!(b.cx, raw[layout.box_offset(BoxField::Cx, 2)]);
        assert_eq!(b.cy, raw[layout.box_offset(BoxField::Cy, 2)]);
        assert_eq!(b.w, raw[layout.box_offset(BoxField::W, 2)]);
        assert_eq!(b.h, raw[layout.box_offset(BoxField::H, 2)]);
        assert_eq!(view.class_row(1).unwrap()[2], raw[layout.class_offset(1, 2)]);
        assert!(view.class_row(2).is_none());
    }

    #[test]
    fn overflowing_layout_is_a_decode_error() {
        let layout = OutputLayout::new(usize::MAX / 8, 80);
        assert_eq!(layout.checked_len(), None);
        assert!(matches!(
            layout.view(&[0.; 4]),
            Err(DetectError::Decode { expected: usize::MAX, actual: 4 })
        ));
        assert_eq!(OutputLayout::new(8400, 80).checked_len(), Some(705_600));
    }

    #[test]
    fn view_rejects_wrong_lengths() {
        let layout = OutputLayout::new(4, 2);
        for len in [0, 23, 25] {
            match layout.view(&vec![0.; len]) {
                Err(DetectError::Decode { expected, actual }) => {
                    assert_eq!(expected, 24);
                    assert_eq!(actual, len);
                }
                other => panic!("expected decode error, got {:?}", other.map(|_| ())),
            }
        }
    }
}
