use ndarray::{Array, IxDyn};
use crate::error::Result;

/// Model input: a `[1, 3, S, S]` planar tensor with values in `[0, 1]`.
/// Built fresh per frame and consumed by a single inference call.
#[derive(Debug, Clone, Default)]
pub struct InputTensor(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for InputTensor {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl std::ops::Deref for InputTensor {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl InputTensor {
    /// Wraps channel-major planar data for a square `size x size` image.
    pub fn from_planar(size: usize, xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec((1, 3, size, size), xs)?.into_dyn()))
    }

    /// Side length `S`, or 0 for an empty tensor.
    pub fn size(&self) -> usize {
        match self.0.shape() {
            [1, 3, h, _] => *h,
            _ => 0,
        }
    }

    /// Value of channel `c` at pixel `(x, y)`.
    pub fn at(&self, c: usize, x: usize, y: usize) -> Option<f32> {
        self.0.get(&[0, c, y, x][..]).copied()
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }
}
