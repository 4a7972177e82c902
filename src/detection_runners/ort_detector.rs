pub mod image_ops;
pub mod input_wrapper;
#[cfg(feature = "ort")]
mod ort_engine;

#[cfg(feature = "ort")]
pub use ort_engine::*;
