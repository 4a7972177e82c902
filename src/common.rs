mod detection_box;
mod inference_device;
mod model_config;
mod output_layout;
mod raw_frame;
mod verdict;

pub use detection_box::*;
pub use inference_device::*;
pub use model_config::*;
pub use output_layout::*;
pub use raw_frame::*;
pub use verdict::*;
