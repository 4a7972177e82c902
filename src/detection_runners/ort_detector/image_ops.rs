//! File adapted from: https://github.com/jamjamjon
//!
//! Frame preprocessing: stretch to the model's square input and lay the
//! channels out planar, scaled to `[0, 1]`.

use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::imageops;
use rayon::prelude::*;
use crate::common::{RawFrame, ResizeKind};
use crate::detection_runners::input_wrapper::InputTensor;
use crate::error::{DetectError, Result};

const CHANNELS: usize = 3;

/// Turns a frame of any size into a `[1, 3, S, S]` tensor.
///
/// Fails only for frames with a zero dimension.
pub fn preprocess(frame: &RawFrame, target_size: u32, resize: ResizeKind) -> Result<InputTensor> {
    let (w, h) = (frame.width(), frame.height());
    if w == 0 || h == 0 || target_size == 0 {
        return Err(DetectError::InvalidFrame { width: w, height: h });
    }

    let resized = if w == target_size && h == target_size {
        frame.as_raw().clone()
    } else {
        resize_exact(frame, target_size, resize)
    };

    let planar = nchw_normalize_flat(&resized, target_size as usize);
    InputTensor::from_planar(target_size as usize, planar)
}

fn resize_options(kind: ResizeKind) -> ResizeOptions {
    let alg = match kind {
        ResizeKind::Nearest => ResizeAlg::Nearest,
        ResizeKind::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
    };
    ResizeOptions::new().resize_alg(alg)
}

/// Resizes to `target x target` and returns interleaved RGB8 bytes.
fn resize_exact(frame: &RawFrame, target: u32, kind: ResizeKind) -> Vec<u8> {
    let fast = FirImage::from_vec_u8(frame.width(), frame.height(), frame.as_raw().clone(), PixelType::U8x3)
        .map_err(|err| err.to_string())
        .and_then(|src| {
            let mut dst = FirImage::new(target, target, PixelType::U8x3);
            Resizer::new()
                .resize(&src, &mut dst, &resize_options(kind))
                .map_err(|err| err.to_string())?;
            Ok(dst.buffer().to_vec())
        });

    match fast {
        Ok(buf) => buf,
        Err(err) => {
            log::warn!("fast_image_resize failed ({err}), falling back to image::imageops");
            let filter = match kind {
                ResizeKind::Nearest => imageops::FilterType::Nearest,
                ResizeKind::Bilinear => imageops::FilterType::Triangle,
            };
            imageops::resize(&frame.image, target, target, filter).into_raw()
        }
    }
}

/// Interleaved RGB8 to planar f32, one channel plane per rayon task.
fn nchw_normalize_flat(buf: &[u8], size: usize) -> Vec<f32> {
    let hw = size * size;
    let mut out = vec![0.0f32; CHANNELS * hw];

    out.par_chunks_mut(hw)
        .enumerate()
        .for_each(|(c, plane)| {
            for (i, v) in plane.iter_mut().enumerate() {
                *v = buf[CHANNELS * i + c] as f32 / 255.0;
            }
        });

    out
}
