use std::io::Cursor;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};

/// One captured colour frame. The pipeline only borrows it for the duration
/// of a single processing call.
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    pub image: RgbImage,
}

impl std::ops::Deref for RawFrame {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<RgbImage> for RawFrame {
    fn from(image: RgbImage) -> Self {
        Self { image }
    }
}

impl From<DynamicImage> for RawFrame {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }
}

impl From<RgbaImage> for RawFrame {
    fn from(image: RgbaImage) -> Self {
        Self::from(DynamicImage::ImageRgba8(image))
    }
}

impl From<GrayImage> for RawFrame {
    fn from(image: GrayImage) -> Self {
        Self::from(DynamicImage::ImageLuma8(image))
    }
}

impl RawFrame {
    /// Wraps an interleaved RGB8 buffer. Returns `None` when the buffer is not
    /// exactly `width * height * 3` bytes.
    pub fn from_rgb8(width: u32, height: u32, buffer: Vec<u8>) -> Option<Self> {
        // padded (strided) rows would otherwise be read as packed pixels
        if buffer.len() as u64 != width as u64 * height as u64 * 3 {
            return None;
        }
        RgbImage::from_raw(width, height, buffer).map(Self::from)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn get_ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Encodes the frame as JPEG for use as an alert attachment.
    pub fn encode_jpeg(&self) -> anyhow::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)?;
        Ok(buf)
    }
}
