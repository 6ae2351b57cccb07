use std::io::Cursor;

use anyhow::Context;

use crate::foundation::error::{FourcutError, FourcutResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Final flattened composite.
///
/// `data` is row-major premultiplied RGBA8 of exactly `width * height * 4` bytes. The renderer
/// keeps no reference to it after returning.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderedImage {
    /// Premultiplied pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy suitable for the `image` crate's encoders.
    pub fn to_rgba_image(&self) -> FourcutResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        image::RgbaImage::from_raw(self.width, self.height, straight).ok_or_else(|| {
            FourcutError::validation(format!(
                "rendered buffer does not match {}x{}",
                self.width, self.height
            ))
        })
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> FourcutResult<Vec<u8>> {
        let img = self.to_rgba_image()?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }
}
