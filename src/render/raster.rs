use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::bitmap::Bitmap;
use crate::assets::fonts::{FontBlob, TextLayoutEngine};
use crate::assets::placeholder::placeholder_badge;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{FourcutError, FourcutResult};
use crate::layout::composer::{ComposedLayout, DrawCommand, TextAnchor};
use crate::render::output::RenderedImage;

use vello_cpu::kurbo::{Affine, Shape};

/// Default ceiling on output pixels (roughly a 4K square).
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 4096 * 4096;

struct RasterFont {
    blob: FontBlob,
    data: vello_cpu::peniko::FontData,
}

/// Flattens a [`ComposedLayout`] into one premultiplied RGBA8 buffer.
///
/// A rasterizer holds per-call scratch state (text shaping contexts, placeholder rasters);
/// build one per render call rather than sharing it.
pub struct Rasterizer {
    font: Option<RasterFont>,
    text_engine: TextLayoutEngine,
    max_output_pixels: u64,
    placeholders: HashMap<u32, Bitmap>,
}

impl Rasterizer {
    /// Without a font, text commands are skipped.
    pub fn new(font: Option<FontBlob>) -> Self {
        let font = font.map(|blob| {
            let data = vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::new(blob.shared_data()),
                blob.index,
            );
            RasterFont { blob, data }
        });
        Self {
            font,
            text_engine: TextLayoutEngine::new(),
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
            placeholders: HashMap::new(),
        }
    }

    pub fn with_max_output_pixels(mut self, max_output_pixels: u64) -> Self {
        self.max_output_pixels = max_output_pixels;
        self
    }

    /// Draw every command of `layout`, scaled from layout units to a `width` x `height` buffer.
    #[tracing::instrument(skip_all, fields(width = width, height = height, commands = layout.commands.len()))]
    pub fn rasterize(
        &mut self,
        layout: &ComposedLayout,
        width: u32,
        height: u32,
    ) -> FourcutResult<RenderedImage> {
        let mut pixmap = allocate_pixmap(width, height, self.max_output_pixels)?;

        let sx = scale_for(width, layout.size.width);
        let sy = scale_for(height, layout.size.height);
        let base = Affine::scale_non_uniform(sx, sy);

        let mut ctx = vello_cpu::RenderContext::new(pixmap.width(), pixmap.height());
        let mut warned_no_font = false;

        for cmd in &layout.commands {
            ctx.set_transform(base);
            ctx.set_paint_transform(Affine::IDENTITY);

            match cmd {
                DrawCommand::Fill { rect, color } => {
                    ctx.set_paint(color_to_cpu(*color));
                    ctx.fill_rect(&rect_to_cpu(*rect));
                }
                DrawCommand::Image {
                    bitmap, src, dst, ..
                } => {
                    set_bitmap_paint(&mut ctx, bitmap, *src, *dst)?;
                    ctx.fill_rect(&rect_to_cpu(*dst));
                }
                DrawCommand::Badge {
                    bitmap,
                    src,
                    center,
                    diameter,
                    ..
                } => {
                    let bounds = circle_bounds(*center, *diameter);
                    set_bitmap_paint(&mut ctx, bitmap, *src, bounds)?;
                    ctx.fill_path(&circle_path(*center, *diameter));
                }
                DrawCommand::PlaceholderBadge {
                    center, diameter, ..
                } => {
                    let px = (diameter * sx.max(sy)).round().max(1.0) as u32;
                    let glyph = match self.placeholders.get(&px) {
                        Some(b) => b.clone(),
                        None => {
                            let b = placeholder_badge(px)?;
                            self.placeholders.insert(px, b.clone());
                            b
                        }
                    };
                    let bounds = circle_bounds(*center, *diameter);
                    let src = Rect::new(0.0, 0.0, f64::from(glyph.width), f64::from(glyph.height));
                    set_bitmap_paint(&mut ctx, &glyph, src, bounds)?;
                    ctx.fill_path(&circle_path(*center, *diameter));
                }
                DrawCommand::Text {
                    text,
                    origin,
                    anchor,
                    size_px,
                    color,
                    max_width,
                    ..
                } => {
                    let Some(font) = self.font.as_ref() else {
                        if !warned_no_font {
                            tracing::warn!("no font available; caption text is not drawn");
                            warned_no_font = true;
                        }
                        continue;
                    };
                    if text.trim().is_empty() {
                        continue;
                    }
                    let text_layout = self.text_engine.layout_plain(
                        text,
                        &font.blob,
                        *size_px as f32,
                        *color,
                        max_width.map(|w| w as f32),
                    )?;
                    let x = match anchor {
                        TextAnchor::Start => origin.x,
                        TextAnchor::End => origin.x - f64::from(text_layout.width()),
                    };
                    ctx.set_transform(base * Affine::translate((x, origin.y)));
                    for line in text_layout.lines() {
                        for item in line.items() {
                            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                                continue;
                            };
                            let brush = run.style().brush;
                            ctx.set_paint(color_to_cpu(brush));
                            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                                id: g.id,
                                x: g.x,
                                y: g.y,
                            });
                            ctx.glyph_run(&font.data)
                                .font_size(run.run().font_size())
                                .fill_glyphs(glyphs);
                        }
                    }
                }
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(RenderedImage {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

fn scale_for(px: u32, units: f64) -> f64 {
    if units > 0.0 {
        f64::from(px) / units
    } else {
        1.0
    }
}

/// Allocate the output surface, reporting allocation limits as [`FourcutError::OutOfMemory`].
fn allocate_pixmap(width: u32, height: u32, max_pixels: u64) -> FourcutResult<vello_cpu::Pixmap> {
    let oom = || FourcutError::OutOfMemory { width, height };
    if width == 0 || height == 0 {
        return Err(FourcutError::validation(format!(
            "output size {width}x{height} must be non-empty"
        )));
    }
    let w: u16 = width.try_into().map_err(|_| oom())?;
    let h: u16 = height.try_into().map_err(|_| oom())?;
    let count = u64::from(width) * u64::from(height);
    if count > max_pixels {
        return Err(oom());
    }
    let count = usize::try_from(count).map_err(|_| oom())?;

    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::new();
    pixels.try_reserve_exact(count).map_err(|_| oom())?;
    pixels.resize(
        count,
        vello_cpu::peniko::color::PremulRgba8::from_u8_array([0, 0, 0, 0]),
    );
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

/// Paint `bitmap` so that its `src` region lands on `dst` (both axes scaled independently).
fn set_bitmap_paint(
    ctx: &mut vello_cpu::RenderContext,
    bitmap: &Bitmap,
    src: Rect,
    dst: Rect,
) -> FourcutResult<()> {
    if src.width() <= 0.0 || src.height() <= 0.0 {
        return Err(FourcutError::validation(format!(
            "empty source region {src:?} for {}x{} bitmap",
            bitmap.width, bitmap.height
        )));
    }
    let pixmap = pixmap_from_bitmap(bitmap)?;
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.set_paint_transform(
        Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate((-src.x0, -src.y0)),
    );
    Ok(())
}

fn pixmap_from_bitmap(bitmap: &Bitmap) -> FourcutResult<vello_cpu::Pixmap> {
    let w: u16 = bitmap
        .width
        .try_into()
        .map_err(|_| FourcutError::validation("bitmap width exceeds u16"))?;
    let h: u16 = bitmap
        .height
        .try_into()
        .map_err(|_| FourcutError::validation("bitmap height exceeds u16"))?;
    let expected = (bitmap.width as usize) * (bitmap.height as usize) * 4;
    if bitmap.rgba8_premul.len() != expected {
        return Err(FourcutError::validation(format!(
            "bitmap holds {} bytes, expected {expected} for {}x{}",
            bitmap.rgba8_premul.len(),
            bitmap.width,
            bitmap.height
        )));
    }
    // Pixmap stores PremulRgba8; bitmap bytes are already premultiplied.
    let pixels = bitmap
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn circle_bounds(center: Point, diameter: f64) -> Rect {
    let r = diameter * 0.5;
    Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
}

fn circle_path(center: Point, diameter: f64) -> vello_cpu::kurbo::BezPath {
    vello_cpu::kurbo::Circle::new((center.x, center.y), diameter * 0.5).to_path(0.1)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
