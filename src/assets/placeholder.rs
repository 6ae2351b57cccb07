use anyhow::Context;

use crate::assets::bitmap::Bitmap;
use crate::foundation::error::{FourcutError, FourcutResult};

/// Person silhouette on a neutral disc, shown in place of a missing identity badge.
const PERSON_GLYPH_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
  <rect width="24" height="24" fill="#C7C7CC"/>
  <circle cx="12" cy="9" r="4.5" fill="#FFFFFF"/>
  <path d="M3.5 24 C3.5 17.5 7.5 14.8 12 14.8 C16.5 14.8 20.5 17.5 20.5 24 Z" fill="#FFFFFF"/>
</svg>"##;

const MAX_DIM: u32 = 4_096;

/// Rasterize the placeholder glyph into a `diameter_px` square bitmap.
pub fn placeholder_badge(diameter_px: u32) -> FourcutResult<Bitmap> {
    if diameter_px == 0 || diameter_px > MAX_DIM {
        return Err(FourcutError::validation(format!(
            "placeholder diameter {diameter_px}px out of range (1..={MAX_DIM})"
        )));
    }

    let tree = usvg::Tree::from_data(PERSON_GLYPH_SVG.as_bytes(), &usvg::Options::default())
        .context("parse placeholder svg")?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(diameter_px, diameter_px)
        .ok_or_else(|| FourcutError::validation("failed to allocate placeholder pixmap"))?;

    let sx = (diameter_px as f32) / tree.size().width();
    let sy = (diameter_px as f32) / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are premultiplied RGBA8, matching `Bitmap`.
    Bitmap::from_rgba8_premul(diameter_px, diameter_px, pixmap.take())
}
