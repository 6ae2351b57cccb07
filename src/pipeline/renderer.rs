use crate::assets::bitmap::Bitmap;
use crate::assets::fetch::{FetchConfig, ImageFetcher, fetch_all, fetch_optional};
use crate::assets::fonts::FontBlob;
use crate::foundation::core::{FrameColor, Size};
use crate::foundation::error::{FourcutError, FourcutResult};
use crate::layout::composer::{CaptionStyle, compose};
use crate::layout::geometry::{CELL_COUNT, ChromeInsets, GeometrySpec, compute_geometry};
use crate::pipeline::request::CompositeRequest;
use crate::render::output::RenderedImage;
use crate::render::raster::{DEFAULT_MAX_OUTPUT_PIXELS, Rasterizer};

/// Options controlling geometry, caption styling and output resolution.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Container the preview was laid out in, in layout units.
    pub container: Size,
    pub insets: ChromeInsets,
    pub style: CaptionStyle,
    /// Output pixels per layout unit.
    pub scale: f64,
    /// Output allocations above this many pixels fail with [`FourcutError::OutOfMemory`].
    pub max_output_pixels: u64,
    pub fetch: FetchConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            container: Size::new(390.0, 844.0),
            insets: ChromeInsets::default(),
            style: CaptionStyle::default(),
            scale: 1.0,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
            fetch: FetchConfig::default(),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> FourcutResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(FourcutError::validation(format!(
                "scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        let Size { width, height } = self.container;
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return Err(FourcutError::validation(format!(
                "container size must be finite and non-negative, got {width}x{height}"
            )));
        }
        if !(self.style.font_size.is_finite() && self.style.font_size > 0.0) {
            return Err(FourcutError::validation("style.font_size must be finite and > 0"));
        }
        Ok(())
    }
}

/// Renders four-cut composites.
///
/// The renderer only holds configuration. Each render call fetches, composes and rasterizes
/// with buffers of its own, so one renderer can serve concurrent calls.
#[derive(Clone, Debug)]
pub struct CompositeRenderer {
    options: RenderOptions,
    font: Option<FontBlob>,
}

impl CompositeRenderer {
    pub fn new(options: RenderOptions) -> FourcutResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            font: None,
        })
    }

    /// Use `font` for caption text.
    pub fn with_font(mut self, font: FontBlob) -> Self {
        self.font = Some(font);
        self
    }

    /// Use the system sans-serif face unless a font is already set.
    pub fn with_system_font(mut self) -> Self {
        if self.font.is_none() {
            self.font = FontBlob::system_sans_serif();
            if self.font.is_none() {
                tracing::warn!("no system font found; caption text will be skipped");
            }
        }
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn geometry(&self) -> GeometrySpec {
        compute_geometry(self.options.container, &self.options.insets)
    }

    /// Fetch every source concurrently, then compose and rasterize.
    ///
    /// Grid images and both badges are fetched as one batch; any failure aborts the call and
    /// drops the remaining fetches.
    #[tracing::instrument(skip_all, fields(caption = request.caption()))]
    pub async fn render<F: ImageFetcher>(
        &self,
        request: &CompositeRequest,
        fetcher: &F,
    ) -> FourcutResult<RenderedImage> {
        let (images, my_badge, partner_badge) = futures::try_join!(
            fetch_all(fetcher, request.sources()),
            fetch_optional(fetcher, request.my_badge()),
            fetch_optional(fetcher, request.partner_badge()),
        )?;
        tracing::debug!(images = images.len(), "fetch phase complete");

        self.render_bitmaps(
            &images,
            request.caption(),
            request.frame_color(),
            my_badge.as_ref(),
            partner_badge.as_ref(),
        )
    }

    /// Compose and rasterize already-decoded bitmaps.
    #[tracing::instrument(skip_all, fields(images = images.len()))]
    pub fn render_bitmaps(
        &self,
        images: &[Bitmap],
        caption: &str,
        frame_color: FrameColor,
        my_badge: Option<&Bitmap>,
        partner_badge: Option<&Bitmap>,
    ) -> FourcutResult<RenderedImage> {
        if images.len() != CELL_COUNT {
            return Err(FourcutError::InvalidImageCount {
                expected: CELL_COUNT,
                actual: images.len(),
            });
        }

        let geometry = self.geometry();
        if geometry.is_empty() {
            let Size { width, height } = self.options.container;
            return Err(FourcutError::validation(format!(
                "container {width}x{height} leaves no room for the frame"
            )));
        }
        let layout = compose(
            images,
            caption,
            frame_color,
            my_badge,
            partner_badge,
            &geometry,
            &self.options.style,
        )?;

        let (width, height) = geometry.output_size_px(self.options.scale);
        Rasterizer::new(self.font.clone())
            .with_max_output_pixels(self.options.max_output_pixels)
            .rasterize(&layout, width, height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/renderer.rs"]
mod tests;
