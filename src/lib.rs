//! fourcut renders "four-cut" photo composites: twelve photos in a 3 x 4 grid above a caption
//! bar with the caption text and two identity badges, flattened into one RGBA image.
//!
//! The pipeline is:
//!
//! - Derive a [`GeometrySpec`] from the container size the preview was laid out in
//! - Fetch every source through an [`ImageFetcher`], preserving request order
//! - Compose a data-only [`ComposedLayout`] and rasterize it on the CPU
//!
//! [`CompositeRenderer`] runs all three stages for one [`CompositeRequest`].
#![forbid(unsafe_code)]

mod assets;
mod foundation;
mod layout;
mod pipeline;
mod render;

pub use crate::foundation::core::{FrameColor, Point, Rect, Rgba8, Size};
pub use crate::foundation::error::{FourcutError, FourcutResult};

pub use crate::assets::bitmap::{Bitmap, decode_image};
pub use crate::assets::fetch::{FetchConfig, ImageFetcher, SourceFetcher, fetch_all};
pub use crate::assets::fonts::FontBlob;
pub use crate::assets::placeholder::placeholder_badge;
pub use crate::assets::source::ImageSource;
pub use crate::layout::composer::{
    BadgePolicy, BadgeSlot, CaptionStyle, ComposedLayout, DrawCommand, TextAnchor, TextRole,
    aspect_fill_source_rect, compose,
};
pub use crate::layout::geometry::{
    CELL_COUNT, ChromeInsets, GRID_COLUMNS, GRID_ROWS, GeometrySpec, compute_geometry,
};
pub use crate::pipeline::renderer::{CompositeRenderer, RenderOptions};
pub use crate::pipeline::request::{CompositeRequest, RequestSpec};
pub use crate::render::output::RenderedImage;
pub use crate::render::raster::{DEFAULT_MAX_OUTPUT_PIXELS, Rasterizer};
