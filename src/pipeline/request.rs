use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::source::ImageSource;
use crate::foundation::core::FrameColor;
use crate::foundation::error::{FourcutError, FourcutResult};
use crate::layout::geometry::CELL_COUNT;
use crate::pipeline::renderer::RenderOptions;

/// Everything needed to render one composite.
///
/// Immutable once built; [`CompositeRequest::new`] guarantees exactly 12 grid sources.
#[derive(Clone, Debug)]
pub struct CompositeRequest {
    sources: Vec<ImageSource>,
    caption: String,
    frame_color: FrameColor,
    my_badge: Option<ImageSource>,
    partner_badge: Option<ImageSource>,
}

impl CompositeRequest {
    /// Build a request without badges. Fails with [`FourcutError::InvalidImageCount`] unless
    /// `sources` holds exactly 12 entries.
    pub fn new(
        sources: Vec<ImageSource>,
        caption: impl Into<String>,
        frame_color: FrameColor,
    ) -> FourcutResult<Self> {
        if sources.len() != CELL_COUNT {
            return Err(FourcutError::InvalidImageCount {
                expected: CELL_COUNT,
                actual: sources.len(),
            });
        }
        Ok(Self {
            sources,
            caption: caption.into(),
            frame_color,
            my_badge: None,
            partner_badge: None,
        })
    }

    pub fn with_badges(
        mut self,
        my_badge: Option<ImageSource>,
        partner_badge: Option<ImageSource>,
    ) -> Self {
        self.my_badge = my_badge;
        self.partner_badge = partner_badge;
        self
    }

    /// Grid sources in row-major cell order.
    pub fn sources(&self) -> &[ImageSource] {
        &self.sources
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn frame_color(&self) -> FrameColor {
        self.frame_color
    }

    pub fn my_badge(&self) -> Option<&ImageSource> {
        self.my_badge.as_ref()
    }

    pub fn partner_badge(&self) -> Option<&ImageSource> {
        self.partner_badge.as_ref()
    }
}

/// On-disk JSON form of a render request.
///
/// References are strings as accepted by [`ImageSource::parse`]. Badge references are numbered
/// after the grid images (12 and 13) in error messages.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSpec {
    pub images: Vec<String>,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub frame_color: FrameColor,
    #[serde(default)]
    pub my_badge: Option<String>,
    #[serde(default)]
    pub partner_badge: Option<String>,
    /// Font file for the caption; relative paths resolve like image paths.
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub options: RenderOptions,
}

impl RequestSpec {
    /// Parse a request from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FourcutResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FourcutError::validation(format!("parse request JSON: {e}")))
    }

    /// Parse a request from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FourcutResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FourcutError::validation(format!("open request JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Resolve every reference into a [`CompositeRequest`].
    ///
    /// The image count is checked before any reference is parsed.
    pub fn to_request(&self, base_dir: Option<&Path>) -> FourcutResult<CompositeRequest> {
        if self.images.len() != CELL_COUNT {
            return Err(FourcutError::InvalidImageCount {
                expected: CELL_COUNT,
                actual: self.images.len(),
            });
        }
        let sources = self
            .images
            .iter()
            .enumerate()
            .map(|(i, r)| ImageSource::parse(i, r, base_dir))
            .collect::<FourcutResult<Vec<_>>>()?;
        let badge = |index: usize, r: &Option<String>| {
            r.as_deref()
                .map(|r| ImageSource::parse(index, r, base_dir))
                .transpose()
        };
        let my_badge = badge(CELL_COUNT, &self.my_badge)?;
        let partner_badge = badge(CELL_COUNT + 1, &self.partner_badge)?;

        Ok(
            CompositeRequest::new(sources, self.caption.clone(), self.frame_color)?
                .with_badges(my_badge, partner_badge),
        )
    }

    /// Font path with relative paths joined onto `base_dir`.
    pub fn font_path(&self, base_dir: Option<&Path>) -> Option<PathBuf> {
        let font = self.font.as_ref()?;
        Some(match base_dir {
            Some(base) if font.is_relative() => base.join(font),
            _ => font.clone(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/request.rs"]
mod tests;
