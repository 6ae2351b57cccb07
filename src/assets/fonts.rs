use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{FourcutError, FourcutResult};

/// Raw font file bytes plus the face index inside the file.
#[derive(Clone)]
pub struct FontBlob {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
}

impl std::fmt::Debug for FontBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBlob")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontBlob {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            index: 0,
        }
    }

    /// Load a `.ttf`/`.otf`/`.ttc` file.
    pub fn from_path(path: impl AsRef<Path>) -> FourcutResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(FourcutError::validation(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self::from_bytes(bytes))
    }

    /// Select face `index` of a font collection.
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Font bytes as a shareable handle for `Blob::new`, without copying the file.
    pub(crate) fn shared_data(&self) -> Arc<dyn AsRef<[u8]> + Send + Sync> {
        self.bytes.clone()
    }

    /// Resolve the system sans-serif face, if the host has any fonts installed.
    pub fn system_sans_serif() -> Option<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let query = usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::SansSerif],
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))?;
        db.with_face_data(id, |data, index| Self {
            bytes: Arc::new(data.to_vec()),
            index,
        })
    }
}

/// Family holding collection face `index`, together with that face.
pub(crate) fn find_face<F: Copy, I>(
    families: &[(F, Vec<I>)],
    index: u32,
    face_index: impl Fn(&I) -> u32,
) -> Option<(F, &I)> {
    families.iter().find_map(|(family, faces)| {
        faces
            .iter()
            .find(|face| face_index(face) == index)
            .map(|face| (*family, face))
    })
}

struct RegisteredFont {
    bytes: Arc<Vec<u8>>,
    index: u32,
    family_name: String,
    // Attributes of the selected face, so the font matcher cannot pick a sibling face.
    weight: parley::style::FontWeight,
    style: parley::style::FontStyle,
    width: parley::style::FontWidth,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// The most recently used font stays registered, so repeated layouts with the same
/// [`FontBlob`] do not re-register its bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    registered: Option<RegisteredFont>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: None,
        }
    }

    /// Family name of the last font used for layout.
    pub fn last_family_name(&self) -> Option<&str> {
        self.registered.as_ref().map(|r| r.family_name.as_str())
    }

    fn register(&mut self, font: &FontBlob) -> FourcutResult<&RegisteredFont> {
        let cached = self
            .registered
            .as_ref()
            .is_some_and(|r| Arc::ptr_eq(&r.bytes, &font.bytes) && r.index == font.index);
        if !cached {
            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::new(font.shared_data()), None);
            let (family_id, face) = find_face(&families, font.index, |f| f.index())
                .ok_or_else(|| {
                    FourcutError::validation(format!(
                        "font bytes have no face at index {}",
                        font.index
                    ))
                })?;
            let (weight, style, width) = (face.weight(), face.style(), face.width());
            let family_name = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| FourcutError::validation("registered font family has no name"))?
                .to_string();
            self.registered = Some(RegisteredFont {
                bytes: font.bytes.clone(),
                index: font.index,
                family_name,
                weight,
                style,
                width,
            });
        }
        self.registered
            .as_ref()
            .ok_or_else(|| FourcutError::validation("font registration failed"))
    }

    /// Shape and lay out plain text with the family holding face `font.index`.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font: &FontBlob,
        size_px: f32,
        brush: Rgba8,
        max_width_px: Option<f32>,
    ) -> FourcutResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FourcutError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let face = self.register(font)?;
        let family_name = face.family_name.clone();
        let (weight, style, width) = (face.weight, face.style, face.width);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(style));
        builder.push_default(parley::style::StyleProperty::FontWidth(width));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        if let Some(w) = max_width_px {
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        }
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
