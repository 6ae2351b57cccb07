use crate::assets::bitmap::Bitmap;
use crate::foundation::core::{FrameColor, Point, Rect, Rgba8, Size};
use crate::foundation::error::{FourcutError, FourcutResult};
use crate::layout::geometry::{CELL_COUNT, GeometrySpec};

/// What to draw for a badge slot whose image is absent.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BadgePolicy {
    /// Draw the person glyph in place of a missing badge.
    #[default]
    Placeholder,
    /// Leave missing badges out of the caption bar.
    Omit,
}

/// Caption bar typography and badge metrics, in layout units.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub font_size: f64,
    /// Inset of caption text and badges from the top of the caption strip.
    pub top_inset: f64,
    /// Inset of the caption text from the left frame edge, and of the badges from the right.
    pub side_inset: f64,
    pub badge_diameter: f64,
    /// Gap between the two badge groups.
    pub badge_gap: f64,
    pub by_label: String,
    pub by_label_size: f64,
    /// Horizontal room reserved for the label to the left of each badge.
    pub by_label_width: f64,
    /// Gap between the label and its badge.
    pub by_label_gap: f64,
    pub badge_policy: BadgePolicy,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 15.0,
            top_inset: 14.0,
            side_inset: 12.0,
            badge_diameter: 26.0,
            badge_gap: 4.0,
            by_label: "by".to_string(),
            by_label_size: 11.0,
            by_label_width: 14.0,
            by_label_gap: 3.0,
            badge_policy: BadgePolicy::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeSlot {
    Mine,
    Partner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// `origin` is the top-left of the text box.
    Start,
    /// `origin` is the top-right of the text box.
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextRole {
    Caption,
    ByLabel,
}

/// One positioned draw operation. Commands are painted in list order.
#[derive(Clone, Debug)]
pub enum DrawCommand {
    Fill {
        rect: Rect,
        color: Rgba8,
    },
    /// Draw the `src` region of `bitmap` (in bitmap pixels) into `dst`.
    Image {
        cell: usize,
        bitmap: Bitmap,
        src: Rect,
        dst: Rect,
    },
    /// Circular badge; `src` is the square region of `bitmap` mapped onto the circle's bounds.
    Badge {
        slot: BadgeSlot,
        bitmap: Bitmap,
        src: Rect,
        center: Point,
        diameter: f64,
    },
    PlaceholderBadge {
        slot: BadgeSlot,
        center: Point,
        diameter: f64,
    },
    Text {
        role: TextRole,
        text: String,
        origin: Point,
        anchor: TextAnchor,
        size_px: f64,
        color: Rgba8,
        max_width: Option<f64>,
    },
}

/// Data-only draw list for one composite; owned by a single render call.
#[derive(Clone, Debug)]
pub struct ComposedLayout {
    pub size: Size,
    pub background: Rgba8,
    pub commands: Vec<DrawCommand>,
}

impl ComposedLayout {
    /// Grid cells as `(cell index, bitmap, destination)` in paint order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &Bitmap, Rect)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Image {
                cell, bitmap, dst, ..
            } => Some((*cell, bitmap, *dst)),
            _ => None,
        })
    }

    pub fn texts(&self, role: TextRole) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands
            .iter()
            .filter(move |c| matches!(c, DrawCommand::Text { role: r, .. } if *r == role))
    }

    /// Badge slots left-to-right, with whether each one is a placeholder.
    pub fn badge_slots(&self) -> Vec<(BadgeSlot, bool, Point)> {
        let mut out: Vec<_> = self
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Badge { slot, center, .. } => Some((*slot, false, *center)),
                DrawCommand::PlaceholderBadge { slot, center, .. } => {
                    Some((*slot, true, *center))
                }
                _ => None,
            })
            .collect();
        out.sort_by(|a, b| a.2.x.total_cmp(&b.2.x));
        out
    }
}

/// Source region of an `image`-sized bitmap that aspect-fills `target`.
///
/// The image is scaled uniformly to cover the target; the overflowing axis is cropped
/// symmetrically. Degenerate sizes return the whole image.
pub fn aspect_fill_source_rect(image: Size, target: Size) -> Rect {
    let full = Rect::from_origin_size(Point::ORIGIN, image);
    if image.width <= 0.0 || image.height <= 0.0 || target.width <= 0.0 || target.height <= 0.0 {
        return full;
    }
    let target_aspect = target.width / target.height;
    let (visible_w, visible_h) = if image.width / image.height > target_aspect {
        (image.height * target_aspect, image.height)
    } else {
        (image.width, image.width / target_aspect)
    };
    let x0 = (image.width - visible_w) * 0.5;
    let y0 = (image.height - visible_h) * 0.5;
    Rect::new(x0, y0, x0 + visible_w, y0 + visible_h)
}

/// Build the draw list: background, 12 aspect-filled cells, caption bar, caption, badges.
///
/// Fails with [`FourcutError::InvalidImageCount`] before any layout work when `images` does not
/// hold exactly 12 bitmaps.
#[tracing::instrument(skip_all, fields(images = images.len()))]
pub fn compose(
    images: &[Bitmap],
    caption: &str,
    frame_color: FrameColor,
    my_badge: Option<&Bitmap>,
    partner_badge: Option<&Bitmap>,
    geometry: &GeometrySpec,
    style: &CaptionStyle,
) -> FourcutResult<ComposedLayout> {
    if images.len() != CELL_COUNT {
        return Err(FourcutError::InvalidImageCount {
            expected: CELL_COUNT,
            actual: images.len(),
        });
    }

    let background = frame_color.background();
    let text_color = frame_color.text();
    let mut commands = Vec::with_capacity(CELL_COUNT + 8);

    commands.push(DrawCommand::Fill {
        rect: Rect::from_origin_size(Point::ORIGIN, geometry.frame),
        color: background,
    });

    for (cell, bitmap) in images.iter().enumerate() {
        let dst = geometry.cell_rect(cell);
        commands.push(DrawCommand::Image {
            cell,
            bitmap: bitmap.clone(),
            src: aspect_fill_source_rect(bitmap.size(), dst.size()),
            dst,
        });
    }

    let strip = geometry.caption_strip;
    commands.push(DrawCommand::Fill {
        rect: strip,
        color: background,
    });

    let d = style.badge_diameter.max(0.0);
    let badge_cy = strip.y0 + style.top_inset + d * 0.5;
    let slots: Vec<(BadgeSlot, Option<&Bitmap>)> = [
        (BadgeSlot::Mine, my_badge),
        (BadgeSlot::Partner, partner_badge),
    ]
    .into_iter()
    .filter(|(_, b)| b.is_some() || style.badge_policy == BadgePolicy::Placeholder)
    .collect();
    let show_by = slots.len() == 2;

    // Lay badges out right-to-left so the pair hugs the right edge.
    let mut badge_commands = Vec::with_capacity(slots.len() * 2);
    let mut x = geometry.frame.width - style.side_inset;
    for (i, (slot, bitmap)) in slots.iter().rev().enumerate() {
        if i > 0 {
            x -= style.badge_gap;
        }
        let center = Point::new(x - d * 0.5, badge_cy);
        badge_commands.push(match bitmap {
            Some(b) => DrawCommand::Badge {
                slot: *slot,
                bitmap: (*b).clone(),
                src: aspect_fill_source_rect(b.size(), Size::new(d, d)),
                center,
                diameter: d,
            },
            None => DrawCommand::PlaceholderBadge {
                slot: *slot,
                center,
                diameter: d,
            },
        });
        x -= d;
        if show_by {
            let label_right = x - style.by_label_gap;
            badge_commands.push(DrawCommand::Text {
                role: TextRole::ByLabel,
                text: style.by_label.clone(),
                origin: Point::new(label_right, badge_cy - style.by_label_size * 0.6),
                anchor: TextAnchor::End,
                size_px: style.by_label_size,
                color: text_color,
                max_width: None,
            });
            x = label_right - style.by_label_width;
        }
    }

    let text_x = style.side_inset;
    let text_right = if slots.is_empty() {
        geometry.frame.width - style.side_inset
    } else {
        x - style.badge_gap
    };
    commands.push(DrawCommand::Text {
        role: TextRole::Caption,
        text: caption.to_string(),
        origin: Point::new(text_x, strip.y0 + style.top_inset),
        anchor: TextAnchor::Start,
        size_px: style.font_size,
        color: text_color,
        max_width: Some((text_right - text_x).max(1.0)),
    });

    badge_commands.reverse();
    commands.extend(badge_commands);

    Ok(ComposedLayout {
        size: geometry.frame,
        background,
        commands,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/composer.rs"]
mod tests;
