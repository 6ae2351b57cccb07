use crate::foundation::core::{Point, Rect, Size};

/// Grid columns.
pub const GRID_COLUMNS: usize = 3;
/// Grid rows.
pub const GRID_ROWS: usize = 4;
/// Number of photos in one four-cut composite.
pub const CELL_COUNT: usize = GRID_COLUMNS * GRID_ROWS;

/// Device chrome and frame constants, in layout units (points).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChromeInsets {
    /// Top safe-area inset.
    pub top_safe_area: f64,
    /// Navigation bar height above the frame.
    pub navigation_height: f64,
    /// Bottom safe-area inset.
    pub bottom_safe_area: f64,
    /// Height of the screen's bottom caption/controls bar below the frame.
    pub caption_bar_height: f64,
    /// Gap between the frame and the bottom bar.
    pub gap: f64,
    /// Horizontal inset on each side of the frame.
    pub horizontal_inset: f64,
    /// Padding between the frame edge and the grid.
    pub frame_padding: f64,
    /// Spacing between adjacent cells, both axes.
    pub cell_spacing: f64,
    /// Smallest caption strip kept below the grid on short containers.
    pub min_caption_strip: f64,
}

impl Default for ChromeInsets {
    fn default() -> Self {
        Self {
            top_safe_area: 59.0,
            navigation_height: 54.0,
            bottom_safe_area: 34.0,
            caption_bar_height: 120.0,
            gap: 8.0,
            horizontal_inset: 16.0,
            frame_padding: 10.0,
            cell_spacing: 4.0,
            min_caption_strip: 48.0,
        }
    }
}

/// Frame geometry derived from container dimensions.
///
/// Invariant: `grid_origin.y + grid_height + caption_strip.height() == frame.height`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeometrySpec {
    pub frame: Size,
    /// Every cell is this square.
    pub cell: Size,
    pub cell_spacing: f64,
    pub grid_origin: Point,
    pub grid_height: f64,
    /// Strip below the grid holding caption text and badges.
    pub caption_strip: Rect,
    pub frame_padding: f64,
}

impl GeometrySpec {
    pub fn grid_width(&self) -> f64 {
        if self.cell.width <= 0.0 {
            return 0.0;
        }
        GRID_COLUMNS as f64 * self.cell.width + (GRID_COLUMNS - 1) as f64 * self.cell_spacing
    }

    /// True when the container leaves no room for a frame.
    pub fn is_empty(&self) -> bool {
        self.frame.width <= 0.0 || self.frame.height <= 0.0
    }

    /// Cell `index` in row-major order (row `index / 3`, column `index % 3`).
    pub fn cell_rect(&self, index: usize) -> Rect {
        let row = (index / GRID_COLUMNS) as f64;
        let col = (index % GRID_COLUMNS) as f64;
        let x = self.grid_origin.x + col * (self.cell.width + self.cell_spacing);
        let y = self.grid_origin.y + row * (self.cell.height + self.cell_spacing);
        Rect::new(x, y, x + self.cell.width, y + self.cell.height)
    }

    /// Output raster size at `scale` pixels per layout unit. An empty frame yields 0 pixels.
    pub fn output_size_px(&self, scale: f64) -> (u32, u32) {
        let to_px = |v: f64| (v * scale).round().max(0.0) as u32;
        (to_px(self.frame.width), to_px(self.frame.height))
    }
}

/// Compute frame, cell and caption-strip geometry for a container.
///
/// Pure: identical inputs always produce identical output. Negative intermediates clamp to 0.
pub fn compute_geometry(container: Size, insets: &ChromeInsets) -> GeometrySpec {
    let spacing = insets.cell_spacing.max(0.0);
    let padding = insets.frame_padding.max(0.0);

    let frame_w = (container.width - 2.0 * insets.horizontal_inset).max(0.0);
    let frame_h = (container.height
        - insets.top_safe_area
        - insets.navigation_height
        - insets.bottom_safe_area
        - insets.caption_bar_height
        - insets.gap)
        .max(0.0);

    let avail_grid_w = (frame_w - 2.0 * padding).max(0.0);
    let cell_from_width = (avail_grid_w - (GRID_COLUMNS - 1) as f64 * spacing) / GRID_COLUMNS as f64;
    let cell_from_height = (frame_h
        - padding
        - insets.min_caption_strip.max(0.0)
        - (GRID_ROWS - 1) as f64 * spacing)
        / GRID_ROWS as f64;
    let cell = cell_from_width.min(cell_from_height).max(0.0);

    // A collapsed grid has no spacing either, and padding never extends past the frame.
    let (grid_w, grid_h) = if cell > 0.0 {
        (
            GRID_COLUMNS as f64 * cell + (GRID_COLUMNS - 1) as f64 * spacing,
            GRID_ROWS as f64 * cell + (GRID_ROWS - 1) as f64 * spacing,
        )
    } else {
        (0.0, 0.0)
    };
    let top = padding.min(frame_h);
    let grid_origin = Point::new(((frame_w - grid_w) * 0.5).max(0.0), top);
    let strip_top = (top + grid_h).min(frame_h);

    let spec = GeometrySpec {
        frame: Size::new(frame_w, frame_h),
        cell: Size::new(cell, cell),
        cell_spacing: spacing,
        grid_origin,
        grid_height: grid_h,
        caption_strip: Rect::new(0.0, strip_top, frame_w, frame_h),
        frame_padding: padding,
    };
    tracing::debug!(
        frame_w,
        frame_h,
        cell,
        grid_h,
        strip_h = frame_h - strip_top,
        "computed geometry"
    );
    spec
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
