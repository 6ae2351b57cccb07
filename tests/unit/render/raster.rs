use super::*;
use crate::foundation::core::{FrameColor, Size};
use crate::layout::composer::TextRole;
use crate::layout::composer::{CaptionStyle, compose};
use crate::layout::geometry::{ChromeInsets, GeometrySpec, compute_geometry};

fn geometry() -> GeometrySpec {
    compute_geometry(Size::new(390.0, 844.0), &ChromeInsets::default())
}

fn palette() -> Vec<Rgba8> {
    (0..12u8)
        .map(|i| Rgba8::opaque(20 * i, 255 - 20 * i, (i % 3) * 100))
        .collect()
}

fn layout_for(color: FrameColor) -> ComposedLayout {
    let images: Vec<Bitmap> = palette()
        .into_iter()
        .enumerate()
        .map(|(i, c)| Bitmap::solid(40 + i as u32 * 7, 30, c))
        .collect();
    compose(
        &images,
        "Week3 Apr",
        color,
        None,
        None,
        &geometry(),
        &CaptionStyle::default(),
    )
    .unwrap()
}

fn fixture_font() -> FontBlob {
    FontBlob::from_path("tests/data/fonts/DejaVuSans.ttf").unwrap()
}

fn is_dark(px: [u8; 4]) -> bool {
    px[0] < 60 && px[1] < 60 && px[2] < 60
}

fn is_bright(px: [u8; 4]) -> bool {
    px[0] > 195 && px[1] > 195 && px[2] > 195
}

/// Pixels of `out` inside `[x0, x1) x [y0, y1)` that satisfy `pred`.
fn matching(
    out: &RenderedImage,
    (x0, x1): (u32, u32),
    (y0, y1): (u32, u32),
    pred: fn([u8; 4]) -> bool,
) -> Vec<(u32, u32)> {
    (y0..y1)
        .flat_map(|y| (x0..x1).map(move |x| (x, y)))
        .filter(|&(x, y)| out.pixel(x, y).is_some_and(pred))
        .collect()
}

fn center_px(r: Rect) -> (u32, u32) {
    (r.center().x as u32, r.center().y as u32)
}

#[test]
fn cells_show_their_bitmaps_in_order() {
    let g = geometry();
    let layout = layout_for(FrameColor::White);
    let (w, h) = g.output_size_px(1.0);
    let out = Rasterizer::new(None).rasterize(&layout, w, h).unwrap();

    assert_eq!((out.width, out.height), (358, 569));
    assert_eq!(out.data.len(), 358 * 569 * 4);
    for (i, c) in palette().into_iter().enumerate() {
        let (x, y) = center_px(g.cell_rect(i));
        assert_eq!(out.pixel(x, y), Some([c.r, c.g, c.b, 255]), "cell {i}");
    }
}

#[test]
fn frame_color_fills_background_and_strip() {
    let g = geometry();
    for (color, bg) in [
        (FrameColor::White, [255, 255, 255, 255]),
        (FrameColor::Black, [0, 0, 0, 255]),
    ] {
        let out = Rasterizer::new(None)
            .rasterize(&layout_for(color), 358, 569)
            .unwrap();
        assert_eq!(out.pixel(2, 2), Some(bg));
        // Gap between the first two cells.
        assert_eq!(out.pixel(122, 60), Some(bg));
        // Bottom-left of the caption strip, clear of text and badges.
        assert_eq!(out.pixel(3, g.frame.height as u32 - 3), Some(bg));
    }
}

#[test]
fn scaled_output_keeps_cell_mapping() {
    let g = geometry();
    let (w, h) = g.output_size_px(2.0);
    let out = Rasterizer::new(None)
        .rasterize(&layout_for(FrameColor::White), w, h)
        .unwrap();
    assert_eq!((out.width, out.height), (716, 1138));
    let c = palette()[5];
    let center = g.cell_rect(5).center();
    assert_eq!(
        out.pixel((center.x * 2.0) as u32, (center.y * 2.0) as u32),
        Some([c.r, c.g, c.b, 255])
    );
}

#[test]
fn placeholder_badges_are_drawn() {
    let layout = layout_for(FrameColor::Black);
    let out = Rasterizer::new(None).rasterize(&layout, 358, 569).unwrap();
    let d = CaptionStyle::default().badge_diameter;

    for (_, placeholder, center) in layout.badge_slots() {
        assert!(placeholder);
        // Head of the person glyph.
        let head = out
            .pixel(center.x as u32, (center.y - d * 0.125) as u32)
            .unwrap();
        assert!(head[0] > 200 && head[1] > 200 && head[2] > 200, "{head:?}");

        // Neutral disc in the upper-left quadrant.
        let disc = out
            .pixel(
                (center.x - d * 7.0 / 24.0) as u32,
                (center.y - d * 7.0 / 24.0) as u32,
            )
            .unwrap();
        assert!(disc[0].abs_diff(0xC7) <= 4, "{disc:?}");
        assert!(disc[2].abs_diff(0xCC) <= 4, "{disc:?}");

        // Outside the circle stays background.
        let corner = out
            .pixel((center.x - d * 0.5) as u32, (center.y - d * 0.5) as u32)
            .unwrap();
        assert_eq!(corner, [0, 0, 0, 255]);
    }
}

#[test]
fn oversized_output_reports_out_of_memory() {
    let layout = layout_for(FrameColor::White);

    let err = Rasterizer::new(None)
        .rasterize(&layout, 70_000, 10)
        .unwrap_err();
    assert!(matches!(
        err,
        FourcutError::OutOfMemory {
            width: 70_000,
            height: 10
        }
    ));

    let err = Rasterizer::new(None)
        .with_max_output_pixels(100)
        .rasterize(&layout, 20, 20)
        .unwrap_err();
    assert!(matches!(err, FourcutError::OutOfMemory { .. }));
}

#[test]
fn zero_sized_output_is_rejected() {
    let layout = layout_for(FrameColor::White);
    let err = Rasterizer::new(None).rasterize(&layout, 0, 569).unwrap_err();
    assert!(matches!(err, FourcutError::Validation(_)));
}

#[test]
fn rasterize_is_deterministic() {
    let layout = layout_for(FrameColor::White);
    let a = Rasterizer::new(None).rasterize(&layout, 358, 569).unwrap();
    let b = Rasterizer::new(None).rasterize(&layout, 358, 569).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn cropped_cells_sample_the_center_of_the_source() {
    // 300x100 red | green | blue stripes; a square cell keeps only the green middle.
    let mut bytes = Vec::with_capacity(300 * 100 * 4);
    for _ in 0..100 {
        for x in 0..300 {
            bytes.extend_from_slice(match x / 100 {
                0 => &[255, 0, 0, 255],
                1 => &[0, 255, 0, 255],
                _ => &[0, 0, 255, 255],
            });
        }
    }
    let striped = Bitmap::from_rgba8_premul(300, 100, bytes).unwrap();
    let mut images: Vec<Bitmap> = (0..12).map(|_| Bitmap::solid(8, 8, Rgba8::BLACK)).collect();
    images[4] = striped;

    let g = geometry();
    let layout = compose(
        &images,
        "",
        FrameColor::White,
        None,
        None,
        &g,
        &CaptionStyle::default(),
    )
    .unwrap();
    let out = Rasterizer::new(None).rasterize(&layout, 358, 569).unwrap();

    let cell = g.cell_rect(4);
    for fx in [0.05, 0.5, 0.95] {
        for fy in [0.05, 0.5, 0.95] {
            let x = (cell.x0 + cell.width() * fx) as u32;
            let y = (cell.y0 + cell.height() * fy) as u32;
            assert_eq!(out.pixel(x, y), Some([0, 255, 0, 255]), "at {fx},{fy}");
        }
    }
}

#[test]
fn caption_is_drawn_in_the_paired_text_color() {
    let g = geometry();
    let style = CaptionStyle::default();
    let x_range = (style.side_inset as u32, 200);
    let y0 = (g.caption_strip.y0 + style.top_inset) as u32;
    let y_range = (y0, y0 + 22);

    let cases: [(FrameColor, fn([u8; 4]) -> bool, fn([u8; 4]) -> bool); 2] = [
        (FrameColor::White, is_dark, is_bright),
        (FrameColor::Black, is_bright, is_dark),
    ];
    for (color, text_px, bg_px) in cases {
        let layout = layout_for(color);
        let out = Rasterizer::new(Some(fixture_font()))
            .rasterize(&layout, 358, 569)
            .unwrap();

        let ink = matching(&out, x_range, y_range, text_px);
        assert!(ink.len() > 20, "{color:?}: {} text pixels", ink.len());
        assert!(ink.iter().all(|&(_, y)| f64::from(y) >= g.caption_strip.y0));

        // Above the caption only the strip background shows.
        let above = matching(
            &out,
            x_range,
            (g.caption_strip.y0 as u32, y0 - 1),
            text_px,
        );
        assert!(above.is_empty(), "{color:?}: ink above caption");
        assert!(out.pixel(3, 566).is_some_and(bg_px));
    }
}

#[test]
fn by_labels_end_left_of_their_badges() {
    let layout = layout_for(FrameColor::White);
    assert_eq!(layout.texts(TextRole::ByLabel).count(), 2);
    let out = Rasterizer::new(Some(fixture_font()))
        .rasterize(&layout, 358, 569)
        .unwrap();

    let r = CaptionStyle::default().badge_diameter / 2.0;
    for (slot, _, center) in layout.badge_slots() {
        let badge_left = (center.x - r) as u32;
        let ink = matching(
            &out,
            (badge_left - 20, badge_left),
            ((center.y - 9.0) as u32, (center.y + 9.0) as u32),
            is_dark,
        );
        assert!(!ink.is_empty(), "{slot:?}: no label");
        let rightmost = ink.iter().map(|&(x, _)| x).max().unwrap_or(0);
        assert!(rightmost + 2 <= badge_left, "{slot:?}: label reaches x={rightmost}");
    }
}

#[test]
fn rasterizer_shares_font_bytes() {
    let font = fixture_font();
    let _rasterizer = Rasterizer::new(Some(font.clone()));
    // The caller's handle, the rasterizer's blob and the glyph-run font data.
    assert_eq!(Arc::strong_count(&font.bytes), 3);
}

#[test]
fn short_pixel_buffers_are_rejected() {
    let bitmap = Bitmap {
        width: 4,
        height: 4,
        rgba8_premul: Arc::new(vec![0; 12]),
    };
    let err = pixmap_from_bitmap(&bitmap).unwrap_err();
    assert!(matches!(err, FourcutError::Validation(_)));
}
