pub use kurbo::{Point, Rect, Size};

/// Straight-alpha RGBA8 color. Also serves as the text brush for Parley layouts.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Premultiplied `[r, g, b, a]` bytes, as stored in bitmaps and output buffers.
    pub fn to_premul_array(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| crate::foundation::math::mul_div255_u8(u16::from(c), a);
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

/// Theme applied to the frame border and the caption bar.
///
/// Text color is always the complement of the background; it is never chosen on its own.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FrameColor {
    #[default]
    White,
    Black,
}

impl FrameColor {
    pub fn background(self) -> Rgba8 {
        match self {
            Self::White => Rgba8::WHITE,
            Self::Black => Rgba8::BLACK,
        }
    }

    pub fn text(self) -> Rgba8 {
        match self {
            Self::White => Rgba8::BLACK,
            Self::Black => Rgba8::WHITE,
        }
    }
}
