//! Image inputs: decoded bitmaps, source references, the fetch contract, fonts and the
//! placeholder badge glyph.
//!
//! All IO happens here, front-loaded before layout; composition and rasterization only ever see
//! resident [`bitmap::Bitmap`] values.

pub(crate) mod bitmap;
pub(crate) mod fetch;
pub(crate) mod fonts;
pub(crate) mod placeholder;
pub(crate) mod source;
