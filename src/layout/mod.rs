//! Geometry and layout: container dimensions to frame geometry, then bitmaps to a data-only
//! draw list.

pub(crate) mod composer;
pub(crate) mod geometry;
