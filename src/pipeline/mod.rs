//! End-to-end rendering: a validated request goes through fetch, compose and rasterize as one
//! call that either returns the whole image or fails.

pub(crate) mod renderer;
pub(crate) mod request;
