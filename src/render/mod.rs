//! CPU rasterization of a composed layout, powered by `vello_cpu`.

pub(crate) mod output;
pub(crate) mod raster;
