pub mod raster;
pub mod text;
