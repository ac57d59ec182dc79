pub mod blur;
pub mod layout;
pub mod pixel_filters;
