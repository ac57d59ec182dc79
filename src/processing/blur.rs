use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Largest sigma blurred at full resolution. Wider blurs run on a
/// downsampled copy scaled so the effective sigma stays at this value.
pub const MAX_DIRECT_SIGMA: f32 = 8.0;

/// Gaussian blur with `radius` used as sigma. Zero leaves the image untouched.
///
/// The radius is clamped to the image's longer side; past that every pixel
/// already sees the whole image.
pub fn apply_blur(image: &mut RgbaImage, radius: u32) {
    let (width, height) = image.dimensions();
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    let sigma = radius.min(width.max(height)) as f32;
    if sigma <= MAX_DIRECT_SIGMA {
        *image = imageops::blur(image, sigma);
        return;
    }

    let factor = sigma / MAX_DIRECT_SIGMA;
    let sample_w = ((width as f32 / factor).round() as u32).max(1);
    let sample_h = ((height as f32 / factor).round() as u32).max(1);
    let sample = imageops::resize(image, sample_w, sample_h, FilterType::Triangle);
    let blurred = imageops::blur(&sample, MAX_DIRECT_SIGMA);
    *image = imageops::resize(&blurred, width, height, FilterType::Triangle);
}
