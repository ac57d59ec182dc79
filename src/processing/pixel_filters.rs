use image::{Rgba, RgbaImage};

use crate::processing::blur::apply_blur;
use crate::surface::FilterOp;

/// Applies one native filter to the whole image in place.
pub fn apply_op(image: &mut RgbaImage, op: FilterOp) {
    match op {
        FilterOp::Gray => gray(image),
        FilterOp::Invert => invert(image),
        FilterOp::Blur { radius } => apply_blur(image, radius),
        FilterOp::Posterize { levels } => posterize(image, levels),
        FilterOp::Threshold { level } => threshold(image, level),
    }
}

pub fn gray(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let l = luma_u8(pixel);
        set_rgb(pixel, l, l, l);
    }
}

pub fn invert(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        set_rgb(pixel, 255 - r, 255 - g, 255 - b);
    }
}

/// Reduces each channel to `levels` evenly spaced values. `levels` is clamped to 2..=255.
pub fn posterize(image: &mut RgbaImage, levels: u32) {
    let levels = levels.clamp(2, 255);
    let steps = levels - 1;
    let quantize = |c: u8| -> u8 { ((((c as u32) * levels) >> 8) * 255 / steps) as u8 };
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        set_rgb(pixel, quantize(r), quantize(g), quantize(b));
    }
}

/// Black/white split at `level` (0..=1) of full brightness.
pub fn threshold(image: &mut RgbaImage, level: f32) {
    let level = if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.5
    };
    let cutoff = (level * 255.0).floor();
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let lumin = 0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32;
        let v = if lumin >= cutoff { 255 } else { 0 };
        set_rgb(pixel, v, v, v);
    }
}

fn luma_u8(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = pixel.0;
    ((r as u32 * 77 + g as u32 * 151 + b as u32 * 28) >> 8) as u8
}

fn set_rgb(pixel: &mut Rgba<u8>, r: u8, g: u8, b: u8) {
    pixel.0[0] = r;
    pixel.0[1] = g;
    pixel.0[2] = b;
}
