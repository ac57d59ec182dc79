//! CPU implementation of [`Surface`] that rasterizes into an RGBA8 canvas.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::events::DecodedImage;
use crate::processing::pixel_filters;
use crate::render::text::TextRenderer;
use crate::surface::{CANVAS_HEIGHT, CANVAS_WIDTH, Color, FilterOp, Rect, Surface};

/// CPU surface backed by an RGBA8 buffer.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    canvas: RgbaImage,
    text: Option<TextRenderer>,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT, None)
    }
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, text: Option<TextRenderer>) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
            text,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Pixel index range covered by the span [`start`, `end`), using pixel centers.
    fn span(start: f32, end: f32, limit: u32) -> (u32, u32) {
        let lo = start.round().clamp(0.0, limit as f32) as u32;
        let hi = end.round().clamp(0.0, limit as f32) as u32;
        (lo, hi.max(lo))
    }
}

/// Source-over blend of `color` scaled by `coverage` onto `dst`.
pub(crate) fn blend_pixel(dst: &mut Rgba<u8>, color: Color, coverage: f32) {
    let a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for i in 0..3 {
        dst[i] = (color[i] as f32 * a + dst[i] as f32 * inv).round() as u8;
    }
    dst[3] = ((a + (dst[3] as f32 / 255.0) * inv) * 255.0).round() as u8;
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn background(&mut self, color: Color) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = color;
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x0, x1) = Self::span(rect.x, rect.right(), self.width());
        let (y0, y1) = Self::span(rect.y, rect.bottom(), self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                blend_pixel(self.canvas.get_pixel_mut(x, y), color, 1.0);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, weight: f32) {
        if weight <= 0.0 {
            return;
        }
        let half = weight / 2.0;
        let (ox0, ox1) = Self::span(rect.x - half, rect.right() + half, self.width());
        let (oy0, oy1) = Self::span(rect.y - half, rect.bottom() + half, self.height());
        let (ix0, ix1) = Self::span(rect.x + half, rect.right() - half, self.width());
        let (iy0, iy1) = Self::span(rect.y + half, rect.bottom() - half, self.height());
        for y in oy0..oy1 {
            for x in ox0..ox1 {
                let inside = (ix0..ix1).contains(&x) && (iy0..iy1).contains(&y);
                if !inside {
                    blend_pixel(self.canvas.get_pixel_mut(x, y), color, 1.0);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, diameter: f32, color: Color) {
        let r = diameter / 2.0;
        if r <= 0.0 {
            return;
        }
        let (x0, x1) = Self::span(cx - r, cx + r, self.width());
        let (y0, y1) = Self::span(cy - r, cy + r, self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    blend_pixel(self.canvas.get_pixel_mut(x, y), color, 1.0);
                }
            }
        }
    }

    fn draw_image(&mut self, image: &DecodedImage, rect: Rect) {
        let w = rect.w.round();
        let h = rect.h.round();
        if w < 1.0 || h < 1.0 {
            return;
        }
        let (w, h) = (w as u32, h as u32);
        let x = rect.x.round() as i64;
        let y = rect.y.round() as i64;
        if image.pixels.dimensions() == (w, h) {
            imageops::overlay(&mut self.canvas, &*image.pixels, x, y);
        } else {
            let scaled = imageops::resize(&*image.pixels, w, h, FilterType::Triangle);
            imageops::overlay(&mut self.canvas, &scaled, x, y);
        }
    }

    fn text(&mut self, text: &str, cx: f32, cy: f32, size: f32, color: Color) {
        match &self.text {
            Some(renderer) => renderer.draw_centered(&mut self.canvas, text, cx, cy, size, color),
            None => debug!(text, "no font loaded; skipping text"),
        }
    }

    fn filter(&mut self, op: FilterOp) {
        pixel_filters::apply_op(&mut self.canvas, op);
    }

    fn pixels(&self) -> Option<&RgbaImage> {
        Some(&self.canvas)
    }
}
