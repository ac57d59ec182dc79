use crate::surface::Rect;

/// Uniformly scales a `src_w`×`src_h` image to fit inside `bounds`, centered.
///
/// Never crops and never stretches one axis independently.
pub fn contain_rect(src_w: u32, src_h: u32, bounds: Rect) -> Rect {
    let iw = src_w.max(1) as f32;
    let ih = src_h.max(1) as f32;
    let scale = (bounds.w / iw).min(bounds.h / ih).max(0.0);
    let scale = if scale.is_finite() { scale } else { 1.0 };
    let w = iw * scale;
    let h = ih * scale;
    let (ox, oy) = center_offset(w, h, bounds.w, bounds.h);
    Rect::new(bounds.x + ox, bounds.y + oy, w, h)
}

pub fn center_offset(inner_w: f32, inner_h: f32, outer_w: f32, outer_h: f32) -> (f32, f32) {
    ((outer_w - inner_w) / 2.0, (outer_h - inner_h) / 2.0)
}

/// Largest `aspect` (width / height) region that fits in `bounds`, centered.
pub fn letterbox_region(bounds: Rect, aspect: f32) -> Rect {
    let mut w = bounds.w;
    let mut h = bounds.w / aspect;
    if h > bounds.h {
        h = bounds.h;
        w = bounds.h * aspect;
    }
    let (ox, oy) = center_offset(w, h, bounds.w, bounds.h);
    Rect::new(bounds.x + ox, bounds.y + oy, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_close(a: Rect, b: Rect) {
        let eps = 0.001;
        assert!(
            (a.x - b.x).abs() <= eps
                && (a.y - b.y).abs() <= eps
                && (a.w - b.w).abs() <= eps
                && (a.h - b.h).abs() <= eps,
            "{a:?} vs {b:?}"
        );
    }

    #[test]
    fn wide_image_fills_width() {
        let r = contain_rect(400, 200, Rect::new(0.0, 0.0, 800.0, 800.0));
        rect_close(r, Rect::new(0.0, 200.0, 800.0, 400.0));
    }

    #[test]
    fn tall_image_fills_height_inside_offset_bounds() {
        let r = contain_rect(100, 200, Rect::new(410.0, 10.0, 380.0, 380.0));
        rect_close(r, Rect::new(505.0, 10.0, 190.0, 380.0));
    }

    #[test]
    fn square_canvas_letterboxes_to_sixteen_nine() {
        let r = letterbox_region(Rect::new(0.0, 0.0, 800.0, 800.0), 16.0 / 9.0);
        rect_close(r, Rect::new(0.0, 175.0, 800.0, 450.0));
    }

    #[test]
    fn wide_canvas_pillarboxes() {
        let r = letterbox_region(Rect::new(0.0, 0.0, 2000.0, 900.0), 16.0 / 9.0);
        rect_close(r, Rect::new(200.0, 0.0, 1600.0, 900.0));
    }
}
