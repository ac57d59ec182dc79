use std::fs;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use fontdb::{Database, Family, Query, Source};
use image::RgbaImage;
use tracing::debug;

use crate::error::{Error, Result};
use crate::render::raster::blend_pixel;
use crate::surface::Color;

/// Rasterizes single-line labels with one font face.
#[derive(Clone)]
pub struct TextRenderer {
    font: FontArc,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer").finish_non_exhaustive()
    }
}

impl TextRenderer {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let font = FontArc::try_from_vec(data)
            .map_err(|err| Error::Font(format!("{}: {err}", path.display())))?;
        Ok(Self::new(font))
    }

    /// Picks the first usable sans-serif face installed on the system.
    pub fn from_system() -> Result<Self> {
        let mut db = Database::new();
        db.load_system_fonts();

        let preferred_families = [
            Family::Name("Inter"),
            Family::Name("Noto Sans"),
            Family::Name("DejaVu Sans"),
            Family::Name("Helvetica"),
            Family::Name("Arial"),
            Family::SansSerif,
        ];

        for family in preferred_families {
            let query = Query {
                families: &[family],
                ..Default::default()
            };
            if let Some(id) = db.query(&query) {
                if let Some(font) = load_face(&db, id) {
                    return Ok(Self::new(font));
                }
            }
        }

        db.faces()
            .find_map(|face| load_face(&db, face.id))
            .map(Self::new)
            .ok_or_else(|| Error::Font("no usable system font found".into()))
    }

    /// Width of `text` at `size` px, including kerning.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars().filter(|c| !c.is_control()) {
            let glyph = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, glyph);
            }
            width += scaled.h_advance(glyph);
            previous = Some(glyph);
        }
        width
    }

    /// Draws `text` so its advance box is centered on (`cx`, `cy`).
    pub fn draw_centered(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        cx: f32,
        cy: f32,
        size: f32,
        color: Color,
    ) {
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);
        let baseline = cy + (scaled.ascent() + scaled.descent()) / 2.0;
        let mut cursor_x = cx - self.measure(text, size) / 2.0;
        let mut previous = None;
        let (width, height) = canvas.dimensions();

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                        return;
                    }
                    blend_pixel(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
                });
            }
            cursor_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
    }
}

fn load_face(db: &Database, id: fontdb::ID) -> Option<FontArc> {
    let face = db.face(id)?;
    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                debug!(path = %path.display(), "skipping unreadable font: {err}");
                return None;
            }
        },
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    match FontArc::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(err) => {
            debug!(family = ?face.families.first(), "skipping undecodable font: {err}");
            None
        }
    }
}
