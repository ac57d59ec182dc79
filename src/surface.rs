//! The drawing capability templates and filters are written against.
//!
//! [`RasterSurface`](crate::render::raster::RasterSurface) rasterizes into an
//! RGBA buffer; [`RecordingSurface`] only remembers what was asked of it.

use std::fmt;

use image::{Rgba, RgbaImage};

use crate::events::DecodedImage;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 800;

pub type Color = Rgba<u8>;

pub const fn gray(level: u8) -> Color {
    Rgba([level, level, level, 255])
}

pub const BLACK: Color = gray(0);
pub const WHITE: Color = gray(255);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Shrinks the rect by `amount` on every side.
    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.w - amount * 2.0).max(0.0),
            (self.h - amount * 2.0).max(0.0),
        )
    }
}

/// Native pixel operations a surface applies to its whole contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Gray,
    Invert,
    Blur { radius: u32 },
    Posterize { levels: u32 },
    Threshold { level: f32 },
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Gray => f.write_str("GRAY"),
            FilterOp::Invert => f.write_str("INVERT"),
            FilterOp::Blur { radius } => write!(f, "BLUR({radius})"),
            FilterOp::Posterize { levels } => write!(f, "POSTERIZE({levels})"),
            FilterOp::Threshold { level } => write!(f, "THRESHOLD({level})"),
        }
    }
}

pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Paints the whole surface with `color`.
    fn background(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Outlines `rect` with a stroke of `weight` centered on its edges.
    fn stroke_rect(&mut self, rect: Rect, color: Color, weight: f32);
    fn fill_circle(&mut self, cx: f32, cy: f32, diameter: f32, color: Color);
    /// Draws `image` scaled into `rect`.
    fn draw_image(&mut self, image: &DecodedImage, rect: Rect);
    /// Draws `text` centered on (`cx`, `cy`).
    fn text(&mut self, text: &str, cx: f32, cy: f32, size: f32, color: Color);
    fn filter(&mut self, op: FilterOp);

    /// Current pixel contents, for surfaces that keep pixels.
    fn pixels(&self) -> Option<&RgbaImage> {
        None
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Color),
    FillRect(Rect, Color),
    StrokeRect(Rect, Color, f32),
    FillCircle {
        cx: f32,
        cy: f32,
        diameter: f32,
        color: Color,
    },
    Image {
        name: String,
        rect: Rect,
    },
    Text {
        text: String,
        cx: f32,
        cy: f32,
        size: f32,
        color: Color,
    },
    Filter(FilterOp),
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::Background(c) => write!(f, "background {:?}", c.0),
            DrawCommand::FillRect(r, c) => {
                write!(f, "fill-rect {} {} {}x{} {:?}", r.x, r.y, r.w, r.h, c.0)
            }
            DrawCommand::StrokeRect(r, c, w) => write!(
                f,
                "stroke-rect {} {} {}x{} {:?} weight={w}",
                r.x, r.y, r.w, r.h, c.0
            ),
            DrawCommand::FillCircle {
                cx,
                cy,
                diameter,
                color,
            } => write!(f, "circle {cx} {cy} d={diameter} {:?}", color.0),
            DrawCommand::Image { name, rect } => write!(
                f,
                "image {name} {} {} {}x{}",
                rect.x, rect.y, rect.w, rect.h
            ),
            DrawCommand::Text {
                text, cx, cy, size, ..
            } => write!(f, "text {text:?} at {cx} {cy} size={size}"),
            DrawCommand::Filter(op) => write!(f, "filter {op}"),
        }
    }
}

/// A surface that keeps the draw calls instead of pixels.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, Rect)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Image { name, rect } => Some((name.as_str(), *rect)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn filters(&self) -> impl Iterator<Item = FilterOp> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Filter(op) => Some(*op),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn background(&mut self, color: Color) {
        self.commands.push(DrawCommand::Background(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, weight: f32) {
        self.commands.push(DrawCommand::StrokeRect(rect, color, weight));
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, diameter: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            cx,
            cy,
            diameter,
            color,
        });
    }

    fn draw_image(&mut self, image: &DecodedImage, rect: Rect) {
        self.commands.push(DrawCommand::Image {
            name: image.name.clone(),
            rect,
        });
    }

    fn text(&mut self, text: &str, cx: f32, cy: f32, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            cx,
            cy,
            size,
            color,
        });
    }

    fn filter(&mut self, op: FilterOp) {
        self.commands.push(DrawCommand::Filter(op));
    }
}
