//! Layout policies for composing decoded images onto a surface.

use image::Rgba;

use crate::events::{DecodedImage, DecodedImageSet};
use crate::processing::layout::{contain_rect, letterbox_region};
use crate::state::Template;
use crate::surface::{BLACK, Rect, Surface, WHITE, gray};

pub const GRID_COLUMNS: usize = 2;
pub const GRID_ROWS: usize = 2;
pub const GRID_PADDING: f32 = 10.0;
pub const VIDEO_ASPECT: f32 = 16.0 / 9.0;
pub const VIDEO_BORDER_WEIGHT: f32 = 3.0;
pub const RECORDING_DOT_DIAMETER: f32 = 15.0;
pub const RECORDING_DOT_INSET: f32 = 20.0;
/// The recording dot shows for the first half of every cycle.
pub const RECORDING_BLINK_PERIOD: u64 = 60;

const SINGLE_PLACEHOLDER: &str = "Upload an image to get started";
const VIDEO_PLACEHOLDER: &str = "Upload an image for video template";

/// Paints `template` with `images`. `frame` drives the video overlay blink.
pub fn render(surface: &mut dyn Surface, template: Template, images: &DecodedImageSet, frame: u64) {
    match template {
        Template::Single => single(surface, images.get(0)),
        Template::Grid => grid(surface, images),
        Template::Video => video(surface, images.get(0), frame),
    }
}

/// Welcome screen shown before anything has been uploaded.
pub fn welcome(surface: &mut dyn Surface) {
    let (cx, cy) = surface.bounds().center();
    surface.background(gray(240));
    surface.text("Welcome to Filter Workflow App", cx, cy - 20.0, 20.0, gray(100));
    surface.text(
        "Upload images and select a template to begin",
        cx,
        cy + 20.0,
        16.0,
        gray(100),
    );
}

fn single(surface: &mut dyn Surface, image: Option<&DecodedImage>) {
    let bounds = surface.bounds();
    surface.background(gray(240));
    match image {
        Some(img) => {
            let rect = contain_rect(img.width(), img.height(), bounds);
            surface.draw_image(img, rect);
        }
        None => {
            let (cx, cy) = bounds.center();
            surface.text(SINGLE_PLACEHOLDER, cx, cy, 24.0, gray(150));
        }
    }
}

/// Top-left corner based cell rect for grid slot `index`.
pub fn grid_cell(bounds: Rect, index: usize) -> Rect {
    let cell_w = bounds.w / GRID_COLUMNS as f32;
    let cell_h = bounds.h / GRID_ROWS as f32;
    let col = index % GRID_COLUMNS;
    let row = index / GRID_COLUMNS;
    Rect::new(
        bounds.x + col as f32 * cell_w,
        bounds.y + row as f32 * cell_h,
        cell_w,
        cell_h,
    )
}

fn grid(surface: &mut dyn Surface, images: &DecodedImageSet) {
    let bounds = surface.bounds();
    surface.background(WHITE);

    for index in 0..GRID_COLUMNS * GRID_ROWS {
        let cell = grid_cell(bounds, index);
        let inner = cell.inset(GRID_PADDING);
        surface.fill_rect(inner, gray(240));

        match images.get(index) {
            Some(img) => {
                let rect = contain_rect(img.width(), img.height(), inner);
                surface.draw_image(img, rect);
            }
            None => {
                let (cx, cy) = cell.center();
                surface.text(&format!("Image {}", index + 1), cx, cy, 16.0, gray(150));
            }
        }
    }
}

fn video(surface: &mut dyn Surface, image: Option<&DecodedImage>, frame: u64) {
    let bounds = surface.bounds();
    surface.background(BLACK);

    let Some(img) = image else {
        let (cx, cy) = bounds.center();
        surface.text(VIDEO_PLACEHOLDER, cx, cy, 24.0, WHITE);
        return;
    };

    let region = letterbox_region(bounds, VIDEO_ASPECT);
    let rect = contain_rect(img.width(), img.height(), region);
    surface.draw_image(img, rect);
    surface.stroke_rect(region, Rgba([255, 255, 255, 100]), VIDEO_BORDER_WEIGHT);

    if recording_dot_visible(frame) {
        surface.fill_circle(
            region.x + RECORDING_DOT_INSET,
            region.y + RECORDING_DOT_INSET,
            RECORDING_DOT_DIAMETER,
            Rgba([255, 0, 0, 255]),
        );
    }
}

pub fn recording_dot_visible(frame: u64) -> bool {
    frame % RECORDING_BLINK_PERIOD < RECORDING_BLINK_PERIOD / 2
}
