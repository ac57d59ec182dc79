//! Headless image-filter workflow: upload images, lay them out with a
//! template, run p5-style pixel filters over the canvas and export a PNG.

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod processing;
pub mod render;
pub mod state;
pub mod surface;
pub mod tasks;
pub mod templates;

pub use error::{Error, Result};
