use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::catalog;
use crate::error::Result;
use crate::events::{DecodedImageSet, SelectedFile, UiEvent, UploadedImage};
use crate::export;
use crate::state::{AppState, ControlPanel, FilterParameters, Template};
use crate::surface::Surface;
use crate::tasks::{loader, uploads};
use crate::templates;

/// Owns the session state and turns UI events into load, render and filter passes.
///
/// Rules:
/// - State only changes through the methods here.
/// - Every canvas update re-decodes all uploads and is tagged with a new generation;
///   a decode that finishes after a newer update started is discarded.
/// - Applying filters always starts from a fresh render of the template.
pub struct Coordinator<S> {
    state: AppState,
    panel: ControlPanel,
    surface: S,
    decoded: DecodedImageSet,
    generation: u64,
    frame: u64,
    output_dir: PathBuf,
    reads: JoinSet<Result<UploadedImage>>,
    decodes: JoinSet<(u64, DecodedImageSet)>,
}

impl<S: Surface> Coordinator<S> {
    /// Creates the coordinator with default state and paints the welcome screen.
    pub fn new(mut surface: S, output_dir: impl Into<PathBuf>) -> Self {
        templates::welcome(&mut surface);
        Self {
            state: AppState::default(),
            panel: ControlPanel::default(),
            surface,
            decoded: DecodedImageSet::default(),
            generation: 0,
            frame: 0,
            output_dir: output_dir.into(),
            reads: JoinSet::new(),
            decodes: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn decoded(&self) -> &DecodedImageSet {
        &self.decoded
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// True while file reads or decodes are still outstanding.
    pub fn is_busy(&self) -> bool {
        !self.reads.is_empty() || !self.decodes.is_empty()
    }

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::SelectTemplate(name) => {
                self.select_template(&name);
            }
            UiEvent::Upload(files) => {
                self.upload(files);
            }
            UiEvent::ToggleFilter { name, checked } => self.toggle_filter(&name, checked),
            UiEvent::SetBlur(value) => self.set_blur(value),
            UiEvent::SetPosterize(value) => self.set_posterize(value),
            UiEvent::SetThreshold(value) => self.set_threshold(value),
            UiEvent::ApplyFilters => {
                self.apply_all_filters();
            }
            UiEvent::ResetFilters => self.reset_all_filters(),
            UiEvent::Export => {
                if let Err(err) = self.export() {
                    error!("export failed: {err}");
                }
            }
        }
    }

    /// Switches layout and redraws. Unknown names are logged and change nothing.
    pub fn select_template(&mut self, name: &str) -> bool {
        match name.parse::<Template>() {
            Ok(template) => {
                self.state.current_template = template;
                self.panel.active_template = template;
                info!(template = %template, "template changed");
                self.update_canvas();
                true
            }
            Err(err) => {
                warn!("{err}; keeping {}", self.state.current_template);
                false
            }
        }
    }

    /// Starts a read for every selected image. Returns how many were accepted.
    pub fn upload(&mut self, files: Vec<SelectedFile>) -> usize {
        let mut accepted = 0;
        for file in files {
            if !file.is_image() {
                debug!(name = %file.name, media_type = %file.media_type, "ignoring non-image file");
                continue;
            }
            self.reads.spawn(uploads::read_file(file));
            accepted += 1;
        }
        accepted
    }

    pub fn toggle_filter(&mut self, name: &str, checked: bool) {
        self.state.active_filters.set(name, checked);
        self.panel.checkboxes.insert(name.to_string(), checked);
        debug!(active = ?self.state.active_filters.names(), "active filters");
    }

    pub fn set_blur(&mut self, value: i32) {
        self.state.parameters.blur = value;
        self.panel.sliders.blur = value;
        self.panel.readouts.blur = value.to_string();
    }

    pub fn set_posterize(&mut self, value: i32) {
        self.state.parameters.posterize = value;
        self.panel.sliders.posterize = value;
        self.panel.readouts.posterize = value.to_string();
    }

    pub fn set_threshold(&mut self, value: f32) {
        self.state.parameters.threshold = value;
        self.panel.sliders.threshold = value;
        self.panel.readouts.threshold = value.to_string();
    }

    /// Re-decodes every upload in the background and redraws once it settles.
    pub fn update_canvas(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let uploads = self.state.uploaded_images.clone();
        debug!(generation, count = uploads.len(), "canvas update requested");
        self.decodes
            .spawn(async move { (generation, loader::load_images(&uploads).await) });
    }

    /// Redraws the template, then runs the active filters over it in order.
    ///
    /// Returns how many filters were applied.
    pub fn apply_all_filters(&mut self) -> usize {
        self.draw_template();
        let applied = if self.state.active_filters.is_empty() {
            0
        } else {
            catalog::apply_filters(
                &mut self.surface,
                self.state.active_filters.names(),
                &self.state.parameters,
            )
        };
        info!(applied, filters = ?self.state.active_filters.names(), "filters applied");
        applied
    }

    pub fn reset_all_filters(&mut self) {
        self.panel.uncheck_all();
        self.state.active_filters.clear();
        self.state.parameters = FilterParameters::default();
        self.panel.sync_parameters(&self.state.parameters);
        info!("filters reset");
        self.update_canvas();
    }

    /// Writes the current surface pixels to a timestamped PNG.
    ///
    /// Surfaces without pixels export nothing and return `None`.
    pub fn export(&self) -> Result<Option<PathBuf>> {
        match self.surface.pixels() {
            Some(canvas) => export::write_png(canvas, &self.output_dir, Utc::now()).map(Some),
            None => {
                info!(
                    name = %export::export_file_name(Utc::now()),
                    "surface keeps no pixels; nothing exported"
                );
                Ok(None)
            }
        }
    }

    /// Advances the frame counter, redrawing animated templates.
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        if self.state.current_template.is_animated() && !self.decoded.is_empty() {
            self.draw_template();
        }
    }

    /// Waits until every outstanding read and decode has been handled.
    pub async fn settle(&mut self) {
        loop {
            if let Some(joined) = self.reads.join_next().await {
                self.on_read(joined);
                continue;
            }
            if let Some(joined) = self.decodes.join_next().await {
                self.on_decoded(joined);
                continue;
            }
            break;
        }
    }

    /// Drives the coordinator from `events` until the channel closes or `cancel` fires.
    pub async fn run(
        &mut self,
        mut events: Receiver<UiEvent>,
        cancel: CancellationToken,
        frame_interval: Duration,
    ) {
        let mut frames = interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            select! {
                _ = cancel.cancelled() => break,

                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(event) => self.handle(event),
                        None => {
                            debug!("event source closed; settling outstanding work");
                            self.settle().await;
                            break;
                        }
                    }
                }

                Some(joined) = self.reads.join_next(), if !self.reads.is_empty() => {
                    self.on_read(joined);
                }

                Some(joined) = self.decodes.join_next(), if !self.decodes.is_empty() => {
                    self.on_decoded(joined);
                }

                _ = frames.tick() => self.tick(),
            }
        }
    }

    fn draw_template(&mut self) {
        templates::render(
            &mut self.surface,
            self.state.current_template,
            &self.decoded,
            self.frame,
        );
    }

    fn on_read(&mut self, joined: std::result::Result<Result<UploadedImage>, JoinError>) {
        match joined {
            Ok(Ok(upload)) => {
                info!(name = %upload.name, "uploaded");
                self.panel.uploaded.push(format!("✓ {}", upload.name));
                self.state.uploaded_images.push(upload);
                self.update_canvas();
            }
            Ok(Err(err)) => error!("{err}"),
            Err(err) => error!("upload task failed: {err}"),
        }
    }

    fn on_decoded(&mut self, joined: std::result::Result<(u64, DecodedImageSet), JoinError>) {
        match joined {
            Ok((generation, set)) if generation == self.generation => {
                self.decoded = set;
                self.draw_template();
            }
            Ok((generation, _)) => {
                debug!(
                    generation,
                    current = self.generation,
                    "discarding stale decode"
                );
            }
            Err(err) => error!("decode batch failed: {err}"),
        }
    }
}
