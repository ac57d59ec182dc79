use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::events::{SelectedFile, UiEvent};
use crate::state::{FilterParameters, Template};

/// A scripted session: what to upload, which layout and filters to use, and
/// where the exported canvas goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Directory exported PNGs are written to.
    pub output_dir: PathBuf,
    /// Layout to select after the uploads settle.
    pub template: String,
    /// Image files uploaded at the start of the session.
    pub images: Vec<PathBuf>,
    /// Filters checked in order before applying.
    pub filters: Vec<String>,
    pub parameters: FilterParameters,
    /// Whether to press "apply" after checking `filters`. Defaults to true when
    /// any filters are listed.
    pub apply_filters: Option<bool>,
    /// Redraw ticks per second for animated templates.
    pub frame_rate: u32,
    /// Frames to advance before filters are applied and the canvas exported.
    pub advance_frames: u64,
    /// Font used for placeholder text. Falls back to a system sans-serif face.
    pub font: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            template: Template::default().as_str().to_string(),
            images: Vec::new(),
            filters: Vec::new(),
            parameters: FilterParameters::default(),
            apply_filters: None,
            frame_rate: Self::default_frame_rate(),
            advance_frames: 0,
            font: None,
        }
    }
}

impl Configuration {
    const fn default_frame_rate() -> u32 {
        60
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.frame_rate > 0, "frame-rate must be greater than zero");
        Ok(self)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }

    pub fn should_apply(&self) -> bool {
        self.apply_filters.unwrap_or(!self.filters.is_empty())
    }

    /// Files to upload, in listed order.
    pub fn selected_files(&self) -> Vec<SelectedFile> {
        self.images.iter().map(SelectedFile::from_path).collect()
    }

    /// Control changes made after uploading: template, checkboxes and sliders.
    pub fn control_events(&self) -> Vec<UiEvent> {
        let mut events = vec![UiEvent::SelectTemplate(self.template.clone())];
        events.extend(self.filters.iter().map(|name| UiEvent::ToggleFilter {
            name: name.clone(),
            checked: true,
        }));
        events.push(UiEvent::SetBlur(self.parameters.blur));
        events.push(UiEvent::SetPosterize(self.parameters.posterize));
        events.push(UiEvent::SetThreshold(self.parameters.threshold));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
        let cfg = cfg.validated().unwrap();
        assert_eq!(cfg.template, "single");
        assert_eq!(cfg.parameters, FilterParameters::default());
        assert_eq!(cfg.frame_interval(), Duration::from_secs_f64(1.0 / 60.0));
        assert!(!cfg.should_apply());
        assert_eq!(cfg.control_events().len(), 4);
    }

    #[test]
    fn zero_frame_rate_is_rejected() {
        let cfg: Configuration = serde_yaml::from_str("frame-rate: 0").unwrap();
        let err = cfg.validated().unwrap_err();
        assert!(err.to_string().contains("frame-rate"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<Configuration>("delay-ms: 5").is_err());
        assert!(serde_yaml::from_str::<Configuration>("parameters: { sepia: 1 }").is_err());
    }

    #[test]
    fn listed_filters_apply_unless_disabled() {
        let yaml = "filters: [invert, blur]\nparameters: { blur: 7 }\n";
        let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.should_apply());
        assert_eq!(cfg.parameters.blur, 7);
        assert_eq!(cfg.parameters.posterize, 5);
        assert!(matches!(
            &cfg.control_events()[1],
            UiEvent::ToggleFilter { name, checked: true } if name == "invert"
        ));

        let cfg: Configuration =
            serde_yaml::from_str("filters: [invert]\napply-filters: false\n").unwrap();
        assert!(!cfg.should_apply());
    }
}
