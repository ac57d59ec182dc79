use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::catalog::FilterName;
use crate::events::UploadedImage;

pub const DEFAULT_BLUR: i32 = 3;
pub const DEFAULT_POSTERIZE: i32 = 5;
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Layout policy used to compose uploaded images onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    Single,
    Grid,
    Video,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Single, Template::Grid, Template::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            Template::Single => "single",
            Template::Grid => "grid",
            Template::Video => "video",
        }
    }

    /// Templates that need the frame loop to keep redrawing.
    pub fn is_animated(self) -> bool {
        matches!(self, Template::Video)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown template: {0}")]
pub struct UnknownTemplate(pub String);

impl FromStr for Template {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Slider-backed parameters shared by the parameterized filters.
///
/// Values are stored exactly as the controls report them; clamping is left to
/// the surface's native filter implementation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterParameters {
    pub blur: i32,
    pub posterize: i32,
    pub threshold: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            blur: DEFAULT_BLUR,
            posterize: DEFAULT_POSTERIZE,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Ordered set of selected filter names. Insertion order is application order.
///
/// Names are not validated here; the catalog skips unknown ones at apply time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilters(Vec<String>);

impl ActiveFilters {
    pub fn set(&mut self, name: &str, checked: bool) {
        if checked {
            if !self.contains(name) {
                self.0.push(name.to_string());
            }
        } else {
            self.0.retain(|f| f != name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|f| f == name)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Single source of truth for the session. Owned by the coordinator.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub current_template: Template,
    pub uploaded_images: Vec<UploadedImage>,
    pub active_filters: ActiveFilters,
    pub parameters: FilterParameters,
}

/// Headless mirror of what the control page displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    pub active_template: Template,
    pub checkboxes: BTreeMap<String, bool>,
    pub sliders: FilterParameters,
    pub readouts: Readouts,
    pub uploaded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readouts {
    pub blur: String,
    pub posterize: String,
    pub threshold: String,
}

impl Readouts {
    pub fn from_parameters(params: &FilterParameters) -> Self {
        Self {
            blur: params.blur.to_string(),
            posterize: params.posterize.to_string(),
            threshold: params.threshold.to_string(),
        }
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        let params = FilterParameters::default();
        Self {
            active_template: Template::default(),
            checkboxes: FilterName::ALL
                .iter()
                .map(|f| (f.as_str().to_string(), false))
                .collect(),
            sliders: params,
            readouts: Readouts::from_parameters(&params),
            uploaded: Vec::new(),
        }
    }
}

impl ControlPanel {
    pub fn checked(&self, name: &str) -> bool {
        self.checkboxes.get(name).copied().unwrap_or(false)
    }

    pub fn uncheck_all(&mut self) {
        for checked in self.checkboxes.values_mut() {
            *checked = false;
        }
    }

    /// Pushes slider positions and readout labels back in line with `params`.
    pub fn sync_parameters(&mut self, params: &FilterParameters) {
        self.sliders = *params;
        self.readouts = Readouts::from_parameters(params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_names_round_trip() {
        for t in Template::ALL {
            assert_eq!(t.as_str().parse::<Template>(), Ok(t));
        }
        assert_eq!(
            "carousel".parse::<Template>(),
            Err(UnknownTemplate("carousel".into()))
        );
    }

    #[test]
    fn check_then_uncheck_restores_previous_set() {
        let mut filters = ActiveFilters::default();
        filters.set("invert", true);
        let before = filters.clone();
        filters.set("blur", true);
        filters.set("blur", false);
        assert_eq!(filters, before);
    }

    #[test]
    fn checking_twice_keeps_single_entry() {
        let mut filters = ActiveFilters::default();
        filters.set("posterize", true);
        filters.set("posterize", true);
        assert_eq!(filters.names(), ["posterize".to_string()]);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut filters = ActiveFilters::default();
        filters.set("threshold", true);
        filters.set("grayscale", true);
        filters.set("blur", true);
        assert_eq!(filters.names(), ["threshold", "grayscale", "blur"]);
    }

    #[test]
    fn readouts_match_default_labels() {
        let panel = ControlPanel::default();
        assert_eq!(panel.readouts.blur, "3");
        assert_eq!(panel.readouts.posterize, "5");
        assert_eq!(panel.readouts.threshold, "0.5");
        assert_eq!(panel.checkboxes.len(), FilterName::ALL.len());
    }
}
