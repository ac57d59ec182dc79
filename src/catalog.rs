//! Named filters and the batch that applies them in checkbox order.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::state::FilterParameters;
use crate::surface::{FilterOp, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterName {
    Grayscale,
    Invert,
    Blur,
    Posterize,
    Threshold,
}

impl FilterName {
    pub const ALL: [FilterName; 5] = [
        FilterName::Grayscale,
        FilterName::Invert,
        FilterName::Blur,
        FilterName::Posterize,
        FilterName::Threshold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterName::Grayscale => "grayscale",
            FilterName::Invert => "invert",
            FilterName::Blur => "blur",
            FilterName::Posterize => "posterize",
            FilterName::Threshold => "threshold",
        }
    }

    /// The surface operation this filter resolves to with `params`.
    pub fn op(self, params: &FilterParameters) -> FilterOp {
        match self {
            FilterName::Grayscale => FilterOp::Gray,
            FilterName::Invert => FilterOp::Invert,
            FilterName::Blur => FilterOp::Blur {
                radius: params.blur.max(0) as u32,
            },
            FilterName::Posterize => FilterOp::Posterize {
                levels: params.posterize.max(0) as u32,
            },
            FilterName::Threshold => FilterOp::Threshold {
                level: params.threshold,
            },
        }
    }
}

impl fmt::Display for FilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter: {0}")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterName {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterName::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

pub fn grayscale(surface: &mut dyn Surface) {
    surface.filter(FilterName::Grayscale.op(&FilterParameters::default()));
}

pub fn invert(surface: &mut dyn Surface) {
    surface.filter(FilterName::Invert.op(&FilterParameters::default()));
}

pub fn blur(surface: &mut dyn Surface, amount: i32) {
    let params = FilterParameters {
        blur: amount,
        ..FilterParameters::default()
    };
    surface.filter(FilterName::Blur.op(&params));
}

pub fn posterize(surface: &mut dyn Surface, levels: i32) {
    let params = FilterParameters {
        posterize: levels,
        ..FilterParameters::default()
    };
    surface.filter(FilterName::Posterize.op(&params));
}

pub fn threshold(surface: &mut dyn Surface, level: f32) {
    let params = FilterParameters {
        threshold: level,
        ..FilterParameters::default()
    };
    surface.filter(FilterName::Threshold.op(&params));
}

/// Applies `names` in order. Unknown names are logged and skipped.
///
/// Returns how many filters were applied.
pub fn apply_filters<S: AsRef<str>>(
    surface: &mut dyn Surface,
    names: &[S],
    params: &FilterParameters,
) -> usize {
    let mut applied = 0;
    for name in names {
        let name = name.as_ref();
        match name.parse::<FilterName>() {
            Ok(filter) => {
                let op = filter.op(params);
                debug!(filter = %filter, op = %op, "applying filter");
                surface.filter(op);
                applied += 1;
            }
            Err(err) => warn!("{err}; skipping"),
        }
    }
    applied
}
