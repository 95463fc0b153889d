//! Cover criteria evaluation
//!
//! Every active check is evaluated on its own, so one cover can collect
//! several violations.

use crate::config::{Resolution, ScanConfig};
use crate::models::CoverInfo;

/// Violation reported for tracks without an embedded picture
pub const NO_COVER_FOUND: &str = "No cover found.";

/// The checks of a [`ScanConfig`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub min_resolution: Option<Resolution>,
    pub max_resolution: Option<Resolution>,
    pub require_square_ratio: bool,
    pub max_file_size_kb: Option<f64>,
}

impl From<&ScanConfig> for Criteria {
    fn from(config: &ScanConfig) -> Self {
        Self {
            min_resolution: config.min_resolution,
            max_resolution: config.max_resolution,
            require_square_ratio: config.require_square_ratio,
            max_file_size_kb: config.max_file_size_kb,
        }
    }
}

/// Why a cover is not well-formed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeViolation {
    BelowThreshold(Resolution),
    AboveMaxThreshold(Resolution),
    NotSquare,
}

impl Criteria {
    /// First resolution or ratio check the cover fails, if any
    pub fn shape_violation(&self, resolution: &Resolution) -> Option<ShapeViolation> {
        if let Some(min) = self.min_resolution.filter(|min| resolution.is_below(min)) {
            return Some(ShapeViolation::BelowThreshold(min));
        }
        if let Some(max) = self.max_resolution.filter(|max| resolution.is_above(max)) {
            return Some(ShapeViolation::AboveMaxThreshold(max));
        }
        if self.require_square_ratio && !resolution.is_square() {
            return Some(ShapeViolation::NotSquare);
        }
        None
    }
}

/// Evaluate a track's cover against the criteria
///
/// Returns the violations in a fixed order: missing cover, file size,
/// resolution or ratio. An empty result means the cover passed.
pub fn evaluate(cover: Option<&CoverInfo>, criteria: &Criteria) -> Vec<String> {
    let Some(cover) = cover else {
        return vec![NO_COVER_FOUND.to_string()];
    };

    let mut violations = Vec::new();

    if let Some(limit) = criteria.max_file_size_kb {
        let size_kb = cover.size_kb();
        if size_kb > limit {
            violations.push(format!(
                "Artwork filesize is {size_kb:.2} kB (limit {limit} kB)."
            ));
        }
    }

    let resolution = cover.resolution();
    if let Some(shape) = criteria.shape_violation(&resolution) {
        let reason = match shape {
            ShapeViolation::BelowThreshold(min) => format!("below threshold {min}"),
            ShapeViolation::AboveMaxThreshold(max) => format!("above maximum threshold {max}"),
            ShapeViolation::NotSquare => "not 1:1".to_string(),
        };
        violations.push(format!("Artwork image size is {resolution} ({reason})."));
    }

    violations
}
