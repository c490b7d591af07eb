//! Report normalization
//!
//! Compatibility reports come from the upstream service with no fixed
//! shape: the same logical field may live at several alternative paths,
//! or be missing entirely. Everything here is a total, pure function of
//! the raw JSON value and the display locale. Nothing panics, nothing is
//! cached, and identical input always yields identical output.

mod insights;
mod intensity;
mod sentences;

pub use insights::{derive_insights, Insights, MIN_DERIVED_CHARS};
pub use intensity::{derive_intensities, Dimension, IntensityLevel, IntensityMap};

use serde_json::Value;

/// Follow a dotted path (`analysis.v2_dimensions.harmony`) through objects
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// First candidate path holding a non-empty string, trimmed
pub(crate) fn probe_text(report: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| {
        lookup(report, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Overall compatibility score, 0 when absent or unusable
///
/// Accepts a JSON number or a numeric string.
pub fn overall_score(report: &Value) -> f64 {
    let score = match report.get("overall_score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|s| s.is_finite()).unwrap_or(0.0)
}
