//! Intensity levels per named compatibility dimension

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::lookup;
use crate::Locale;

/// Containers probed for each key, in order; `""` is the report root
const DIMENSION_CONTAINERS: &[&str] = &["v2_dimensions", "v2.dimensions", "analysis.v2_dimensions", ""];

/// Three-level intensity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    Low,
    Medium,
    High,
}

impl IntensityLevel {
    /// `<40` low, `<70` medium, otherwise high
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            IntensityLevel::Low
        } else if score < 70.0 {
            IntensityLevel::Medium
        } else {
            IntensityLevel::High
        }
    }

    /// Classify a free-text level by keyword
    ///
    /// A keyword matches the start of a word, so `strongly` is high but
    /// `effort` is not. The keywords of `locale` are tried before the other
    /// language's.
    pub fn from_text(text: &str, locale: Locale) -> Option<Self> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        [locale, locale.toggled()].into_iter().find_map(|lang| {
            keywords(lang)
                .iter()
                .find(|(_, keys)| {
                    keys.iter()
                        .any(|key| words.iter().any(|word| word.starts_with(key)))
                })
                .map(|(level, _)| *level)
        })
    }

    /// Classify any JSON value; numbers and numeric strings use the score bands
    pub fn from_value(value: &Value, locale: Locale) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(Self::from_score),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(score) if score.is_finite() => Some(Self::from_score(score)),
                _ => Self::from_text(s, locale),
            },
            _ => None,
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Fr, IntensityLevel::Low) => "Faible",
            (Locale::Fr, IntensityLevel::Medium) => "Moyen",
            (Locale::Fr, IntensityLevel::High) => "Fort",
            (Locale::En, IntensityLevel::Low) => "Low",
            (Locale::En, IntensityLevel::Medium) => "Medium",
            (Locale::En, IntensityLevel::High) => "High",
        }
    }

    pub fn stars(&self) -> &'static str {
        match self {
            IntensityLevel::Low => "⭐️",
            IntensityLevel::Medium => "⭐️⭐️",
            IntensityLevel::High => "⭐️⭐️⭐️",
        }
    }
}

const FR_KEYWORDS: &[(IntensityLevel, &[&str])] = &[
    (IntensityLevel::Low, &["faible"]),
    (IntensityLevel::Medium, &["moyen", "modéré"]),
    (IntensityLevel::High, &["fort"]),
];

const EN_KEYWORDS: &[(IntensityLevel, &[&str])] = &[
    (IntensityLevel::Low, &["low", "weak"]),
    (IntensityLevel::Medium, &["medium"]),
    (IntensityLevel::High, &["high", "strong"]),
];

fn keywords(locale: Locale) -> &'static [(IntensityLevel, &'static [&'static str])] {
    match locale {
        Locale::Fr => FR_KEYWORDS,
        Locale::En => EN_KEYWORDS,
    }
}

/// Named dimensions shown in the intensity panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Harmony,
    Intensity,
    Karmic,
    Communication,
    Passion,
    Trust,
    Destiny,
    FirstImpression,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Harmony,
        Dimension::Intensity,
        Dimension::Karmic,
        Dimension::Communication,
        Dimension::Passion,
        Dimension::Trust,
        Dimension::Destiny,
        Dimension::FirstImpression,
    ];

    /// Key spellings used by the upstream service, preferred first
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Dimension::Harmony => &["harmony", "emotional_harmony"],
            Dimension::Intensity => &["intensity", "intensity_score"],
            Dimension::Karmic => &["karmic", "karmic_destiny"],
            Dimension::Communication => &["communication", "communication_score"],
            Dimension::Passion => &["passion", "passion_score"],
            Dimension::Trust => &["trust", "trust_score"],
            Dimension::Destiny => &["destiny"],
            Dimension::FirstImpression => &["first_impression", "first_impression_score"],
        }
    }

    /// Always shown, `medium` when the report says nothing
    pub fn is_required(&self) -> bool {
        matches!(self, Dimension::Harmony | Dimension::Intensity)
    }
}

/// Resolved levels, ordered by dimension
pub type IntensityMap = BTreeMap<Dimension, IntensityLevel>;

fn resolve(report: &Value, dimension: Dimension, locale: Locale) -> Option<IntensityLevel> {
    dimension.keys().iter().find_map(|key| {
        DIMENSION_CONTAINERS.iter().find_map(|container| {
            let path = if container.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", container, key)
            };
            lookup(report, &path).and_then(|v| IntensityLevel::from_value(v, locale))
        })
    })
}

/// Classify every dimension the report supports
///
/// `harmony` and `intensity` are always present; other dimensions only
/// when some probe resolved.
pub fn derive_intensities(report: &Value, locale: Locale) -> IntensityMap {
    Dimension::ALL
        .iter()
        .filter_map(|&dimension| {
            let level = resolve(report, dimension, locale).or_else(|| {
                dimension
                    .is_required()
                    .then_some(IntensityLevel::Medium)
            });
            level.map(|level| (dimension, level))
        })
        .collect()
}
