//! Display language and localized texts
//!
//! Two languages are supported. French is the default, matching the
//! product's primary audience.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }

    /// The other language (language toggle)
    pub fn toggled(self) -> Self {
        match self {
            Locale::Fr => Locale::En,
            Locale::En => Locale::Fr,
        }
    }

    /// Sentence used for the potential insight when the report has none
    pub fn potential_fallback(self, score: f64) -> &'static str {
        match (self, ScoreBand::of(score)) {
            (Locale::Fr, ScoreBand::High) => {
                "Votre relation possède un fort potentiel d'épanouissement et de complicité durable."
            }
            (Locale::Fr, ScoreBand::Mid) => {
                "Votre relation présente un potentiel réel qui se construit avec patience et dialogue."
            }
            (Locale::Fr, ScoreBand::Low) => {
                "Votre relation demande des efforts, mais chaque défi peut devenir une source d'évolution."
            }
            (Locale::En, ScoreBand::High) => {
                "Your relationship has strong potential for lasting growth and closeness."
            }
            (Locale::En, ScoreBand::Mid) => {
                "Your relationship shows real potential that grows with patience and dialogue."
            }
            (Locale::En, ScoreBand::Low) => {
                "Your relationship asks for effort, but every challenge can become a source of growth."
            }
        }
    }

    /// Generic strongest-dimension text for sparse reports
    pub fn strongest_fallback(self) -> &'static str {
        match self {
            Locale::Fr => "Une complicité naturelle et une attirance mutuelle évidente.",
            Locale::En => "A natural closeness and an obvious mutual attraction.",
        }
    }

    /// Generic weakest-dimension text for sparse reports
    pub fn weakest_fallback(self) -> &'static str {
        match self {
            Locale::Fr => "Des rythmes différents qui demandent de l'écoute et des compromis.",
            Locale::En => "Different rhythms that call for listening and compromise.",
        }
    }

    /// Generic destiny text for sparse reports
    pub fn destiny_fallback(self) -> &'static str {
        match self {
            Locale::Fr => "Vos chemins se sont croisés pour vous apprendre quelque chose l'un de l'autre.",
            Locale::En => "Your paths crossed so that each of you could learn from the other.",
        }
    }

    /// Text copied to the clipboard by the share action
    pub fn share_text(self, firstname1: &str, firstname2: &str, score: f64) -> String {
        let score = format_score(score);
        match self {
            Locale::Fr => format!(
                "Compatibilité entre {} & {} : {}% ✨\nAnalyse ton couple ici : https://astromatch.app",
                firstname1, firstname2, score
            ),
            Locale::En => format!(
                "Compatibility between {} & {} : {}% ✨\nAnalyze your couple here : https://astromatch.app",
                firstname1, firstname2, score
            ),
        }
    }

    /// User-visible message for a failed primary request
    pub fn request_failed(self) -> &'static str {
        match self {
            Locale::Fr => "Erreur lors du calcul",
            Locale::En => "Error calculating",
        }
    }
}

/// Scores are shown without a trailing `.0` when whole
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{:.1}", score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScoreBand {
    High,
    Mid,
    Low,
}

impl ScoreBand {
    fn of(score: f64) -> Self {
        if score >= 70.0 {
            ScoreBand::High
        } else if score >= 50.0 {
            ScoreBand::Mid
        } else {
            ScoreBand::Low
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "en" => Ok(Locale::En),
            other => Err(Error::InvalidInput(format!("Unsupported language: {}", other))),
        }
    }
}
