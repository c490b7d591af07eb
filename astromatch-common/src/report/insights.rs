//! Named insights extracted from a compatibility report

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::sentences::{pick_potential, SentencePool, POTENTIAL_MIN};
use super::{overall_score, probe_text};
use crate::Locale;

const STRONGEST_PATHS: &[&str] = &[
    "strongest_dimension",
    "analysis.strongest_dimension",
    "v2_dimensions.strongest",
    "v2.strongest_dimension",
    "dimensions.strongest",
];

const WEAKEST_PATHS: &[&str] = &[
    "weakest_dimension",
    "analysis.weakest_dimension",
    "v2_dimensions.weakest",
    "v2.weakest_dimension",
    "dimensions.weakest",
];

const POTENTIAL_PATHS: &[&str] = &[
    "potential",
    "analysis.potential",
    "v2.potential",
    "relationship_potential",
    "analysis.relationship_potential",
];

const FIRST_IMPRESSION_PATHS: &[&str] = &[
    "first_impression",
    "analysis.first_impression",
    "v2.first_impression",
];

const DESTINY_PATHS: &[&str] = &["destiny", "analysis.destiny", "v2.destiny"];

const HIDDEN_TENSION_PATHS: &[&str] = &[
    "hidden_tension",
    "analysis.hidden_tension",
    "v2.hidden_tension",
];

const COMMUNICATION_PATHS: &[&str] = &[
    "communication",
    "analysis.communication",
    "v2.communication",
];

const KARMIC_PATHS: &[&str] = &["karmic", "analysis.karmic", "v2.karmic", "karmic_link"];

/// Free-text fields scanned for sentences, in priority order
const DESCRIPTION_PATHS: &[&str] = &[
    "description",
    "analysis.description",
    "summary",
    "analysis.summary",
    "v2.description",
    "v2.summary",
    "analysis.text",
];

/// Below this many filled slots the generic texts kick in
const SPARSE_THRESHOLD: usize = 3;

/// Scanned sentences and generic texts are always longer than this many
/// characters; a direct field only has to be non-empty
pub const MIN_DERIVED_CHARS: usize = 10;

const _: () = assert!(SentencePool::MIN_LEN > MIN_DERIVED_CHARS);
const _: () = assert!(POTENTIAL_MIN >= MIN_DERIVED_CHARS);

fn topic(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("valid topic regex")
}

static POTENTIAL_RE: Lazy<Regex> =
    Lazy::new(|| topic("potentiel|évolution|relation|compatibilité|harmonie"));
static FIRST_IMPRESSION_RE: Lazy<Regex> = Lazy::new(|| {
    topic("première impression|first impression|rencontre|attirance|attraction|coup de foudre")
});
static DESTINY_RE: Lazy<Regex> = Lazy::new(|| topic("destin|fate|avenir|future"));
static HIDDEN_TENSION_RE: Lazy<Regex> =
    Lazy::new(|| topic("tension|conflit|conflict|friction|défi|challenge|obstacle"));
static COMMUNICATION_RE: Lazy<Regex> =
    Lazy::new(|| topic("communic|dialogue|échange|exchange|parole|écoute|listen|convers"));
static KARMIC_RE: Lazy<Regex> = Lazy::new(|| topic("karm|vie antérieure|past li|âme|soul"));
static RELATIONSHIP_RE: Lazy<Regex> =
    Lazy::new(|| topic("relation|couple|partenaire|partner|lien|bond|ensemble|together"));

/// Canonical insight slots; each is a trimmed non-empty string or absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strongest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_impression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destiny: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_tension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub karmic: Option<String>,
}

impl Insights {
    /// Number of filled slots (out of 8)
    pub fn filled(&self) -> usize {
        [
            &self.strongest,
            &self.weakest,
            &self.potential,
            &self.first_impression,
            &self.destiny,
            &self.hidden_tension,
            &self.communication,
            &self.karmic,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }
}

/// Extract the display insights of a report
///
/// Direct fields first, then sentences scanned from the description
/// fields, then score-banded texts in `locale`.
pub fn derive_insights(report: &Value, locale: Locale) -> Insights {
    let score = overall_score(report);
    let mut pool = SentencePool::collect(report, DESCRIPTION_PATHS);

    let mut insights = Insights {
        strongest: probe_text(report, STRONGEST_PATHS),
        weakest: probe_text(report, WEAKEST_PATHS),
        potential: probe_text(report, POTENTIAL_PATHS),
        first_impression: probe_text(report, FIRST_IMPRESSION_PATHS),
        destiny: probe_text(report, DESTINY_PATHS),
        hidden_tension: probe_text(report, HIDDEN_TENSION_PATHS),
        communication: probe_text(report, COMMUNICATION_PATHS),
        karmic: probe_text(report, KARMIC_PATHS),
    };

    if insights.potential.is_none() {
        insights.potential = pick_potential(report, DESCRIPTION_PATHS, &POTENTIAL_RE);
        if let Some(text) = &insights.potential {
            pool.mark_used(text);
        }
    }
    if insights.potential.is_none() {
        insights.potential = Some(locale.potential_fallback(score).to_string());
    }

    let derived: [(&mut Option<String>, &Regex); 5] = [
        (&mut insights.first_impression, &*FIRST_IMPRESSION_RE),
        (&mut insights.destiny, &*DESTINY_RE),
        (&mut insights.hidden_tension, &*HIDDEN_TENSION_RE),
        (&mut insights.communication, &*COMMUNICATION_RE),
        (&mut insights.karmic, &*KARMIC_RE),
    ];
    for (slot, topic) in derived {
        if slot.is_none() {
            *slot = pool.take_matching(topic);
        }
    }

    if insights.filled() < SPARSE_THRESHOLD {
        if insights.strongest.is_none() && score >= 60.0 {
            insights.strongest = Some(locale.strongest_fallback().to_string());
        }
        if insights.weakest.is_none() && score < 70.0 {
            insights.weakest = Some(locale.weakest_fallback().to_string());
        }
        if insights.destiny.is_none() {
            insights.destiny = Some(locale.destiny_fallback().to_string());
        }
        if insights.communication.is_none() {
            insights.communication = pool.take_matching(&RELATIONSHIP_RE);
        }
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_path_wins() {
        let report = json!({
            "strongest_dimension": "A",
            "analysis": {"strongest_dimension": "B"}
        });
        let insights = derive_insights(&report, Locale::Fr);
        assert_eq!(insights.strongest.as_deref(), Some("A"));
    }

    #[test]
    fn test_later_path_used_when_earlier_blank() {
        let report = json!({
            "strongest_dimension": "   ",
            "v2": {"strongest_dimension": "  Emotional harmony  "}
        });
        let insights = derive_insights(&report, Locale::En);
        assert_eq!(insights.strongest.as_deref(), Some("Emotional harmony"));
    }

    #[test]
    fn test_potential_from_score_only() {
        let insights = derive_insights(&json!({"overall_score": 82}), Locale::En);
        assert_eq!(
            insights.potential.as_deref(),
            Some(Locale::En.potential_fallback(82.0))
        );
        assert_eq!(
            insights.potential.as_deref(),
            Some("Your relationship has strong potential for lasting growth and closeness.")
        );
    }

    #[test]
    fn test_sparse_report_gets_generic_texts() {
        let insights = derive_insights(&json!({"overall_score": 65}), Locale::Fr);
        assert_eq!(insights.strongest.as_deref(), Some(Locale::Fr.strongest_fallback()));
        assert_eq!(insights.weakest.as_deref(), Some(Locale::Fr.weakest_fallback()));
        assert_eq!(insights.destiny.as_deref(), Some(Locale::Fr.destiny_fallback()));
        assert!(insights.communication.is_none());
    }

    #[test]
    fn test_score_bands_gate_generic_texts() {
        let high = derive_insights(&json!({"overall_score": 90}), Locale::En);
        assert!(high.strongest.is_some());
        assert!(high.weakest.is_none());

        let low = derive_insights(&json!({"overall_score": 30}), Locale::En);
        assert!(low.strongest.is_none());
        assert!(low.weakest.is_some());
    }

    #[test]
    fn test_rich_report_skips_generic_texts() {
        let report = json!({
            "overall_score": 65,
            "strongest_dimension": "Shared values",
            "weakest_dimension": "Daily rhythm",
            "hidden_tension": "Unspoken expectations about money",
        });
        let insights = derive_insights(&report, Locale::En);
        assert!(insights.filled() >= SPARSE_THRESHOLD);
        assert!(insights.destiny.is_none());
    }

    #[test]
    fn test_topic_sentences_are_distributed() {
        let report = json!({
            "overall_score": 55,
            "analysis": {
                "description": "This relationship leaves room for real growth. \
                                Your first impression was a true coup de foudre. \
                                Open dialogue will carry you through hard seasons. \
                                An old karmic thread ties your two souls. \
                                A hidden tension appears around independence."
            }
        });
        let insights = derive_insights(&report, Locale::En);
        assert_eq!(
            insights.first_impression.as_deref(),
            Some("Your first impression was a true coup de foudre")
        );
        assert_eq!(
            insights.communication.as_deref(),
            Some("Open dialogue will carry you through hard seasons")
        );
        assert_eq!(
            insights.karmic.as_deref(),
            Some("An old karmic thread ties your two souls")
        );
        assert_eq!(
            insights.hidden_tension.as_deref(),
            Some("A hidden tension appears around independence")
        );
    }

    #[test]
    fn test_relationship_sentence_fills_communication_when_sparse() {
        let report = json!({
            "overall_score": 40,
            "summary": "Your harmonie is a quiet strength in this bond. \
                        You build a lasting bond when working together."
        });
        let insights = derive_insights(&report, Locale::En);
        assert_eq!(
            insights.potential.as_deref(),
            Some("Your harmonie is a quiet strength in this bond")
        );
        assert_eq!(
            insights.communication.as_deref(),
            Some("You build a lasting bond when working together")
        );
    }

    #[test]
    fn test_potential_sentence_not_reused() {
        let report = json!({
            "overall_score": 40,
            "summary": "Your couple thrives when you stay together on projects."
        });
        let insights = derive_insights(&report, Locale::En);
        // the only sentence is taken by potential, leaving nothing else
        assert_eq!(
            insights.potential.as_deref(),
            Some("Your couple thrives when you stay together on projects")
        );
        assert!(insights.communication.is_none());
    }

    #[test]
    fn test_derived_slots_exceed_minimum_length() {
        let report = json!({
            "overall_score": 45,
            "description": "Fate is near. Love. Talk more. \
                            Your relationship grows with every season. \
                            Your future together is bright and open. \
                            A karmic bond ties you."
        });
        for locale in [Locale::Fr, Locale::En] {
            let insights = derive_insights(&report, locale);
            for text in [
                &insights.strongest,
                &insights.weakest,
                &insights.potential,
                &insights.first_impression,
                &insights.destiny,
                &insights.hidden_tension,
                &insights.communication,
                &insights.karmic,
            ]
            .into_iter()
            .flatten()
            {
                assert!(text.chars().count() > MIN_DERIVED_CHARS, "{:?}", text);
            }
            // too short for the pool, so destiny comes from the longer sentence
            assert_eq!(
                insights.destiny.as_deref(),
                Some("Your future together is bright and open")
            );
        }
    }

    #[test]
    fn test_generic_texts_exceed_minimum_length() {
        for locale in [Locale::Fr, Locale::En] {
            for text in [
                locale.potential_fallback(90.0),
                locale.potential_fallback(60.0),
                locale.potential_fallback(10.0),
                locale.strongest_fallback(),
                locale.weakest_fallback(),
                locale.destiny_fallback(),
            ] {
                assert!(text.chars().count() > MIN_DERIVED_CHARS, "{}", text);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let report = json!({
            "overall_score": 71.5,
            "v2": {"description": "Destiny guides your future together. Conflict fades with time and care."}
        });
        let a = serde_json::to_string(&derive_insights(&report, Locale::Fr)).unwrap();
        let b = serde_json::to_string(&derive_insights(&report, Locale::Fr)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_total_on_garbage() {
        for report in [
            Value::Null,
            json!({}),
            json!([1, "two", null]),
            json!("just a string"),
            json!({"analysis": null, "v2": 42, "description": {"nested": [null]}}),
            json!({"strongest_dimension": 5, "overall_score": {"x": 1}}),
        ] {
            let insights = derive_insights(&report, Locale::En);
            assert!(insights.potential.is_some());
            assert!(insights.destiny.is_some());
        }
    }
}
