//! Data model shared by the service and the local stores

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::overall_score;
use crate::{Error, Result};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Geocoordinates attached by selecting a place suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
    pub country: String,
}

/// Birth data of one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthProfile {
    pub firstname: String,
    /// ISO date (`YYYY-MM-DD`)
    pub date: String,
    /// Local time (`HH:MM`)
    pub time: String,
    pub place: String,
    /// Present only when the place came from a selected suggestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl BirthProfile {
    fn validate(&self, label: &str) -> Result<()> {
        if self.firstname.trim().is_empty() {
            return Err(Error::InvalidInput(format!("{}: first name is required", label)));
        }
        if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            return Err(Error::InvalidInput(format!(
                "{}: birth date must be YYYY-MM-DD",
                label
            )));
        }
        if NaiveTime::parse_from_str(self.time.trim(), "%H:%M").is_err() {
            return Err(Error::InvalidInput(format!("{}: birth time must be HH:MM", label)));
        }
        if self.place.trim().is_empty() {
            return Err(Error::InvalidInput(format!("{}: birth place is required", label)));
        }
        Ok(())
    }
}

/// Last submitted form: both profiles plus the contact email
///
/// This is also the payload of the upstream compatibility call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub person1: BirthProfile,
    pub person2: BirthProfile,
    pub email: String,
}

impl FormSnapshot {
    /// Check required fields and email format before any network call
    pub fn validate(&self) -> Result<()> {
        self.person1.validate("person1")?;
        self.person2.validate("person2")?;
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(Error::InvalidInput("email: invalid address".to_string()));
        }
        Ok(())
    }
}

/// One past computation in the local history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub overall_score: f64,
    pub person1_firstname: String,
    pub person2_firstname: String,
    pub report: Value,
}

impl HistoryEntry {
    /// Snapshot a freshly computed report
    pub fn new(report: Value, person1_firstname: &str, person2_firstname: &str) -> Self {
        Self {
            date: Utc::now(),
            overall_score: overall_score(&report),
            person1_firstname: person1_firstname.to_string(),
            person2_firstname: person2_firstname.to_string(),
            report,
        }
    }
}

/// Last displayed report with the participants' first names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    pub report: Value,
    pub firstname1: String,
    pub firstname2: String,
}

/// Body of the upstream PDF generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfRequest {
    pub person1: BirthProfile,
    pub person2: BirthProfile,
    pub report: Value,
}

impl PdfRequest {
    /// Rebuild the PDF payload from local state
    ///
    /// First names come from the saved report slot. Birth details come from
    /// the form snapshot when it belongs to the same pair, otherwise from the
    /// `person1`/`person2` objects echoed in the report.
    pub fn rebuild(saved: &SavedReport, form: Option<&FormSnapshot>) -> Self {
        let form = form.filter(|f| {
            f.person1.firstname == saved.firstname1 && f.person2.firstname == saved.firstname2
        });

        let profile = |firstname: &str, from_form: Option<&BirthProfile>, key: &str| {
            match from_form {
                Some(p) => BirthProfile {
                    firstname: firstname.to_string(),
                    ..p.clone()
                },
                None => {
                    let field = |name: &str| {
                        saved
                            .report
                            .get(key)
                            .and_then(|p| p.get(name))
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string()
                    };
                    BirthProfile {
                        firstname: firstname.to_string(),
                        date: field("date"),
                        time: field("time"),
                        place: field("place"),
                        coordinates: None,
                    }
                }
            }
        };

        Self {
            person1: profile(&saved.firstname1, form.map(|f| &f.person1), "person1"),
            person2: profile(&saved.firstname2, form.map(|f| &f.person2), "person2"),
            report: saved.report.clone(),
        }
    }
}

/// Checkout session request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub person1_firstname: String,
    pub person2_firstname: String,
}

/// Analytics event forwarded to the upstream log sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub person1_firstname: String,
    pub person2_firstname: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(name: &str) -> BirthProfile {
        BirthProfile {
            firstname: name.to_string(),
            date: "1990-04-12".to_string(),
            time: "08:30".to_string(),
            place: "Lyon".to_string(),
            coordinates: None,
        }
    }

    fn form() -> FormSnapshot {
        FormSnapshot {
            person1: profile("Ana"),
            person2: profile("Léo"),
            email: "ana@example.com".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_missing_firstname_rejected() {
        let mut f = form();
        f.person2.firstname = "  ".to_string();
        let err = f.validate().unwrap_err();
        assert!(err.to_string().contains("person2"));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut f = form();
        f.email = "ana@example".to_string();
        assert!(matches!(f.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_bad_time_rejected() {
        let mut f = form();
        f.person1.time = "25:99".to_string();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_coordinates_omitted_when_absent() {
        let value = serde_json::to_value(profile("Ana")).unwrap();
        assert!(value.get("coordinates").is_none());
    }

    #[test]
    fn test_history_entry_takes_score_from_report() {
        let entry = HistoryEntry::new(json!({"overall_score": 77.5}), "Ana", "Léo");
        assert_eq!(entry.overall_score, 77.5);
        let entry = HistoryEntry::new(json!({}), "Ana", "Léo");
        assert_eq!(entry.overall_score, 0.0);
    }

    #[test]
    fn test_pdf_request_prefers_matching_form() {
        let saved = SavedReport {
            report: json!({"person1": {"date": "2000-01-01"}}),
            firstname1: "Ana".to_string(),
            firstname2: "Léo".to_string(),
        };
        let request = PdfRequest::rebuild(&saved, Some(&form()));
        assert_eq!(request.person1.date, "1990-04-12");
        assert_eq!(request.person2.place, "Lyon");
    }

    #[test]
    fn test_pdf_request_falls_back_to_report_fields() {
        let saved = SavedReport {
            report: json!({"person1": {"date": "2000-01-01", "time": "10:00", "place": "Nice"}}),
            firstname1: "Zoé".to_string(),
            firstname2: "Max".to_string(),
        };
        let request = PdfRequest::rebuild(&saved, Some(&form()));
        assert_eq!(request.person1.firstname, "Zoé");
        assert_eq!(request.person1.place, "Nice");
        assert_eq!(request.person2.date, "");
    }
}
