//! Place resolver
//!
//! Turns free-text birth places into geocoded suggestions using a
//! Nominatim-compatible search endpoint. Each form field owns a search
//! slot with a generation counter: a response is applied to its slot only
//! if no newer search started meanwhile, so a slow answer to `Par` can
//! never replace the results for `Paris`.

use astromatch_common::Locale;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use crate::upstream::UpstreamError;

const USER_AGENT: &str = concat!("AstroMatch/", env!("CARGO_PKG_VERSION"));
const RESULT_LIMIT: u32 = 8;

/// Shortest query sent to the geocoder, in characters
pub const MIN_QUERY_CHARS: usize = 2;

/// One geocoded suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Human-readable label, also used as the profile's place string
    pub label: String,
    pub lat: String,
    pub lon: String,
    pub country: String,
}

/// Form field owning a search slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaceField {
    #[default]
    Person1,
    Person2,
}

impl PlaceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceField::Person1 => "person1",
            PlaceField::Person2 => "person2",
        }
    }
}

impl fmt::Display for PlaceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceField {
    type Err = astromatch_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person1" => Ok(PlaceField::Person1),
            "person2" => Ok(PlaceField::Person2),
            other => Err(astromatch_common::Error::InvalidInput(format!(
                "Unknown place field: {}",
                other
            ))),
        }
    }
}

/// Result of a search as seen by its slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Latest search for the slot; suggestions were updated
    Fresh(Vec<PlaceCandidate>),
    /// A newer search started first; the slot was left untouched
    Superseded,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    lat: Value,
    #[serde(default)]
    lon: Value,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Coordinates arrive as strings from Nominatim, as numbers elsewhere
fn coordinate_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

impl From<NominatimPlace> for PlaceCandidate {
    fn from(place: NominatimPlace) -> Self {
        let address = &place.address;
        let locality = non_empty(&address.city)
            .or_else(|| non_empty(&address.town))
            .or_else(|| non_empty(&address.village));

        let mut parts: Vec<&str> = Vec::new();
        for part in [
            non_empty(&place.name),
            locality,
            non_empty(&address.state),
            non_empty(&address.country),
        ]
        .into_iter()
        .flatten()
        {
            // "Lyon, Lyon, ..." when the place is the city itself
            if parts.last() != Some(&part) {
                parts.push(part);
            }
        }

        let label = if parts.is_empty() {
            place.display_name.clone().unwrap_or_default()
        } else {
            parts.join(", ")
        };

        PlaceCandidate {
            label,
            lat: coordinate_text(&place.lat),
            lon: coordinate_text(&place.lon),
            country: non_empty(&address.country).unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct SearchSlot {
    generation: u64,
    suggestions: Vec<PlaceCandidate>,
}

/// Geocoding client with per-slot stale-result suppression
#[derive(Debug)]
pub struct PlaceResolver {
    http_client: reqwest::Client,
    base_url: String,
    slots: Mutex<HashMap<PlaceField, SearchSlot>>,
}

impl PlaceResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            slots: Mutex::new(HashMap::new()),
        })
    }

    fn with_slots<R>(&self, f: impl FnOnce(&mut HashMap<PlaceField, SearchSlot>) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut slots)
    }

    /// Start a search in `slot`, returning its generation
    fn begin(&self, slot: PlaceField) -> u64 {
        self.with_slots(|slots| {
            let entry = slots.entry(slot).or_default();
            entry.generation += 1;
            entry.generation
        })
    }

    /// Store `suggestions` if `generation` is still the slot's latest
    fn apply(&self, slot: PlaceField, generation: u64, suggestions: Vec<PlaceCandidate>) -> SearchOutcome {
        self.with_slots(|slots| {
            let entry = slots.entry(slot).or_default();
            if entry.generation != generation {
                return SearchOutcome::Superseded;
            }
            entry.suggestions = suggestions.clone();
            SearchOutcome::Fresh(suggestions)
        })
    }

    /// Current suggestions of a slot
    pub fn suggestions(&self, slot: PlaceField) -> Vec<PlaceCandidate> {
        self.with_slots(|slots| {
            slots
                .get(&slot)
                .map(|s| s.suggestions.clone())
                .unwrap_or_default()
        })
    }

    /// Search places for `query` on behalf of `slot`
    ///
    /// Queries shorter than [`MIN_QUERY_CHARS`] clear the slot without any
    /// network call.
    pub async fn search(&self, slot: PlaceField, query: &str, locale: Locale) -> Result<SearchOutcome, UpstreamError> {
        let generation = self.begin(slot);
        let query = query.trim();

        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(self.apply(slot, generation, Vec::new()));
        }

        let url = format!("{}/search", self.base_url);
        let limit = RESULT_LIMIT.to_string();
        tracing::debug!(%slot, query, generation, "Searching places");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", limit.as_str()),
                ("accept-language", locale.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;
        let candidates = places.into_iter().map(PlaceCandidate::from).collect();

        let outcome = self.apply(slot, generation, candidates);
        if outcome == SearchOutcome::Superseded {
            tracing::debug!(%slot, query, generation, "Discarding stale place results");
        }
        Ok(outcome)
    }
}
