//! Single-slot session state: last form, last report, language, unlock
//!
//! Every save overwrites its slot. These slots are what survives the trip
//! through the hosted payment page, which only hands back an opaque
//! session id.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use super::{keys, KeyValueStore};
use crate::models::{FormSnapshot, SavedReport};
use crate::{Locale, Result};

#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read a slot, treating storage errors as absent
    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "Failed to read session slot: {}", e);
                None
            }
        }
    }

    pub async fn save_form(&self, snapshot: &FormSnapshot) -> Result<()> {
        let serialized = serde_json::to_string(snapshot)?;
        self.store.set(keys::FORM, &serialized).await
    }

    pub async fn load_form(&self) -> Option<FormSnapshot> {
        let raw = self.read(keys::FORM).await?;
        serde_json::from_str(&raw)
            .map_err(|e| warn!("Discarding corrupt form snapshot: {}", e))
            .ok()
    }

    /// Store the report being displayed together with both first names
    pub async fn save_report(&self, report: &Value, firstname1: &str, firstname2: &str) -> Result<()> {
        let serialized = serde_json::to_string(report)?;
        self.store.set(keys::REPORT, &serialized).await?;
        self.store.set(keys::FIRSTNAME1, firstname1).await?;
        self.store.set(keys::FIRSTNAME2, firstname2).await
    }

    /// Report slot; missing first names read as empty strings
    pub async fn load_report(&self) -> Option<SavedReport> {
        let raw = self.read(keys::REPORT).await?;
        let report: Value = serde_json::from_str(&raw)
            .map_err(|e| warn!("Discarding corrupt saved report: {}", e))
            .ok()?;
        Some(SavedReport {
            report,
            firstname1: self.read(keys::FIRSTNAME1).await.unwrap_or_default(),
            firstname2: self.read(keys::FIRSTNAME2).await.unwrap_or_default(),
        })
    }

    /// Selected language, French when unset or unrecognized
    pub async fn language(&self) -> Locale {
        self.read(keys::LANG)
            .await
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub async fn set_language(&self, locale: Locale) -> Result<()> {
        self.store.set(keys::LANG, locale.as_str()).await
    }

    /// Switch fr <-> en and return the new language
    pub async fn toggle_language(&self) -> Result<Locale> {
        let next = self.language().await.toggled();
        self.set_language(next).await?;
        Ok(next)
    }

    /// Remember the checkout session that unlocked premium content
    pub async fn mark_premium(&self, session_id: &str) -> Result<()> {
        self.store.set(keys::PREMIUM_SESSION, session_id).await
    }

    pub async fn premium_session(&self) -> Option<String> {
        self.read(keys::PREMIUM_SESSION).await.filter(|s| !s.is_empty())
    }
}
