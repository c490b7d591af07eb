//! Append-only history of past computations, newest first

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{keys, KeyValueStore};
use crate::models::HistoryEntry;
use crate::Result;

/// History log stored as one serialized JSON array
///
/// Entries are never updated, removed or capped. Order is prepend order,
/// not `date` order.
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Prepend `entry` and write back the full list
    pub async fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.list().await;
        entries.insert(0, entry);
        let serialized = serde_json::to_string(&entries)?;
        self.store.set(keys::HISTORY, &serialized).await?;
        debug!(count = entries.len(), "History entry appended");
        Ok(())
    }

    /// All entries, newest first
    ///
    /// Unreadable storage degrades to an empty list; an unreadable entry
    /// inside a readable list is skipped.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        let raw = match self.store.get(keys::HISTORY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read history: {}", e);
                return Vec::new();
            }
        };

        let items: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!("Discarding corrupt history: {}", e);
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<HistoryEntry>(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping malformed history entry: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Entry at `index` (0 = newest), `None` when out of range
    pub async fn get_at(&self, index: usize) -> Option<HistoryEntry> {
        self.list().await.into_iter().nth(index)
    }
}
