//! Local durable key/value storage
//!
//! The service keeps its per-user state the way a browser keeps local
//! storage: a flat map of fixed string keys to serialized string values.
//! Stores built on top of it ([`HistoryStore`], [`SessionCache`]) own the
//! serialization and treat unreadable values as absent.

use async_trait::async_trait;

use crate::Result;

mod history;
mod memory;
mod session;
mod sqlite;

pub use history::HistoryStore;
pub use memory::MemoryStore;
pub use session::SessionCache;
pub use sqlite::SqliteStore;

/// Fixed storage slots
pub mod keys {
    pub const LANG: &str = "astromatch_lang";
    pub const REPORT: &str = "astromatch_report";
    pub const FIRSTNAME1: &str = "astromatch_firstname1";
    pub const FIRSTNAME2: &str = "astromatch_firstname2";
    pub const FORM: &str = "astromatch_form";
    pub const HISTORY: &str = "astromatch_history";
    pub const PREMIUM_SESSION: &str = "astromatch_premium_session";
}

/// String key/value store with overwrite semantics
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value at `key`, `None` when never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value at `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
