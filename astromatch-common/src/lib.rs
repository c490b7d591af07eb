//! # AstroMatch Common Library
//!
//! Shared code for the AstroMatch service and tools including:
//! - Birth profile, form snapshot and history data model
//! - Report normalization (insights and intensity levels)
//! - Local durable key/value storage (history, session cache)
//! - Configuration loading
//! - Locale texts and filename utilities

pub mod config;
pub mod error;
pub mod filename;
pub mod locale;
pub mod models;
pub mod report;
pub mod storage;

pub use error::{Error, Result};
pub use locale::Locale;
