//! Configuration module for dubdesk
//!
//! Loads API, cache and logging settings from a TOML file.

mod settings;

pub use settings::{ApiSettings, CacheSettings, GeneralSettings, Settings};
