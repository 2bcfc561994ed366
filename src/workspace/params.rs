//! Workspace query-string vocabulary

use reqwest::Url;
use std::fmt;

use crate::{DubdeskError, Result};

pub const SECTION_PARAM: &str = "section";
pub const CREATE_PARAM: &str = "create";

const PARSE_BASE: &str = "http://workspace.local/";

/// Top-level areas of the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkspaceSection {
    #[default]
    Projects,
    VoiceSamples,
    Glossary,
    Guide,
    Support,
}

impl WorkspaceSection {
    pub const ALL: [WorkspaceSection; 5] = [
        Self::Projects,
        Self::VoiceSamples,
        Self::Glossary,
        Self::Guide,
        Self::Support,
    ];

    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::VoiceSamples => "voice-samples",
            Self::Glossary => "glossary",
            Self::Guide => "guide",
            Self::Support => "support",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_param() == value)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Projects => "My workspace",
            Self::VoiceSamples => "Voice samples",
            Self::Glossary => "Glossary",
            Self::Guide => "Guide",
            Self::Support => "Support",
        }
    }
}

impl fmt::Display for WorkspaceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_param())
    }
}

/// Steps of the project creation modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CreationStep {
    #[default]
    Upload,
    SettingsA,
    SettingsB,
}

impl CreationStep {
    pub const ALL: [CreationStep; 3] = [Self::Upload, Self::SettingsA, Self::SettingsB];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::SettingsA => "settings-a",
            Self::SettingsB => "settings-b",
        }
    }

    /// Value of the `create` query parameter for this step
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::SettingsA => "settings",
            Self::SettingsB => "assign",
        }
    }

    /// Step named by a `create` query parameter value
    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_param() == value)
    }

    /// Step by its own name (`upload`, `settings-a`, `settings-b`)
    pub fn from_name(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for CreationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ordered, decoded query parameters of the workspace URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Result<Self> {
        let mut url = Self::scratch_url()?;
        url.set_query(Some(query.trim().trim_start_matches('?')));
        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        Self {
            pairs: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace every value of `key` with one value, keeping its position.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value.to_string();
                let mut seen = 0;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encoded query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        let Ok(mut url) = Self::scratch_url() else {
            return String::new();
        };
        if !self.pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(self.pairs.iter());
        }
        url.query().unwrap_or_default().to_string()
    }

    /// Write these parameters into `url`, replacing its query.
    pub fn apply_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(self.pairs.iter());
        }
    }

    fn scratch_url() -> Result<Url> {
        Url::parse(PARSE_BASE)
            .map_err(|e| DubdeskError::Config(format!("query parser base URL: {}", e)))
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
