//! Data models for the projects API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pipeline stage of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Source is being transcribed and translated
    Processing,
    /// Translators are editing segments
    Editing,
    /// Awaiting review
    Review,
    /// Delivered
    Done,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Editing => "editing",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// The stage that follows this one, if any.
    ///
    /// Stages only move forward; the server is the one enforcing it.
    pub fn next_stage(&self) -> Option<Self> {
        match self {
            Self::Processing => Some(Self::Editing),
            Self::Editing => Some(Self::Review),
            Self::Review => Some(Self::Done),
            Self::Done => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A project as shown in the workspace list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub status: ProjectStatus,
    /// Completion percentage (0 - 100), not necessarily whole
    pub progress: f64,
    /// Due date as sent by the server, see [`due_day`]
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProjectSummary {
    pub fn due_day(&self) -> Option<NaiveDate> {
        due_day(&self.due_date)
    }
}

/// Calendar day of a `dueDate` value, given either as `YYYY-MM-DD` or as an
/// RFC 3339 timestamp.
pub fn due_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|at| at.date_naive()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Video,
    Subtitle,
}

/// A media artifact attached to a project in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAsset {
    pub id: String,
    pub language: String,
    #[serde(rename = "type")]
    pub kind: AssetType,
    pub url: String,
    /// Duration in seconds
    pub duration: f64,
    pub codec: String,
    pub resolution: String,
    pub size_mb: f64,
}

/// Full project view, including its assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub id: String,
    pub title: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub status: ProjectStatus,
    pub progress: f64,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub speaker_count: u32,
    #[serde(default)]
    pub assets: Vec<ProjectAsset>,
}

impl ProjectDetail {
    /// The list-row view of this project
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            source_language: self.source_language.clone(),
            target_languages: self.target_languages.clone(),
            status: self.status,
            progress: self.progress,
            due_date: self.due_date.clone(),
            assigned_editor: self.assigned_editor.clone(),
            created_at: Some(self.created_at),
        }
    }

    pub fn due_day(&self) -> Option<NaiveDate> {
        due_day(&self.due_date)
    }

    /// Assets delivered for one language, in server order
    pub fn assets_for<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a ProjectAsset> {
        self.assets.iter().filter(move |a| a.language == language)
    }
}

/// Body of `GET api/projects`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub items: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    File,
    Youtube,
}

/// Project creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub title: String,
    pub source_type: SourceType,
    pub detect_automatically: bool,
    /// Sent as `null` when the language is detected automatically
    #[serde(default)]
    pub source_language: Option<String>,
    pub target_languages: Vec<String>,
    pub speaker_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(rename = "owner_code")]
    pub owner_code: String,
}

/// Body returned when a project is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: ProjectDetail,
    pub project_id: String,
}

/// Request for a direct-to-storage upload target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUploadPayload {
    pub project_id: String,
    pub file_name: String,
    pub content_type: String,
    #[serde(rename = "owner_code")]
    pub owner_code: String,
}

/// Where and how to upload the raw asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUploadResponse {
    pub project_id: String,
    pub upload_url: String,
    pub object_key: String,
    /// Extra form fields required by the storage target (presigned POST)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterYoutubeSourcePayload {
    pub project_id: String,
    pub youtube_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterYoutubeSourceResponse {
    pub project_id: String,
    pub status: ProjectStatus,
}
