//! Wire naming for the storage endpoints
//!
//! The storage endpoints expect `filename`, `project_id` and `content_type`
//! where the rest of the API uses camel case. Each endpoint has its own typed
//! body; [`remap_keys`] is the shallow table-driven rename for untyped JSON.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::projects::models::{PrepareUploadPayload, RegisterYoutubeSourcePayload};

/// Field renames applied before a payload goes over the wire
pub const RENAMED_KEYS: [(&str, &str); 3] = [
    ("fileName", "filename"),
    ("projectId", "project_id"),
    ("contentType", "content_type"),
];

/// Wire name for an internal field name; unknown names pass through.
pub fn wire_key(key: &str) -> &str {
    RENAMED_KEYS
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

/// Rename the top-level keys of `fields`.
///
/// Only the first level is touched; nested objects are carried over as-is.
pub fn remap_keys(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (wire_key(&key).to_string(), value))
        .collect()
}

/// `POST api/storage/prepare-upload` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrepareUploadBody<'a> {
    pub filename: &'a str,
    pub project_id: &'a str,
    pub content_type: &'a str,
    pub owner_code: &'a str,
}

impl<'a> From<&'a PrepareUploadPayload> for PrepareUploadBody<'a> {
    fn from(payload: &'a PrepareUploadPayload) -> Self {
        Self {
            filename: &payload.file_name,
            project_id: &payload.project_id,
            content_type: &payload.content_type,
            owner_code: &payload.owner_code,
        }
    }
}

/// `POST api/storage/register-source` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterSourceBody<'a> {
    pub project_id: &'a str,
    #[serde(rename = "youtubeUrl")]
    pub youtube_url: &'a str,
}

impl<'a> From<&'a RegisterYoutubeSourcePayload> for RegisterSourceBody<'a> {
    fn from(payload: &'a RegisterYoutubeSourcePayload) -> Self {
        Self {
            project_id: &payload.project_id,
            youtube_url: &payload.youtube_url,
        }
    }
}
