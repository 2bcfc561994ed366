//! Storage and source registration mutations
//!
//! Each mutation is validated locally, sent once and never retried.

use reqwest::Url;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

use crate::api::{post_json, ApiTransport};
use crate::projects::models::{
    PrepareUploadPayload, PrepareUploadResponse, ProjectPayload, ProjectResponse,
    RegisterYoutubeSourcePayload, RegisterYoutubeSourceResponse,
};
use crate::projects::remap::{PrepareUploadBody, RegisterSourceBody};
use crate::{DubdeskError, Result};

const PREPARE_UPLOAD_PATH: &str = "api/storage/prepare-upload";
const REGISTER_SOURCE_PATH: &str = "api/storage/register-source";

/// Identifies a mutation in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKey {
    PrepareUpload,
    RegisterYoutube,
    CreateProject,
}

impl MutationKey {
    pub fn segments(&self) -> [&'static str; 2] {
        match self {
            Self::PrepareUpload => ["projects", "prepare-upload"],
            Self::RegisterYoutube => ["projects", "register-youtube"],
            Self::CreateProject => ["projects", "create"],
        }
    }
}

impl fmt::Display for MutationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [scope, name] = self.segments();
        write!(f, "[{}, {}]", scope, name)
    }
}

/// Hooks run after a mutation succeeds.
///
/// Every hook does nothing by default. Cache invalidation is left to the
/// caller.
pub trait MutationObserver: Send + Sync {
    fn upload_prepared(&self, _payload: &PrepareUploadPayload, _response: &PrepareUploadResponse) {}

    fn source_registered(
        &self,
        _payload: &RegisterYoutubeSourcePayload,
        _response: &RegisterYoutubeSourceResponse,
    ) {
    }

    fn project_created(&self, _payload: &ProjectPayload, _response: &ProjectResponse) {}
}

/// Observer that ignores every event
pub struct NoopObserver;

impl MutationObserver for NoopObserver {}

/// Write operations on projects
#[derive(Clone)]
pub struct ProjectMutations {
    pub(crate) transport: Arc<dyn ApiTransport>,
    pub(crate) observer: Arc<dyn MutationObserver>,
}

impl ProjectMutations {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn MutationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Ask the API for a direct-to-storage upload target.
    pub async fn prepare_upload(
        &self,
        payload: &PrepareUploadPayload,
    ) -> Result<PrepareUploadResponse> {
        validate_prepare_upload(payload)?;

        let key = MutationKey::PrepareUpload;
        let response: PrepareUploadResponse = post_json(
            self.transport.as_ref(),
            PREPARE_UPLOAD_PATH,
            &PrepareUploadBody::from(payload),
        )
        .instrument(tracing::info_span!("mutation", key = %key))
        .await?;

        tracing::info!(
            project_id = %payload.project_id,
            object_key = %response.object_key,
            "Upload target prepared"
        );
        self.observer.upload_prepared(payload, &response);

        Ok(response)
    }

    /// Attach a YouTube video as the project's source.
    pub async fn register_youtube_source(
        &self,
        payload: &RegisterYoutubeSourcePayload,
    ) -> Result<RegisterYoutubeSourceResponse> {
        validate_register_source(payload)?;

        let key = MutationKey::RegisterYoutube;
        let response: RegisterYoutubeSourceResponse = post_json(
            self.transport.as_ref(),
            REGISTER_SOURCE_PATH,
            &RegisterSourceBody::from(payload),
        )
        .instrument(tracing::info_span!("mutation", key = %key))
        .await?;

        tracing::info!(
            project_id = %response.project_id,
            status = %response.status,
            "YouTube source registered"
        );
        self.observer.source_registered(payload, &response);

        Ok(response)
    }
}

fn validate_prepare_upload(payload: &PrepareUploadPayload) -> Result<()> {
    require_non_empty("projectId", &payload.project_id)?;
    require_non_empty("fileName", &payload.file_name)?;

    if !is_media_type(&payload.content_type) {
        return Err(DubdeskError::Validation(format!(
            "contentType '{}' is not a valid media type",
            payload.content_type
        )));
    }

    Ok(())
}

fn validate_register_source(payload: &RegisterYoutubeSourcePayload) -> Result<()> {
    require_non_empty("projectId", &payload.project_id)?;
    validate_source_url(&payload.youtube_url)
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DubdeskError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Syntax check only; whether the video exists is the server's call.
pub(crate) fn validate_source_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        DubdeskError::Validation(format!("youtubeUrl '{}' is not a valid URL: {}", raw, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(DubdeskError::Validation(format!(
            "youtubeUrl '{}' must be an http(s) URL with a host",
            raw
        )));
    }

    Ok(())
}

/// `type "/" subtype *(";" parameter)` with RFC 6838 restricted names.
pub fn is_media_type(value: &str) -> bool {
    let mut parts = value.split(';');
    let essence = parts.next().unwrap_or_default().trim();

    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    if !is_restricted_name(kind) || !is_restricted_name(subtype) {
        return false;
    }

    parts.all(|param| {
        param
            .split_once('=')
            .map(|(name, value)| is_restricted_name(name.trim()) && !value.trim().is_empty())
            .unwrap_or(false)
    })
}

fn is_restricted_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    name.len() <= 127
        && chars.all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::projects::models::ProjectStatus;
    use serde_json::json;
    use std::sync::Mutex;

    fn upload_payload() -> PrepareUploadPayload {
        PrepareUploadPayload {
            project_id: "p1".to_string(),
            file_name: "a.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            owner_code: "o1".to_string(),
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl MutationObserver for Recorder {
        fn upload_prepared(&self, payload: &PrepareUploadPayload, _: &PrepareUploadResponse) {
            self.0.lock().unwrap().push(format!("upload:{}", payload.file_name));
        }

        fn source_registered(
            &self,
            _: &RegisterYoutubeSourcePayload,
            response: &RegisterYoutubeSourceResponse,
        ) {
            self.0.lock().unwrap().push(format!("source:{}", response.status));
        }
    }

    #[test]
    fn mutation_keys_render_as_segments() {
        assert_eq!(MutationKey::PrepareUpload.to_string(), "[projects, prepare-upload]");
        assert_eq!(
            MutationKey::RegisterYoutube.segments(),
            ["projects", "register-youtube"]
        );
    }

    #[test]
    fn media_types_follow_type_slash_subtype() {
        for valid in [
            "video/mp4",
            "audio/mpeg",
            "application/vnd.apple.mpegurl",
            "text/plain; charset=utf-8",
            "video/x-matroska",
        ] {
            assert!(is_media_type(valid), "{valid} should be accepted");
        }

        for invalid in ["", "video", "video/", "/mp4", "video/mp4/extra", "vid eo/mp4", "text/plain; charset"] {
            assert!(!is_media_type(invalid), "{invalid:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn prepare_upload_sends_wire_field_names() {
        let fake = FakeTransport::new();
        fake.respond(
            PREPARE_UPLOAD_PATH,
            json!({
                "projectId": "p1",
                "uploadUrl": "https://bucket.example.com/",
                "objectKey": "uploads/p1/a.mp4",
                "fields": { "policy": "abc", "x-amz-signature": "sig" }
            }),
        );
        let mutations = ProjectMutations::new(fake.clone());

        let response = mutations.prepare_upload(&upload_payload()).await.unwrap();

        assert_eq!(response.object_key, "uploads/p1/a.mp4");
        assert_eq!(
            response.fields.as_ref().and_then(|f| f.get("policy")).map(String::as_str),
            Some("abc")
        );

        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(
            calls[0].body,
            Some(json!({
                "filename": "a.mp4",
                "project_id": "p1",
                "content_type": "video/mp4",
                "owner_code": "o1"
            }))
        );
    }

    #[tokio::test]
    async fn invalid_upload_payloads_are_rejected_before_sending() {
        let fake = FakeTransport::new();
        let mutations = ProjectMutations::new(fake.clone());

        let mut missing_project = upload_payload();
        missing_project.project_id = "  ".to_string();
        let mut missing_file = upload_payload();
        missing_file.file_name = String::new();
        let mut bad_type = upload_payload();
        bad_type.content_type = "mp4".to_string();

        for payload in [missing_project, missing_file, bad_type] {
            let err = mutations.prepare_upload(&payload).await.unwrap_err();
            assert!(err.is_validation(), "expected validation error, got {err}");
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn register_source_reports_new_status() {
        let fake = FakeTransport::new();
        fake.respond(
            REGISTER_SOURCE_PATH,
            json!({ "projectId": "p1", "status": "processing" }),
        );
        let recorder = Arc::new(Recorder::default());
        let mutations = ProjectMutations::new(fake.clone()).with_observer(recorder.clone());

        let response = mutations
            .register_youtube_source(&RegisterYoutubeSourcePayload {
                project_id: "p1".to_string(),
                youtube_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, ProjectStatus::Processing);
        assert_eq!(
            fake.calls()[0].body,
            Some(json!({
                "project_id": "p1",
                "youtubeUrl": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
            }))
        );
        assert_eq!(*recorder.0.lock().unwrap(), vec!["source:processing"]);
    }

    #[tokio::test]
    async fn malformed_youtube_url_is_rejected() {
        let fake = FakeTransport::new();
        let mutations = ProjectMutations::new(fake.clone());

        for url in ["not a url", "youtube.com/watch?v=x", "mailto:someone@example.com"] {
            let err = mutations
                .register_youtube_source(&RegisterYoutubeSourcePayload {
                    project_id: "p1".to_string(),
                    youtube_url: url.to_string(),
                })
                .await
                .unwrap_err();
            assert!(err.is_validation(), "{url} should fail validation");
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn server_errors_propagate_without_retry() {
        let fake = FakeTransport::new();
        fake.fail(PREPARE_UPLOAD_PATH, 500);
        let recorder = Arc::new(Recorder::default());
        let mutations = ProjectMutations::new(fake.clone()).with_observer(recorder.clone());

        let err = mutations.prepare_upload(&upload_payload()).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(fake.calls_to(PREPARE_UPLOAD_PATH), 1);
        assert!(recorder.0.lock().unwrap().is_empty());
    }
}
