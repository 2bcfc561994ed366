//! Project creation

use tracing::Instrument;

use crate::api::post_json;
use crate::projects::models::{ProjectPayload, ProjectResponse, SourceType};
use crate::projects::storage::{
    require_non_empty, validate_source_url, MutationKey, ProjectMutations,
};
use crate::{DubdeskError, Result};

const CREATE_PROJECT_PATH: &str = "api/projects";

impl ProjectMutations {
    /// Create a project from a file or YouTube source.
    ///
    /// With `detect_automatically` set the source language is sent as `null`,
    /// whatever the payload carried.
    pub async fn create_project(&self, payload: &ProjectPayload) -> Result<ProjectResponse> {
        validate_project(payload)?;

        let mut body = payload.clone();
        if body.detect_automatically {
            body.source_language = None;
        }

        let key = MutationKey::CreateProject;
        let response: ProjectResponse =
            post_json(self.transport.as_ref(), CREATE_PROJECT_PATH, &body)
                .instrument(tracing::info_span!("mutation", key = %key))
                .await?;

        tracing::info!(project_id = %response.project_id, title = %body.title, "Project created");
        self.observer.project_created(&body, &response);

        Ok(response)
    }
}

fn validate_project(payload: &ProjectPayload) -> Result<()> {
    require_non_empty("title", &payload.title)?;

    if payload.target_languages.is_empty() {
        return Err(DubdeskError::Validation(
            "at least one target language is required".to_string(),
        ));
    }
    if payload.speaker_count == 0 {
        return Err(DubdeskError::Validation(
            "speakerCount must be at least 1".to_string(),
        ));
    }
    if !payload.detect_automatically {
        require_non_empty(
            "sourceLanguage",
            payload.source_language.as_deref().unwrap_or_default(),
        )?;
    }

    match payload.source_type {
        SourceType::Youtube => {
            let url = payload.youtube_url.as_deref().ok_or_else(|| {
                DubdeskError::Validation("youtubeUrl is required for youtube sources".to_string())
            })?;
            validate_source_url(url)
        }
        SourceType::File => {
            require_non_empty("fileName", payload.file_name.as_deref().unwrap_or_default())?;
            match payload.file_size {
                Some(size) if size > 0 => Ok(()),
                _ => Err(DubdeskError::Validation(
                    "fileSize is required for file sources".to_string(),
                )),
            }
        }
    }
}
