//! Projects module for dubdesk
//!
//! Typed models, cached queries and the storage/creation mutations of the
//! dashboard's projects API.

mod create;
pub mod models;
mod query;
pub mod remap;
mod storage;

pub use models::{
    due_day, AssetType, PrepareUploadPayload, PrepareUploadResponse, ProjectAsset, ProjectDetail,
    ProjectPayload, ProjectResponse, ProjectStatus, ProjectSummary, ProjectsResponse,
    RegisterYoutubeSourcePayload, RegisterYoutubeSourceResponse, SourceType,
};
pub use query::{ProjectQueries, QueryKey, QuerySnapshot};
pub use storage::{is_media_type, MutationKey, MutationObserver, NoopObserver, ProjectMutations};

/// Dashboard route of a project's dubbing studio
pub fn editor_route(project_id: &str) -> String {
    format!("/projects/{}/editor", project_id)
}
