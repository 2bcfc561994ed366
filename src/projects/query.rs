//! Cached project queries
//!
//! Results are cached per [`QueryKey`] for the configured freshness window.
//! Concurrent loads of the same key share one request, and failed loads are
//! never cached.

use moka::future::Cache;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{get_json, ApiTransport};
use crate::config::Settings;
use crate::projects::models::{ProjectDetail, ProjectSummary, ProjectsResponse};
use crate::{DubdeskError, Result};

const PROJECTS_PATH: &str = "api/projects";

/// Cache key of a project query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full project list
    Projects,
    /// One project by id
    ProjectDetail(String),
}

impl QueryKey {
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Projects => vec!["projects"],
            Self::ProjectDetail(id) => vec!["projects", "detail", id.as_str()],
        }
    }

    fn path(&self) -> String {
        match self {
            Self::Projects => PROJECTS_PATH.to_string(),
            // The id is always a single path segment.
            Self::ProjectDetail(id) => format!("{}/{}", PROJECTS_PATH, urlencoding::encode(id)),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.segments().join(", "))
    }
}

/// What a consumer of a query sees right now
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    /// Last successful result
    pub data: Option<T>,
    /// A network load is in flight
    pub is_fetching: bool,
    /// `data` is the previous result shown while a refetch is pending
    pub is_placeholder: bool,
    /// Error of the most recent load, cleared by the next success
    pub error: Option<Arc<DubdeskError>>,
}

impl<T> QuerySnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }
}

#[derive(Default)]
struct ListState {
    last: Option<Arc<Vec<ProjectSummary>>>,
    in_flight: usize,
    error: Option<Arc<DubdeskError>>,
}

/// Marks a list load as in flight for as long as it lives.
struct InFlight(Arc<Mutex<ListState>>);

impl InFlight {
    fn start(state: Arc<Mutex<ListState>>) -> Self {
        lock(&state).in_flight += 1;
        Self(state)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = lock(&self.0);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

fn lock(state: &Mutex<ListState>) -> std::sync::MutexGuard<'_, ListState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Project list and detail queries over an [`ApiTransport`]
#[derive(Clone)]
pub struct ProjectQueries {
    transport: Arc<dyn ApiTransport>,
    lists: Cache<QueryKey, Arc<Vec<ProjectSummary>>>,
    details: Cache<QueryKey, Arc<ProjectDetail>>,
    list_state: Arc<Mutex<ListState>>,
}

impl ProjectQueries {
    pub fn new(transport: Arc<dyn ApiTransport>, stale_time: Duration, max_entries: u64) -> Self {
        Self {
            transport,
            lists: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(stale_time)
                .build(),
            details: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(stale_time)
                .build(),
            list_state: Arc::new(Mutex::new(ListState::default())),
        }
    }

    pub fn from_settings(transport: Arc<dyn ApiTransport>, settings: &Settings) -> Self {
        Self::new(transport, settings.stale_time(), settings.cache.max_entries)
    }

    /// Fetch the project list, or serve it from cache while fresh.
    pub async fn projects(&self) -> Result<Arc<Vec<ProjectSummary>>> {
        let key = QueryKey::Projects;
        let path = key.path();
        let transport = self.transport.clone();
        let state = self.list_state.clone();

        let result = self
            .lists
            .try_get_with(key, async move {
                let _in_flight = InFlight::start(state);
                tracing::debug!(query = %QueryKey::Projects, "fetching project list");

                let response: ProjectsResponse = get_json(transport.as_ref(), &path).await?;
                Ok::<_, DubdeskError>(Arc::new(response.items))
            })
            .await;

        let mut state = lock(&self.list_state);
        match result {
            Ok(items) => {
                state.last = Some(items.clone());
                state.error = None;
                Ok(items)
            }
            Err(e) => {
                state.error = Some(e.clone());
                Err(DubdeskError::Shared(e))
            }
        }
    }

    /// Current view of the project list query.
    ///
    /// While a refetch is pending the previous list stays visible instead of
    /// an empty loading state.
    pub fn projects_snapshot(&self) -> QuerySnapshot<Arc<Vec<ProjectSummary>>> {
        let state = lock(&self.list_state);
        let is_fetching = state.in_flight > 0;

        QuerySnapshot {
            data: state.last.clone(),
            is_fetching,
            is_placeholder: is_fetching && state.last.is_some(),
            error: state.error.clone(),
        }
    }

    /// Fetch one project.
    ///
    /// An empty id disables the query: `Ok(None)` and no request.
    pub async fn project(&self, project_id: &str) -> Result<Option<Arc<ProjectDetail>>> {
        if project_id.is_empty() {
            tracing::debug!("project query disabled without an id");
            return Ok(None);
        }
        if matches!(project_id, "." | "..") {
            return Err(DubdeskError::Validation(format!(
                "'{}' is not a project id",
                project_id
            )));
        }

        let key = QueryKey::ProjectDetail(project_id.to_string());
        let path = key.path();
        let transport = self.transport.clone();

        let detail = self
            .details
            .try_get_with(key.clone(), async move {
                tracing::debug!(query = %key, "fetching project detail");
                let detail: ProjectDetail = get_json(transport.as_ref(), &path).await?;
                Ok::<_, DubdeskError>(Arc::new(detail))
            })
            .await?;

        Ok(Some(detail))
    }

    /// Drop the cached list so the next call refetches.
    ///
    /// The last list stays available to [`Self::projects_snapshot`].
    pub async fn invalidate_projects(&self) {
        self.lists.invalidate(&QueryKey::Projects).await;
    }

    pub async fn invalidate_project(&self, project_id: &str) {
        self.details
            .invalidate(&QueryKey::ProjectDetail(project_id.to_string()))
            .await;
    }

    pub fn invalidate_all(&self) {
        self.lists.invalidate_all();
        self.details.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use serde_json::{json, Value};

    fn summary(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "sourceLanguage": "English",
            "targetLanguages": ["Korean", "Japanese"],
            "status": "editing",
            "progress": 56,
            "dueDate": "2025-02-06"
        })
    }

    fn detail(id: &str) -> Value {
        json!({
            "id": id,
            "title": "AI Voice-over Launch Trailer",
            "sourceLanguage": "English",
            "targetLanguages": ["Korean"],
            "status": "editing",
            "progress": 56,
            "dueDate": "2025-02-06",
            "createdAt": "2025-01-15T10:00:00Z",
            "speakerCount": 3,
            "assets": []
        })
    }

    fn queries(fake: &Arc<FakeTransport>) -> ProjectQueries {
        ProjectQueries::new(fake.clone(), Duration::from_secs(60), 64)
    }

    #[test]
    fn keys_are_stable_segments() {
        assert_eq!(QueryKey::Projects.segments(), vec!["projects"]);
        assert_eq!(
            QueryKey::ProjectDetail("proj-1".into()).segments(),
            vec!["projects", "detail", "proj-1"]
        );
        assert_eq!(
            QueryKey::ProjectDetail("proj-1".into()).to_string(),
            "[projects, detail, proj-1]"
        );
    }

    #[tokio::test]
    async fn empty_project_id_never_hits_the_network() {
        let fake = FakeTransport::new();
        let queries = queries(&fake);

        let result = queries.project("").await.expect("disabled query is not an error");

        assert!(result.is_none());
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn detail_path_escapes_the_id() {
        assert_eq!(
            QueryKey::ProjectDetail("proj-1001".into()).path(),
            "api/projects/proj-1001"
        );
        assert_eq!(
            QueryKey::ProjectDetail("../storage/x".into()).path(),
            "api/projects/..%2Fstorage%2Fx"
        );
        assert_eq!(
            QueryKey::ProjectDetail("a/b?c#d".into()).path(),
            "api/projects/a%2Fb%3Fc%23d"
        );
    }

    #[tokio::test]
    async fn dot_segment_ids_are_rejected_without_a_request() {
        let fake = FakeTransport::new();
        let queries = queries(&fake);

        for id in [".", ".."] {
            let err = queries.project(id).await.unwrap_err();
            assert!(err.is_validation(), "{id}: {err:?}");
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn project_detail_is_cached_per_id() {
        let fake = FakeTransport::new();
        fake.respond("api/projects/proj-1001", detail("proj-1001"));
        fake.respond("api/projects/proj-1002", detail("proj-1002"));
        let queries = queries(&fake);

        let first = queries.project("proj-1001").await.unwrap().unwrap();
        let second = queries.project("proj-1001").await.unwrap().unwrap();
        queries.project("proj-1002").await.unwrap().unwrap();

        assert_eq!(first.id, "proj-1001");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fake.calls_to("api/projects/proj-1001"), 1);
        assert_eq!(fake.calls_to("api/projects/proj-1002"), 1);
    }

    #[tokio::test]
    async fn invalidated_detail_is_refetched() {
        let fake = FakeTransport::new();
        fake.respond("api/projects/proj-1001", detail("proj-1001"));
        let queries = queries(&fake);

        queries.project("proj-1001").await.unwrap();
        queries.invalidate_project("proj-1001").await;
        queries.project("proj-1001").await.unwrap();

        assert_eq!(fake.calls_to("api/projects/proj-1001"), 2);
    }

    #[tokio::test]
    async fn expired_results_are_refetched() {
        let fake = FakeTransport::new();
        fake.respond(PROJECTS_PATH, json!({ "items": [] }));
        let queries = ProjectQueries::new(fake.clone(), Duration::from_millis(50), 64);

        queries.projects().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        queries.projects().await.unwrap();

        assert_eq!(fake.calls_to(PROJECTS_PATH), 2);
    }

    #[tokio::test]
    async fn list_returns_items_in_server_order() {
        let fake = FakeTransport::new();
        fake.respond(
            PROJECTS_PATH,
            json!({ "items": [summary("proj-2", "B"), summary("proj-1", "A")] }),
        );
        let queries = queries(&fake);

        let items = queries.projects().await.unwrap();
        let ids: Vec<_> = items.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["proj-2", "proj-1"]);
        let snapshot = queries.projects_snapshot();
        assert!(!snapshot.is_fetching);
        assert!(!snapshot.is_placeholder);
        assert_eq!(snapshot.data.map(|d| d.len()), Some(2));
    }

    #[tokio::test]
    async fn concurrent_list_loads_share_one_request() {
        let fake = FakeTransport::new();
        fake.respond(PROJECTS_PATH, json!({ "items": [summary("proj-1", "A")] }));
        let gate = fake.hold_requests();
        let queries = queries(&fake);

        let first = tokio::spawn({
            let queries = queries.clone();
            async move { queries.projects().await }
        });
        let second = tokio::spawn({
            let queries = queries.clone();
            async move { queries.projects().await }
        });

        gate.started.notified().await;
        assert!(queries.projects_snapshot().is_loading());
        gate.release.add_permits(1);

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(fake.calls_to(PROJECTS_PATH), 1);
    }

    #[tokio::test]
    async fn previous_list_stays_visible_during_refetch() {
        let fake = FakeTransport::new();
        fake.respond(PROJECTS_PATH, json!({ "items": [summary("proj-1", "Old")] }));
        let queries = queries(&fake);
        queries.projects().await.unwrap();

        queries.invalidate_projects().await;
        fake.respond(
            PROJECTS_PATH,
            json!({ "items": [summary("proj-1", "Old"), summary("proj-2", "New")] }),
        );
        let gate = fake.hold_requests();

        let refetch = tokio::spawn({
            let queries = queries.clone();
            async move { queries.projects().await }
        });
        gate.started.notified().await;

        let pending = queries.projects_snapshot();
        assert!(pending.is_fetching);
        assert!(pending.is_placeholder);
        assert!(!pending.is_loading());
        assert_eq!(pending.data.as_ref().map(|d| d.len()), Some(1));

        gate.release.add_permits(1);
        let fresh = refetch.await.unwrap().unwrap();

        assert_eq!(fresh.len(), 2);
        let settled = queries.projects_snapshot();
        assert!(!settled.is_fetching);
        assert_eq!(settled.data.map(|d| d.len()), Some(2));
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_not_cached() {
        let fake = FakeTransport::new();
        fake.fail(PROJECTS_PATH, 503);
        let queries = queries(&fake);

        let err = queries.projects().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(queries.projects_snapshot().error.is_some());

        fake.respond(PROJECTS_PATH, json!({ "items": [] }));
        let items = queries.projects().await.unwrap();

        assert!(items.is_empty());
        assert!(queries.projects_snapshot().error.is_none());
        assert_eq!(fake.calls_to(PROJECTS_PATH), 2);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let fake = FakeTransport::new();
        fake.respond("api/projects/proj-9", json!({ "id": "proj-9" }));
        let queries = queries(&fake);

        let err = queries.project("proj-9").await.unwrap_err();
        match err {
            DubdeskError::Shared(inner) => {
                assert!(matches!(inner.as_ref(), DubdeskError::Decode(_)))
            }
            other => panic!("expected shared decode error, got {other:?}"),
        }
    }
}
