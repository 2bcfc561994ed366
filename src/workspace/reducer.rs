//! URL ⇄ UI state synchronization
//!
//! One reducer step takes the previous query parameters and UI state plus an
//! event, and returns the next pair. URL changes drive the store only through
//! the `create` parameter; the store always drives `create` back.

use crate::workspace::params::{
    CreationStep, SearchParams, WorkspaceSection, CREATE_PARAM, SECTION_PARAM,
};
use crate::workspace::store::{UiAction, UiState};

/// Something that changes workspace state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// The URL query changed (mount, navigation, back/forward)
    Navigated(SearchParams),
    /// The UI wrote to the store
    Ui(UiAction),
}

/// Query parameters and UI state, always consistent with each other
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceState {
    pub params: SearchParams,
    pub ui: UiState,
}

/// What the workspace page renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceView {
    pub section: WorkspaceSection,
    pub modal_open: bool,
    pub step: Option<CreationStep>,
    /// The URL names a known creation step
    pub step_requested: bool,
}

/// Compute the next state from the previous one and an event.
pub fn reduce(previous: &WorkspaceState, event: WorkspaceEvent) -> WorkspaceState {
    let (mut params, ui) = match event {
        WorkspaceEvent::Navigated(params) => {
            let ui = store_from_url(&params, previous.ui);
            (params, ui)
        }
        WorkspaceEvent::Ui(action) => (previous.params.clone(), previous.ui.apply(action)),
    };

    url_from_store(&mut params, &ui);
    default_section(&mut params);

    WorkspaceState { params, ui }
}

/// Derive the rendered view of a state.
pub fn view(state: &WorkspaceState) -> WorkspaceView {
    WorkspaceView {
        section: state
            .params
            .get(SECTION_PARAM)
            .and_then(WorkspaceSection::from_param)
            .unwrap_or_default(),
        modal_open: state.ui.is_creation_open(),
        step: state.ui.open_step(),
        step_requested: requested_step(&state.params).is_some(),
    }
}

fn requested_step(params: &SearchParams) -> Option<CreationStep> {
    params.get(CREATE_PARAM).and_then(CreationStep::from_param)
}

// An empty `create` counts as absent.
fn store_from_url(params: &SearchParams, ui: UiState) -> UiState {
    match params.get(CREATE_PARAM).filter(|value| !value.is_empty()) {
        None => ui.apply(UiAction::CloseProjectCreation),
        Some(_) => match requested_step(params) {
            Some(step) => ui.apply(UiAction::OpenProjectCreation(step)),
            None => ui,
        },
    }
}

fn url_from_store(params: &mut SearchParams, ui: &UiState) {
    match ui.open_step() {
        Some(step) => params.set(CREATE_PARAM, step.as_param()),
        None => params.remove(CREATE_PARAM),
    }
}

// Unknown sections are rewritten like missing ones.
fn default_section(params: &mut SearchParams) {
    let known = params
        .get(SECTION_PARAM)
        .and_then(WorkspaceSection::from_param)
        .is_some();
    if !known {
        params.set(SECTION_PARAM, WorkspaceSection::Projects.as_param());
    }
}

/// Owns the workspace state and applies events to it one at a time.
#[derive(Debug, Clone)]
pub struct WorkspaceController {
    state: WorkspaceState,
}

impl WorkspaceController {
    /// Mount the workspace at `params` with an injected UI state.
    pub fn mount(params: SearchParams, ui: UiState) -> Self {
        let state = reduce(
            &WorkspaceState {
                params: SearchParams::new(),
                ui,
            },
            WorkspaceEvent::Navigated(params),
        );
        Self { state }
    }

    pub fn dispatch(&mut self, event: WorkspaceEvent) -> WorkspaceView {
        self.state = reduce(&self.state, event);
        tracing::debug!(query = %self.state.params, "workspace state updated");
        self.view()
    }

    pub fn navigate(&mut self, params: SearchParams) -> WorkspaceView {
        self.dispatch(WorkspaceEvent::Navigated(params))
    }

    pub fn ui(&mut self, action: UiAction) -> WorkspaceView {
        self.dispatch(WorkspaceEvent::Ui(action))
    }

    pub fn view(&self) -> WorkspaceView {
        view(&self.state)
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn params(&self) -> &SearchParams {
        &self.state.params
    }

    pub fn ui_state(&self) -> UiState {
        self.state.ui
    }
}
