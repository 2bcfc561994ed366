//! Workspace navigation state
//!
//! The workspace page is driven by two query parameters, `section` and
//! `create`, kept in step with the project creation modal's UI state.

mod params;
mod reducer;
mod store;

pub use params::{CreationStep, SearchParams, WorkspaceSection, CREATE_PARAM, SECTION_PARAM};
pub use reducer::{reduce, view, WorkspaceController, WorkspaceEvent, WorkspaceState, WorkspaceView};
pub use store::{ProjectCreationState, UiAction, UiState};
