//! UI state snapshots
//!
//! The state is a plain value: every action yields a new snapshot and the
//! previous one is left untouched.

use crate::workspace::params::CreationStep;

/// Project creation modal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectCreationState {
    pub open: bool,
    pub step: CreationStep,
}

/// UI state shared by the workspace views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiState {
    pub project_creation: ProjectCreationState,
}

/// Writes to [`UiState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Open the creation modal at a step
    OpenProjectCreation(CreationStep),
    /// Move to a step without opening or closing the modal
    SetProjectCreationStep(CreationStep),
    /// Close the modal, remembering the step it was on
    CloseProjectCreation,
}

impl UiState {
    pub fn apply(self, action: UiAction) -> Self {
        match action {
            UiAction::OpenProjectCreation(step) => self.with_creation(true, step),
            UiAction::SetProjectCreationStep(step) => {
                self.with_creation(self.project_creation.open, step)
            }
            UiAction::CloseProjectCreation => {
                self.with_creation(false, self.project_creation.step)
            }
        }
    }

    pub fn is_creation_open(&self) -> bool {
        self.project_creation.open
    }

    /// Current step, only while the modal is open
    pub fn open_step(&self) -> Option<CreationStep> {
        self.project_creation
            .open
            .then_some(self.project_creation.step)
    }

    fn with_creation(self, open: bool, step: CreationStep) -> Self {
        Self {
            project_creation: ProjectCreationState { open, step },
        }
    }
}
