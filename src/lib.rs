//! dubdesk - Client library and CLI for the dubbing studio dashboard API
//!
//! Covers the dashboard's data contract (project queries, upload preparation,
//! source registration) and its workspace navigation state.

pub mod api;
pub mod cli;
pub mod config;
pub mod projects;
pub mod workspace;

use std::sync::Arc;

use thiserror::Error;

/// Main error type for dubdesk
#[derive(Error, Debug)]
pub enum DubdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status} for {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure of a deduplicated cache load, shared by every caller that
    /// waited on it.
    #[error(transparent)]
    Shared(#[from] Arc<DubdeskError>),
}

impl DubdeskError {
    /// HTTP status code when the server answered with a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Shared(inner) => inner.status(),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Shared(inner) => inner.is_validation(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DubdeskError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "dubdesk";
