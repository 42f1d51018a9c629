//! Error types for the screenshot harness

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Fixture error: {0}")]
    Fixture(#[from] bioshaker_common::Error),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Settle wait failed: {0}")]
    Settle(String),

    #[error("Capture failed for {path}: {reason}")]
    Capture { path: PathBuf, reason: String },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification used in per-scenario reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Navigation,
    Capture,
    Browser,
    Timeout,
}

impl E2eError {
    pub fn capture(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        E2eError::Capture {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            E2eError::Configuration(_)
            | E2eError::Fixture(_)
            | E2eError::Yaml(_)
            | E2eError::Toml(_)
            | E2eError::Json(_) => FailureKind::Configuration,
            E2eError::Navigation(_)
            | E2eError::Settle(_)
            | E2eError::ServerStartup(_)
            | E2eError::ServerHealthCheck(_)
            | E2eError::Http(_) => FailureKind::Navigation,
            E2eError::Capture { .. } => FailureKind::Capture,
            E2eError::Timeout(_) => FailureKind::Timeout,
            E2eError::PlaywrightNotFound | E2eError::Playwright(_) | E2eError::Io(_) => {
                FailureKind::Browser
            }
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
