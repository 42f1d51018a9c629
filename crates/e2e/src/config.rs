//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use bioshaker_common::RoutePattern;

use crate::error::E2eResult;
use crate::playwright::PlaywrightConfig;
use crate::server::ServerConfig;

/// Harness configuration, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Static server settings
    pub server: ServerConfig,

    /// Browser settings
    pub browser: PlaywrightConfig,

    /// Directory screenshots are written to
    pub artifact_dir: PathBuf,

    /// Endpoint the UI polls for device state
    pub status_route: RoutePattern,

    /// Scenarios run concurrently, at most this many at once
    pub workers: usize,

    /// Per-scenario budget before it is reported as timed out
    pub scenario_timeout_secs: u64,

    /// Optional YAML file replacing the built-in scenarios
    pub scenarios_file: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            browser: PlaywrightConfig::default(),
            artifact_dir: PathBuf::from("docs/screenshots"),
            status_route: RoutePattern::default(),
            workers: 1,
            scenario_timeout_secs: 30,
            scenarios_file: None,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, or defaults when it does not exist
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn scenario_timeout(&self) -> Duration {
        Duration::from_secs(self.scenario_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_ui_project_layout() {
        let config = HarnessConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.static_dir, PathBuf::from("data"));
        assert_eq!(config.artifact_dir, PathBuf::from("docs/screenshots"));
        assert_eq!(config.status_route.as_str(), "/status");
        assert_eq!(config.browser.viewport_width, 800);
        assert_eq!(config.browser.viewport_height, 600);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: HarnessConfig = toml::from_str(
            r#"
workers = 3
artifact_dir = "out/shots"

[browser]
browser = "firefox"

[server]
port = 9000
"#,
        )
        .unwrap();

        assert_eq!(config.workers, 3);
        assert_eq!(config.artifact_dir, PathBuf::from("out/shots"));
        assert_eq!(config.browser.browser, crate::playwright::Browser::Firefox);
        assert_eq!(config.browser.viewport_width, 800);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.scenario_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_route_is_rejected() {
        let result: Result<HarnessConfig, _> = toml::from_str(r#"status_route = "status""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::load(&dir.path().join("harness.toml")).unwrap();
        assert_eq!(config.workers, 1);
    }
}
