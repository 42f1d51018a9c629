//! Scenarios: one fixture bound to one screenshot
//!
//! The built-in set mirrors the three device states the UI can show. More
//! can be declared in YAML, referencing fixtures by catalog name:
//!
//! ```yaml
//! scenarios:
//!   - name: Connected State (STA)
//!     fixture: connected
//!     artifact: web-ui-connected.png
//!     settle:
//!       kind: fixed
//!       ms: 1500
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use bioshaker_common::fixtures::{self, ACCESS_POINT, CONNECTED, SERVER_ERROR};
use bioshaker_common::Fixture;

use crate::error::{E2eError, E2eResult};

/// How long to let the UI settle between navigation and capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settle {
    /// Sleep a fixed amount of time
    Fixed { ms: u64 },

    /// Wait for `selector` to become visible, sleeping `fallback_ms`
    /// instead if it never shows up within `timeout_ms`
    Condition {
        selector: String,
        #[serde(default = "default_condition_timeout")]
        timeout_ms: u64,
        fallback_ms: u64,
    },
}

fn default_condition_timeout() -> u64 {
    5000
}

impl Settle {
    pub fn fixed(ms: u64) -> Self {
        Settle::Fixed { ms }
    }

    /// Longest the settle step can take
    pub fn upper_bound(&self) -> Duration {
        match self {
            Settle::Fixed { ms } => Duration::from_millis(*ms),
            Settle::Condition {
                timeout_ms,
                fallback_ms,
                ..
            } => Duration::from_millis(timeout_ms.saturating_add(*fallback_ms)),
        }
    }

    pub fn to_js(&self) -> E2eResult<String> {
        Ok(match self {
            Settle::Fixed { ms } => format!("    await page.waitForTimeout({});", ms),
            Settle::Condition {
                selector,
                timeout_ms,
                fallback_ms,
            } => {
                let selector = serde_json::to_string(selector)?;
                format!(
                    r#"    try {{
      await page.waitForSelector({selector}, {{ state: 'visible', timeout: {timeout_ms} }});
    }} catch (_) {{
      await page.waitForTimeout({fallback_ms});
    }}"#
                )
            }
        })
    }
}

/// A fixture-to-artifact binding run as one isolated unit of work
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub fixture: &'static Fixture,
    /// File name of the screenshot inside the artifact directory
    pub artifact: String,
    pub settle: Settle,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        fixture: &'static Fixture,
        artifact: impl Into<String>,
        settle: Settle,
    ) -> Self {
        Self {
            name: name.into(),
            fixture,
            artifact: artifact.into(),
            settle,
        }
    }

    /// Connected, access-point and disconnected states.
    ///
    /// AP mode waits longer so the blinking indicator reaches a visible phase.
    /// The error state waits for the UI's failed-fetch fallback to render.
    pub fn defaults() -> E2eResult<Vec<Scenario>> {
        Ok(vec![
            Scenario::new(
                "Connected State (STA)",
                fixtures::get(CONNECTED)?,
                "web-ui-connected.png",
                Settle::fixed(1500),
            ),
            Scenario::new(
                "Access Point Mode (AP)",
                fixtures::get(ACCESS_POINT)?,
                "web-ui-ap-mode.png",
                Settle::fixed(2000),
            ),
            Scenario::new(
                "Disconnected State",
                fixtures::get(SERVER_ERROR)?,
                "web-ui-disconnected.png",
                Settle::fixed(1500),
            ),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    pub fixture: String,
    pub artifact: String,
    pub settle: Settle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub scenarios: Vec<ScenarioSpec>,
}

impl ScenarioSpec {
    fn resolve(self) -> E2eResult<Scenario> {
        let fixture = fixtures::get(&self.fixture)?;
        Ok(Scenario::new(self.name, fixture, self.artifact, self.settle))
    }
}

/// Parse scenarios from a YAML document
pub fn from_yaml(yaml: &str) -> E2eResult<Vec<Scenario>> {
    let file: ScenarioFile = serde_yaml::from_str(yaml)?;
    let scenarios = file
        .scenarios
        .into_iter()
        .map(ScenarioSpec::resolve)
        .collect::<E2eResult<Vec<_>>>()?;
    validate(&scenarios)?;
    Ok(scenarios)
}

/// Parse scenarios from a YAML file
pub fn load_file(path: &Path) -> E2eResult<Vec<Scenario>> {
    let content = std::fs::read_to_string(path)?;
    from_yaml(&content)
}

/// Reject sets that would race on the artifact namespace or escape it
pub fn validate(scenarios: &[Scenario]) -> E2eResult<()> {
    let mut names = HashSet::new();
    let mut artifacts = HashSet::new();

    for scenario in scenarios {
        let artifact = Path::new(&scenario.artifact);
        let bare = artifact.file_name().map(|f| f == artifact.as_os_str()).unwrap_or(false);
        let png = artifact.extension().map(|e| e == "png").unwrap_or(false);
        if !bare || !png {
            return Err(E2eError::Configuration(format!(
                "scenario '{}': artifact '{}' must be a bare *.png file name",
                scenario.name, scenario.artifact
            )));
        }
        if !names.insert(scenario.name.as_str()) {
            return Err(E2eError::Configuration(format!(
                "duplicate scenario name '{}'",
                scenario.name
            )));
        }
        if !artifacts.insert(scenario.artifact.as_str()) {
            return Err(E2eError::Configuration(format!(
                "artifact '{}' is claimed by more than one scenario",
                scenario.artifact
            )));
        }
    }

    Ok(())
}

/// Reject scenarios whose settle step alone could outlast `scenario_timeout`
pub fn validate_timing(scenarios: &[Scenario], scenario_timeout: Duration) -> E2eResult<()> {
    for scenario in scenarios {
        let settle = scenario.settle.upper_bound();
        if settle >= scenario_timeout {
            return Err(E2eError::Configuration(format!(
                "scenario '{}': settle time {:?} does not fit in the {:?} scenario timeout",
                scenario.name, settle, scenario_timeout
            )));
        }
    }
    Ok(())
}

/// Case-insensitive name filter
pub fn filter(scenarios: Vec<Scenario>, grep: Option<&str>) -> Vec<Scenario> {
    match grep {
        None => scenarios,
        Some(needle) => {
            let needle = needle.to_lowercase();
            scenarios
                .into_iter()
                .filter(|s| s.name.to_lowercase().contains(&needle))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let scenarios = Scenario::defaults().unwrap();
        assert_eq!(scenarios.len(), 3);
        validate(&scenarios).unwrap();
    }

    #[test]
    fn test_ap_settles_longest() {
        let scenarios = Scenario::defaults().unwrap();
        let ap = scenarios.iter().find(|s| s.fixture.name == ACCESS_POINT).unwrap();
        assert!(scenarios
            .iter()
            .all(|s| s.settle.upper_bound() <= ap.settle.upper_bound()));
    }

    #[test]
    fn test_parse_yaml_with_condition() {
        let yaml = r#"
scenarios:
  - name: error banner
    fixture: server-error
    artifact: web-ui-error-banner.png
    settle:
      kind: condition
      selector: '#status-error'
      fallback_ms: 1500
"#;
        let scenarios = from_yaml(yaml).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].fixture.status, 500);
        assert_eq!(
            scenarios[0].settle,
            Settle::Condition {
                selector: "#status-error".into(),
                timeout_ms: 5000,
                fallback_ms: 1500,
            }
        );
    }

    #[test]
    fn test_unknown_fixture_is_configuration_error() {
        let yaml = r#"
scenarios:
  - name: offline
    fixture: offline
    artifact: offline.png
    settle: { kind: fixed, ms: 100 }
"#;
        let err = from_yaml(yaml).unwrap_err();
        assert_eq!(err.failure_kind(), crate::error::FailureKind::Configuration);
    }

    #[test]
    fn test_shared_artifact_is_rejected() {
        let fixture = fixtures::get(CONNECTED).unwrap();
        let scenarios = vec![
            Scenario::new("a", fixture, "same.png", Settle::fixed(10)),
            Scenario::new("b", fixture, "same.png", Settle::fixed(10)),
        ];
        assert!(matches!(validate(&scenarios), Err(E2eError::Configuration(_))));
    }

    #[test]
    fn test_artifact_must_stay_in_directory() {
        let fixture = fixtures::get(CONNECTED).unwrap();
        for artifact in ["../escape.png", "nested/shot.png", "shot.jpg"] {
            let scenarios = vec![Scenario::new("a", fixture, artifact, Settle::fixed(10))];
            assert!(validate(&scenarios).is_err(), "{artifact}");
        }
    }

    #[test]
    fn test_condition_upper_bound_saturates() {
        let settle = Settle::Condition {
            selector: "#status".into(),
            timeout_ms: u64::MAX,
            fallback_ms: 1500,
        };
        assert_eq!(settle.upper_bound(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_settle_must_fit_in_scenario_timeout() {
        let fixture = fixtures::get(CONNECTED).unwrap();
        let fits = vec![Scenario::new("quick", fixture, "quick.png", Settle::fixed(1500))];
        validate_timing(&fits, Duration::from_secs(30)).unwrap();

        let yaml = r#"
scenarios:
  - name: never settles
    fixture: connected
    artifact: slow.png
    settle:
      kind: condition
      selector: '#status'
      timeout_ms: 18446744073709551615
      fallback_ms: 1500
"#;
        let slow = from_yaml(yaml).unwrap();
        let err = validate_timing(&slow, Duration::from_secs(30)).unwrap_err();
        assert_eq!(err.failure_kind(), crate::error::FailureKind::Configuration);

        let exact = vec![Scenario::new("exact", fixture, "exact.png", Settle::fixed(30_000))];
        assert!(validate_timing(&exact, Duration::from_secs(30)).is_err());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let picked = filter(Scenario::defaults().unwrap(), Some("ap mode"));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].artifact, "web-ui-ap-mode.png");
    }

    #[test]
    fn test_condition_settle_js_falls_back() {
        let js = Settle::Condition {
            selector: "#status".into(),
            timeout_ms: 3000,
            fallback_ms: 1500,
        }
        .to_js()
        .unwrap();
        assert!(js.contains(r##"waitForSelector("#status""##));
        assert!(js.contains("waitForTimeout(1500)"));
    }
}
