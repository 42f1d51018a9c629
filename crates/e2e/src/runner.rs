//! Scenario runner: install route, navigate, settle, capture
//!
//! Steps inside a scenario are strictly sequential. Scenarios themselves are
//! independent and run concurrently up to the worker limit. A failing or
//! timed-out scenario is reported and never stops its siblings.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info};
use url::Url;

use bioshaker_common::RoutePattern;

use crate::capture::{Artifact, CaptureSink};
use crate::error::{E2eError, E2eResult, FailureKind};
use crate::intercept::InterceptRule;
use crate::playwright::PlaywrightHandle;
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    TimedOut,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub fixture: String,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub artifact: Option<Artifact>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
}

/// Result of running every selected scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.timed_out == 0
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> E2eResult<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path.to_path_buf())
    }
}

pub struct ScenarioRunner {
    playwright: PlaywrightHandle,
    sink: CaptureSink,
    route: RoutePattern,
    workers: usize,
    scenario_timeout: Duration,
}

impl ScenarioRunner {
    pub fn new(playwright: PlaywrightHandle, sink: CaptureSink, route: RoutePattern) -> Self {
        Self {
            playwright,
            sink,
            route,
            workers: 1,
            scenario_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_timeout(mut self, scenario_timeout: Duration) -> Self {
        self.scenario_timeout = scenario_timeout;
        self
    }

    /// Run every scenario, keeping results in declaration order
    pub async fn run_all(&self, scenarios: &[Scenario]) -> SuiteResult {
        let start = Instant::now();

        info!(
            "Running {} scenario(s) against {} with {} worker(s)...",
            scenarios.len(),
            self.playwright.base_url(),
            self.workers
        );

        let results: Vec<ScenarioResult> = stream::iter(scenarios)
            .map(|scenario| self.run_scenario(scenario))
            .buffered(self.workers)
            .collect()
            .await;

        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        let passed = count(ScenarioStatus::Passed);
        let failed = count(ScenarioStatus::Failed);
        let timed_out = count(ScenarioStatus::TimedOut);
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed, {} timed out ({} ms)",
            passed, failed, timed_out, duration_ms
        );

        SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            timed_out,
            duration_ms,
            results,
        }
    }

    /// Run one scenario under the timeout and turn its outcome into a report entry
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        let outcome = timeout(self.scenario_timeout, self.execute(scenario)).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let mut result = ScenarioResult {
            name: scenario.name.clone(),
            fixture: scenario.fixture.name.to_string(),
            status: ScenarioStatus::Passed,
            duration_ms,
            artifact: None,
            failure: None,
            error: None,
        };

        match outcome {
            Ok(Ok(artifact)) => {
                info!(
                    "✓ {} -> {} ({} ms)",
                    scenario.name,
                    artifact.path.display(),
                    duration_ms
                );
                result.artifact = Some(artifact);
            }
            Ok(Err(e)) => {
                error!("✗ {} - {}", scenario.name, e);
                result.status = ScenarioStatus::Failed;
                result.failure = Some(e.failure_kind());
                result.error = Some(e.to_string());
            }
            Err(_) => {
                let e = E2eError::Timeout(format!(
                    "scenario '{}' exceeded {:?}",
                    scenario.name, self.scenario_timeout
                ));
                error!("⏱ {} - {}", scenario.name, e);
                result.status = ScenarioStatus::TimedOut;
                result.failure = Some(FailureKind::Timeout);
                result.error = Some(e.to_string());
            }
        }

        result
    }

    /// The scenario steps, each a suspension point
    pub async fn execute(&self, scenario: &Scenario) -> E2eResult<Artifact> {
        debug!("Running scenario: {}", scenario.name);

        // Fails on a malformed fixture before any browser starts
        let rule = InterceptRule::for_fixture(self.route.clone(), scenario.fixture)?;
        self.check_page_not_intercepted(&rule)?;
        debug!("Intercepting {} with fixture '{}'", self.route, rule.fixture_name());

        let workdir = tempfile::tempdir()?;
        let staged = workdir.path().join("capture.png");
        let script = self
            .playwright
            .build_script(&rule, &scenario.settle, &staged)?;

        self.playwright
            .run_script(&script, workdir.path())
            .await?
            .into_result(&self.sink.destination(&scenario.artifact))?;

        let artifact = self
            .sink
            .persist_async(staged, scenario.artifact.clone())
            .await;
        drop(workdir);
        artifact
    }

    /// The rule must not answer the navigation itself, or the page would load
    /// the fixture instead of the UI
    fn check_page_not_intercepted(&self, rule: &InterceptRule) -> E2eResult<()> {
        let base_url = self.playwright.base_url();
        let page = Url::parse(base_url).map_err(|e| {
            E2eError::Configuration(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        if rule.respond(page.as_str()).is_some() {
            return Err(E2eError::Configuration(format!(
                "status route {} would intercept the UI page {}",
                self.route, base_url
            )));
        }
        Ok(())
    }
}
