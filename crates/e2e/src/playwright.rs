//! Playwright browser automation
//!
//! Each scenario becomes one generated Node script. Every script launches its
//! own browser and context, so no page or network state leaks between runs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::intercept::InterceptRule;
use crate::scenario::Settle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Configuration(format!("unknown browser '{}'", other))),
        }
    }
}

/// Step the generated script was in when it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Launch,
    Route,
    Navigate,
    Settle,
    Capture,
    Done,
}

/// The JSON line every generated script prints on exit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReport {
    pub success: bool,
    pub phase: Phase,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScriptReport {
    /// Turn a failed report into the matching error
    pub fn into_result(self, capture_path: &Path) -> E2eResult<()> {
        if self.success {
            return Ok(());
        }
        let reason = self.error.unwrap_or_else(|| "unknown error".to_string());
        Err(match self.phase {
            Phase::Route => E2eError::Configuration(format!("route installation failed: {}", reason)),
            Phase::Navigate => E2eError::Navigation(reason),
            Phase::Settle => E2eError::Settle(reason),
            Phase::Capture => E2eError::capture(capture_path, reason),
            Phase::Launch | Phase::Done => E2eError::Playwright(reason),
        })
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// `node_modules` holding the `playwright` package
    pub node_modules: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 800,
            viewport_height: 600,
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

/// Playwright browser handle
#[derive(Debug, Clone)]
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
    base_url: String,
}

impl PlaywrightHandle {
    pub fn new(config: PlaywrightConfig, base_url: impl Into<String>) -> Self {
        Self {
            config,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Playwright is installed
    pub async fn check_installed() -> E2eResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Build the script for one scenario: route, navigate, settle, capture
    pub fn build_script(
        &self,
        rule: &InterceptRule,
        settle: &Settle,
        capture_path: &Path,
    ) -> E2eResult<String> {
        let base_url = serde_json::to_string(&self.base_url)?;
        let capture_path = serde_json::to_string(&capture_path.to_string_lossy())?;
        let route = rule.to_js()?;
        let settle = settle.to_js()?;

        Ok(format!(
            r#"
const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  let phase = 'launch';
  let browser;
  try {{
    browser = await {browser}.launch({{ headless: {headless} }});
    const context = await browser.newContext({{
      viewport: {{ width: {width}, height: {height} }}
    }});
    const page = await context.newPage();

    phase = 'route';
{route}

    phase = 'navigate';
    await page.goto({base_url}, {{ waitUntil: 'load' }});

    phase = 'settle';
{settle}

    phase = 'capture';
    await page.screenshot({{ path: {capture_path} }});

    phase = 'done';
    console.log(JSON.stringify({{ success: true, phase }}));
  }} catch (error) {{
    console.log(JSON.stringify({{ success: false, phase, error: error.message }}));
    process.exitCode = 1;
  }} finally {{
    if (browser) await browser.close();
  }}
}})();
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
        ))
    }

    /// Run a script from `workdir` and parse its report
    pub async fn run_script(&self, script: &str, workdir: &Path) -> E2eResult<ScriptReport> {
        let script_path = workdir.join("scenario.js");
        tokio::fs::write(&script_path, script).await?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = Command::new("node")
            .arg(&script_path)
            .current_dir(workdir)
            .env("NODE_PATH", absolute(&self.config.node_modules)?)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| E2eError::Playwright(format!("failed to run node: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_report(&stdout) {
            Some(report) => Ok(report),
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(E2eError::Playwright(format!(
                    "Script exited with {} and no report:\nstdout: {}\nstderr: {}",
                    output.status, stdout, stderr
                )))
            }
        }
    }
}

/// Last line of `stdout` that parses as a report
fn parse_report(stdout: &str) -> Option<ScriptReport> {
    stdout
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str(line.trim()).ok())
}

fn absolute(path: &Path) -> E2eResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
