//! Full runs against a real browser
//!
//! Needs Node with the `playwright` package and its browsers installed.
//! Run with: cargo test --package bioshaker-e2e --test screenshots -- --ignored

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use bioshaker_common::RoutePattern;
use bioshaker_e2e::playwright::{PlaywrightConfig, PlaywrightHandle};
use bioshaker_e2e::server::{ServerConfig, ServerHandle};
use bioshaker_e2e::{CaptureSink, Scenario, ScenarioRunner, ScenarioStatus};
use tempfile::TempDir;

/// Minimal stand-in for the device UI: polls /status and renders it
const INDEX_HTML: &str = r##"<!doctype html>
<html>
<body style="font-family: monospace; background: #fff">
  <div id="state">Loading...</div>
  <script>
    async function poll() {
      const el = document.getElementById('state');
      try {
        const res = await fetch('/status');
        if (!res.ok) throw new Error('HTTP ' + res.status);
        const s = await res.json();
        el.textContent = s.mode === 'AP'
          ? 'AP ' + s.ip_ap
          : 'STA ' + s.ip + ' ' + s.ssid + ' ' + s.rssi + 'dBm ' + s.currentRpm + 'rpm';
      } catch (e) {
        el.textContent = 'Disconnected';
      }
    }
    poll();
  </script>
</body>
</html>
"##;

fn playwright_available() -> bool {
    Command::new("npx")
        .args(["playwright", "--version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

async fn run_defaults(out: &TempDir) -> bioshaker_e2e::SuiteResult {
    let ui = TempDir::new().unwrap();
    fs::write(ui.path().join("index.html"), INDEX_HTML).unwrap();

    let server = ServerHandle::start(ServerConfig {
        static_dir: ui.path().to_path_buf(),
        port: 0,
        reuse_existing: false,
        startup_timeout_secs: 10,
    })
    .await
    .unwrap();

    let node_modules = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("node_modules");
    let runner = ScenarioRunner::new(
        PlaywrightHandle::new(
            PlaywrightConfig {
                node_modules,
                ..Default::default()
            },
            server.base_url(),
        ),
        CaptureSink::new(out.path()),
        RoutePattern::default(),
    )
    .with_workers(3)
    .with_timeout(Duration::from_secs(60));

    let suite = runner.run_all(&Scenario::defaults().unwrap()).await;
    server.stop().await;
    suite
}

#[tokio::test]
#[ignore]
async fn every_device_state_produces_a_screenshot() {
    if !playwright_available() {
        eprintln!("Skipping: playwright not available via npx");
        return;
    }

    let out = TempDir::new().unwrap();
    let suite = run_defaults(&out).await;

    assert!(suite.success(), "{:#?}", suite.results);
    for name in ["web-ui-connected.png", "web-ui-ap-mode.png", "web-ui-disconnected.png"] {
        let path = out.path().join(name);
        let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        assert!(len > 0, "expected non-empty {}", path.display());
    }
}

#[tokio::test]
#[ignore]
async fn rerun_overwrites_with_identical_captures() {
    if !playwright_available() {
        eprintln!("Skipping: playwright not available via npx");
        return;
    }

    let out = TempDir::new().unwrap();
    let first = run_defaults(&out).await;
    let second = run_defaults(&out).await;

    assert!(first.success() && second.success());
    for (a, b) in first.results.iter().zip(&second.results) {
        assert_eq!(a.status, ScenarioStatus::Passed);
        let (a, b) = (a.artifact.as_ref().unwrap(), b.artifact.as_ref().unwrap());
        assert_eq!(a.path, b.path);
        assert_eq!(a.sha256, b.sha256, "{} changed between runs", a.path.display());
    }
}
