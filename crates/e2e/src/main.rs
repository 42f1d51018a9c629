//! Screenshot harness entry point
//!
//! Serves the UI, runs every scenario, and exits 0 only if every screenshot
//! was written. Exit code 1 means a scenario failed or timed out, 2 means the
//! harness itself could not run.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bioshaker_common::RoutePattern;
use bioshaker_e2e::playwright::{Browser, PlaywrightHandle};
use bioshaker_e2e::scenario::{self, Scenario};
use bioshaker_e2e::server::ServerHandle;
use bioshaker_e2e::{CaptureSink, HarnessConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "bioshaker-screenshots")]
#[command(about = "Capture BioShaker web UI screenshots for each device state")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "harness.toml", env = "BIOSHAKER_HARNESS_CONFIG")]
    config: PathBuf,

    /// YAML file replacing the built-in scenarios
    #[arg(short, long)]
    scenarios: Option<PathBuf>,

    /// Run only scenarios whose name contains this text
    #[arg(short, long)]
    grep: Option<String>,

    /// List the selected scenarios and exit
    #[arg(long)]
    list: bool,

    /// Number of scenarios to run concurrently
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Directory screenshots are written to
    #[arg(short, long, env = "BIOSHAKER_ARTIFACT_DIR")]
    artifact_dir: Option<PathBuf>,

    /// Directory containing the UI assets
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Port for the static server
    #[arg(long)]
    port: Option<u16>,

    /// Always start a fresh static server
    #[arg(long)]
    no_reuse_server: bool,

    /// Status endpoint to intercept
    #[arg(long)]
    status_route: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Per-scenario timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let result = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")
        .and_then(|rt| rt.block_on(async_main(args)));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn apply_overrides(config: &mut HarnessConfig, args: &Args) -> anyhow::Result<()> {
    if let Some(path) = &args.scenarios {
        config.scenarios_file = Some(path.clone());
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(dir) = &args.artifact_dir {
        config.artifact_dir = dir.clone();
    }
    if let Some(dir) = &args.static_dir {
        config.server.static_dir = dir.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_reuse_server {
        config.server.reuse_existing = false;
    }
    if let Some(route) = &args.status_route {
        config.status_route = RoutePattern::parse(route)?;
    }
    if let Some(browser) = &args.browser {
        config.browser.browser = browser.parse::<Browser>()?;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(secs) = args.timeout {
        config.scenario_timeout_secs = secs;
    }
    Ok(())
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let mut config = HarnessConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    apply_overrides(&mut config, &args)?;

    let scenarios = match &config.scenarios_file {
        Some(path) => scenario::load_file(path)
            .with_context(|| format!("loading scenarios from {}", path.display()))?,
        None => Scenario::defaults()?,
    };
    scenario::validate(&scenarios)?;
    scenario::validate_timing(&scenarios, config.scenario_timeout())?;

    let scenarios = scenario::filter(scenarios, args.grep.as_deref());
    if scenarios.is_empty() {
        bail!("no scenarios match the filter");
    }

    if args.list {
        for s in &scenarios {
            println!("{}\t{}\t{}", s.name, s.fixture.name, s.artifact);
        }
        return Ok(true);
    }

    std::fs::create_dir_all(&config.artifact_dir).with_context(|| {
        format!("creating artifact directory {}", config.artifact_dir.display())
    })?;

    PlaywrightHandle::check_installed().await?;

    let server = ServerHandle::start(config.server.clone()).await?;

    let runner = ScenarioRunner::new(
        PlaywrightHandle::new(config.browser.clone(), server.base_url()),
        CaptureSink::new(&config.artifact_dir),
        config.status_route.clone(),
    )
    .with_workers(config.workers)
    .with_timeout(config.scenario_timeout());

    let suite = runner.run_all(&scenarios).await;

    if let Some(path) = &args.report {
        suite.write_json(path)?;
    }

    server.stop().await;

    if suite.success() {
        info!("All {} screenshot(s) written to {}", suite.total, config.artifact_dir.display());
    }
    Ok(suite.success())
}
