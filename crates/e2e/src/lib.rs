//! BioShaker UI screenshot harness
//!
//! Drives a headless browser against the locally served web UI, answers the
//! UI's `/status` poll from a fixture, and writes one screenshot per device
//! state for review.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Screenshot Harness (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ServerHandle::start() -> base_url   (static UI assets)     │
//! │  ScenarioRunner::run_all(&[Scenario]) -> SuiteResult        │
//! │    per scenario, in a fresh browser context:                │
//! │      InterceptRule::for_fixture()   route /status           │
//! │      page.goto(base_url)            navigate                │
//! │      Settle                         fixed or DOM condition  │
//! │      page.screenshot()              staged PNG              │
//! │      CaptureSink::persist()         atomic write            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod intercept;
pub mod playwright;
pub mod runner;
pub mod scenario;
pub mod server;

pub use capture::{Artifact, CaptureSink};
pub use config::HarnessConfig;
pub use error::{E2eError, E2eResult, FailureKind};
pub use intercept::{Fulfillment, InterceptRule};
pub use runner::{ScenarioResult, ScenarioRunner, ScenarioStatus, SuiteResult};
pub use scenario::{Scenario, Settle};
