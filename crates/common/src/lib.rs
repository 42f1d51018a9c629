//! BioShaker UI harness common library
//!
//! Device status model, the status route contract, and the catalog of
//! synthetic `/status` responses the screenshot harness serves to the UI.

pub mod error;
pub mod fixtures;
pub mod route;
pub mod types;

pub use error::{Error, Result};
pub use fixtures::Fixture;
pub use route::{RoutePattern, STATUS_ROUTE};
pub use types::{DeviceStatus, WifiMode};
