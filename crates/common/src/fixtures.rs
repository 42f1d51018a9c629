//! Catalog of synthetic `/status` responses
//!
//! Each fixture stands for one backend device state. The catalog is built
//! once and only ever read, so scenarios running in parallel share it freely.
//! Adding a state means adding one entry to [`CATALOG`].

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::DeviceStatus;

pub const CONNECTED: &str = "connected";
pub const ACCESS_POINT: &str = "access-point";
pub const SERVER_ERROR: &str = "server-error";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A canned HTTP response for the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub name: &'static str,
    pub description: &'static str,
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Option<DeviceStatus>,
}

impl Fixture {
    /// A `200 application/json` response carrying `body`
    pub fn ok(name: &'static str, description: &'static str, body: DeviceStatus) -> Self {
        Self {
            name,
            description,
            status: 200,
            content_type: Some(JSON_CONTENT_TYPE),
            body: Some(body),
        }
    }

    /// A bodiless response with the given status
    pub fn empty(name: &'static str, description: &'static str, status: u16) -> Self {
        Self {
            name,
            description,
            status,
            content_type: None,
            body: None,
        }
    }

    /// Validate the fixture and render its response body.
    ///
    /// `Ok(None)` means the response is intentionally empty.
    pub fn serialized_body(&self) -> Result<Option<String>> {
        let invalid = |reason: String| Error::InvalidFixture {
            name: self.name.to_string(),
            reason,
        };

        if !(100..=599).contains(&self.status) {
            return Err(invalid(format!("HTTP status {} out of range", self.status)));
        }

        match &self.body {
            None => Ok(None),
            Some(_) if self.content_type.is_none() => {
                Err(invalid("body present without a content type".to_string()))
            }
            Some(body) => body
                .to_json()
                .map(Some)
                .map_err(|e| invalid(e.to_string())),
        }
    }
}

/// The closed set of device states the harness knows how to render
pub static CATALOG: Lazy<Vec<Fixture>> = Lazy::new(|| {
    vec![
        Fixture::ok(
            CONNECTED,
            "Joined to a WiFi network in station mode, motor spinning",
            DeviceStatus::station("192.168.1.123", "MyWiFi", -55, 250.5),
        ),
        Fixture::ok(
            ACCESS_POINT,
            "No WiFi link, device hosting its own access point",
            DeviceStatus::access_point("192.168.4.1"),
        ),
        Fixture::empty(
            SERVER_ERROR,
            "Status endpoint failing with an empty 500",
            500,
        ),
    ]
});

/// Every fixture, in catalog order
pub fn catalog() -> &'static [Fixture] {
    CATALOG.as_slice()
}

/// Look up a fixture by name
pub fn get(name: &str) -> Result<&'static Fixture> {
    catalog()
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| Error::UnknownFixture(name.to_string()))
}
