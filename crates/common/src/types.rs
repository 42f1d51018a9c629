//! Device status record served by the shaker's `/status` endpoint

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wireless operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WifiMode {
    /// Station (client) mode, joined to an existing network
    Sta,
    /// Access-point mode, the device hosts its own network
    Ap,
}

impl WifiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiMode::Sta => "STA",
            WifiMode::Ap => "AP",
        }
    }
}

impl std::fmt::Display for WifiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload the web UI polls to render its connection panel.
///
/// A missing `ip`, `ip_ap` or `rssi` field deserializes the same as an
/// explicit `null`. On the way out `ip`/`ip_ap` are omitted when not
/// applicable while `rssi` is always written, `null` included, which is
/// what the firmware emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub wifi: bool,

    pub mode: WifiMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_ap: Option<String>,

    #[serde(default)]
    pub ssid: String,

    #[serde(default)]
    pub rssi: Option<i32>,

    #[serde(rename = "currentRpm", default)]
    pub current_rpm: f64,
}

impl DeviceStatus {
    /// Connected station: linked to `ssid` with address `ip`
    pub fn station(ip: impl Into<String>, ssid: impl Into<String>, rssi: i32, current_rpm: f64) -> Self {
        Self {
            wifi: true,
            mode: WifiMode::Sta,
            ip: Some(ip.into()),
            ip_ap: None,
            ssid: ssid.into(),
            rssi: Some(rssi),
            current_rpm,
        }
    }

    /// Self-hosted access point. The firmware zeroes the speed reading in this mode.
    pub fn access_point(ip_ap: impl Into<String>) -> Self {
        Self {
            wifi: false,
            mode: WifiMode::Ap,
            ip: None,
            ip_ap: Some(ip_ap.into()),
            ssid: String::new(),
            rssi: None,
            current_rpm: 0.0,
        }
    }

    /// Check the record is one the firmware could actually produce
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            WifiMode::Sta => {
                if self.ip.as_deref().map_or(true, str::is_empty) {
                    return Err(Error::InvalidStatus("STA mode requires a non-empty ip".into()));
                }
                if self.ip_ap.is_some() {
                    return Err(Error::InvalidStatus("ip_ap is only meaningful in AP mode".into()));
                }
            }
            WifiMode::Ap => {
                if self.ip_ap.as_deref().map_or(true, str::is_empty) {
                    return Err(Error::InvalidStatus("AP mode requires a non-empty ip_ap".into()));
                }
                if self.ip.is_some() {
                    return Err(Error::InvalidStatus("ip is only meaningful in STA mode".into()));
                }
                if self.wifi {
                    return Err(Error::InvalidStatus("wifi link cannot be up in AP mode".into()));
                }
            }
        }

        let rssi_expected = self.wifi && self.mode == WifiMode::Sta;
        if self.rssi.is_some() != rssi_expected {
            return Err(Error::InvalidStatus(format!(
                "rssi must be {} when wifi={} and mode={}",
                if rssi_expected { "set" } else { "null" },
                self.wifi,
                self.mode
            )));
        }

        if !self.current_rpm.is_finite() || self.current_rpm < 0.0 {
            return Err(Error::InvalidStatus(format!(
                "currentRpm must be a finite, non-negative number (got {})",
                self.current_rpm
            )));
        }

        Ok(())
    }

    /// Validate, then serialize to the wire format
    pub fn to_json(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}
