//! Route contract for the UI's status endpoint

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Path the web UI polls for device state
pub const STATUS_ROUTE: &str = "/status";

/// An exact request path, matched against the pathname of outbound requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePattern(String);

impl RoutePattern {
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRoute {
            pattern: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        // Intercepting the root would answer the page's own document request
        if path == "/" {
            return Err(invalid("is the UI root"));
        }
        if let Some(c) = path
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '?' | '#' | '"' | '\'' | '`' | '\\'))
        {
            return Err(invalid(&format!("contains disallowed character {:?}", c)));
        }

        Ok(Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `pathname` is exactly this route
    pub fn matches_path(&self, pathname: &str) -> bool {
        self.0 == pathname
    }
}

impl Default for RoutePattern {
    fn default() -> Self {
        Self(STATUS_ROUTE.to_string())
    }
}

impl TryFrom<String> for RoutePattern {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RoutePattern> for String {
    fn from(value: RoutePattern) -> Self {
        value.0
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
