//! Network interception: answer the UI's status poll from a fixture
//!
//! A rule is a standing route for the lifetime of the page. Every request
//! whose pathname equals the pattern gets the same fulfillment, since the UI
//! polls repeatedly. Everything else is left to the network.

use serde::Serialize;
use url::Url;

use bioshaker_common::{Fixture, RoutePattern};

use crate::error::E2eResult;

/// The response handed back to the page for a matched request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fulfillment {
    pub status: u16,
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InterceptRule {
    pattern: RoutePattern,
    fixture: &'static str,
    fulfillment: Fulfillment,
}

impl InterceptRule {
    /// Build a rule answering `pattern` with `fixture`.
    ///
    /// The body is serialized here so a malformed fixture is reported before
    /// any browser is launched.
    pub fn for_fixture(pattern: RoutePattern, fixture: &Fixture) -> E2eResult<Self> {
        let body = fixture.serialized_body()?;
        Ok(Self {
            pattern,
            fixture: fixture.name,
            fulfillment: Fulfillment {
                status: fixture.status,
                content_type: fixture.content_type.map(str::to_string),
                body,
            },
        })
    }

    pub fn fixture_name(&self) -> &'static str {
        self.fixture
    }

    /// What the page receives for `url`, or `None` if the request passes through.
    ///
    /// `url` is resolved the way the browser's `URL` does, so a relative
    /// reference is taken against a document root and only its pathname is
    /// compared, exactly like the predicate from [`InterceptRule::to_js`].
    pub fn respond(&self, url: &str) -> Option<&Fulfillment> {
        let parsed = Url::parse(url)
            .or_else(|_| Url::parse(DOCUMENT_ROOT).and_then(|root| root.join(url)))
            .ok()?;
        self.pattern
            .matches_path(parsed.path())
            .then_some(&self.fulfillment)
    }

    /// Playwright statements installing this rule on `page`
    pub fn to_js(&self) -> E2eResult<String> {
        let predicate = pathname_predicate(&self.pattern)?;
        let fulfillment = serde_json::to_string(&self.fulfillment)?;
        Ok(format!(
            r#"    await page.route({predicate}, route => route.fulfill({fulfillment}));"#
        ))
    }
}

const DOCUMENT_ROOT: &str = "http://localhost/";

/// JS counterpart of [`RoutePattern::matches_path`] applied to a parsed `URL`
pub fn pathname_predicate(pattern: &RoutePattern) -> E2eResult<String> {
    let path = serde_json::to_string(pattern.as_str())?;
    Ok(format!("url => url.pathname === {path}"))
}
