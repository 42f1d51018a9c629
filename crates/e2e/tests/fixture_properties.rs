//! Response properties the interception layer must guarantee for every fixture

use bioshaker_common::fixtures::{self, ACCESS_POINT, CONNECTED, SERVER_ERROR};
use bioshaker_common::{DeviceStatus, RoutePattern, WifiMode};
use bioshaker_e2e::InterceptRule;
use test_case::test_case;

const STATUS_URL: &str = "http://127.0.0.1:8080/status";

fn rule_for(name: &str) -> InterceptRule {
    InterceptRule::for_fixture(RoutePattern::default(), fixtures::get(name).unwrap())
        .expect("catalog fixtures are valid")
}

fn delivered_status(rule: &InterceptRule) -> Option<DeviceStatus> {
    let fulfillment = rule.respond(STATUS_URL).expect("status route is intercepted");
    fulfillment
        .body
        .as_deref()
        .map(|body| serde_json::from_str(body).expect("body is a device status record"))
}

#[test]
fn connected_fixtures_deliver_station_with_signal() {
    for fixture in fixtures::catalog().iter().filter(|f| f.body.as_ref().is_some_and(|b| b.wifi)) {
        let rule = rule_for(fixture.name);
        assert_eq!(rule.respond(STATUS_URL).unwrap().status, 200);

        let status = delivered_status(&rule).unwrap();
        assert_eq!(status.mode, WifiMode::Sta, "{}", fixture.name);
        assert!(status.rssi.is_some(), "{}", fixture.name);
    }
}

#[test]
fn access_point_fixtures_have_address_and_no_signal() {
    let ap_fixtures: Vec<_> = fixtures::catalog()
        .iter()
        .filter(|f| f.body.as_ref().is_some_and(|b| b.mode == WifiMode::Ap))
        .collect();
    assert!(!ap_fixtures.is_empty());

    for fixture in ap_fixtures {
        let status = delivered_status(&rule_for(fixture.name)).unwrap();
        assert!(status.ip_ap.as_deref().is_some_and(|ip| !ip.is_empty()));
        assert!(status.rssi.is_none());
    }
}

#[test]
fn failure_fixture_is_empty_500() {
    let rule = rule_for(SERVER_ERROR);
    let fulfillment = rule.respond(STATUS_URL).unwrap();
    assert_eq!(fulfillment.status, 500);
    assert!(fulfillment.body.is_none());
    assert!(fulfillment.content_type.is_none());
}

#[test]
fn connected_fixture_matches_reference_payload() {
    let raw = rule_for(CONNECTED).respond(STATUS_URL).unwrap().body.clone().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "wifi": true,
            "mode": "STA",
            "ip": "192.168.1.123",
            "ssid": "MyWiFi",
            "rssi": -55,
            "currentRpm": 250.5
        })
    );
}

#[test]
fn access_point_fixture_matches_reference_payload() {
    let raw = rule_for(ACCESS_POINT).respond(STATUS_URL).unwrap().body.clone().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "wifi": false,
            "mode": "AP",
            "ip_ap": "192.168.4.1",
            "ssid": "",
            "rssi": null,
            "currentRpm": 0.0
        })
    );
}

#[test_case(CONNECTED, 200, Some("application/json") ; "connected")]
#[test_case(ACCESS_POINT, 200, Some("application/json") ; "access point")]
#[test_case(SERVER_ERROR, 500, None ; "server error")]
fn every_poll_gets_the_same_answer(name: &str, status: u16, content_type: Option<&str>) {
    let rule = rule_for(name);
    let answers: Vec<_> = (0..5)
        .map(|i| rule.respond(&format!("{STATUS_URL}?poll={i}")).cloned().unwrap())
        .collect();

    assert!(answers.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(answers[0].status, status);
    assert_eq!(answers[0].content_type.as_deref(), content_type);
}

#[test]
fn custom_route_leaves_default_path_alone() {
    let rule = InterceptRule::for_fixture(
        RoutePattern::parse("/api/status").unwrap(),
        fixtures::get(CONNECTED).unwrap(),
    )
    .unwrap();

    assert!(rule.respond("http://127.0.0.1:8080/api/status").is_some());
    assert!(rule.respond(STATUS_URL).is_none());
}
