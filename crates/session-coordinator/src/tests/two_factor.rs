use super::harness::{Scripted, TestHarness};
use crate::keys::store_keys;
use serde_json::json;

fn signed_in() -> TestHarness {
    TestHarness::seeded(vec![(store_keys::SESSION, json!({"authToken": "abc"}))])
}

#[tokio::test]
async fn enable_and_disable_use_distinct_commands() {
    let h = signed_in();

    h.coordinator.toggle_two_factor_auth(true).await;
    h.coordinator.toggle_two_factor_auth(false).await;

    let commands: Vec<String> = h
        .transport
        .sent()
        .into_iter()
        .map(|sent| sent.request.command)
        .collect();
    assert_eq!(commands, vec!["EnableTwoFactorAuth", "DisableTwoFactorAuth"]);
}

#[tokio::test]
async fn toggle_shows_loading_while_in_flight() {
    let h = TestHarness::seeded(vec![
        (store_keys::SESSION, json!({"authToken": "abc"})),
        (store_keys::ACCOUNT, json!({"errors": {"1": "common.genericError"}})),
    ]);

    h.coordinator.toggle_two_factor_auth(true).await;

    let sent = &h.transport.sent_for("EnableTwoFactorAuth")[0];
    assert_eq!(sent.stored(store_keys::ACCOUNT, "isLoading"), Some(&json!(true)));
    assert_eq!(sent.stored(store_keys::ACCOUNT, "errors"), None);
    assert_eq!(sent.param("authToken"), Some(&json!("abc")));
    assert_eq!(h.stored(store_keys::ACCOUNT, "isLoading"), Some(json!(false)));
}

#[tokio::test]
async fn validate_sends_code() {
    let h = signed_in();

    h.coordinator.validate_two_factor_auth("123456").await;

    let sent = &h.transport.sent_for("TwoFactorAuth_Validate")[0];
    assert_eq!(sent.param("twoFactorAuthCode"), Some(&json!("123456")));
    assert_eq!(h.stored(store_keys::ACCOUNT, "isLoading"), Some(json!(false)));
}

#[tokio::test]
async fn transport_failure_clears_loading() {
    let h = signed_in();
    h.transport.script(
        "TwoFactorAuth_Validate",
        Scripted::Fail("connection reset".to_string()),
    );

    h.coordinator.validate_two_factor_auth("123456").await;

    assert_eq!(h.stored(store_keys::ACCOUNT, "isLoading"), Some(json!(false)));
}
