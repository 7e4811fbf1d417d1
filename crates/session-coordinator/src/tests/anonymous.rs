//! Anonymous-user gating.

use super::harness::{settle, TestHarness};
use crate::keys::store_keys;
use crate::{GatedAction, SIGN_IN_MODAL_ROUTE};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn anonymous_harness() -> TestHarness {
    TestHarness::seeded(vec![(
        store_keys::SESSION,
        json!({"authToken": "anon", "authTokenType": "anonymousAccount"}),
    )])
}

fn counting_callback(calls: &Arc<AtomicUsize>) -> impl FnOnce() -> usize {
    let calls = calls.clone();
    move || calls.fetch_add(1, Ordering::SeqCst) + 1
}

#[test]
fn anonymous_marker_is_detected() {
    assert!(anonymous_harness().coordinator.is_anonymous_user());
    assert!(!TestHarness::new().coordinator.is_anonymous_user());
}

#[tokio::test]
async fn blocked_action_redirects_and_never_runs_callback() {
    let h = anonymous_harness();
    let calls = Arc::new(AtomicUsize::new(0));

    let gated = h
        .coordinator
        .check_if_action_is_allowed(counting_callback(&calls), false);
    assert!(!gated.is_allowed());

    assert_eq!(gated.invoke().await, None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.navigator.navigated(), vec![SIGN_IN_MODAL_ROUTE.to_string()]);
}

#[tokio::test]
async fn full_session_gets_original_callback() {
    let h = TestHarness::seeded(vec![(store_keys::SESSION, json!({"authToken": "abc"}))]);
    let calls = Arc::new(AtomicUsize::new(0));

    let gated = h
        .coordinator
        .check_if_action_is_allowed(counting_callback(&calls), false);

    let callback = gated.into_allowed().expect("callback returned untouched");
    assert_eq!(callback(), 1);
    assert!(h.navigator.navigated().is_empty());
}

#[tokio::test]
async fn anonymous_safe_action_is_allowed() {
    let h = anonymous_harness();
    let calls = Arc::new(AtomicUsize::new(0));

    let gated = h
        .coordinator
        .check_if_action_is_allowed(counting_callback(&calls), true);

    assert!(matches!(gated, GatedAction::Allowed(_)));
    assert_eq!(gated.invoke().await, Some(1));
}

#[tokio::test]
async fn anonymous_redirect_stages_public_room_without_signing_out() {
    let h = anonymous_harness();
    h.navigator.set_initial_url("https://new.tally.app/r/8675309");

    h.coordinator.sign_out_and_redirect_to_sign_in().await;
    settle().await;

    assert_eq!(
        h.store.get(store_keys::LAST_OPENED_PUBLIC_ROOM_ID),
        Some(json!("8675309"))
    );
    assert_eq!(h.navigator.navigated(), vec![SIGN_IN_MODAL_ROUTE.to_string()]);
    assert_eq!(h.transport.count("LogOut"), 0);
    assert!(h.coordinator.has_auth_token());
}

#[tokio::test]
async fn anonymous_redirect_without_deep_link_only_navigates() {
    let h = anonymous_harness();
    h.navigator.set_initial_url("https://new.tally.app/settings");

    h.coordinator.sign_out_and_redirect_to_sign_in().await;

    assert_eq!(h.store.get(store_keys::LAST_OPENED_PUBLIC_ROOM_ID), None);
    assert_eq!(h.navigator.navigated(), vec![SIGN_IN_MODAL_ROUTE.to_string()]);
}

#[tokio::test]
async fn anonymous_redirect_is_noop_on_sign_in_modal() {
    let h = anonymous_harness();
    h.navigator.set_active_route(SIGN_IN_MODAL_ROUTE);

    h.coordinator.sign_out_and_redirect_to_sign_in().await;

    assert!(h.navigator.navigated().is_empty());
}

#[test]
fn route_allow_list_uses_configured_web_app() {
    let h = TestHarness::new();

    assert!(h.coordinator.can_access_route_by_anonymous_user("r/123"));
    assert!(h
        .coordinator
        .can_access_route_by_anonymous_user("https://new.tally.app/r/123/details"));
    assert!(!h.coordinator.can_access_route_by_anonymous_user("settings/profile"));
}
