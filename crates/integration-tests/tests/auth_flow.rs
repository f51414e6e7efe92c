//! Integration tests for signing in and out.
//!
//! These drive `AuthSession` and `RouteGuard` together against a scripted
//! backend and check what ends up in the session store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use village_water_client::{
    AuthState, GuardDecision, LoginError, MemorySessionStore, Route, SessionStore, TransportError,
};
use village_water_core::Role;
use village_water_integration_tests::{
    LOGIN_PATH, LOGOUT_PATH, Method, TestApp, auth_body, session, user,
};

fn signed_out() -> TestApp<MemorySessionStore> {
    let app = TestApp::start(Arc::new(MemorySessionStore::new()));
    app.auth.resolve();
    app
}

fn signed_in() -> TestApp<MemorySessionStore> {
    let store = MemorySessionStore::with_session(&session("access-1", "refresh-1")).unwrap();
    let app = TestApp::start(Arc::new(store));
    app.auth.resolve();
    app
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_authenticates_guard() {
    let app = signed_out();
    let guard = app.auth.guard();
    assert_eq!(guard.state(), AuthState::Unauthenticated);
    assert_eq!(guard.decide(Route::Dashboard), GuardDecision::RedirectToLogin);

    app.backend.respond(Method::POST, LOGIN_PATH, 200, auth_body("Manager", "access-1", "refresh-1"));
    let user = app
        .auth
        .login("jdoe", &SecretString::from("secret123"))
        .await
        .unwrap();

    assert_eq!(user.role, Role::Manager);
    let stored = app.store.load().unwrap();
    assert!(!stored.access_token.expose_secret().is_empty());
    assert!(!stored.refresh_token.expose_secret().is_empty());
    assert_eq!(stored.user.role, Role::Manager);

    assert!(guard.state().is_authenticated());
    assert_eq!(guard.decide(Route::Dashboard), GuardDecision::Render);

    let sent = app.backend.requests_to(LOGIN_PATH);
    assert_eq!(sent[0].body, Some(json!({"username": "jdoe", "password": "secret123"})));
    assert_eq!(sent[0].bearer, None);
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let app = signed_in();
    app.backend.respond(
        Method::POST,
        LOGIN_PATH,
        401,
        json!({"error": "Invalid username or password"}),
    );

    let err = app
        .auth
        .login("jdoe", &SecretString::from("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Rejected(ref m) if m == "Invalid username or password"));
    let stored = app.store.load().unwrap();
    assert_eq!(stored.access_token.expose_secret(), "access-1");
    assert_eq!(stored.refresh_token.expose_secret(), "refresh-1");
    assert!(app.auth.state().is_authenticated());
    // A rejected login never triggers the refresh policy.
    assert_eq!(app.backend.request_count(), 1);
}

#[tokio::test]
async fn test_unreachable_login_keeps_existing_session() {
    let app = signed_in();
    app.backend.fail(Method::POST, LOGIN_PATH, TransportError::Timeout);

    let err = app
        .auth
        .login("jdoe", &SecretString::from("secret123"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Api(_)));
    assert!(app.store.load().is_some());
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_invalidates_refresh_token() {
    let app = signed_in();
    app.backend.respond(Method::POST, LOGOUT_PATH, 200, json!({"message": "Logout successful"}));

    app.auth.logout().await;

    let sent = app.backend.requests_to(LOGOUT_PATH);
    assert_eq!(sent[0].bearer.as_deref(), Some("access-1"));
    assert_eq!(sent[0].body, Some(json!({"refresh_token": "refresh-1"})));
    assert!(app.store.is_empty());
    assert_eq!(app.auth.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_logout_clears_session_when_backend_fails() {
    for failure in [Some(500), None] {
        let app = signed_in();
        let guard = app.auth.guard();
        match failure {
            Some(status) => app.backend.respond(Method::POST, LOGOUT_PATH, status, json!({})),
            None => app.backend.fail(Method::POST, LOGOUT_PATH, TransportError::Timeout),
        }

        app.auth.logout().await;

        assert!(app.store.load().is_none());
        assert_eq!(guard.navigate("/billing"), (Route::Login, GuardDecision::RedirectToLogin));
    }
}

// =============================================================================
// Role Flags
// =============================================================================

#[test]
fn test_role_flags_follow_updated_user() {
    let app = signed_in();
    let caps = app.auth.capabilities();
    assert!(caps.is_manager_or_admin);
    assert!(!caps.is_household);

    app.auth.update_user(user(Role::Household)).unwrap();
    let caps = app.auth.capabilities();
    assert!(caps.is_household);
    assert!(!caps.is_manager_or_admin);
    assert_eq!(app.store.load().unwrap().user.role, Role::Household);

    app.auth.update_user(user(Role::Admin)).unwrap();
    let caps = app.auth.capabilities();
    assert!(caps.is_admin);
    assert!(caps.is_manager_or_admin);
    assert!(!caps.is_household);
}

#[test]
fn test_signed_out_has_no_capabilities() {
    let app = signed_out();
    let caps = app.auth.capabilities();
    assert!(!caps.is_authenticated);
    assert!(!caps.is_manager_or_admin);
    assert!(!caps.is_household);
}
