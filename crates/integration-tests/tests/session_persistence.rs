//! Integration tests for sessions surviving an application restart.
//!
//! Each test "restarts" by building a second `TestApp` over the same
//! session file.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use village_water_client::{AuthState, FileSessionStore, GuardDecision, Route, SessionStore};
use village_water_core::Role;
use village_water_integration_tests::{
    CURRENT_USER_PATH, LOGIN_PATH, Method, REFRESH_PATH, TestApp, auth_body, session,
    temp_session_file, user_json,
};

// =============================================================================
// Restart
// =============================================================================

#[tokio::test]
async fn test_restart_resolves_without_network() {
    let path = temp_session_file();
    FileSessionStore::new(&path)
        .save(&session("access-1", "refresh-1"))
        .unwrap();

    let app = TestApp::start(Arc::new(FileSessionStore::new(&path)));
    let guard = app.auth.guard();
    assert_eq!(guard.state(), AuthState::Resolving);
    assert_eq!(guard.decide(Route::Households), GuardDecision::Wait);

    let state = app.auth.resolve();

    assert_eq!(state.user().unwrap().role, Role::Manager);
    assert_eq!(guard.decide(Route::Households), GuardDecision::Render);
    assert_eq!(app.backend.request_count(), 0);

    app.backend.respond(Method::GET, "/households/", 200, json!([]));
    app.client().households().list().await.unwrap();
    assert_eq!(app.backend.request_count(), 1);
}

#[tokio::test]
async fn test_login_survives_restart() {
    let path = temp_session_file();

    let first = TestApp::start(Arc::new(FileSessionStore::new(&path)));
    assert_eq!(first.auth.resolve(), AuthState::Unauthenticated);
    first.backend.respond(Method::POST, LOGIN_PATH, 200, auth_body("Household", "access-1", "refresh-1"));
    first
        .auth
        .login("jdoe", &SecretString::from("secret123"))
        .await
        .unwrap();
    drop(first);

    let second = TestApp::start(Arc::new(FileSessionStore::new(&path)));
    let state = second.auth.resolve();
    assert_eq!(state.user().unwrap().role, Role::Household);
    assert!(second.auth.capabilities().is_household);
}

#[tokio::test]
async fn test_refreshed_token_survives_restart() {
    let path = temp_session_file();
    FileSessionStore::new(&path)
        .save(&session("access-1", "refresh-1"))
        .unwrap();

    let first = TestApp::start(Arc::new(FileSessionStore::new(&path)));
    first.auth.resolve();
    first.backend.respond(Method::GET, CURRENT_USER_PATH, 401, json!({}));
    first.backend.respond(Method::POST, REFRESH_PATH, 200, json!({"access": "access-2"}));
    first.backend.respond(Method::GET, CURRENT_USER_PATH, 200, user_json("Admin"));
    let user = first.auth.refresh_profile().await.unwrap();
    assert_eq!(user.role, Role::Admin);
    drop(first);

    let stored = FileSessionStore::new(&path).load().unwrap();
    assert_eq!(stored.access_token.expose_secret(), "access-2");
    assert_eq!(stored.refresh_token.expose_secret(), "refresh-1");
    assert_eq!(stored.user.role, Role::Admin);
}

#[tokio::test]
async fn test_logout_removes_session_file_contents() {
    let path = temp_session_file();
    FileSessionStore::new(&path)
        .save(&session("access-1", "refresh-1"))
        .unwrap();

    let app = TestApp::start(Arc::new(FileSessionStore::new(&path)));
    app.auth.resolve();
    app.auth.logout().await;

    let restarted = TestApp::start(Arc::new(FileSessionStore::new(&path)));
    assert_eq!(restarted.auth.resolve(), AuthState::Unauthenticated);
}
