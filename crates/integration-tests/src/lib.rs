//! Integration tests for the Village Water System client.
//!
//! The tests drive the public client API end to end against a
//! [`ScriptedTransport`], so they need no running backend:
//!
//! ```bash
//! cargo test -p village-water-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Login, logout, registration and session resolution
//! - `token_refresh` - Token injection and the 401 refresh-and-retry policy
//! - `session_persistence` - Sessions surviving an application restart
//!
//! This library holds the fixtures they share.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Value, json};
use village_water_client::{
    ApiClient, AuthSession, ClientConfig, ScriptedTransport, Session, SessionStore,
};
use village_water_core::{Role, User};

pub use reqwest::Method;

pub const LOGIN_PATH: &str = "/auth/login/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const REFRESH_PATH: &str = "/auth/token/refresh/";
pub const CURRENT_USER_PATH: &str = "/auth/user/";

/// Everything a test needs: the auth session, the scripted backend and the
/// store behind them.
pub struct TestApp<S: SessionStore + 'static> {
    pub auth: AuthSession<Arc<ScriptedTransport>>,
    pub backend: Arc<ScriptedTransport>,
    pub store: Arc<S>,
}

impl<S: SessionStore + 'static> TestApp<S> {
    /// Start an application over `store`. The auth state is still
    /// `Resolving`; call `auth.resolve()` to read the store.
    pub fn start(store: Arc<S>) -> Self {
        let backend = Arc::new(ScriptedTransport::new());
        let client = ApiClient::new(
            Arc::clone(&backend),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            &config(),
        );
        Self {
            auth: AuthSession::new(client),
            backend,
            store,
        }
    }

    pub fn client(&self) -> &ApiClient<Arc<ScriptedTransport>> {
        self.auth.client()
    }
}

/// Client configuration pointing at a backend that is never contacted.
pub fn config() -> ClientConfig {
    ClientConfig::with_base_url("http://localhost:8000/api".parse().unwrap())
}

/// A user record for `role`.
pub fn user(role: Role) -> User {
    serde_json::from_value(user_json(role.as_str())).unwrap()
}

/// The JSON the backend sends for the `jdoe` user with `role`.
pub fn user_json(role: &str) -> Value {
    json!({
        "user_id": 12,
        "username": "jdoe",
        "full_name": "Jean Doe",
        "email": "jdoe@village.rw",
        "role": role,
        "status": "Active"
    })
}

/// A stored session for `jdoe` as a Manager.
pub fn session(access: &str, refresh: &str) -> Session {
    Session::new(
        SecretString::from(access.to_owned()),
        SecretString::from(refresh.to_owned()),
        user(Role::Manager),
    )
}

/// Body of a successful login or registration.
pub fn auth_body(role: &str, access: &str, refresh: &str) -> Value {
    json!({
        "message": "Login successful",
        "user": user_json(role),
        "tokens": {"access": access, "refresh": refresh}
    })
}

/// A household record as the backend lists it.
pub fn household_json(id: i32) -> Value {
    json!({
        "household_id": id,
        "household_code": format!("HH-2025-{id:04}"),
        "household_name": "Doe Family",
        "head_of_household": "Jean Doe",
        "national_id": "1199080012345678",
        "phone_number": "0788123456",
        "number_of_members": 4,
        "connection_date": "2025-01-15",
        "status": "Active"
    })
}

/// A fresh path for a session file in the system temp directory.
pub fn temp_session_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("village-water-test-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}
