//! Login, registration, logout and the current user's auth state.
//!
//! [`AuthSession`] is the one place that creates and destroys sessions
//! (apart from a failed token refresh, which tears the session down inside
//! [`ApiClient`]). Every change is published as an [`AuthState`] on a watch
//! channel that [`RouteGuard`] and other consumers observe.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;
use village_water_core::{Capabilities, RegistrationProfile, User};

use crate::client::ApiClient;
use crate::error::{ApiError, summarize};
use crate::guard::RouteGuard;
use crate::refresh::classify;
use crate::session::Session;
use crate::transport::{ApiRequest, ReqwestTransport, Transport};

const LOGIN_PATH: &str = "/auth/login/";
const REGISTER_PATH: &str = "/auth/register/";
const LOGOUT_PATH: &str = "/auth/logout/";
const CURRENT_USER_PATH: &str = "/auth/user/";
const CHANGE_PASSWORD_PATH: &str = "/users/change_password/";

/// Message used when a rejected login carries no `error` field.
const LOGIN_FAILED: &str = "Login failed";

/// Who is signed in, as far as the client knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The stored session has not been read yet.
    Resolving,
    /// Nobody is signed in.
    Unauthenticated,
    /// A session is stored for this user.
    Authenticated(Box<User>),
}

impl AuthState {
    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Resolving | Self::Unauthenticated => None,
        }
    }

    #[must_use]
    pub const fn is_resolving(&self) -> bool {
        matches!(self, Self::Resolving)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Capability flags for the signed-in user; all `false` otherwise.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_user(self.user())
    }
}

/// Why a login did not produce a session.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The backend refused the credentials.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LoginError {
    /// Short message suitable for showing to a user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Api(e) => e.message(),
        }
    }
}

/// Why a registration did not produce a session.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Field errors, either from local checks or exactly as the backend sent them.
    #[error("Registration failed: {}", summarize(.0))]
    Invalid(serde_json::Value),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Deserialize)]
struct AuthResponse {
    user: User,
    tokens: Tokens,
}

#[derive(Deserialize)]
struct Tokens {
    access: String,
    refresh: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// The application's authentication session.
///
/// Create one per application and hand clones to whatever needs the current
/// user; clones share state.
pub struct AuthSession<T = ReqwestTransport> {
    client: ApiClient<T>,
}

impl<T> Clone for AuthSession<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<T: Transport> AuthSession<T> {
    #[must_use]
    pub const fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    /// The client this session manages.
    #[must_use]
    pub const fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Read the stored session and leave [`AuthState::Resolving`].
    ///
    /// Makes no network calls. Does nothing once the state has been resolved.
    pub fn resolve(&self) -> AuthState {
        let stored = self.client.store().load();
        self.client.state().send_if_modified(|state| {
            if !state.is_resolving() {
                return false;
            }
            *state = stored.map_or(AuthState::Unauthenticated, |session| {
                AuthState::Authenticated(Box::new(session.user))
            });
            true
        });

        let state = self.state();
        tracing::debug!(authenticated = state.is_authenticated(), "Auth state resolved");
        state
    }

    /// Current auth state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.client.state().borrow().clone()
    }

    /// Subscribe to auth state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.client.subscribe()
    }

    /// A route guard observing this session.
    #[must_use]
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.subscribe())
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.client.state().borrow().user().cloned()
    }

    /// Capability flags derived from the signed-in user's role.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.client.state().borrow().capabilities()
    }

    /// Sign in and persist the session.
    ///
    /// A failed login leaves any existing session untouched.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::Rejected` with the backend's message if the
    /// credentials are refused, or `LoginError::Api` if the backend could not
    /// be reached or the session could not be stored.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User, LoginError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .json(&serde_json::json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .map_err(ApiError::from)?;

        let response = self.client.send_raw(&request).await?;
        if !response.status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            tracing::warn!(status = %response.status, "Login rejected");
            return Err(LoginError::Rejected(message));
        }

        let body: AuthResponse = response.json().map_err(ApiError::from)?;
        let user = self.establish(body)?;
        tracing::info!(role = %user.role, "Logged in");
        Ok(user)
    }

    /// Create an account and sign in as it.
    ///
    /// The profile is checked locally first; nothing is sent if that fails.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::Invalid` with the field errors if the profile
    /// is refused, or `RegisterError::Api` for any other failure.
    #[instrument(skip(self, profile), fields(username = %profile.username, role = %profile.role))]
    pub async fn register(&self, profile: &RegistrationProfile) -> Result<User, RegisterError> {
        if let Err(errors) = profile.validate() {
            let body = serde_json::to_value(&errors).map_err(ApiError::from)?;
            return Err(RegisterError::Invalid(body));
        }

        let request = ApiRequest::post(REGISTER_PATH)
            .json(profile)
            .map_err(ApiError::from)?;
        let response = self.client.send_raw(&request).await?;

        if response.status.is_client_error() {
            tracing::warn!(status = %response.status, "Registration rejected");
            return Err(RegisterError::Invalid(response.json_or_text()));
        }
        let response = classify(response)?;

        let body: AuthResponse = response.json().map_err(ApiError::from)?;
        let user = self.establish(body)?;
        tracing::info!("Registered");
        Ok(user)
    }

    /// Sign out.
    ///
    /// Asks the backend to invalidate the refresh token, then clears the
    /// stored session whatever the backend said. Backend failures are logged
    /// and otherwise ignored.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(session) = self.client.store().load()
            && let Err(e) = self.invalidate_refresh_token(&session).await
        {
            tracing::warn!(error = %e, "Logout request failed");
        }

        self.client.expire_session();
        tracing::info!("Logged out");
    }

    async fn invalidate_refresh_token(&self, session: &Session) -> Result<(), ApiError> {
        let request = ApiRequest::post(LOGOUT_PATH)
            .bearer(session.access_token.clone())
            .json(&serde_json::json!({
                "refresh_token": session.refresh_token.expose_secret(),
            }))?;
        classify(self.client.send_raw(&request).await?)?;
        Ok(())
    }

    /// Replace the cached user profile, keeping the tokens.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` if nobody is signed in, or
    /// `ApiError::Store` if the profile could not be persisted.
    pub fn update_user(&self, user: User) -> Result<(), ApiError> {
        let session = self
            .client
            .store()
            .load()
            .ok_or(ApiError::NotAuthenticated)?;

        self.client.store().save(&session.with_user(user.clone()))?;
        self.client
            .state()
            .send_replace(AuthState::Authenticated(Box::new(user)));
        Ok(())
    }

    /// Fetch the current user from the backend and cache it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the profile cannot be stored.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Result<User, ApiError> {
        let user: User = self.client.get_json(CURRENT_USER_PATH).await?;
        self.update_user(user.clone())?;
        Ok(user)
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` with the backend's field errors if the
    /// old password is wrong or the new one is refused.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post(CHANGE_PASSWORD_PATH).json(&serde_json::json!({
            "old_password": old_password.expose_secret(),
            "new_password": new_password.expose_secret(),
            "confirm_password": confirm_password.expose_secret(),
        }))?;
        self.client.send(request).await?;
        tracing::info!("Password changed");
        Ok(())
    }

    /// Persist a fresh session from a login/registration response and
    /// publish it.
    fn establish(&self, body: AuthResponse) -> Result<User, ApiError> {
        let session = Session::new(
            SecretString::from(body.tokens.access),
            SecretString::from(body.tokens.refresh),
            body.user,
        );
        self.client.store().save(&session)?;

        self.client
            .state()
            .send_replace(AuthState::Authenticated(Box::new(session.user.clone())));
        Ok(session.user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::json;
    use village_water_core::Role;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::TransportError;
    use crate::refresh::REFRESH_PATH;
    use crate::refresh::tests::HeldRefresh;
    use crate::session::tests::{session, user};
    use crate::session::{MemorySessionStore, SessionStore};
    use crate::transport::scripted::ScriptedTransport;

    fn auth(store: MemorySessionStore) -> (AuthSession<Arc<ScriptedTransport>>, Arc<ScriptedTransport>, Arc<MemorySessionStore>) {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(store);
        let config = ClientConfig::with_base_url("http://localhost:8000/api".parse().unwrap());
        let client = ApiClient::new(Arc::clone(&transport), Arc::clone(&store) as Arc<dyn SessionStore>, &config);
        (AuthSession::new(client), transport, store)
    }

    fn login_body(role: &str) -> serde_json::Value {
        json!({
            "message": "Login successful",
            "user": {
                "user_id": 12,
                "username": "jdoe",
                "full_name": "Jean Doe",
                "email": "jdoe@village.rw",
                "role": role,
                "status": "Active"
            },
            "tokens": {"access": "access-1", "refresh": "refresh-1"}
        })
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let (auth, transport, store) = auth(MemorySessionStore::new());
        assert_eq!(auth.resolve(), AuthState::Unauthenticated);
        transport.respond(Method::POST, LOGIN_PATH, 200, login_body("Manager"));

        let user = auth
            .login("jdoe", &SecretString::from("secret123"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Manager);
        assert!(auth.state().is_authenticated());
        assert!(auth.capabilities().is_manager_or_admin);

        let stored = store.load().unwrap();
        assert_eq!(stored.access_token.expose_secret(), "access-1");
        assert_eq!(stored.refresh_token.expose_secret(), "refresh-1");

        let sent = transport.requests_to(LOGIN_PATH);
        assert_eq!(sent[0].body, Some(json!({"username": "jdoe", "password": "secret123"})));
        assert!(sent[0].bearer.is_none());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (auth, transport, store) =
            auth(MemorySessionStore::with_session(&session("access-1")).unwrap());
        auth.resolve();
        transport.respond(Method::POST, LOGIN_PATH, 401, json!({"error": "Invalid credentials"}));

        let err = auth
            .login("jdoe", &SecretString::from("wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Invalid credentials");
        assert_eq!(store.load().unwrap().access_token.expose_secret(), "access-1");
        assert!(auth.state().is_authenticated());
        assert!(transport.requests_to("/auth/token/refresh/").is_empty());
    }

    #[tokio::test]
    async fn test_login_failure_without_message() {
        let (auth, transport, store) = auth(MemorySessionStore::new());
        transport.respond_bytes(Method::POST, LOGIN_PATH, 500, b"Internal Server Error".to_vec());

        let err = auth
            .login("jdoe", &SecretString::from("secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::Rejected(ref m) if m == "Login failed"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_login_unreachable() {
        let (auth, transport, _) = auth(MemorySessionStore::new());
        transport.fail(
            Method::POST,
            LOGIN_PATH,
            TransportError::Unreachable("connection refused".into()),
        );

        let err = auth
            .login("jdoe", &SecretString::from("secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::Api(ref e) if e.is_unreachable()));
    }

    fn household_profile() -> RegistrationProfile {
        RegistrationProfile {
            username: "doe_family".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            full_name: "Jean Doe".to_string(),
            email: "jdoe@village.rw".to_string(),
            phone_number: "0788123456".to_string(),
            role: Role::Household,
            national_id: Some("1199880012345678".to_string()),
            address: Some("Nyamata".to_string()),
            ..RegistrationProfile::default()
        }
    }

    #[tokio::test]
    async fn test_register_rejected_locally_without_network() {
        let (auth, transport, _) = auth(MemorySessionStore::new());
        let mut profile = household_profile();
        profile.national_id = Some("123".to_string());

        let err = auth.register(&profile).await.unwrap_err();
        let RegisterError::Invalid(body) = err else {
            panic!("expected field errors");
        };
        assert_eq!(body["national_id"], json!(["National ID must be 16 digits"]));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_register_returns_backend_errors_unmodified() {
        let (auth, transport, store) = auth(MemorySessionStore::new());
        let backend_errors = json!({
            "username": ["A user with that username already exists."],
            "email": ["user with this email already exists."]
        });
        transport.respond(Method::POST, REGISTER_PATH, 400, backend_errors.clone());

        let err = auth.register(&household_profile()).await.unwrap_err();
        assert!(matches!(err, RegisterError::Invalid(ref body) if *body == backend_errors));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let (auth, transport, store) = auth(MemorySessionStore::new());
        transport.respond(Method::POST, REGISTER_PATH, 201, login_body("Household"));

        let user = auth.register(&household_profile()).await.unwrap();
        assert!(user.capabilities().is_household);
        assert!(store.load().is_some());

        let sent = transport.requests_to(REGISTER_PATH);
        let body = sent[0].body.as_ref().unwrap();
        assert_eq!(body["role"], "Household");
        assert_eq!(body["national_id"], "1199880012345678");
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let (auth, transport, store) =
            auth(MemorySessionStore::with_session(&session("access-1")).unwrap());
        auth.resolve();
        transport.respond(Method::POST, LOGOUT_PATH, 500, json!({"error": "boom"}));

        auth.logout().await;

        assert!(store.is_empty());
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        let sent = transport.requests_to(LOGOUT_PATH);
        assert_eq!(sent[0].body, Some(json!({"refresh_token": "refresh-1"})));
        assert_eq!(sent[0].bearer.as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_logout_unreachable_backend() {
        let (auth, _, store) = auth(MemorySessionStore::with_session(&session("access-1")).unwrap());
        auth.logout().await;
        assert!(store.is_empty());
        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_without_session_makes_no_call() {
        let (auth, transport, _) = auth(MemorySessionStore::new());
        auth.logout().await;
        assert_eq!(transport.request_count(), 0);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_update_user_changes_flags() {
        let (auth, _, store) = auth(MemorySessionStore::with_session(&session("access-1")).unwrap());
        auth.resolve();
        assert!(auth.capabilities().is_manager);

        auth.update_user(user(Role::Admin)).unwrap();

        let caps = auth.capabilities();
        assert!(caps.is_admin);
        assert!(!caps.is_manager);
        let stored = store.load().unwrap();
        assert_eq!(stored.user.role, Role::Admin);
        assert_eq!(stored.access_token.expose_secret(), "access-1");
    }

    #[test]
    fn test_update_user_requires_session() {
        let (auth, _, _) = auth(MemorySessionStore::new());
        let err = auth.update_user(user(Role::Admin)).unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[test]
    fn test_resolve_is_offline_and_idempotent() {
        let (auth, transport, store) =
            auth(MemorySessionStore::with_session(&session("access-1")).unwrap());
        assert!(auth.state().is_resolving());
        assert!(auth.resolve().is_authenticated());

        store.clear().unwrap();
        assert!(auth.resolve().is_authenticated());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_profile() {
        let (auth, transport, store) =
            auth(MemorySessionStore::with_session(&session("access-1")).unwrap());
        let mut profile = serde_json::to_value(user(Role::Household)).unwrap();
        profile["household_id"] = json!(3);
        transport.respond(Method::GET, CURRENT_USER_PATH, 200, profile);

        let user = auth.refresh_profile().await.unwrap();
        assert_eq!(user.household_id.map(|id| id.as_i32()), Some(3));
        assert_eq!(store.load().unwrap().user.household_id, user.household_id);
        assert!(auth.capabilities().is_household);
    }

    #[tokio::test]
    async fn test_change_password_surfaces_field_errors() {
        let (auth, transport, _) = auth(MemorySessionStore::with_session(&session("access-1")).unwrap());
        transport.respond(
            Method::POST,
            CHANGE_PASSWORD_PATH,
            400,
            json!({"old_password": ["Wrong password"]}),
        );

        let err = auth
            .change_password(
                &SecretString::from("nope"),
                &SecretString::from("secret456"),
                &SecretString::from("secret456"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.message(), "old_password: Wrong password");
    }

    fn held_auth() -> (
        AuthSession<Arc<HeldRefresh>>,
        Arc<HeldRefresh>,
        Arc<MemorySessionStore>,
    ) {
        let transport = Arc::new(HeldRefresh::default());
        let store = Arc::new(MemorySessionStore::with_session(&session("access-1")).unwrap());
        let config = ClientConfig::with_base_url("http://localhost:8000/api".parse().unwrap());
        let client = ApiClient::new(
            Arc::clone(&transport),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            &config,
        );
        let auth = AuthSession::new(client);
        auth.resolve();
        (auth, transport, store)
    }

    #[tokio::test]
    async fn test_logout_during_refresh_stays_logged_out() {
        let (auth, transport, store) = held_auth();
        transport.script.respond(Method::GET, "/bills/", 401, json!({}));
        transport.script.respond(Method::POST, REFRESH_PATH, 200, json!({"access": "access-2"}));

        let client = auth.client().clone();
        let call = tokio::spawn(async move { client.get_json::<serde_json::Value>("/bills/").await });
        transport.entered.notified().await;

        auth.logout().await;
        assert!(store.is_empty());
        transport.release.notify_one();

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(store.is_empty());
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(transport.script.requests_to("/bills/").len(), 1);
    }

    #[tokio::test]
    async fn test_login_during_refresh_keeps_new_session() {
        let (auth, transport, store) = held_auth();
        transport.script.respond(Method::GET, "/bills/", 401, json!({}));
        transport.script.respond(Method::POST, REFRESH_PATH, 200, json!({"access": "access-2"}));
        let mut body = login_body("Household");
        body["user"]["username"] = json!("amahoro");
        body["tokens"] = json!({"access": "access-9", "refresh": "refresh-9"});
        transport.script.respond(Method::POST, LOGIN_PATH, 200, body);

        let client = auth.client().clone();
        let call = tokio::spawn(async move { client.get_json::<serde_json::Value>("/bills/").await });
        transport.entered.notified().await;

        auth.login("amahoro", &SecretString::from("secret123"))
            .await
            .unwrap();
        transport.release.notify_one();

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));

        let stored = store.load().unwrap();
        assert_eq!(stored.access_token.expose_secret(), "access-9");
        assert_eq!(stored.refresh_token.expose_secret(), "refresh-9");
        assert_eq!(stored.user.username, "amahoro");
        assert_eq!(auth.user().unwrap().username, "amahoro");
        assert!(auth.capabilities().is_household);
    }
}
