//! Persisted authentication session.
//!
//! A session is stored as three string values under fixed keys:
//! `access_token`, `refresh_token` and `user` (the profile as serialized
//! JSON). Reading is all-or-nothing: if any value is missing or the profile
//! does not parse, the store reports no session at all.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use village_water_core::User;

/// Key of the access token value.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key of the refresh token value.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Key of the serialized user profile.
pub const USER_KEY: &str = "user";

/// Errors writing to a session store.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The signed-in user's credentials and profile.
#[derive(Clone)]
pub struct Session {
    /// Short-lived bearer credential.
    pub access_token: SecretString,
    /// Credential used only to mint new access tokens.
    pub refresh_token: SecretString,
    /// Profile of the signed-in user.
    pub user: User,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("user", &self.user.username)
            .finish()
    }
}

impl Session {
    #[must_use]
    pub fn new(access_token: SecretString, refresh_token: SecretString, user: User) -> Self {
        Self {
            access_token,
            refresh_token,
            user,
        }
    }

    /// The same session with a new access token.
    #[must_use]
    pub fn with_access_token(self, access_token: SecretString) -> Self {
        Self {
            access_token,
            ..self
        }
    }

    /// The same session with a new user profile.
    #[must_use]
    pub fn with_user(self, user: User) -> Self {
        Self { user, ..self }
    }
}

/// Durable storage for one [`Session`].
///
/// Implementations must give read-after-write consistency: a `load` that
/// follows a `save` or `clear` on any thread observes it.
pub trait SessionStore: Send + Sync {
    /// The stored session, or `None` if nothing complete is stored.
    ///
    /// Never fails; unreadable or malformed data counts as no session.
    fn load(&self) -> Option<Session>;

    /// Replace the stored session with `session`, all values at once.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the values could not be written.
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Swap in a new access token, but only while the stored session is the
    /// one holding `refresh_token`. The check and the write are atomic with
    /// respect to the store's other operations.
    ///
    /// Returns the updated session, or `None` if the session was cleared or
    /// replaced in the meantime (nothing is written then).
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the values could not be written.
    fn replace_access_token(
        &self,
        refresh_token: &SecretString,
        access_token: SecretString,
    ) -> Result<Option<Session>, SessionStoreError>;

    /// Remove all stored values.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the values could not be removed.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Raw key/value form of a session.
pub(crate) type StoredValues = BTreeMap<String, String>;

/// `session` with `access_token`, if it is the session holding `refresh_token`.
pub(crate) fn with_refreshed_token(
    session: Option<Session>,
    refresh_token: &SecretString,
    access_token: SecretString,
) -> Option<Session> {
    session
        .filter(|session| session.refresh_token.expose_secret() == refresh_token.expose_secret())
        .map(|session| session.with_access_token(access_token))
}

pub(crate) fn encode(session: &Session) -> Result<StoredValues, SessionStoreError> {
    let mut values = StoredValues::new();
    values.insert(
        ACCESS_TOKEN_KEY.to_string(),
        session.access_token.expose_secret().to_string(),
    );
    values.insert(
        REFRESH_TOKEN_KEY.to_string(),
        session.refresh_token.expose_secret().to_string(),
    );
    values.insert(USER_KEY.to_string(), serde_json::to_string(&session.user)?);
    Ok(values)
}

pub(crate) fn decode(values: &StoredValues) -> Option<Session> {
    let access_token = values.get(ACCESS_TOKEN_KEY).filter(|v| !v.is_empty())?;
    let refresh_token = values.get(REFRESH_TOKEN_KEY).filter(|v| !v.is_empty())?;
    let user = values.get(USER_KEY)?;

    match serde_json::from_str::<User>(user) {
        Ok(user) => Some(Session::new(
            SecretString::from(access_token.as_str()),
            SecretString::from(refresh_token.as_str()),
            user,
        )),
        Err(e) => {
            tracing::warn!(error = %e, "Stored user profile is malformed, ignoring session");
            None
        }
    }
}
