use std::sync::{Mutex, PoisonError};

use secrecy::SecretString;

use super::{
    Session, SessionStore, SessionStoreError, StoredValues, decode, encode, with_refreshed_token,
};

/// In-process session store.
///
/// Holds the same key/value form as [`super::FileSessionStore`], so malformed
/// or partial data behaves identically.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<StoredValues>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError` if the session cannot be encoded.
    pub fn with_session(session: &Session) -> Result<Self, SessionStoreError> {
        let store = Self::new();
        store.save(session)?;
        Ok(store)
    }

    /// Overwrite one raw value, bypassing encoding.
    pub fn set_raw(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    /// Read one raw value.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Whether no values are stored at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        decode(&self.values.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let encoded = encode(session)?;
        *self.values.lock().unwrap_or_else(PoisonError::into_inner) = encoded;
        Ok(())
    }

    fn replace_access_token(
        &self,
        refresh_token: &SecretString,
        access_token: SecretString,
    ) -> Result<Option<Session>, SessionStoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(session) = with_refreshed_token(decode(&values), refresh_token, access_token)
        else {
            return Ok(None);
        };
        *values = encode(&session)?;
        Ok(Some(session))
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};

    use super::*;
    use crate::session::tests::session;
    use crate::session::{ACCESS_TOKEN_KEY, USER_KEY};

    #[test]
    fn test_save_load_clear() {
        let store = MemorySessionStore::new();
        assert!(store.load().is_none());

        store.save(&session("access-1")).unwrap();
        assert_eq!(store.load().unwrap().access_token.expose_secret(), "access-1");

        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_user_reads_as_empty() {
        let store = MemorySessionStore::with_session(&session("access-1")).unwrap();
        store.set_raw(USER_KEY, "undefined");
        assert!(store.load().is_none());
    }

    #[test]
    fn test_token_without_user_reads_as_empty() {
        let store = MemorySessionStore::new();
        store.set_raw(ACCESS_TOKEN_KEY, "access-1");
        assert!(store.load().is_none());
    }

    #[test]
    fn test_replace_access_token_only_for_same_session() {
        let store = MemorySessionStore::with_session(&session("access-1")).unwrap();
        let updated = store
            .replace_access_token(&SecretString::from("refresh-1"), SecretString::from("access-2"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.access_token.expose_secret(), "access-2");
        assert_eq!(store.load().unwrap().access_token.expose_secret(), "access-2");

        let replaced = store
            .replace_access_token(&SecretString::from("refresh-old"), SecretString::from("access-3"))
            .unwrap();
        assert!(replaced.is_none());
        assert_eq!(store.load().unwrap().access_token.expose_secret(), "access-2");

        store.clear().unwrap();
        let cleared = store
            .replace_access_token(&SecretString::from("refresh-1"), SecretString::from("access-4"))
            .unwrap();
        assert!(cleared.is_none());
        assert!(store.is_empty());
    }
}
